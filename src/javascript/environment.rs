use super::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope. Function values keep the scope they were defined
/// in alive through one of these.
pub type Env = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
    parent: Option<Env>,
}

impl Environment {
    pub fn new_root() -> Env {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Child scope whose lookups fall back to `parent`.
    pub fn new_enclosed(parent: &Env) -> Env {
        Rc::new(RefCell::new(Self {
            bindings: HashMap::new(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Nearest binding of `name`, searching outward through the parents.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.bindings.get(name) {
            Some(value) => Some(value.clone()),
            None => self.parent.as_ref()?.borrow().get(name),
        }
    }

    /// Binds `name` in this scope only; outer bindings are shadowed, never
    /// overwritten.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_parents() {
        let root = Environment::new_root();
        root.borrow_mut().set("x", Value::Number(1.0));
        let child = Environment::new_enclosed(&root);
        let grandchild = Environment::new_enclosed(&child);
        assert_eq!(grandchild.borrow().get("x"), Some(Value::Number(1.0)));
        assert_eq!(grandchild.borrow().get("y"), None);
    }

    #[test]
    fn test_set_shadows_without_touching_parent() {
        let root = Environment::new_root();
        root.borrow_mut().set("x", Value::Number(1.0));
        let child = Environment::new_enclosed(&root);
        child.borrow_mut().set("x", Value::Number(2.0));

        assert_eq!(child.borrow().get("x"), Some(Value::Number(2.0)));
        assert_eq!(root.borrow().get("x"), Some(Value::Number(1.0)));
        assert!(child.borrow().contains_local("x"));
    }

    #[test]
    fn test_parent_updates_visible_through_child() {
        let root = Environment::new_root();
        let child = Environment::new_enclosed(&root);
        root.borrow_mut().set("late", Value::Boolean(true));
        assert_eq!(child.borrow().get("late"), Some(Value::Boolean(true)));
    }
}
