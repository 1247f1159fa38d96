use super::ast::{Block, Expression, InfixOperator, PrefixOperator, Program, Statement};
use super::environment::{Env, Environment};
use super::value::{Function, UserFunction, Value};
use log::debug;
use std::cmp::Ordering;
use std::rc::Rc;

/// Evaluation events offered to a `TraceSink`.
#[derive(Debug)]
pub enum TraceEvent<'a> {
    ProgramStart { statements: usize },
    Statement(&'a Statement),
    Expression(&'a Expression),
    Bind { name: &'a str, value: &'a Value },
    Return(&'a Value),
    Call { arguments: usize },
    ProgramEnd(&'a Value),
}

/// Observer for evaluation. Installing or removing one never changes results.
pub trait TraceSink {
    fn trace(&self, event: &TraceEvent<'_>);
}

/// Forwards every event to the `javascript` log target at debug level.
pub struct LogTrace;

impl TraceSink for LogTrace {
    fn trace(&self, event: &TraceEvent<'_>) {
        match event {
            TraceEvent::ProgramStart { statements } => {
                debug!(target: "javascript", "Evaluating program with {} statement(s)", statements)
            }
            TraceEvent::Statement(stmt) => {
                debug!(target: "javascript", "Evaluating {} statement", stmt.kind())
            }
            TraceEvent::Expression(expr) => {
                debug!(target: "javascript", "Evaluating {} expression", expr.kind())
            }
            TraceEvent::Bind { name, value } => {
                debug!(target: "javascript", "Binding '{}' to {}", name, value)
            }
            TraceEvent::Return(value) => {
                debug!(target: "javascript", "Returning {}", value)
            }
            TraceEvent::Call { arguments } => {
                debug!(target: "javascript", "Calling function with {} argument(s)", arguments)
            }
            TraceEvent::ProgramEnd(value) => {
                debug!(target: "javascript", "Program evaluation complete, result: {}", value)
            }
        }
    }
}

/// Tree-walking evaluator.
///
/// Every semantic failure (unbound name, mismatched operand types, division by
/// zero, calling a non-function) yields `Value::Undefined`; nothing here
/// returns an error.
#[derive(Default)]
pub struct Interpreter {
    trace: Option<Box<dyn TraceSink>>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace(sink: impl TraceSink + 'static) -> Self {
        Self {
            trace: Some(Box::new(sink)),
        }
    }

    pub fn set_trace(&mut self, sink: Option<Box<dyn TraceSink>>) {
        self.trace = sink;
    }

    pub fn is_tracing(&self) -> bool {
        self.trace.is_some()
    }

    fn emit(&self, event: TraceEvent<'_>) {
        if let Some(sink) = &self.trace {
            sink.trace(&event);
        }
    }

    /// Runs the top-level statements in `env`. A top-level `return` ends the
    /// program and yields its value.
    pub fn evaluate_program(&self, program: &Program, env: &Env) -> Value {
        self.emit(TraceEvent::ProgramStart {
            statements: program.statements.len(),
        });

        let mut result = Value::Undefined;
        for stmt in &program.statements {
            result = self.evaluate_statement(stmt, env);
            if result.is_return() {
                break;
            }
        }

        let result = result.unwrap_return();
        self.emit(TraceEvent::ProgramEnd(&result));
        result
    }

    pub fn evaluate_statement(&self, stmt: &Statement, env: &Env) -> Value {
        self.emit(TraceEvent::Statement(stmt));

        match stmt {
            Statement::Let { name, value } => {
                let value = self.evaluate_optional(value.as_ref(), env);
                if value.is_return() {
                    return value;
                }
                self.emit(TraceEvent::Bind {
                    name: name.name(),
                    value: &value,
                });
                env.borrow_mut().set(name.name(), value);
                Value::Undefined
            }
            Statement::Return(value) => {
                let value = self.evaluate_optional(value.as_ref(), env).unwrap_return();
                self.emit(TraceEvent::Return(&value));
                Value::Return(Box::new(value))
            }
            Statement::Block(block) => self.evaluate_block(block, env),
            Statement::Expression(expr) => self.evaluate_optional(expr.as_ref(), env),
        }
    }

    /// Runs statements in order, stopping at the first `Return` marker and
    /// handing it up still wrapped.
    fn evaluate_block(&self, block: &Block, env: &Env) -> Value {
        let mut result = Value::Undefined;
        for stmt in &block.statements {
            result = self.evaluate_statement(stmt, env);
            if result.is_return() {
                return result;
            }
        }
        result
    }

    // Absent fragments left by the parser evaluate to Undefined.
    fn evaluate_optional(&self, expr: Option<&Expression>, env: &Env) -> Value {
        match expr {
            Some(expr) => self.evaluate_expression(expr, env),
            None => Value::Undefined,
        }
    }

    pub fn evaluate_expression(&self, expr: &Expression, env: &Env) -> Value {
        self.emit(TraceEvent::Expression(expr));

        match expr {
            Expression::Number(n) => Value::Number(*n),
            Expression::String(s) => Value::String(s.clone()),
            Expression::Boolean(b) => Value::Boolean(*b),
            Expression::Identifier(ident) => env.borrow().get(ident.name()).unwrap_or_default(),

            Expression::Prefix { op, right } => {
                let right = self.evaluate_expression(right, env);
                if right.is_return() {
                    return right;
                }
                match (op, right) {
                    (PrefixOperator::Not, value) => Value::Boolean(!value.is_truthy()),
                    (PrefixOperator::Negative, Value::Number(n)) => Value::Number(-n),
                    (PrefixOperator::Negative, _) => Value::Undefined,
                }
            }

            Expression::Infix { op, left, right } => {
                let left = self.evaluate_expression(left, env);
                if left.is_return() {
                    return left;
                }
                let right = self.evaluate_expression(right, env);
                if right.is_return() {
                    return right;
                }
                evaluate_infix(*op, &left, &right)
            }

            Expression::Property { object, property } => {
                let object = self.evaluate_expression(object, env);
                if object.is_return() {
                    return object;
                }
                object.get_property(property.name())
            }

            Expression::Function { params, body } => {
                Value::Function(Function::User(Rc::new(UserFunction {
                    params: params.clone(),
                    body: body.clone(),
                    closure: Rc::clone(env),
                })))
            }

            Expression::Call { callee, arguments } => {
                let callee = self.evaluate_expression(callee, env);
                if callee.is_return() {
                    return callee;
                }
                let mut args = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    let value = self.evaluate_expression(arg, env);
                    // A `return` inside an argument leaves the enclosing function
                    if value.is_return() {
                        return value;
                    }
                    args.push(value);
                }
                self.apply_function(&callee, &args)
            }

            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                let condition = self.evaluate_expression(condition, env);
                if condition.is_return() {
                    return condition;
                }
                if condition.is_truthy() {
                    self.evaluate_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.evaluate_block(alternative, env)
                } else {
                    Value::Undefined
                }
            }
        }
    }

    /// Invokes `callee` with `args`. User functions run in a fresh scope whose
    /// parent is their closure; missing arguments bind to `Undefined` and
    /// extras are ignored. The result never carries a `Return` marker.
    pub fn apply_function(&self, callee: &Value, args: &[Value]) -> Value {
        self.emit(TraceEvent::Call {
            arguments: args.len(),
        });

        match callee {
            Value::Function(Function::Native(native)) => native.call(args).unwrap_return(),
            Value::Function(Function::User(func)) => {
                let call_env = Environment::new_enclosed(&func.closure);
                {
                    let mut scope = call_env.borrow_mut();
                    for (i, param) in func.params.iter().enumerate() {
                        scope.set(param.name(), args.get(i).cloned().unwrap_or_default());
                    }
                }
                self.evaluate_block(&func.body, &call_env).unwrap_return()
            }
            other => {
                debug!(target: "javascript", "Attempted to call non-function {}", other.type_name());
                Value::Undefined
            }
        }
    }
}

fn evaluate_infix(op: InfixOperator, left: &Value, right: &Value) -> Value {
    let ordered = |accept: fn(Ordering) -> bool| match left.compare(right) {
        Some(ordering) => Value::Boolean(accept(ordering)),
        None => Value::Undefined,
    };

    match op {
        InfixOperator::Add => left.add(right),
        InfixOperator::Subtract => left.subtract(right),
        InfixOperator::Multiply => left.multiply(right),
        InfixOperator::Divide => left.divide(right),
        InfixOperator::Equal => Value::Boolean(left.equals(right)),
        InfixOperator::NotEqual => Value::Boolean(!left.equals(right)),
        InfixOperator::LessThan => ordered(Ordering::is_lt),
        InfixOperator::GreaterThan => ordered(Ordering::is_gt),
        InfixOperator::LessThanEqual => ordered(Ordering::is_le),
        InfixOperator::GreaterThanEqual => ordered(Ordering::is_ge),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::javascript::parser::parse;
    use std::cell::RefCell;

    fn eval(source: &str) -> Value {
        let env = Environment::new_root();
        Interpreter::new().evaluate_program(&parse(source), &env)
    }

    #[test]
    fn test_literals() {
        assert_eq!(eval("42;"), Value::Number(42.0));
        assert_eq!(eval("\"hi\";"), Value::String("hi".into()));
        assert_eq!(eval("true;"), Value::Boolean(true));
        assert_eq!(eval(""), Value::Undefined);
    }

    #[test]
    fn test_prefix_operators() {
        assert_eq!(eval("-5;"), Value::Number(-5.0));
        assert_eq!(eval("!true;"), Value::Boolean(false));
        assert_eq!(eval("!0;"), Value::Boolean(true));
        assert_eq!(eval("!!\"x\";"), Value::Boolean(true));
        assert_eq!(eval("-\"x\";"), Value::Undefined);
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(eval("2 + 3 * 4;"), Value::Number(14.0));
        assert_eq!(eval("(2 + 3) * 4;"), Value::Number(20.0));
        assert_eq!(eval("10 - 4 - 3;"), Value::Number(3.0));
        assert_eq!(eval("7 / 2;"), Value::Number(3.5));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("1 < 2;"), Value::Boolean(true));
        assert_eq!(eval("2 <= 2;"), Value::Boolean(true));
        assert_eq!(eval("\"b\" > \"a\";"), Value::Boolean(true));
        assert_eq!(eval("1 == 1;"), Value::Boolean(true));
        assert_eq!(eval("1 != \"1\";"), Value::Boolean(true));
        assert_eq!(eval("1 < \"2\";"), Value::Undefined);
    }

    #[test]
    fn test_if_expression() {
        assert_eq!(eval("if (1 < 2) { 10 } else { 20 }"), Value::Number(10.0));
        assert_eq!(eval("if (0) { 10 } else { 20 }"), Value::Number(20.0));
        assert_eq!(eval("if (false) { 10 }"), Value::Undefined);
    }

    #[test]
    fn test_return_stops_program() {
        assert_eq!(eval("1; return 2; 3;"), Value::Number(2.0));
        assert_eq!(eval("{ return 4; } 5;"), Value::Number(4.0));
        assert_eq!(eval("if (true) { return 6; } 7;"), Value::Number(6.0));
    }

    #[test]
    fn test_return_does_not_leak_from_call() {
        let result = eval("let f = fn() { return 1; 2; }; f();");
        assert!(!result.is_return());
        assert_eq!(result, Value::Number(1.0));
    }

    #[test]
    fn test_nested_return_stops_at_call_boundary() {
        let source = "let f = fn() { { if (true) { return 1; } } return 2; }; f() + 10;";
        assert_eq!(eval(source), Value::Number(11.0));
    }

    #[test]
    fn test_implicit_function_result() {
        assert_eq!(eval("let f = fn(x) { x * 2 }; f(4);"), Value::Number(8.0));
        assert_eq!(eval("fn() {}();"), Value::Undefined);
    }

    #[test]
    fn test_argument_arity() {
        assert_eq!(eval("let f = fn(a, b) { b }; f(1);"), Value::Undefined);
        assert_eq!(eval("let f = fn(a) { a }; f(1, 2, 3);"), Value::Number(1.0));
    }

    #[test]
    fn test_calling_non_function() {
        assert_eq!(eval("let x = 5; x(1);"), Value::Undefined);
        assert_eq!(eval("nothing();"), Value::Undefined);
    }

    #[test]
    fn test_let_yields_undefined() {
        assert_eq!(eval("let x = 1;"), Value::Undefined);
    }

    #[test]
    fn test_closure_sees_later_bindings() {
        let source = "let get = fn() { later }; let later = 9; get();";
        assert_eq!(eval(source), Value::Number(9.0));
    }

    #[test]
    fn test_recursion_through_closure() {
        let source = "
            let fact = fn(n) { if (n < 2) { return 1; } return n * fact(n - 1); };
            fact(5);
        ";
        assert_eq!(eval(source), Value::Number(120.0));
    }

    #[test]
    fn test_native_function_receives_arguments() {
        let env = Environment::new_root();
        env.borrow_mut().set(
            "sum",
            Value::native("sum", |args| {
                Value::Number(args.iter().map(Value::to_number).sum())
            }),
        );
        let result = Interpreter::new().evaluate_program(&parse("sum(1, 2, 3);"), &env);
        assert_eq!(result, Value::Number(6.0));
    }

    #[test]
    fn test_return_inside_operand_leaves_enclosing_function() {
        let env = Environment::new_root();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        env.borrow_mut().set(
            "spy",
            Value::native("spy", move |args| {
                sink.borrow_mut().extend(args.iter().cloned());
                Value::Undefined
            }),
        );
        let run = |source: &str| Interpreter::new().evaluate_program(&parse(source), &env);

        assert_eq!(
            run("let h = fn() { spy(if (true) { return 1; }); 2 }; h();"),
            Value::Number(1.0)
        );
        assert!(seen.borrow().is_empty());

        assert_eq!(
            run("let id = fn(a) { let b = a; 99 }; let g = fn() { id(if (true) { return 5; }); 7 }; g();"),
            Value::Number(5.0)
        );
        assert_eq!(
            run("let k = fn() { 1 + if (true) { return 5; }; 0 }; k();"),
            Value::Number(5.0)
        );
        assert_eq!(
            run("let n = fn() { -if (true) { return 3; }; 0 }; n();"),
            Value::Number(3.0)
        );
        assert_eq!(
            run("let c = fn() { if (if (true) { return 4; }) { 8 }; 0 }; c();"),
            Value::Number(4.0)
        );
        assert!(seen.borrow().iter().all(|value| !value.is_return()));
    }

    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl TraceSink for Recorder {
        fn trace(&self, event: &TraceEvent<'_>) {
            if let TraceEvent::Bind { name, value } = event {
                self.0.borrow_mut().push(format!("{}={}", name, value));
            }
        }
    }

    #[test]
    fn test_trace_sink_observes_without_changing_results() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let traced = Interpreter::with_trace(Recorder(Rc::clone(&events)));
        assert!(traced.is_tracing());
        assert!(!Interpreter::new().is_tracing());
        let source = "let a = 2; let b = a * 3; b;";

        let env = Environment::new_root();
        let with_trace = traced.evaluate_program(&parse(source), &env);

        assert_eq!(with_trace, eval(source));
        assert_eq!(*events.borrow(), vec!["a=2".to_string(), "b=6".to_string()]);
    }
}
