use crate::javascript::interpreter::Interpreter;
use crate::javascript::value::Value;
use log::{debug, warn};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A callback waiting for its due time.
#[derive(Debug)]
pub struct Task {
    pub callback: Value,
    pub args: Vec<Value>,
    pub due: Instant,
}

/// Deferred-task queue shared between the timer built-in and the host.
///
/// Cloning yields another handle to the same queue. Every access is a scoped
/// exclusive borrow that is released before any callback runs, so callbacks
/// may register further tasks.
#[derive(Clone, Default)]
pub struct EventLoop {
    tasks: Rc<RefCell<Vec<Task>>>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_task(&self, callback: Value, args: Vec<Value>, delay: Duration) {
        let Some(due) = Instant::now().checked_add(delay) else {
            warn!(target: "runtime", "Dropping task with unrepresentable delay {:?}", delay);
            return;
        };
        debug!(target: "runtime", "Scheduling task in {:?}", delay);
        self.tasks.borrow_mut().push(Task { callback, args, due });
    }

    /// Drops every task that has not fired yet.
    pub fn clear(&self) {
        let mut tasks = self.tasks.borrow_mut();
        if !tasks.is_empty() {
            debug!(target: "runtime", "Clearing {} pending task(s)", tasks.len());
        }
        tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.tasks.borrow().iter().map(|task| task.due).min()
    }

    /// Removes and returns every task due at or before `now`, in no
    /// particular order.
    pub fn take_due(&self, now: Instant) -> Vec<Task> {
        let mut tasks = self.tasks.borrow_mut();
        let (due, pending): (Vec<Task>, Vec<Task>) =
            std::mem::take(&mut *tasks).into_iter().partition(|task| task.due <= now);
        *tasks = pending;
        due
    }

    /// Fires everything that is due right now and returns how many callbacks
    /// ran. Tasks registered by those callbacks wait for a later tick.
    pub fn tick(&self, interpreter: &Interpreter) -> usize {
        let due = self.take_due(Instant::now());
        let fired = due.len();
        for task in due {
            interpreter.apply_function(&task.callback, &task.args);
        }
        if fired > 0 {
            debug!(target: "runtime", "Fired {} task(s), {} pending", fired, self.len());
        }
        fired
    }
}
