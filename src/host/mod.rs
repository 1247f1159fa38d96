mod console;
mod event_loop;
mod timer;

pub use event_loop::{EventLoop, Task};

use crate::error::RuntimeError;
use crate::javascript::JavaScriptEngine;
use crate::javascript::environment::{Env, Environment};
use crate::javascript::interpreter::LogTrace;
use crate::javascript::value::Value;
use log::{debug, info};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Emit per-statement and per-expression evaluation events to the log.
    pub debug: bool,
    /// How often `run_event_loop` checks for due tasks.
    pub tick_interval: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            debug: false,
            tick_interval: Duration::from_millis(10),
        }
    }
}

/// Host around the interpreter: owns the global scope, the injected
/// built-ins and the deferred-task queue.
pub struct Runtime {
    config: RuntimeConfig,
    engine: JavaScriptEngine,
    globals: Env,
    event_loop: EventLoop,
    running: bool,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        let mut runtime = Self {
            config,
            engine: JavaScriptEngine::new(),
            globals: Environment::new_root(),
            event_loop: EventLoop::new(),
            running: true,
        };

        if runtime.config.debug {
            runtime.enable_debug();
        }
        runtime.inject_globals();
        runtime
    }

    fn inject_globals(&self) {
        self.set_global("console", console::console_object());
        self.set_global("print", console::print_function());
        self.set_global("setTimeout", timer::set_timeout("setTimeout", self.event_loop.clone()));
        self.set_global("delay", timer::set_timeout("delay", self.event_loop.clone()));
        debug!(target: "runtime", "Globals injected");
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Root scope every `execute` call evaluates in.
    pub fn globals(&self) -> &Env {
        &self.globals
    }

    pub fn set_global(&self, name: &str, value: Value) {
        self.globals.borrow_mut().set(name, value);
    }

    pub fn define_native(&self, name: &str, func: impl Fn(&[Value]) -> Value + 'static) {
        self.set_global(name, Value::native(name, func));
    }

    pub fn enable_debug(&mut self) {
        self.config.debug = true;
        self.engine.interpreter_mut().set_trace(Some(Box::new(LogTrace)));
    }

    pub fn disable_debug(&mut self) {
        self.config.debug = false;
        self.engine.interpreter_mut().set_trace(None);
    }

    /// Runs `code` against the global scope. Bindings made here stay visible
    /// to later calls.
    pub fn execute(&self, code: &str) -> Result<Value, RuntimeError> {
        if !self.running {
            return Err(RuntimeError::Stopped);
        }
        if code.is_empty() {
            return Err(RuntimeError::EmptySource);
        }
        Ok(self.engine.evaluate(code, &self.globals))
    }

    pub fn pending_tasks(&self) -> usize {
        self.event_loop.len()
    }

    /// Fires every task that is due now; returns how many ran.
    pub fn tick(&self) -> usize {
        if !self.running {
            return 0;
        }
        self.event_loop.tick(self.engine.interpreter())
    }

    /// Ticks every `tick_interval` until no task is pending.
    pub async fn run_event_loop(&self) {
        let mut interval = tokio::time::interval(self.config.tick_interval);
        while self.running && !self.event_loop.is_empty() {
            interval.tick().await;
            self.tick();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Rejects further `execute` calls and drops every pending task.
    pub fn stop(&mut self) {
        if self.running {
            info!(target: "runtime", "Stopping runtime");
        }
        self.running = false;
        self.event_loop.clear();
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Instant;

    fn runtime() -> Runtime {
        Runtime::new(RuntimeConfig::default())
    }

    fn recorder(runtime: &Runtime) -> Rc<RefCell<Vec<(String, Instant)>>> {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        runtime.define_native("record", move |args| {
            let label = args.first().map(|v| v.to_string()).unwrap_or_default();
            sink.borrow_mut().push((label, Instant::now()));
            Value::Undefined
        });
        calls
    }

    #[test]
    fn test_rejects_empty_source() {
        assert_eq!(runtime().execute(""), Err(RuntimeError::EmptySource));
    }

    #[test]
    fn test_rejects_after_stop() {
        let mut runtime = runtime();
        runtime.stop();
        assert!(!runtime.is_running());
        assert_eq!(runtime.execute("1;"), Err(RuntimeError::Stopped));
    }

    #[test]
    fn test_globals_persist_between_calls() {
        let runtime = runtime();
        assert_eq!(runtime.execute("let x = 40;"), Ok(Value::Undefined));
        assert_eq!(runtime.execute("x + 2;"), Ok(Value::Number(42.0)));
    }

    #[test]
    fn test_injected_globals() {
        let runtime = runtime();
        for name in ["console", "print", "setTimeout", "delay"] {
            assert!(runtime.globals().borrow().get(name).is_some(), "missing {}", name);
        }
        assert_eq!(runtime.execute("console.log(\"hi\", 1);"), Ok(Value::Undefined));
        assert_eq!(runtime.execute("console.missing;"), Ok(Value::Undefined));
    }

    #[test]
    fn test_debug_toggle_keeps_results() {
        let mut runtime = Runtime::new(RuntimeConfig {
            debug: true,
            ..RuntimeConfig::default()
        });
        assert!(runtime.config().debug);
        assert_eq!(runtime.execute("2 * 21;"), Ok(Value::Number(42.0)));
        runtime.disable_debug();
        assert!(!runtime.config().debug);
        assert_eq!(runtime.execute("2 * 21;"), Ok(Value::Number(42.0)));
    }

    #[test]
    fn test_delay_waits_for_due_time() {
        let runtime = runtime();
        let calls = recorder(&runtime);

        runtime
            .execute("setTimeout(fn() { record(\"late\"); }, 60000);")
            .expect("script runs");
        assert_eq!(runtime.pending_tasks(), 1);
        assert_eq!(runtime.tick(), 0);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_stop_clears_pending_tasks() {
        let mut runtime = runtime();
        let calls = recorder(&runtime);

        runtime
            .execute("delay(fn() { record(\"a\"); }, 0); delay(fn() { record(\"b\"); }, 5);")
            .expect("script runs");
        assert_eq!(runtime.pending_tasks(), 2);

        runtime.stop();
        assert_eq!(runtime.pending_tasks(), 0);
        assert_eq!(runtime.tick(), 0);
        assert!(calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_event_loop_fires_after_due_times() {
        let runtime = runtime();
        let calls = recorder(&runtime);
        let start = Instant::now();

        runtime
            .execute(
                "let tag = \"first\";
                 setTimeout(fn(label) { record(label); }, 40, \"second\");
                 setTimeout(fn() { record(tag); }, 15);",
            )
            .expect("script runs");
        runtime.run_event_loop().await;

        let calls = calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "first");
        assert_eq!(calls[1].0, "second");
        assert!(calls[0].1.duration_since(start) >= Duration::from_millis(15));
        assert!(calls[1].1.duration_since(start) >= Duration::from_millis(40));
        assert_eq!(runtime.pending_tasks(), 0);
    }

    #[tokio::test]
    async fn test_callback_scheduled_by_callback_runs() {
        let runtime = runtime();
        let calls = recorder(&runtime);

        runtime
            .execute("setTimeout(fn() { record(1); setTimeout(fn() { record(2); }, 5); }, 5);")
            .expect("script runs");
        runtime.run_event_loop().await;

        let labels: Vec<String> = calls.borrow().iter().map(|(l, _)| l.clone()).collect();
        assert_eq!(labels, vec!["1".to_string(), "2".to_string()]);
    }
}
