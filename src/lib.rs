//! A small JavaScript-flavoured scripting language: a lexer, a Pratt parser
//! and a tree-walking evaluator with lexical closures, plus a host runtime
//! providing `console`, `print` and a deferred-task queue behind
//! `setTimeout`/`delay`.
//!
//! ```
//! use minijs::{evaluate_source, Environment, Value};
//!
//! let env = Environment::new_root();
//! let result = evaluate_source("let add = fn(a, b) { return a + b; }; add(10, 20);", &env);
//! assert_eq!(result, Value::Number(30.0));
//! ```

mod error;
mod host;
pub mod javascript;
pub mod logger;

pub use error::RuntimeError;
pub use host::{EventLoop, Runtime, RuntimeConfig, Task};
pub use javascript::environment::{Env, Environment};
pub use javascript::interpreter::{Interpreter, LogTrace, TraceEvent, TraceSink};
pub use javascript::value::{Function, JsObject, NativeFunction, Value};
pub use javascript::{JavaScriptEngine, evaluate_source};
