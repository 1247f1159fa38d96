pub mod ast;
pub mod environment;
pub mod interpreter;
pub mod parser;
pub mod tokenizer;
pub mod value;

use environment::Env;
use interpreter::Interpreter;
use log::debug;
use value::Value;

/// Lexes, parses and evaluates `source` against `env`.
///
/// Malformed input never fails here: unknown characters, dropped syntax and
/// runtime type errors all surface as `Value::Undefined` somewhere in the
/// result.
pub fn evaluate_source(source: &str, env: &Env) -> Value {
    JavaScriptEngine::new().evaluate(source, env)
}

/// Pipeline front end pairing the parser with an evaluator that may carry a
/// trace sink.
#[derive(Default)]
pub struct JavaScriptEngine {
    interpreter: Interpreter,
}

impl JavaScriptEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    pub fn evaluate(&self, source: &str, env: &Env) -> Value {
        let mut parser = parser::Parser::new(tokenizer::Lexer::new(source));
        let program = parser.parse_program();
        if !parser.errors().is_empty() {
            debug!(target: "javascript", "Parsed with {} dropped construct(s)", parser.errors().len());
        }
        self.interpreter.evaluate_program(&program, env)
    }
}
