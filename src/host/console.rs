use crate::javascript::value::{JsObject, Value};
use crate::logger::CONSOLE_TARGET;
use log::Level;

/// Space-separated string forms of `args`.
pub fn join_args(args: &[Value]) -> String {
    args.iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `console` object whose methods log on the console target.
pub fn console_object() -> Value {
    let mut console = JsObject::new("console");

    let methods = [
        ("log", Level::Info),
        ("info", Level::Info),
        ("warn", Level::Warn),
        ("error", Level::Error),
        ("debug", Level::Debug),
    ];
    for (name, level) in methods {
        console.set(
            name,
            Value::native(format!("console.{}", name), move |args| {
                log::log!(target: CONSOLE_TARGET, level, "{}", join_args(args));
                Value::Undefined
            }),
        );
    }

    Value::object(console)
}

/// `print(...)`: writes straight to stdout.
pub fn print_function() -> Value {
    Value::native("print", |args| {
        println!("{}", join_args(args));
        Value::Undefined
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_args() {
        let args = [
            Value::String("n =".into()),
            Value::Number(5.0),
            Value::Boolean(false),
            Value::Undefined,
        ];
        assert_eq!(join_args(&args), "n = 5 false undefined");
        assert_eq!(join_args(&[]), "");
    }

    #[test]
    fn test_console_methods_are_functions() {
        let console = console_object();
        for name in ["log", "info", "warn", "error", "debug"] {
            let method = console.get_property(name);
            assert!(method.is_function(), "console.{} should be callable", name);
        }
        assert_eq!(console.get_property("table"), Value::Undefined);
    }
}
