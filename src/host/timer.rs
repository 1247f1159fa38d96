use super::event_loop::EventLoop;
use crate::javascript::value::Value;
use log::debug;
use std::time::Duration;

/// `setTimeout(callback, ms, ...args)`.
///
/// Registers `callback` on `event_loop`; extra arguments are handed to it when
/// it fires. Always returns `Undefined`; there is no handle to cancel a
/// single task.
pub fn set_timeout(name: &str, event_loop: EventLoop) -> Value {
    Value::native(name, move |args| {
        let [callback, delay, extra @ ..] = args else {
            debug!(target: "runtime", "setTimeout needs a callback and a delay, got {} argument(s)", args.len());
            return Value::Undefined;
        };
        if !callback.is_function() {
            debug!(target: "runtime", "setTimeout callback is a {}, ignoring", callback.type_name());
            return Value::Undefined;
        }

        // NaN and negatives clamp to zero
        let millis = delay.to_number().max(0.0);
        let delay = Duration::try_from_secs_f64(millis / 1000.0).unwrap_or(Duration::MAX);
        event_loop.add_task(callback.clone(), extra.to_vec(), delay);
        Value::Undefined
    })
}
