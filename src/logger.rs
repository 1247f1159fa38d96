use log::{LevelFilter, Log, Metadata, Record};

/// Target used by the script-facing `console` object.
pub const CONSOLE_TARGET: &str = "js-console";

pub struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if record.target() == CONSOLE_TARGET {
            // Script output reads like program output, not like a diagnostic
            println!("[JS Console.{}] {}", record.level(), record.args());
        } else {
            let location = match (record.file(), record.line()) {
                (Some(file), Some(line)) => format!("{}:{}", file, line),
                (Some(file), None) => file.to_string(),
                (None, _) => String::from("unknown location"),
            };

            eprintln!(
                "[{level}][{target}][{location}] {message}",
                level = record.level(),
                target = record.target(),
                location = location,
                message = record.args()
            );
        }
    }

    fn flush(&self) {}
}

pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    static LOGGER: SimpleLogger = SimpleLogger;
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}
