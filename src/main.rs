use log::{LevelFilter, info};
use minijs::{Runtime, RuntimeConfig};
use std::error::Error;

const DEMO_SCRIPTS: &[(&str, &str)] = &[
    ("arithmetic", "let x = 5; let y = 3; x + y;"),
    ("function", "let add = function(a, b) { return a + b; }; add(10, 20);"),
    (
        "closure",
        "let mk = fn(a) { return fn(b) { return a + b; }; }; let add5 = mk(5); add5(2);",
    ),
    ("strings", "\"n=\" + 5;"),
    ("console", "console.log(\"Hello from minijs!\");"),
    (
        "timers",
        "setTimeout(fn() { console.log(\"fired after 50ms\"); }, 50);
         delay(fn(who) { console.log(\"hello\", who); }, 10, \"world\");",
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut debug = false;
    let mut script_path = None;
    for arg in std::env::args().skip(1) {
        if arg == "--debug" {
            debug = true;
        } else {
            script_path = Some(arg);
        }
    }

    let level = if debug { LevelFilter::Debug } else { LevelFilter::Info };
    minijs::logger::init(level).map_err(|e| format!("Failed to initialize logger: {}", e))?;

    let mut runtime = Runtime::new(RuntimeConfig {
        debug,
        ..RuntimeConfig::default()
    });
    info!(target: "runtime", "Runtime initialized");

    match script_path {
        Some(path) => {
            let source = std::fs::read_to_string(&path)?;
            let result = runtime.execute(&source)?;
            println!("{}", result);
        }
        None => {
            for (name, source) in DEMO_SCRIPTS {
                let result = runtime.execute(source)?;
                println!("{:<12} => {}", name, result);
            }
        }
    }

    let start = std::time::Instant::now();
    runtime.run_event_loop().await;
    info!(target: "runtime", "Event loop drained in {:?}", start.elapsed());

    runtime.stop();
    Ok(())
}
