//! Times a few simulated operations and prints the report at every scale.

use std::thread;
use std::time::Duration;

use task_clock::{Registry, Scale};

fn main() -> task_clock::Result<()> {
    let registry = Registry::global();

    let connect = registry.task("Connect")?;
    let query = registry.task("Query")?;
    let _cleanup = registry.task("Cleanup")?;

    connect.start()?;
    thread::sleep(Duration::from_millis(15));
    connect.finish()?;

    // Left running, so the report shows a live reading.
    query.start()?;
    thread::sleep(Duration::from_millis(5));

    for scale in Scale::ALL {
        registry.to_report(scale)?.print_to_stdout();
        println!();
    }

    Ok(())
}
