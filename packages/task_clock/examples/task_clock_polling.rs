//! Polls a long-running task for progress without finishing it, then excludes a task from the
//! report by untracking it.

use std::thread;
use std::time::Duration;

use task_clock::{Registry, Scale};

fn main() -> task_clock::Result<()> {
    let registry = Registry::new();

    let import = registry.task("Import")?;
    let warmup = registry.task("Warm-up")?;
    warmup.start()?.finish()?;

    import.start()?;
    for _ in 0..3 {
        thread::sleep(Duration::from_millis(10));
        println!("{import}: {:.1} ms so far", import.millis()?);
    }
    import.finish()?;

    // Not interesting for the report.
    warmup.untrack();

    println!("{}", registry.report(Scale::Milliseconds)?);

    Ok(())
}
