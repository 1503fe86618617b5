//! Block Timer CLI
//! Times a sleep of the requested length and prints the report

use block_timer::logging::init_logging;
use block_timer::{Config, TimeUnit, Timer};
use std::env;
use std::time::Duration;
use tracing::info;

const USAGE: &str = "usage: block-timer [sec|milis|nano] [name] [sleep_ms]";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;
    init_logging(&config.logging)?;

    let args: Vec<String> = env::args().skip(1).collect();
    if args.first().is_some_and(|a| a == "-h" || a == "--help") {
        println!("{USAGE}");
        return Ok(());
    }

    let mut timer = Timer::from_config(&config)?;
    if let Some(label) = args.first() {
        let unit: TimeUnit = label.parse().map_err(|e| anyhow::anyhow!("{e}\n{USAGE}"))?;
        timer = timer.unit(unit);
    }
    if let Some(name) = args.get(1) {
        timer = timer.named(name.as_str());
    }
    let sleep_ms: u64 = match args.get(2) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid sleep_ms `{raw}`: {e}\n{USAGE}"))?,
        None => 5,
    };

    info!(unit = %timer.time_unit(), sleep_ms, "timing sleep");
    let ((), measurement) = timer
        .run_async(tokio::time::sleep(Duration::from_millis(sleep_ms)))
        .await;
    info!(elapsed = ?measurement.elapsed(), "done");

    Ok(())
}
