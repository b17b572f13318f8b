use anyhow::Context;

use roster_sweep::config::{load_config, resolve_config_path};
use roster_sweep::mutate::BatchOutcome;
use roster_sweep::run_sweep;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = resolve_config_path(std::env::args().nth(1));
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load sweep config {}", config_path.display()))?;

    log::info!("Starting worker access sweep on spreadsheet {}", config.spreadsheet_id);

    match run_sweep(&config).await {
        Ok(summary) => {
            if let BatchOutcome::Submitted(n) = summary.batch {
                log::info!("Applied {} spreadsheet updates", n);
            }
            log::info!("Process completed successfully");
            Ok(())
        }
        Err(e) => {
            if let Some(details) = e.details() {
                log::error!("Details: {}", details);
            }
            log::error!("{}", e.recovery_suggestion());
            Err(e.into())
        }
    }
}
