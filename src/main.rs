//! db-report - query PostgreSQL, export the result and mail it as a report.

mod cli;

use cli::Cli;
use db_report::config::Config;
use db_report::error::{ReportError, Result};
use db_report::{logging, pipeline};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // A missing .env is not an error
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    match &cli.log_file {
        Some(path) => logging::init_file_logging(path),
        None => logging::init_stderr_logging(),
    }

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;

    // CLI arguments win over the file; the environment only fills gaps
    cli.apply_to(&mut config)?;
    config.apply_env_defaults();

    let report = pipeline::run(&config).await?;

    for (file_type, path) in &report.written {
        info!("Wrote {}: {}", file_type, path.display());
    }
    if let Some(mailing) = &report.mailing {
        for address in &mailing.rejected {
            warn!("Not sent (invalid address): {}", address);
        }
        if !mailing.failed.is_empty() {
            let addresses: Vec<&str> = mailing.failed.iter().map(|f| f.address.as_str()).collect();
            return Err(ReportError::mail(format!(
                "delivery failed for {}",
                addresses.join(", ")
            )));
        }
    }
    if !report.failed.is_empty() {
        let formats: Vec<String> = report.failed.iter().map(|f| f.file_type.to_string()).collect();
        return Err(ReportError::export(format!(
            "{} format(s) failed: {}",
            formats.len(),
            formats.join(", ")
        )));
    }

    info!("Report complete: {} rows", report.rows);
    Ok(())
}
