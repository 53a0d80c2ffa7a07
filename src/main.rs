// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use nscheck::config::{CheckConfig, CloudCredentials};
use nscheck::error::CheckError;
use nscheck::exec::ShellRunner;
use nscheck::marketplace::MarketplaceClient;
use nscheck::pipeline::Pipeline;

#[derive(Parser)]
#[command(
    name = "nscheck",
    about = "NativeScript marketplace plugin compatibility harness",
    version
)]
struct Args {
    /// Number of catalog entries to skip
    #[arg(default_value_t = 0)]
    skip: u64,

    /// Number of catalog entries to check
    #[arg(default_value_t = 10)]
    take: u64,

    /// Cloud build account id (enables remote builds; needs --cloud-api-key)
    #[arg(long, env = "NSCHECK_CLOUD_ACCOUNT", requires = "cloud_api_key")]
    cloud_account: Option<String>,

    /// Cloud build API key
    #[arg(long, env = "NSCHECK_CLOUD_API_KEY", requires = "cloud_account")]
    cloud_api_key: Option<String>,

    /// Also clone and build each plugin's demo app
    #[arg(long)]
    demos: bool,

    /// Report output path
    #[arg(long, default_value = "nscheck-report.json")]
    out: PathBuf,

    /// Log filter (trace, debug, info, warn, error)
    #[arg(long, env = "NSCHECK_LOG", default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&args.log).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cloud = match (args.cloud_account, args.cloud_api_key) {
        (Some(account_id), Some(api_key)) => Some(CloudCredentials { account_id, api_key }),
        _ => None,
    };
    let config = CheckConfig {
        skip: args.skip,
        take: args.take,
        cloud,
        check_demos: args.demos,
        report_path: args.out,
        ..CheckConfig::default()
    };

    let pipeline = Pipeline::new(config, Arc::new(ShellRunner), MarketplaceClient::default());
    match pipeline.run().await {
        Ok(report) => {
            let passed: usize = report
                .plugins
                .iter()
                .flat_map(|p| p.actions.values())
                .flat_map(|platforms| platforms.values())
                .filter(|o| o.success)
                .count();
            tracing::info!(plugins = report.plugins.len(), passing_builds = passed, "run complete");
            Ok(())
        }
        Err(e) if CheckError::is_template_drift(&e) => {
            // Maintainer alert: the scaffold template changed upstream and
            // the patch logic needs updating. Distinct exit code so CI can
            // tell this apart from ordinary failures.
            error!("{e:#}");
            std::process::exit(2);
        }
        Err(e) => Err(e),
    }
}
