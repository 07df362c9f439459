//! Cost Estimator CLI - daily AWS cost report by email.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cost_estimator::{CostNotifier, CostSourceConfig, NotifierConfig, PipelineSettings};
use estimator_cloud::{ReportStore, S3ObjectStore};
use estimator_notify::SnsChannel;

/// Exit code for configuration and startup errors.
const EXIT_STARTUP: u8 = 1;

/// Cost Estimator - Email a daily AWS cost report through S3 and SNS.
#[derive(Parser, Debug)]
#[command(name = "cost-estimator")]
#[command(about = "Generate the daily AWS cost report and email links to it")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, env = "COST_ESTIMATOR_LOG_JSON")]
    log_json: bool,

    /// TOML configuration file
    #[arg(short, long, env = "COST_ESTIMATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Recipient email address
    #[arg(long, env = "COST_ESTIMATOR_EMAIL")]
    email: Option<String>,

    /// S3 bucket receiving reports
    #[arg(long, env = "COST_ESTIMATOR_BUCKET")]
    bucket: Option<String>,

    /// AWS region
    #[arg(long, env = "COST_ESTIMATOR_REGION")]
    region: Option<String>,

    /// SNS topic name
    #[arg(long, env = "COST_ESTIMATOR_TOPIC")]
    topic: Option<String>,

    /// Object key of the stored report
    #[arg(long, env = "COST_ESTIMATOR_REPORT_KEY")]
    report_key: Option<String>,

    /// Local copy of the rendered report
    #[arg(long, env = "COST_ESTIMATOR_LOCAL_FILE")]
    local_file: Option<PathBuf>,

    /// Read cost figures from a JSON file
    #[arg(long, env = "COST_ESTIMATOR_COSTS_FILE", conflicts_with = "costs_command")]
    costs_file: Option<PathBuf>,

    /// Run a pricing command that prints cost figures as JSON
    #[arg(long, env = "COST_ESTIMATOR_COSTS_COMMAND")]
    costs_command: Option<String>,

    /// Argument passed to the pricing command (repeatable)
    #[arg(long = "costs-arg", requires = "costs_command")]
    costs_args: Vec<String>,

    /// Include EBS and Route 53 sections
    #[arg(long)]
    extended: bool,

    /// Seconds between subscription confirmation checks
    #[arg(long, env = "COST_ESTIMATOR_POLL_INTERVAL")]
    poll_interval_secs: Option<u64>,

    /// Give up waiting for confirmation after this many seconds
    #[arg(long, env = "COST_ESTIMATOR_MAX_WAIT")]
    max_wait_secs: Option<u64>,

    /// Fetch and render only; skip S3 and SNS
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Apply CLI and environment overrides on top of a loaded config.
    fn apply(&self, config: &mut NotifierConfig) {
        if let Some(email) = &self.email {
            config.email = Some(email.clone());
        }
        if let Some(bucket) = &self.bucket {
            config.bucket = Some(bucket.clone());
        }
        if let Some(region) = &self.region {
            config.region.clone_from(region);
        }
        if let Some(topic) = &self.topic {
            config.topic_name.clone_from(topic);
        }
        if let Some(key) = &self.report_key {
            config.report_key.clone_from(key);
        }
        if let Some(path) = &self.local_file {
            config.local_file.clone_from(path);
        }
        if let Some(path) = &self.costs_file {
            config.cost_source = Some(CostSourceConfig::File { path: path.clone() });
        }
        if let Some(program) = &self.costs_command {
            config.cost_source = Some(CostSourceConfig::Command {
                program: program.clone(),
                args: self.costs_args.clone(),
            });
        }
        if self.extended {
            config.extended_layout = true;
        }
        if let Some(secs) = self.poll_interval_secs {
            config.poll_interval_secs = secs;
        }
        if let Some(secs) = self.max_wait_secs {
            config.max_confirmation_wait_secs = Some(secs);
        }
    }

    fn load_config(&self) -> Result<NotifierConfig> {
        let mut config = match &self.config {
            Some(path) => NotifierConfig::from_toml_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => NotifierConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("cost_estimator=debug,estimator_cloud=debug,estimator_notify=debug,info")
        } else {
            EnvFilter::new("info")
        }
    });

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match run(&cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(EXIT_STARTUP)
        }
    }
}

async fn run(cli: &Cli) -> Result<u8> {
    let config = cli.load_config()?;

    if cli.dry_run {
        config.validate_local()?;
        let source = config.cost_source()?.build();
        return match cost_estimator::dry_run(source.as_ref(), config.layout(), &config.local_file)
            .await
        {
            Ok(outcome) => {
                println!("{}", outcome.preview);
                Ok(0)
            }
            Err(e) => {
                error!(exit_code = e.exit_code(), "Dry run failed: {e}");
                Ok(e.exit_code())
            }
        };
    }

    let settings = PipelineSettings::from_config(&config)?;
    let source = config.cost_source()?.build();

    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()))
        .load()
        .await;

    let bucket = config.bucket_name()?;
    let store = ReportStore::new(Arc::new(S3ObjectStore::from_sdk_config(&sdk_config, bucket)))
        .with_download_filename(config.download_filename.clone())
        .with_url_expiry(config.url_expiry());
    let channel = Arc::new(SnsChannel::from_sdk_config(&sdk_config));

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping");
            signal_token.cancel();
        }
    });

    info!(region = %config.region, bucket = %bucket, "AWS clients configured");

    let notifier = CostNotifier::new(settings, source, store, channel).with_cancellation(cancel);
    match notifier.run().await {
        Ok(outcome) => Ok(outcome.exit_code()),
        Err(e) => {
            error!(exit_code = e.exit_code(), "Run failed: {e}");
            Ok(e.exit_code())
        }
    }
}
