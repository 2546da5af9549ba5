//! Clean command implementation.
//!
//! Resolves settings from flags, environment and an optional YAML file,
//! then runs one retention cleanup over a registry project.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::{info, warn};

use tagsweep_cleanup::{
    Cleaner, CleanupConfig, ConsoleReporter, JsonReporter, Reporter, ShutdownSignal,
};
use tagsweep_core::RetentionPolicy;
use tagsweep_registry::{
    RegistryAuth, RegistryClient, RegistryConfig, TlsConfig, DEFAULT_PAGE_SIZE,
};

use crate::sweep_file::SweepFile;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Exit status after a forced stop by a second interrupt (128 + SIGINT).
const EXIT_INTERRUPTED: i32 = 130;

/// Report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per repository and a summary
    #[default]
    Text,
    /// A single JSON document
    Json,
}

/// Arguments for the clean command.
#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Registry base URL (e.g., `<https://harbor.example.com>`)
    #[arg(long, env = "TAGSWEEP_URL")]
    pub url: Option<String>,

    /// Username for basic authentication
    #[arg(short, long, env = "TAGSWEEP_USER")]
    pub user: Option<String>,

    /// Password for basic authentication
    #[arg(long, env = "TAGSWEEP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Project whose repositories are cleaned
    #[arg(short, long, env = "TAGSWEEP_PROJECT")]
    pub project: Option<String>,

    /// Number of newest tags to keep per repository [default: 5]
    #[arg(short, long, env = "TAGSWEEP_KEEP", allow_negative_numbers = true)]
    pub keep: Option<i64>,

    /// Request timeout in seconds [default: 30]
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Connect timeout in seconds [default: 10]
    #[arg(long)]
    pub connect_timeout: Option<u64>,

    /// Repositories processed concurrently [default: 1]
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Repositories requested per listing page [default: 100]
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Report what would be deleted without deleting anything
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub dry_run: Option<bool>,

    /// Skip TLS certificate verification
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub insecure: Option<bool>,

    /// Additional CA certificate (PEM) to trust
    #[arg(long)]
    pub ca_cert: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// YAML file supplying defaults for the options above
    #[arg(short, long, env = "TAGSWEEP_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    url: String,
    user: String,
    password: String,
    project: String,
    /// `None` keeps the policy default.
    keep: Option<i64>,
    timeout: Duration,
    connect_timeout: Duration,
    concurrency: usize,
    page_size: u32,
    dry_run: bool,
    insecure: bool,
    ca_cert: Option<PathBuf>,
}

impl Settings {
    /// Merges flags (and their env fallbacks) over the file over defaults.
    fn resolve(args: &CleanArgs, file: SweepFile) -> Result<Self> {
        Ok(Self {
            url: required(args.url.clone(), file.url, "--url", "TAGSWEEP_URL", "url")?,
            user: required(args.user.clone(), file.user, "--user", "TAGSWEEP_USER", "user")?,
            password: required(
                args.password.clone(),
                file.password,
                "--password",
                "TAGSWEEP_PASSWORD",
                "password",
            )?,
            project: required(
                args.project.clone(),
                file.project,
                "--project",
                "TAGSWEEP_PROJECT",
                "project",
            )?,
            keep: args.keep.or(file.keep),
            timeout: Duration::from_secs(
                args.timeout.or(file.timeout).unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            connect_timeout: Duration::from_secs(
                args.connect_timeout
                    .or(file.connect_timeout)
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            ),
            concurrency: args.concurrency.or(file.concurrency).unwrap_or(1),
            page_size: args.page_size.or(file.page_size).unwrap_or(DEFAULT_PAGE_SIZE),
            dry_run: args.dry_run.or(file.dry_run).unwrap_or(false),
            insecure: args.insecure.or(file.insecure).unwrap_or(false),
            ca_cert: args.ca_cert.clone().or(file.ca_cert),
        })
    }

    fn registry_config(&self) -> RegistryConfig {
        let mut config = RegistryConfig::new(&self.url)
            .with_auth(RegistryAuth::basic(&self.user, &self.password))
            .with_timeout(self.timeout)
            .with_connect_timeout(self.connect_timeout)
            .with_page_size(self.page_size);

        if self.insecure || self.ca_cert.is_some() {
            let mut tls = TlsConfig::new();
            if let Some(ref path) = self.ca_cert {
                tls = tls.with_ca_cert(path);
            }
            if self.insecure {
                tls = tls.insecure();
            }
            config = config.with_tls(tls);
        }

        config
    }

    fn cleanup_config(&self) -> Result<CleanupConfig> {
        let policy = match self.keep {
            Some(keep) => RetentionPolicy::new(keep).context("Invalid retention setting")?,
            None => RetentionPolicy::default(),
        };
        Ok(CleanupConfig::builder()
            .policy(policy)
            .concurrency(self.concurrency)
            .dry_run(self.dry_run)
            .build())
    }
}

fn required(
    flag: Option<String>,
    file: Option<String>,
    name: &str,
    env: &str,
    key: &str,
) -> Result<String> {
    flag.or(file)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Missing {name} (or {env}, or `{key}` in the config file)"))
}

/// Forwards interrupts to `shutdown`.
///
/// The first interrupt requests a graceful stop. Returns `true` once a second
/// interrupt arrives, and `false` if interrupts can no longer be received.
async fn forward_interrupts<F, Fut>(mut interrupt: F, shutdown: ShutdownSignal) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    if let Err(e) = interrupt().await {
        warn!(error = %e, "Cannot listen for interrupts");
        return false;
    }
    warn!("Interrupt received, finishing in-flight requests (press Ctrl+C again to exit)");
    shutdown.trigger();

    if interrupt().await.is_err() {
        return false;
    }
    warn!("Second interrupt received, exiting without waiting");
    true
}

/// Executes the clean command.
///
/// Tag- and repository-level failures are reported but do not fail the
/// command; only errors that prevent the run from starting do.
pub async fn execute(args: CleanArgs) -> Result<()> {
    let file = match args.config {
        Some(ref path) => SweepFile::load(path)?,
        None => SweepFile::default(),
    };
    let settings = Settings::resolve(&args, file)?;
    let config = settings.cleanup_config()?;

    info!(
        url = %settings.url,
        project = %settings.project,
        keep = config.policy.keep(),
        dry_run = settings.dry_run,
        "Starting tag cleanup"
    );

    let client = RegistryClient::new(settings.registry_config())
        .context("Failed to create registry client")?;
    let cleaner = Cleaner::new(client, config).context("Invalid cleanup configuration")?;

    let shutdown = cleaner.shutdown_signal();
    tokio::spawn(async move {
        if forward_interrupts(tokio::signal::ctrl_c, shutdown).await {
            std::process::exit(EXIT_INTERRUPTED);
        }
    });

    let reporter: Box<dyn Reporter> = match args.output {
        OutputFormat::Text => Box::new(ConsoleReporter::new().with_colors(!args.no_color)),
        OutputFormat::Json => Box::new(JsonReporter::new().with_pretty(true)),
    };

    let report = cleaner
        .run_with_progress(&settings.project, |repository| {
            if let Err(e) = reporter.repository(repository) {
                warn!(error = %e, "Failed to write repository report");
            }
        })
        .await
        .with_context(|| format!("Cleanup of project '{}' failed", settings.project))?;

    reporter
        .summary(&report)
        .context("Failed to write summary")?;

    Ok(())
}
