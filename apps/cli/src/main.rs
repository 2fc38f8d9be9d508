//! Datastream version retention command line tool.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use dsretain_application::{
    DiscoveryService, PurgeMode, RetentionRunRequest, RetentionRunner, RetentionService,
};
use dsretain_core::{AppError, AppResult};
use dsretain_domain::{DatastreamId, ObjectPid, RetentionPolicy};
use dsretain_infrastructure::{
    FedoraConnection, FedoraConnectionConfig, FedoraRestClient, ResourceIndexClient,
    TracingRunObserver,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8080/fedora";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Purges old datastream versions below a collection, keeping the newest ones.
#[derive(Debug, Parser)]
#[command(name = "dsretain", version, about)]
struct Args {
    /// Comma-separated datastream ids, e.g. `OBJ,DC`.
    #[arg(
        short = 'd',
        long,
        required = true,
        value_delimiter = ',',
        value_parser = parse_datastream_id
    )]
    dsids: Vec<DatastreamId>,

    /// PID of the root collection, without the `info:fedora/` prefix.
    #[arg(short = 'r', long, value_parser = parse_object_pid)]
    root: ObjectPid,

    /// Number of newest versions to keep per datastream.
    ///
    /// Versions created strictly before the oldest kept version are purged by
    /// sending its creation date as `endDT`. A repository that treats `endDT`
    /// as inclusive also purges that version; with `--keep 1` that is every
    /// version. Check with `--dry-run` first.
    #[arg(short = 'k', long, default_value = "1", value_parser = parse_retention_policy)]
    keep: RetentionPolicy,

    /// Objects processed in parallel per datastream.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    concurrency: u16,

    /// Report what would be purged without deleting anything.
    ///
    /// Logs the `endDT` boundary of every object. Versions created at that
    /// exact date survive only if the repository treats `endDT` as exclusive.
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn into_request(self) -> RetentionRunRequest {
        RetentionRunRequest {
            datastream_ids: self.dsids,
            root: self.root,
            policy: self.keep,
            mode: if self.dry_run {
                PurgeMode::DryRun
            } else {
                PurgeMode::Apply
            },
        }
    }
}

#[derive(Debug, Clone)]
struct RepositoryConfig {
    base_url: Url,
    risearch_url: Url,
    username: String,
    password: String,
    timeout_seconds: u64,
}

impl RepositoryConfig {
    fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let base_url = parse_url(
            "FEDORA_BASE_URL",
            lookup("FEDORA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned())
                .as_str(),
        )?;
        let risearch_url = match lookup("FEDORA_RISEARCH_URL") {
            Some(value) => parse_url("FEDORA_RISEARCH_URL", value.as_str())?,
            None => default_risearch_url(&base_url)?,
        };
        let username = required_env(&lookup, "FEDORA_USER")?;
        let password = required_env(&lookup, "FEDORA_PASSWORD")?;
        let timeout_seconds =
            parse_env_u64(&lookup, "FEDORA_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECONDS)?;
        if timeout_seconds == 0 {
            return Err(AppError::Configuration(
                "FEDORA_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            base_url,
            risearch_url,
            username,
            password,
            timeout_seconds,
        })
    }

    fn connection_config(&self) -> FedoraConnectionConfig {
        FedoraConnectionConfig {
            base_url: self.base_url.clone(),
            risearch_url: self.risearch_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let concurrency = usize::from(args.concurrency);
    let config = RepositoryConfig::load()?;
    let connection = FedoraConnection::new(config.connection_config())?;

    info!(
        base_url = %config.base_url,
        risearch_url = %config.risearch_url,
        user = %config.username,
        concurrency,
        "dsretain started"
    );

    let runner = build_runner(connection).with_concurrency(concurrency);
    let summary = runner.run(&args.into_request()).await;

    if summary.failed > 0 || summary.failed_discoveries > 0 {
        warn!(
            failed = summary.failed,
            failed_discoveries = summary.failed_discoveries,
            "some objects could not be processed, see errors above"
        );
    }

    Ok(())
}

fn build_runner(connection: FedoraConnection) -> RetentionRunner {
    let index = Arc::new(ResourceIndexClient::new(connection.clone()));
    let rest_client = Arc::new(FedoraRestClient::new(connection));

    RetentionRunner::new(
        DiscoveryService::new(index),
        RetentionService::new(rest_client.clone(), rest_client),
        Arc::new(TracingRunObserver::new()),
    )
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_datastream_id(value: &str) -> Result<DatastreamId, String> {
    DatastreamId::new(value).map_err(|error| error.to_string())
}

fn parse_object_pid(value: &str) -> Result<ObjectPid, String> {
    ObjectPid::new(value).map_err(|error| error.to_string())
}

fn parse_retention_policy(value: &str) -> Result<RetentionPolicy, String> {
    let keep = value
        .trim()
        .parse::<usize>()
        .map_err(|error| format!("invalid keep value '{value}': {error}"))?;
    RetentionPolicy::new(keep).map_err(|error| error.to_string())
}

fn default_risearch_url(base_url: &Url) -> AppResult<Url> {
    let mut risearch_url = base_url.clone();
    risearch_url
        .path_segments_mut()
        .map_err(|()| {
            AppError::Configuration(format!(
                "FEDORA_BASE_URL '{base_url}' cannot carry path segments"
            ))
        })?
        .pop_if_empty()
        .push("risearch");
    Ok(risearch_url)
}

fn parse_url(name: &str, value: &str) -> AppResult<Url> {
    Url::parse(value.trim())
        .map_err(|error| AppError::Configuration(format!("invalid {name} value '{value}': {error}")))
}

fn required_env(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> AppResult<String> {
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::Configuration(format!("{name} is required")))
}

fn parse_env_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
) -> AppResult<u64> {
    match lookup(name) {
        Some(value) => value.trim().parse::<u64>().map_err(|error| {
            AppError::Configuration(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}
