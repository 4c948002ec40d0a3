//! MBQ - MongoDB to BigQuery export tool

use anyhow::Result;
use clap::Parser;
use mbq_common::logging::{init_logging, LogConfig, LogLevel};
use mbq_etl::bigquery::BigQueryClient;
use mbq_etl::config::{
    BigQueryConfig, MongoCredentials, RunConfig, DEFAULT_BIGQUERY_ENDPOINT, DEFAULT_CONCURRENCY,
    DEFAULT_INSERT_BATCH_SIZE,
};
use mbq_etl::orchestrator;
use mbq_etl::source::MongoSource;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "mbq")]
#[command(author, version, about = "Export MongoDB collections into BigQuery tables")]
struct Cli {
    /// GCP project that owns the destination dataset
    #[arg(long, env = "PROJECT")]
    project_id: String,

    /// Destination BigQuery dataset
    #[arg(long, env = "DATASET")]
    dataset: String,

    /// CSV file listing the collections to move
    #[arg(long, env = "FILE_NAME")]
    mappings_file: PathBuf,

    /// MongoDB username
    #[arg(long, env = "MONGODB_USERNAME")]
    mongo_username: String,

    /// MongoDB password
    #[arg(long, env = "MONGODB_PASSWORD", hide_env_values = true)]
    mongo_password: String,

    /// OAuth bearer token for the BigQuery API
    #[arg(long, env = "BIGQUERY_ACCESS_TOKEN", hide_env_values = true)]
    bigquery_token: String,

    /// BigQuery REST endpoint; override for emulators
    #[arg(long, env = "BIGQUERY_ENDPOINT", default_value = DEFAULT_BIGQUERY_ENDPOINT)]
    bigquery_endpoint: String,

    /// Export jobs running at the same time; 1 means strictly sequential
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Rows per streaming-insert request
    #[arg(long, default_value_t = DEFAULT_INSERT_BATCH_SIZE)]
    insert_batch_size: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up PROJECT, DATASET, credentials etc. from a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env().unwrap_or_default();
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }
    init_logging(&log_config)?;

    let config = RunConfig {
        project_id: cli.project_id,
        dataset: cli.dataset,
        mappings_file: cli.mappings_file,
        mongo: MongoCredentials::new(cli.mongo_username, cli.mongo_password),
        bigquery: BigQueryConfig {
            endpoint: cli.bigquery_endpoint,
            access_token: cli.bigquery_token,
        },
        concurrency: cli.concurrency,
        insert_batch_size: cli.insert_batch_size,
    };
    config.validate()?;

    let source = MongoSource::new(config.mongo.clone());
    let sink = BigQueryClient::new(&config.bigquery)?;

    let summary = orchestrator::run(&config, &source, &sink).await;

    info!(
        "Export finished: {} attempted, {} succeeded, {} failed",
        summary.attempted, summary.succeeded, summary.failed
    );

    if !summary.is_success() {
        error!("Run had failures, exiting with non-zero status");
        std::process::exit(1);
    }

    Ok(())
}
