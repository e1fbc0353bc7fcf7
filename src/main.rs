use anyhow::Context;
use anyhow::Result;
use housing_etl::config::PipelineConfig;
use housing_etl::database::Store;
use housing_etl::pipeline;
use tracing::info;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config = PipelineConfig::default();
    info!(database = %config.database.display(), "startup");

    let mut store = Store::open(&config.database)
        .with_context(|| format!("Failed to open database {}", config.database.display()))?;
    let report = pipeline::run(&config, &mut store).context("Failed to load housing data")?;
    println!("{report}");
    store.close().context("Failed to close database")?;
    Ok(())
}
