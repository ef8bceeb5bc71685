use crate::sink::JsonLines;
use bind_stats_config::Config;
use bind_stats_gatherer::{
    Collection,
    CollectionConfig,
    FetchError,
    Orchestrator,
    Target,
};
use color_eyre::Result;
use eyre::{
    bail,
    Context as _,
};
use futures::future::join_all;
use std::io::{
    self,
    BufWriter,
};

/// One collection cycle over every configured target.
pub struct App {
    targets: Vec<Target>,
    collection: CollectionConfig,
    orchestrator: Orchestrator,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let targets = config.targets();
        if targets.is_empty() {
            bail!(
                "No targets configured, pass --url or list them under `targets` in {}",
                config.config_dir().join("config.yaml").display()
            );
        }

        let timeout = config.timeout()?;
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .wrap_err("Failed to build HTTP client")?;

        debug!(targets = targets.len(), ?timeout, collection = ?config.collection(), "configured");
        Ok(Self {
            targets,
            collection: config.collection(),
            orchestrator: Orchestrator::new(client, timeout),
        })
    }

    /// Collects all targets concurrently and prints their observations.
    ///
    /// Fails only when no target could be collected.
    pub async fn run(self) -> Result<()> {
        let cycles = join_all(
            self.targets
                .iter()
                .map(|target| self.orchestrator.collect(target, self.collection)),
        );

        let results = tokio::select! {
            results = cycles => results,
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, abandoning in-flight collections");
                return Ok(());
            }
        };

        let total = results.len();
        let (collections, failures) = partition(results);
        for err in &failures {
            error!("Collection failed: {err:?}");
        }

        let mut sink = JsonLines::new(BufWriter::new(io::stdout().lock()));
        for collection in &collections {
            let recorded = collection.record_into(&mut sink);
            info!(url = %collection.target(), observations = recorded, "Collected");
        }
        sink.finish().wrap_err("Failed to write observations")?;

        if collections.is_empty() {
            bail!("All {total} targets failed");
        }
        Ok(())
    }
}

fn partition(results: Vec<Result<Collection, FetchError>>) -> (Vec<Collection>, Vec<eyre::Report>) {
    let mut collections = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(collection) => collections.push(collection),
            Err(err) => failures.push(eyre::Report::new(err)),
        }
    }
    (collections, failures)
}
