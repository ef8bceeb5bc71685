//! # BIND Stats Gatherer
//!
//! Decodes the XML statistics a BIND name server publishes over HTTP and turns
//! them into tagged metric observations.
//!
//! ## Features
//!
//! - **Schema v2 and v3**: the version marker inside the document picks the decoder
//! - **Partitioned v3 endpoints**: `.../xml/v3` is fetched as its `server`, `net` and `mem` subsets
//! - **Lenient counters**: unparsable values are reported and recorded as zero
//! - **Optional sections**: memory contexts and per-view counters are gathered on request
//!
//! ## Architecture
//!
//! - **`decoder`**: raw document to [`NormalizedTree`]
//! - **`metrics`**: the normalized tree, observations, tags and the `Accumulator` sink
//! - **`collectors`**: transport, target layout, orchestration and emission
//! - **`config`**: per-collection switches
//!
//! ## Usage
//!
//! ```no_run
//! # async fn run() -> Result<(), bind_stats_gatherer::FetchError> {
//! use bind_stats_gatherer::{CollectionConfig, MetricObservation, Orchestrator, Target};
//! use std::time::Duration;
//!
//! let orchestrator = Orchestrator::new(reqwest::Client::new(), Duration::from_secs(5));
//! let target: Target = "http://localhost:8053/xml/v3".parse().expect("valid url");
//!
//! let collection = orchestrator.collect(&target, CollectionConfig::all()).await?;
//! let mut observations: Vec<MetricObservation> = Vec::new();
//! collection.record_into(&mut observations);
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate tracing;

pub mod collectors;
pub mod config;
pub mod decoder;
pub mod metrics;

pub use collectors::*;
pub use config::CollectionConfig;
pub use decoder::{
    decode,
    DecodeError,
    RawDocument,
    SchemaVersion,
};
pub use metrics::*;
