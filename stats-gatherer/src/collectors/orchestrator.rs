use super::{
    emit,
    Target,
    Transport,
    TransportError,
};
use crate::{
    config::CollectionConfig,
    decoder::{
        self,
        DecodeError,
        RawDocument,
    },
    metrics::{
        Accumulator,
        MetricObservation,
        NormalizedTree,
        Tags,
    },
};
use std::time::Duration;
use url::Url;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{target} answered with status {code}")]
    BadStatus { code: u16, target: Url },

    #[error("fetching {target} failed")]
    Transport {
        target: Url,
        #[source]
        cause: TransportError,
    },

    #[error("decoding {target} failed")]
    Decode {
        target: Url,
        #[source]
        inner: DecodeError,
    },
}

/// Drives one fetch-decode cycle per target.
///
/// Holds no per-cycle state, so a single instance can serve concurrent
/// collections of distinct targets.
pub struct Orchestrator<T = reqwest::Client> {
    transport: T,
    timeout: Duration,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(transport: T, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Fetches and decodes every document of `target`.
    ///
    /// The first failure ends the cycle. Nothing is observable from a failed
    /// cycle.
    #[instrument(level = "debug", skip_all, fields(url = %target))]
    pub async fn collect(&self, target: &Target, config: CollectionConfig) -> Result<Collection, FetchError> {
        let mut merged: Option<NormalizedTree> = None;

        for document in target.documents() {
            let tree = self.fetch(&document.url, document.declared).await?;
            match merged.as_mut() {
                Some(acc) => acc.merge(tree),
                None => merged = Some(tree),
            }
        }

        // documents() never yields an empty list
        let tree = merged.ok_or_else(|| FetchError::Decode {
            target: target.url().clone(),
            inner: DecodeError::malformed("no documents to fetch"),
        })?;

        debug!(counters = tree.counter_count(), schema = %tree.version.schema, "collected");
        Ok(Collection {
            target: target.clone(),
            tags: Tags::for_target(target.tag()),
            tree,
            config,
        })
    }

    async fn fetch(
        &self,
        url: &Url,
        declared: Option<decoder::SchemaVersion>,
    ) -> Result<NormalizedTree, FetchError> {
        trace!(%url, "GET");
        let response = self
            .transport
            .get(url, self.timeout)
            .await
            .map_err(|cause| FetchError::Transport {
                target: url.clone(),
                cause,
            })?;

        if !response.is_success() {
            return Err(FetchError::BadStatus {
                code: response.status,
                target: url.clone(),
            });
        }

        let mut raw = RawDocument::new(response.body);
        if let Some(declared) = declared {
            raw = raw.with_declared(declared);
        }

        decoder::decode(&raw).map_err(|inner| FetchError::Decode {
            target: url.clone(),
            inner,
        })
    }
}

/// Result of a successful cycle: the decoded tree and the tags of its target.
#[derive(Debug, Clone)]
pub struct Collection {
    target: Target,
    tags: Tags,
    tree: NormalizedTree,
    config: CollectionConfig,
}

impl Collection {
    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn tree(&self) -> &NormalizedTree {
        &self.tree
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn observations(&self) -> impl Iterator<Item = MetricObservation> + '_ {
        emit(&self.tree, &self.tags, self.config)
    }

    /// Streams every observation into `acc`, returning how many were recorded.
    pub fn record_into<A: Accumulator + ?Sized>(&self, acc: &mut A) -> usize {
        self.observations().fold(0, |count, observation| {
            observation.record(acc);
            count + 1
        })
    }

    pub fn into_observations(self) -> Vec<MetricObservation> {
        self.observations().collect()
    }
}
