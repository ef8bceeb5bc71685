//! Wire shapes shared by the v2 and v3 schemas.

use crate::metrics::{
    CacheStats,
    Counter,
    MemoryContext,
    MemoryStats,
    MemorySummary,
};
use serde::Deserialize;

/// Parses a counter or gauge value, defaulting to 0.
///
/// A value that does not fit an `i64` is logged with its element path and
/// zeroed. An absent or empty value is 0 without a warning.
pub(super) fn integer(raw: Option<&str>, path: impl FnOnce() -> String) -> i64 {
    let Some(text) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
        return 0;
    };
    match text.parse::<i64>() {
        Ok(value) => value,
        Err(err) => {
            warn!(path = %path(), value = text, %err, "statistics value is not an integer, using 0");
            0
        }
    }
}

/// `<x><name>A</name><counter>1</counter></x>`
#[derive(Debug, Default, Deserialize)]
pub(super) struct NamedCounter {
    #[serde(default)]
    name: String,
    #[serde(default)]
    counter: Option<String>,
}

pub(super) fn named_counters(wire: Vec<NamedCounter>, path: &str) -> Vec<Counter> {
    wire.into_iter()
        .map(|c| {
            let value = integer(c.counter.as_deref(), || format!("{path}[{}]/counter", c.name));
            Counter::new(c.name, value)
        })
        .collect()
}

/// `<cache name="_default"><rrset>…</rrset></cache>`
#[derive(Debug, Default, Deserialize)]
pub(super) struct Cache {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "rrset", default)]
    rrsets: Vec<NamedCounter>,
}

pub(super) fn caches(wire: Vec<Cache>, path: &str) -> Vec<CacheStats> {
    wire.into_iter()
        .map(|cache| {
            let rrsets = named_counters(cache.rrsets, &format!("{path}/cache[{}]/rrset", cache.name));
            CacheStats {
                name: cache.name,
                rrsets,
            }
        })
        .collect()
}

// Omitted nodes: references, maxinuse, blocksize, pools, hiwater, lowater
#[derive(Debug, Default, Deserialize)]
struct Context {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    total: Option<String>,
    #[serde(default)]
    inuse: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Contexts {
    #[serde(rename = "context", default)]
    contexts: Vec<Context>,
}

#[derive(Debug, Default, Deserialize)]
struct Summary {
    #[serde(rename = "TotalUse", default)]
    total_use: Option<String>,
    #[serde(rename = "InUse", default)]
    in_use: Option<String>,
    #[serde(rename = "BlockSize", default)]
    block_size: Option<String>,
    #[serde(rename = "ContextSize", default)]
    context_size: Option<String>,
    #[serde(rename = "Lost", default)]
    lost: Option<String>,
}

/// The `memory` section; identical in both schemas.
#[derive(Debug, Default, Deserialize)]
pub(super) struct Memory {
    #[serde(default)]
    summary: Option<Summary>,
    #[serde(default)]
    contexts: Contexts,
}

impl Memory {
    pub(super) fn normalize(self, path: &str) -> MemoryStats {
        let summary = self.summary.map(|s| {
            let figure = |raw: Option<String>, name: &str| integer(raw.as_deref(), || format!("{path}/summary/{name}"));
            MemorySummary {
                total_use: figure(s.total_use, "TotalUse"),
                in_use: figure(s.in_use, "InUse"),
                block_size: figure(s.block_size, "BlockSize"),
                context_size: figure(s.context_size, "ContextSize"),
                lost: figure(s.lost, "Lost"),
            }
        });

        let contexts = self
            .contexts
            .contexts
            .into_iter()
            .map(|c| {
                let context_path = format!("{path}/contexts/context[{}]", c.id);
                MemoryContext {
                    total: integer(c.total.as_deref(), || format!("{context_path}/total")),
                    in_use: integer(c.inuse.as_deref(), || format!("{context_path}/inuse")),
                    id: c.id,
                    name: c.name,
                }
            })
            .collect();

        MemoryStats { summary, contexts }
    }
}
