//! BIND statistics v3: `statistics/...`, counters grouped by their `type`
//! attribute. A document may hold any subset of the sections.

use super::{
    common::{
        caches,
        integer,
        Cache,
        Memory,
    },
    DecodeError,
};
use crate::metrics::{
    Counter,
    MetaVersion,
    NormalizedTree,
    ServerGroup,
    ServerStats,
    ViewGroup,
    ViewStats,
};
use serde::Deserialize;
use std::str::FromStr;
use strum::IntoEnumIterator;

#[derive(Debug, Deserialize)]
struct Statistics {
    #[serde(default)]
    server: Server,
    #[serde(default)]
    views: Views,
    #[serde(default)]
    memory: Memory,
}

#[derive(Debug, Default, Deserialize)]
struct Server {
    #[serde(rename = "counters", default)]
    groups: Vec<CounterGroup>,
}

#[derive(Debug, Default, Deserialize)]
struct Views {
    #[serde(rename = "view", default)]
    views: Vec<View>,
}

// Omitted branches: zones
#[derive(Debug, Default, Deserialize)]
struct View {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "counters", default)]
    groups: Vec<CounterGroup>,
    #[serde(rename = "cache", default)]
    caches: Vec<Cache>,
}

/// `<counters type="opcode"><counter name="QUERY">1</counter></counters>`
#[derive(Debug, Default, Deserialize)]
struct CounterGroup {
    #[serde(rename = "@type", default)]
    kind: String,
    #[serde(rename = "counter", default)]
    counters: Vec<AttrCounter>,
}

#[derive(Debug, Default, Deserialize)]
struct AttrCounter {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "$text", default)]
    value: Option<String>,
}

impl CounterGroup {
    fn normalize(self, path: &str) -> Vec<Counter> {
        let path = format!("{path}/counters[@type={}]", self.kind);
        self.counters
            .into_iter()
            .map(|c| {
                let value = integer(c.value.as_deref(), || format!("{path}/counter[@name={}]", c.name));
                Counter::new(c.name, value)
            })
            .collect()
    }
}

const ROOT: &str = "statistics";

pub(super) fn decode(text: &str, version: MetaVersion) -> Result<NormalizedTree, DecodeError> {
    let stats: Statistics = quick_xml::de::from_str(text).map_err(DecodeError::malformed)?;

    let mut server = ServerStats::default();
    let server_path = format!("{ROOT}/server");
    for group in stats.server.groups {
        match ServerGroup::from_str(&group.kind) {
            Ok(kind) => {
                let counters = group.normalize(&server_path);
                server.group_mut(kind).extend(counters);
            }
            Err(_) => debug!(kind = %group.kind, "skipping server counter group"),
        }
    }

    let views = stats
        .views
        .views
        .into_iter()
        .map(|view| {
            let path = format!("{ROOT}/views/view[@name={}]", view.name);
            let mut normalized = ViewStats::new(view.name);
            for group in view.groups {
                match ViewGroup::iter().find(|kind| kind.v3_type() == group.kind) {
                    Some(kind) => {
                        let counters = group.normalize(&path);
                        normalized.group_mut(kind).extend(counters);
                    }
                    None => debug!(view = %normalized.name, kind = %group.kind, "skipping view counter group"),
                }
            }
            normalized.caches = caches(view.caches, &path);
            normalized
        })
        .collect();

    Ok(NormalizedTree {
        server,
        memory: stats.memory.normalize(&format!("{ROOT}/memory")),
        views,
        version,
    })
}
