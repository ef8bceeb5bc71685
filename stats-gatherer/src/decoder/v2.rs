//! BIND statistics v2: `isc/bind/statistics`. Unlike v3, the v2 format does
//! not support broken-out subsets; every section lives at a fixed path.

use super::{
    common::{
        caches,
        named_counters,
        Cache,
        Memory,
        NamedCounter,
    },
    DecodeError,
};
use crate::metrics::{
    MetaVersion,
    NormalizedTree,
    ServerStats,
    ViewStats,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Root {
    bind: Bind,
}

#[derive(Debug, Deserialize)]
struct Bind {
    statistics: Statistics,
}

// Omitted branches: socketmgr, taskmgr
#[derive(Debug, Deserialize)]
struct Statistics {
    #[serde(default)]
    views: Views,
    #[serde(default)]
    server: Server,
    #[serde(default)]
    memory: Memory,
}

#[derive(Debug, Default, Deserialize)]
struct Views {
    #[serde(rename = "view", default)]
    views: Vec<View>,
}

// Omitted branches: zones
#[derive(Debug, Default, Deserialize)]
struct View {
    #[serde(default)]
    name: String,
    #[serde(rename = "rdtype", default)]
    rdtypes: Vec<NamedCounter>,
    #[serde(rename = "resstat", default)]
    resstats: Vec<NamedCounter>,
    #[serde(rename = "cache", default)]
    caches: Vec<Cache>,
}

#[derive(Debug, Default, Deserialize)]
struct Requests {
    #[serde(rename = "opcode", default)]
    opcodes: Vec<NamedCounter>,
}

#[derive(Debug, Default, Deserialize)]
struct QueriesIn {
    #[serde(rename = "rdtype", default)]
    rdtypes: Vec<NamedCounter>,
}

#[derive(Debug, Default, Deserialize)]
struct Server {
    #[serde(default)]
    requests: Requests,
    #[serde(rename = "queries-in", default)]
    queries_in: QueriesIn,
    #[serde(rename = "nsstat", default)]
    nsstats: Vec<NamedCounter>,
    #[serde(rename = "zonestat", default)]
    zonestats: Vec<NamedCounter>,
    #[serde(rename = "resstat", default)]
    resstats: Vec<NamedCounter>,
    #[serde(rename = "sockstat", default)]
    sockstats: Vec<NamedCounter>,
}

const ROOT: &str = "isc/bind/statistics";

pub(super) fn decode(text: &str, version: MetaVersion) -> Result<NormalizedTree, DecodeError> {
    let root: Root = quick_xml::de::from_str(text).map_err(DecodeError::malformed)?;
    let stats = root.bind.statistics;

    let server = ServerStats {
        opcodes: named_counters(stats.server.requests.opcodes, &format!("{ROOT}/server/requests/opcode")),
        qtypes: named_counters(stats.server.queries_in.rdtypes, &format!("{ROOT}/server/queries-in/rdtype")),
        nsstats: named_counters(stats.server.nsstats, &format!("{ROOT}/server/nsstat")),
        zonestats: named_counters(stats.server.zonestats, &format!("{ROOT}/server/zonestat")),
        resstats: named_counters(stats.server.resstats, &format!("{ROOT}/server/resstat")),
        sockstats: named_counters(stats.server.sockstats, &format!("{ROOT}/server/sockstat")),
    };

    let views = stats
        .views
        .views
        .into_iter()
        .map(|view| {
            let path = format!("{ROOT}/views/view[{}]", view.name);
            ViewStats {
                qtypes: named_counters(view.rdtypes, &format!("{path}/rdtype")),
                resstats: named_counters(view.resstats, &format!("{path}/resstat")),
                caches: caches(view.caches, &path),
                name: view.name,
            }
        })
        .collect();

    Ok(NormalizedTree {
        server,
        memory: stats.memory.normalize(&format!("{ROOT}/memory")),
        views,
        version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        decoder::{
            decode as decode_raw,
            RawDocument,
            SchemaVersion,
        },
        metrics::{
            Counter,
            MemorySummary,
        },
    };
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = include_str!("../../testdata/xml_v2.xml");

    fn decoded(text: &str) -> Result<NormalizedTree, DecodeError> {
        decode_raw(&RawDocument::new(text))
    }

    #[test]
    fn decodes_server_groups() {
        let tree = decoded(FIXTURE).unwrap();

        assert_eq!(tree.version.schema, SchemaVersion::V2);
        assert_eq!(tree.version.declared, "2.2");
        assert_eq!(
            tree.server.opcodes,
            vec![Counter::new("QUERY", 102312611), Counter::new("NOTIFY", 3)]
        );
        assert_eq!(
            tree.server.qtypes,
            vec![Counter::new("A", 58951432), Counter::new("AAAA", 13524)]
        );
        assert_eq!(tree.server.nsstats.len(), 2);
        assert_eq!(tree.server.zonestats, vec![Counter::new("NotifyOutv4", 663)]);
        assert_eq!(tree.server.resstats, vec![Counter::new("Queryv4", 11)]);
        assert_eq!(
            tree.server.sockstats,
            vec![Counter::new("UDP4Open", 118), Counter::new("UDP4Close", 113)]
        );
    }

    #[test]
    fn decodes_memory() {
        let tree = decoded(FIXTURE).unwrap();

        assert_eq!(
            tree.memory.summary,
            Some(MemorySummary {
                total_use: 18206566,
                in_use: 3064368,
                block_size: 13893632,
                context_size: 3685480,
                lost: 0,
            })
        );
        assert_eq!(tree.memory.contexts.len(), 2);
        assert_eq!(tree.memory.contexts[0].id, "0x7f8a94e061d0");
        assert_eq!(tree.memory.contexts[0].name, "main");
        assert_eq!(tree.memory.contexts[0].total, 1176);
        assert_eq!(tree.memory.contexts[0].in_use, 1040);
    }

    #[test]
    fn decodes_views_and_caches() {
        let tree = decoded(FIXTURE).unwrap();

        assert_eq!(tree.views.len(), 2);
        let view = &tree.views[0];
        assert_eq!(view.name, "_default");
        assert_eq!(view.qtypes, vec![Counter::new("A", 2), Counter::new("PTR", 7)]);
        assert_eq!(view.resstats, vec![Counter::new("Queryv4", 9)]);
        assert_eq!(view.caches.len(), 1);
        assert_eq!(view.caches[0].name, "_default");
        assert_eq!(view.caches[0].rrsets, vec![Counter::new("A", 5)]);
        assert_eq!(tree.views[1].name, "_bind");
    }

    #[test]
    fn minimal_document_with_one_opcode() {
        let doc = r#"<isc version="1.0"><bind><statistics version="2">
            <server><requests><opcode><name>QUERY</name><counter>42</counter></opcode></requests></server>
        </statistics></bind></isc>"#;
        let tree = decoded(doc).unwrap();

        assert_eq!(tree.server.opcodes, vec![Counter::new("QUERY", 42)]);
        assert_eq!(tree.counter_count(), 1);
        assert!(tree.memory.summary.is_none());
        assert!(tree.memory.contexts.is_empty());
        assert!(tree.views.is_empty());
    }

    #[test]
    fn duplicate_names_are_preserved() {
        let doc = r#"<isc><bind><statistics version="2.2"><server>
            <nsstat><name>Requestv4</name><counter>1</counter></nsstat>
            <nsstat><name>Requestv4</name><counter>2</counter></nsstat>
        </server></statistics></bind></isc>"#;
        let tree = decoded(doc).unwrap();

        assert_eq!(
            tree.server.nsstats,
            vec![Counter::new("Requestv4", 1), Counter::new("Requestv4", 2)]
        );
    }

    #[test]
    fn bad_counter_value_becomes_zero() {
        let doc = r#"<isc><bind><statistics version="2.2"><server>
            <sockstat><name>UDP4Open</name><counter>lots</counter></sockstat>
            <sockstat><name>UDP4Close</name><counter>4</counter></sockstat>
        </server></statistics></bind></isc>"#;
        let tree = decoded(doc).unwrap();

        assert_eq!(
            tree.server.sockstats,
            vec![Counter::new("UDP4Open", 0), Counter::new("UDP4Close", 4)]
        );
    }

    #[test]
    fn missing_bind_wrapper_is_malformed() {
        let doc = r#"<isc version="1.0"><statistics version="2.2"/></isc>"#;
        assert!(matches!(
            decoded(doc).unwrap_err(),
            DecodeError::MalformedDocument { .. }
        ));
    }

    #[test]
    fn broken_nesting_is_malformed() {
        let doc = r#"<isc><bind><statistics version="2.2"><server><nsstat></server></statistics></bind></isc>"#;
        assert!(matches!(
            decoded(doc).unwrap_err(),
            DecodeError::MalformedDocument { .. }
        ));
    }
}
