use super::{
    ServerGroup,
    ViewGroup,
};
use crate::decoder::SchemaVersion;
use serde::{
    Deserialize,
    Serialize,
};

/// A single named counter. Names are not unique within a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub name: String,
    pub value: i64,
}

impl Counter {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Server-wide counter groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStats {
    pub opcodes: Vec<Counter>,
    pub qtypes: Vec<Counter>,
    pub nsstats: Vec<Counter>,
    pub zonestats: Vec<Counter>,
    pub resstats: Vec<Counter>,
    pub sockstats: Vec<Counter>,
}

impl ServerStats {
    pub fn group(&self, group: ServerGroup) -> &[Counter] {
        match group {
            ServerGroup::Opcode => &self.opcodes,
            ServerGroup::Qtype => &self.qtypes,
            ServerGroup::Nsstat => &self.nsstats,
            ServerGroup::Zonestat => &self.zonestats,
            ServerGroup::Resstat => &self.resstats,
            ServerGroup::Sockstat => &self.sockstats,
        }
    }

    pub fn group_mut(&mut self, group: ServerGroup) -> &mut Vec<Counter> {
        match group {
            ServerGroup::Opcode => &mut self.opcodes,
            ServerGroup::Qtype => &mut self.qtypes,
            ServerGroup::Nsstat => &mut self.nsstats,
            ServerGroup::Zonestat => &mut self.zonestats,
            ServerGroup::Resstat => &mut self.resstats,
            ServerGroup::Sockstat => &mut self.sockstats,
        }
    }

    fn merge(&mut self, other: ServerStats) {
        self.opcodes.extend(other.opcodes);
        self.qtypes.extend(other.qtypes);
        self.nsstats.extend(other.nsstats);
        self.zonestats.extend(other.zonestats);
        self.resstats.extend(other.resstats);
        self.sockstats.extend(other.sockstats);
    }
}

/// Allocator summary figures, in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySummary {
    pub total_use: i64,
    pub in_use: i64,
    pub block_size: i64,
    pub context_size: i64,
    pub lost: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryContext {
    pub id: String,
    pub name: String,
    pub total: i64,
    pub in_use: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    /// `None` when the document carries no `memory/summary` element.
    pub summary: Option<MemorySummary>,
    pub contexts: Vec<MemoryContext>,
}

impl MemoryStats {
    fn merge(&mut self, other: MemoryStats) {
        if other.summary.is_some() {
            self.summary = other.summary;
        }
        self.contexts.extend(other.contexts);
    }
}

/// A named cache section (`rrset` counters) inside a view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub name: String,
    pub rrsets: Vec<Counter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewStats {
    pub name: String,
    pub qtypes: Vec<Counter>,
    pub resstats: Vec<Counter>,
    pub caches: Vec<CacheStats>,
}

impl ViewStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn group(&self, group: ViewGroup) -> &[Counter] {
        match group {
            ViewGroup::Qtype => &self.qtypes,
            ViewGroup::Resstats => &self.resstats,
        }
    }

    pub fn group_mut(&mut self, group: ViewGroup) -> &mut Vec<Counter> {
        match group {
            ViewGroup::Qtype => &mut self.qtypes,
            ViewGroup::Resstats => &mut self.resstats,
        }
    }
}

/// The schema version a tree was decoded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaVersion {
    pub schema: SchemaVersion,
    /// Version string as declared by the document, empty when it declared none.
    pub declared: String,
}

/// Version-independent statistics tree produced by the decoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTree {
    pub server: ServerStats,
    pub memory: MemoryStats,
    pub views: Vec<ViewStats>,
    pub version: MetaVersion,
}

impl NormalizedTree {
    pub fn new(version: MetaVersion) -> Self {
        Self {
            server: ServerStats::default(),
            memory: MemoryStats::default(),
            views: Vec::new(),
            version,
        }
    }

    /// Folds the sections of a subset document into this tree.
    ///
    /// Views with the same name are combined; counters are appended, never
    /// deduplicated.
    pub fn merge(&mut self, other: NormalizedTree) {
        self.server.merge(other.server);
        self.memory.merge(other.memory);
        for view in other.views {
            match self.views.iter_mut().find(|existing| existing.name == view.name) {
                Some(existing) => {
                    existing.qtypes.extend(view.qtypes);
                    existing.resstats.extend(view.resstats);
                    existing.caches.extend(view.caches);
                }
                None => self.views.push(view),
            }
        }
    }

    /// Number of counters across every counter-bearing section, caches included.
    pub fn counter_count(&self) -> usize {
        let server: usize = [
            &self.server.opcodes,
            &self.server.qtypes,
            &self.server.nsstats,
            &self.server.zonestats,
            &self.server.resstats,
            &self.server.sockstats,
        ]
        .iter()
        .map(|group| group.len())
        .sum();
        let views: usize = self
            .views
            .iter()
            .map(|view| {
                view.qtypes.len() + view.resstats.len() + view.caches.iter().map(|c| c.rrsets.len()).sum::<usize>()
            })
            .sum();
        server + views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn v3() -> MetaVersion {
        MetaVersion {
            schema: SchemaVersion::V3,
            declared: "3.11".to_string(),
        }
    }

    #[test]
    fn merge_keeps_duplicates_and_summary() {
        let mut server = NormalizedTree::new(v3());
        server.server.opcodes.push(Counter::new("QUERY", 1));
        let mut mem = NormalizedTree::new(v3());
        mem.server.opcodes.push(Counter::new("QUERY", 2));
        mem.memory.summary = Some(MemorySummary {
            total_use: 10,
            ..Default::default()
        });

        server.merge(mem);

        assert_eq!(server.server.opcodes, vec![Counter::new("QUERY", 1), Counter::new("QUERY", 2)]);
        assert_eq!(server.memory.summary.map(|s| s.total_use), Some(10));
    }

    #[test]
    fn merge_never_drops_an_existing_summary() {
        let mut tree = NormalizedTree::new(v3());
        tree.memory.summary = Some(MemorySummary::default());
        tree.merge(NormalizedTree::new(v3()));
        assert!(tree.memory.summary.is_some());
    }

    #[test]
    fn merge_combines_views_by_name() {
        let mut left = NormalizedTree::new(v3());
        let mut view = ViewStats::new("_default");
        view.qtypes.push(Counter::new("A", 1));
        left.views.push(view);

        let mut right = NormalizedTree::new(v3());
        let mut view = ViewStats::new("_default");
        view.resstats.push(Counter::new("Queryv4", 3));
        right.views.push(view);
        right.views.push(ViewStats::new("_bind"));

        left.merge(right);

        assert_eq!(left.views.len(), 2);
        assert_eq!(left.views[0].qtypes.len(), 1);
        assert_eq!(left.views[0].resstats.len(), 1);
        assert_eq!(left.views[1].name, "_bind");
        assert_eq!(left.counter_count(), 2);
    }
}
