use super::extract;
use crate::{
    config::CollectionConfig,
    metrics::{
        Counter,
        Fields,
        MemoryContext,
        MemorySummary,
        MetricObservation,
        NormalizedTree,
        ServerGroup,
        Tags,
        ViewGroup,
    },
};
use strum::IntoEnumIterator;

pub const COUNTER_MEASUREMENT: &str = "stat_counter";
pub const MEMORY_MEASUREMENT: &str = "stat_memory";
pub const MEMORY_CONTEXT_MEASUREMENT: &str = "stat_memory_context";

/// Maps a decoded tree to observations, lazily.
///
/// Order: server counter groups, the memory summary gauge, memory contexts
/// (when enabled), then per-view counters (when enabled). Each observation owns
/// its tags, derived from `base`.
pub fn emit<'a>(
    tree: &'a NormalizedTree,
    base: &'a Tags,
    config: CollectionConfig,
) -> impl Iterator<Item = MetricObservation> + 'a {
    let server = ServerGroup::iter()
        .flat_map(move |group| counters(tree.server.group(group), base.with("type", group.label())));

    let summary = tree
        .memory
        .summary
        .iter()
        .map(move |summary| MetricObservation::gauge(MEMORY_MEASUREMENT, summary_fields(summary), base.clone()));

    let contexts = tree
        .memory
        .contexts
        .iter()
        .filter(move |_| config.gather_memory_contexts)
        .map(move |context| context_observation(context, base));

    let views = tree
        .views
        .iter()
        .filter(move |_| config.gather_views)
        .flat_map(move |view| {
            let tags = base.with("view", view.name.as_str());
            ViewGroup::iter().flat_map(move |group| counters(view.group(group), tags.with("type", group.label())))
        });

    server.chain(summary).chain(contexts).chain(views)
}

fn counters(group: &[Counter], tags: Tags) -> impl Iterator<Item = MetricObservation> + '_ {
    extract(group).map(move |counter| {
        MetricObservation::counter(
            COUNTER_MEASUREMENT,
            Fields::from([("value".to_string(), counter.value)]),
            tags.with("name", counter.name.as_str()),
        )
    })
}

fn summary_fields(summary: &MemorySummary) -> Fields {
    Fields::from([
        ("TotalUse".to_string(), summary.total_use),
        ("InUse".to_string(), summary.in_use),
        ("BlockSize".to_string(), summary.block_size),
        ("ContextSize".to_string(), summary.context_size),
        ("Lost".to_string(), summary.lost),
    ])
}

fn context_observation(context: &MemoryContext, base: &Tags) -> MetricObservation {
    let mut tags = base.clone();
    tags.insert("id", context.id.as_str());
    tags.insert("name", context.name.as_str());

    let fields = Fields::from([("total".to_string(), context.total), ("inUse".to_string(), context.in_use)]);
    MetricObservation::gauge(MEMORY_CONTEXT_MEASUREMENT, fields, tags)
}
