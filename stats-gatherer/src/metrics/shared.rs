use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// The server-wide counter groups, in emission order.
///
/// The string form is both the `type` tag value and the v3 `counters@type`
/// attribute the group is decoded from.
#[derive(
    Debug, Clone, Copy, Display, EnumIter, EnumString, IntoStaticStr, Serialize, Deserialize, PartialEq, Eq, Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ServerGroup {
    Opcode,
    Qtype,
    Nsstat,
    Zonestat,
    Resstat,
    Sockstat,
}

impl ServerGroup {
    pub fn label(&self) -> &'static str {
        self.into()
    }
}

/// Per-view counter groups.
#[derive(Debug, Clone, Copy, Display, EnumIter, IntoStaticStr, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum ViewGroup {
    Qtype,
    Resstats,
}

impl ViewGroup {
    pub fn label(&self) -> &'static str {
        self.into()
    }

    /// The v3 `counters@type` attribute a view group is decoded from.
    pub fn v3_type(&self) -> &'static str {
        match self {
            ViewGroup::Qtype => "resqtype",
            ViewGroup::Resstats => "resstats",
        }
    }
}
