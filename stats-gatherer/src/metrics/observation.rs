use super::MetricKind;
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;

pub type Fields = BTreeMap<String, i64>;

/// Tag set of a single observation.
///
/// A value type: deriving tags with [`Tags::with`] copies, so no two
/// observations ever share a map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    /// Base tags identifying a collection target.
    pub fn for_target(url: impl Into<String>) -> Self {
        let mut tags = Self::default();
        tags.insert("url", url);
        tags
    }

    /// Returns a copy of these tags with `key` set to `value`.
    pub fn with(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut tags = self.clone();
        tags.insert(key, value);
        tags
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricObservation {
    pub measurement: String,
    pub kind: MetricKind,
    pub fields: Fields,
    pub tags: Tags,
}

impl MetricObservation {
    pub fn counter(measurement: impl Into<String>, fields: Fields, tags: Tags) -> Self {
        Self {
            measurement: measurement.into(),
            kind: MetricKind::Counter,
            fields,
            tags,
        }
    }

    pub fn gauge(measurement: impl Into<String>, fields: Fields, tags: Tags) -> Self {
        Self {
            measurement: measurement.into(),
            kind: MetricKind::Gauge,
            fields,
            tags,
        }
    }

    /// Hands this observation to `acc` using the operation matching its kind.
    pub fn record<A: Accumulator + ?Sized>(self, acc: &mut A) {
        match self.kind {
            MetricKind::Counter => acc.add_counter(&self.measurement, self.fields, self.tags),
            MetricKind::Gauge => acc.add_gauge(&self.measurement, self.fields, self.tags),
        }
    }
}

/// Sink consuming observations one at a time
pub trait Accumulator {
    fn add_counter(&mut self, measurement: &str, fields: Fields, tags: Tags);

    fn add_gauge(&mut self, measurement: &str, fields: Fields, tags: Tags);
}

impl Accumulator for Vec<MetricObservation> {
    fn add_counter(&mut self, measurement: &str, fields: Fields, tags: Tags) {
        self.push(MetricObservation::counter(measurement, fields, tags));
    }

    fn add_gauge(&mut self, measurement: &str, fields: Fields, tags: Tags) {
        self.push(MetricObservation::gauge(measurement, fields, tags));
    }
}
