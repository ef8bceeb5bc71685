use crate::decoder::SchemaVersion;
use std::{
    fmt,
    str::FromStr,
};
use url::Url;

/// Subsets a partitioned v3 statistics root is fetched as.
pub const V3_SUBSETS: [&str; 3] = ["server", "net", "mem"];

/// How a target's statistics are laid out on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One GET returns the whole document.
    Document,
    /// A `.../xml/v3` root, fetched as one document per subset and merged.
    Partitioned,
}

/// A single document to fetch for a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub url: Url,
    pub declared: Option<SchemaVersion>,
}

/// A statistics endpoint of one name server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    url: Url,
    tag: String,
}

impl Target {
    pub fn new(url: Url) -> Self {
        let tag = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => url.to_string(),
        };
        Self { url, tag }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Value of the `url` tag: `host[:port]`.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn layout(&self) -> Layout {
        if self.url.path().trim_end_matches('/').ends_with("/xml/v3") {
            Layout::Partitioned
        } else {
            Layout::Document
        }
    }

    /// Documents making up one collection cycle, in fetch order.
    pub fn documents(&self) -> Vec<Document> {
        match self.layout() {
            Layout::Document => vec![Document {
                url: self.url.clone(),
                declared: declared_version(&self.url),
            }],
            Layout::Partitioned => V3_SUBSETS
                .iter()
                .map(|subset| {
                    let mut url = self.url.clone();
                    let path = format!("{}/{subset}", self.url.path().trim_end_matches('/'));
                    url.set_path(&path);
                    Document {
                        url,
                        declared: Some(SchemaVersion::V3),
                    }
                })
                .collect(),
        }
    }
}

/// Version implied by a `/xml/v2` or `/xml/v3` path segment pair.
fn declared_version(url: &Url) -> Option<SchemaVersion> {
    let segments: Vec<_> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    segments.windows(2).find_map(|pair| match pair {
        ["xml", "v2"] => Some(SchemaVersion::V2),
        ["xml", "v3"] => Some(SchemaVersion::V3),
        _ => None,
    })
}

impl From<Url> for Target {
    fn from(url: Url) -> Self {
        Self::new(url)
    }
}

impl FromStr for Target {
    type Err = url::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Url::parse(s).map(Self::new)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn target(s: &str) -> Target {
        s.parse().unwrap()
    }

    #[test]
    fn tag_is_host_and_port() {
        assert_eq!(target("http://example:8053/").tag(), "example:8053");
        assert_eq!(target("http://ns1.example.org/xml/v3").tag(), "ns1.example.org");
        assert_eq!(target("http://127.0.0.1:8053").tag(), "127.0.0.1:8053");
    }

    #[test]
    fn plain_target_is_one_document() {
        let target = target("http://example:8053/");

        assert_eq!(target.layout(), Layout::Document);
        assert_eq!(
            target.documents(),
            vec![Document {
                url: Url::parse("http://example:8053/").unwrap(),
                declared: None,
            }]
        );
    }

    #[test]
    fn v2_path_declares_v2() {
        let documents = target("http://example:8053/xml/v2").documents();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].declared, Some(SchemaVersion::V2));
    }

    #[test]
    fn v3_subset_path_is_a_single_document() {
        let target = target("http://example:8053/xml/v3/server");

        assert_eq!(target.layout(), Layout::Document);
        assert_eq!(target.documents()[0].declared, Some(SchemaVersion::V3));
    }

    #[test]
    fn v3_root_is_partitioned() {
        let target = target("http://example:8053/xml/v3/");
        assert_eq!(target.layout(), Layout::Partitioned);

        let urls: Vec<_> = target.documents().into_iter().map(|d| d.url.to_string()).collect();
        assert_eq!(
            urls,
            vec![
                "http://example:8053/xml/v3/server",
                "http://example:8053/xml/v3/net",
                "http://example:8053/xml/v3/mem",
            ]
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!("not a url".parse::<Target>().is_err());
    }
}
