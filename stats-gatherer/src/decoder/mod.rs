//! # Schema Decoder
//!
//! Turns a raw statistics document into a [`NormalizedTree`].
//!
//! The schema version is read from the `version` attribute of the
//! `statistics` element before any structural decoding happens:
//!
//! - **v2**: `<isc><bind><statistics version="2.x">`, every section at a fixed path
//! - **v3**: `<statistics version="3.x">`, counters grouped by `counters@type`;
//!   the daemon may serve only a subset of the sections per document
//!
//! An `isc` wrapper without a version attribute only exists in the v2 schema and
//! is decoded as such.

mod common;
mod v2;
mod v3;

use crate::metrics::{
    MetaVersion,
    NormalizedTree,
};
use quick_xml::{
    events::Event,
    Reader,
};
use serde::{
    Deserialize,
    Serialize,
};
use strum::Display;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unsupported statistics schema version {found:?}")]
    UnsupportedVersion { found: String },
    #[error("malformed statistics document: {cause}")]
    MalformedDocument { cause: String },
}

impl DecodeError {
    pub(crate) fn malformed(cause: impl ToString) -> Self {
        DecodeError::MalformedDocument {
            cause: cause.to_string(),
        }
    }
}

/// Supported wire-format revisions. Adding a variant forces a decoder for it.
#[derive(Debug, Clone, Copy, Display, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SchemaVersion {
    V2,
    V3,
}

impl SchemaVersion {
    /// Maps a declared `statistics@version` value to a schema by its major number.
    pub fn from_declared(declared: &str) -> Result<Self, DecodeError> {
        let major = declared.trim().split('.').next().unwrap_or_default();
        match major {
            "2" => Ok(SchemaVersion::V2),
            "3" => Ok(SchemaVersion::V3),
            _ => Err(DecodeError::UnsupportedVersion {
                found: declared.to_string(),
            }),
        }
    }

    fn decode(self, text: &str, version: MetaVersion) -> Result<NormalizedTree, DecodeError> {
        match self {
            SchemaVersion::V2 => v2::decode(text, version),
            SchemaVersion::V3 => v3::decode(text, version),
        }
    }
}

/// A fetched document, alive for one fetch-decode cycle.
#[derive(Debug, Clone)]
pub struct RawDocument {
    body: Vec<u8>,
    declared: Option<SchemaVersion>,
}

impl RawDocument {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            declared: None,
        }
    }

    /// Attaches the version the caller expects, e.g. from the URL it fetched.
    pub fn with_declared(mut self, declared: SchemaVersion) -> Self {
        self.declared = Some(declared);
        self
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn declared(&self) -> Option<SchemaVersion> {
        self.declared
    }
}

/// Decodes `raw` with the decoder matching its embedded version marker.
pub fn decode(raw: &RawDocument) -> Result<NormalizedTree, DecodeError> {
    let text = std::str::from_utf8(raw.body()).map_err(DecodeError::malformed)?;
    let version = sniff(text)?;

    if let Some(declared) = raw.declared() {
        if declared != version.schema {
            warn!(%declared, found = %version.schema, "document version differs from the requested one");
        }
    }

    debug!(schema = %version.schema, declared = %version.declared, bytes = text.len(), "decoding statistics document");
    version.schema.decode(text, version)
}

/// Reads the version marker without decoding the rest of the document.
fn sniff(text: &str) -> Result<MetaVersion, DecodeError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    loop {
        let (element, empty) = match reader.read_event().map_err(DecodeError::malformed)? {
            Event::Start(element) => (element, false),
            Event::Empty(element) => (element, true),
            Event::End(_) => {
                path.pop();
                continue;
            }
            Event::Eof => return Err(DecodeError::malformed("no statistics element found")),
            _ => continue,
        };

        let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
        let wrapped = path.first().is_some_and(|root| root == "isc");
        let at_statistics = name == "statistics"
            && match path.as_slice() {
                [] => true,
                [root, bind] => root == "isc" && bind == "bind",
                _ => false,
            };

        if at_statistics {
            let declared = element
                .try_get_attribute("version")
                .map_err(DecodeError::malformed)?
                .map(|attr| attr.unescape_value().map(|value| value.into_owned()))
                .transpose()
                .map_err(DecodeError::malformed)?;

            let version = match declared {
                Some(declared) => MetaVersion {
                    schema: SchemaVersion::from_declared(&declared)?,
                    declared,
                },
                None if wrapped => MetaVersion {
                    schema: SchemaVersion::V2,
                    declared: String::new(),
                },
                None => return Err(DecodeError::UnsupportedVersion { found: String::new() }),
            };

            if !empty {
                reader.read_to_end(element.name()).map_err(DecodeError::malformed)?;
            }
            expect_eof(&mut reader, path.len())?;
            return Ok(version);
        }

        match (path.len(), name.as_str()) {
            (0, "isc") => {}
            (0, other) => return Err(DecodeError::malformed(format!("unexpected root element <{other}>"))),
            (1, "bind") if wrapped => {}
            _ => {
                if !empty {
                    reader.read_to_end(element.name()).map_err(DecodeError::malformed)?;
                }
                continue;
            }
        }

        if !empty {
            path.push(name);
        }
    }
}

/// Checks the rest of the document is well formed once the statistics element
/// was read: `depth` open ancestors get closed and nothing follows the root.
fn expect_eof(reader: &mut Reader<&[u8]>, mut depth: usize) -> Result<(), DecodeError> {
    loop {
        match reader.read_event().map_err(DecodeError::malformed)? {
            Event::Start(element) if depth > 0 => {
                reader.read_to_end(element.name()).map_err(DecodeError::malformed)?;
            }
            Event::End(_) if depth > 0 => depth -= 1,
            Event::Empty(_) | Event::Text(_) | Event::CData(_) if depth > 0 => {}
            Event::Start(_) | Event::Empty(_) | Event::End(_) | Event::Text(_) | Event::CData(_) => {
                return Err(DecodeError::malformed("content after the root element"));
            }
            Event::Eof if depth == 0 => return Ok(()),
            Event::Eof => return Err(DecodeError::malformed("unexpected end of document")),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sniffed(text: &str) -> Result<(SchemaVersion, String), DecodeError> {
        sniff(text).map(|version| (version.schema, version.declared))
    }

    #[test]
    fn sniffs_v2_wrapper() {
        let doc = r#"<?xml version="1.0"?><isc version="1.0"><bind><statistics version="2.2"/></bind></isc>"#;
        assert_eq!(sniffed(doc).unwrap(), (SchemaVersion::V2, "2.2".to_string()));
    }

    #[test]
    fn sniffs_v2_wrapper_without_version_attribute() {
        let doc = "<isc><bind><statistics><server/></statistics></bind></isc>";
        assert_eq!(sniffed(doc).unwrap(), (SchemaVersion::V2, String::new()));
    }

    #[test]
    fn sniffs_v3_root() {
        let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
            <?xml-stylesheet type="text/xsl" href="/bind9.xsl"?>
            <statistics version="3.11"><server/></statistics>"#;
        assert_eq!(sniffed(doc).unwrap(), (SchemaVersion::V3, "3.11".to_string()));
    }

    #[test]
    fn skips_siblings_before_statistics() {
        let doc = r#"<isc><meta><statistics version="9"/></meta><bind><statistics version="2"/></bind></isc>"#;
        assert_eq!(sniffed(doc).unwrap(), (SchemaVersion::V2, "2".to_string()));
    }

    #[test]
    fn unknown_version_is_unsupported() {
        let doc = r#"<statistics version="v9"/>"#;
        assert_eq!(
            sniffed(doc).unwrap_err(),
            DecodeError::UnsupportedVersion {
                found: "v9".to_string()
            }
        );
    }

    #[test]
    fn bare_statistics_without_version_is_unsupported() {
        assert!(matches!(
            sniffed("<statistics/>").unwrap_err(),
            DecodeError::UnsupportedVersion { .. }
        ));
    }

    #[test]
    fn unexpected_root_is_malformed() {
        assert!(matches!(
            sniffed("<html><body/></html>").unwrap_err(),
            DecodeError::MalformedDocument { .. }
        ));
    }

    #[test]
    fn empty_and_broken_documents_are_malformed() {
        assert!(matches!(sniffed("").unwrap_err(), DecodeError::MalformedDocument { .. }));
        assert!(matches!(
            sniffed("<isc><bind></isc>").unwrap_err(),
            DecodeError::MalformedDocument { .. }
        ));
    }

    #[test]
    fn content_after_the_root_is_malformed() {
        for doc in [
            r#"<statistics version="3.0"><server/></statistics><junk>"#,
            r#"<statistics version="3.0"/><statistics version="3.0"/>"#,
            r#"<isc><bind><statistics version="2.2"/></bind></isc>trailing"#,
        ] {
            assert!(
                matches!(sniffed(doc), Err(DecodeError::MalformedDocument { .. })),
                "{doc}"
            );
        }
    }

    #[test]
    fn trailing_comments_and_whitespace_are_accepted() {
        let doc = "<isc><bind><statistics version=\"2.2\"><server/></statistics><memory/></bind></isc>\n<!-- end -->\n";
        assert_eq!(sniffed(doc).unwrap(), (SchemaVersion::V2, "2.2".to_string()));
    }

    #[test]
    fn unclosed_ancestors_are_malformed() {
        let doc = r#"<isc><bind><statistics version="2.2"/></bind>"#;
        assert!(matches!(sniffed(doc).unwrap_err(), DecodeError::MalformedDocument { .. }));
    }

    #[test]
    fn decode_rejects_trailing_junk() {
        let raw = RawDocument::new(r#"<statistics version="3.0"><server/></statistics><junk>"#);
        assert!(matches!(decode(&raw).unwrap_err(), DecodeError::MalformedDocument { .. }));
    }

    #[test]
    fn non_utf8_body_is_malformed() {
        let raw = RawDocument::new(vec![0xff, 0xfe, 0x3c]);
        assert!(matches!(decode(&raw).unwrap_err(), DecodeError::MalformedDocument { .. }));
    }

    #[test]
    fn declared_version_does_not_override_the_marker() {
        let raw = RawDocument::new(r#"<statistics version="3.5"/>"#).with_declared(SchemaVersion::V2);
        let tree = decode(&raw).unwrap();
        assert_eq!(tree.version.schema, SchemaVersion::V3);
    }

    #[test]
    fn from_declared_uses_major_number() {
        assert_eq!(SchemaVersion::from_declared("2").unwrap(), SchemaVersion::V2);
        assert_eq!(SchemaVersion::from_declared("3.0").unwrap(), SchemaVersion::V3);
        assert!(SchemaVersion::from_declared("4.0").is_err());
    }
}
