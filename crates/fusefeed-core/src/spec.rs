//! Loading a [`FusedFeed`] from its JSON spec document (§4.E).

use super::*;

/// The on-disk shape of a fused feed definition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpecDocument {
    pub name: String,
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
    /// Reserved, mirrors [`FusedFeed::filters`] (§4.D); not applied today.
    #[serde(default)]
    pub filters: Vec<Filter>,
}

impl SpecDocument {
    pub fn into_fused_feed(self) -> FusedFeed {
        FusedFeed {
            name: self.name,
            sources: self.sources.into_iter().map(Source::from).collect(),
            filters: self.filters,
        }
    }

    /// Parse a spec document from JSON text. An empty string is rejected
    /// outright; a well-formed document with no sources is accepted and
    /// produces a fused feed that simply fetches nothing (§4.E).
    pub fn parse(text: &str) -> Result<SpecDocument, SpecError> {
        if text.trim().is_empty() {
            return Err(SpecError::Empty);
        }
        Ok(serde_json::from_str(text)?)
    }
}

/// Read and parse a spec document from a file on disk.
pub fn load_spec_file(path: impl AsRef<std::path::Path>) -> Result<FusedFeed, SpecError> {
    let text = std::fs::read_to_string(path)?;
    let doc = SpecDocument::parse(&text)?;
    Ok(doc.into_fused_feed())
}
