//! Feed entry normalization.
//!
//! Converts a parsed upstream Atom/RSS entry into the canonical [`Entry`]
//! shape. See `spec.md` §4.A for the field-by-field rules this follows.

use super::*;

use md5::{Digest, Md5};

/// Media type of a text-bearing field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "text/plain")]
    Text,
    #[serde(rename = "text/html")]
    Html,
}

/// A feed enclosure (podcast audio, attached media, etc).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enclosure {
    pub href: String,
    pub r#type: Option<String>,
    pub length: Option<String>,
}

/// A normalized feed entry, immutable after construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entry {
    pub guid: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub summary_type: MediaType,
    pub content: Option<String>,
    pub content_type: MediaType,
    pub pub_date: Option<Timestamp>,
    pub update_date: Timestamp,
    pub enclosures: Vec<Enclosure>,
}

impl Entry {
    /// Read a field by name, for rule evaluation (§4.B). Unknown field
    /// names resolve to `None`, which every rule operator treats as a
    /// non-match.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => self.title.as_deref(),
            "author" => self.author.as_deref(),
            "link" => self.link.as_deref(),
            "summary" => self.summary.as_deref(),
            "content" => self.content.as_deref(),
            "guid" => Some(self.guid.as_str()),
            _ => None,
        }
    }

    /// Normalize a parsed Atom entry. Returns `None` if there is no
    /// identity material to synthesize a guid from (§3).
    ///
    /// Atom's `updated` is a required element, so unlike [`Entry::from_rss`]
    /// there is no upstream-timestamp fallback to thread through here.
    pub fn from_atom(entry: &atom_syndication::Entry) -> Option<Entry> {
        let title = non_empty(entry.title().to_string());
        let author = non_empty(
            entry
                .authors()
                .iter()
                .map(|a| a.name().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        );
        let link = entry.links().first().map(|l| l.href.clone());

        let (summary, summary_type) = match entry.summary() {
            Some(text) => (Some(text.value.clone()), media_type_of(text.r#type)),
            None => (None, MediaType::Text),
        };
        let (content, content_type) = match entry.content() {
            Some(content) => (
                content.value().map(|v| v.to_string()),
                content
                    .content_type()
                    .map(media_type_of_str)
                    .unwrap_or(MediaType::Html),
            ),
            None => (None, MediaType::Text),
        };

        let pub_date = entry.published();
        // Atom's `updated` is a required element, so it's always the
        // primary source for `update_date`; `published` never overrides it.
        let update_date = entry.updated();

        let enclosures = entry
            .links()
            .iter()
            .filter(|l| l.rel == "enclosure")
            .map(|l| Enclosure {
                href: l.href.clone(),
                r#type: l.mime_type().map(|m| m.to_string()),
                length: l.length().map(|len| len.to_string()),
            })
            .collect();

        let guid = synthesize_guid(
            non_empty(entry.id().to_string()),
            &title,
            &content,
            &summary,
        )?;

        Some(Entry {
            guid,
            title,
            author,
            link,
            summary,
            summary_type,
            content,
            content_type,
            pub_date,
            update_date,
            enclosures,
        })
    }

    /// Normalize a parsed RSS item. Returns `None` if there is no identity
    /// material to synthesize a guid from (§3).
    pub fn from_rss(item: &rss::Item, parse_time: Timestamp) -> Option<Entry> {
        let title = item.title().map(|t| t.to_string());
        let author = item.author().map(|a| a.to_string());
        let link = item.link().map(|l| l.to_string());

        // RSS has no declared media type for description/content; assume
        // html, which is the overwhelmingly common convention.
        let summary = item.description().map(|d| d.to_string());
        let summary_type = MediaType::Html;
        let content = item
            .content()
            .map(|c| c.to_string())
            .or_else(|| summary.clone());
        let content_type = MediaType::Html;

        let pub_date = item.pub_date().and_then(parse_timestamp);
        let update_date = pub_date.unwrap_or(parse_time);

        let enclosures = item
            .enclosure()
            .map(|e| {
                vec![Enclosure {
                    href: e.url().to_string(),
                    r#type: non_empty(e.mime_type().to_string()),
                    length: non_empty(e.length().to_string()),
                }]
            })
            .unwrap_or_default();

        let upstream_guid = item.guid().map(|g| g.value().to_string());
        let guid =
            synthesize_guid(non_empty_opt(upstream_guid), &title, &content, &summary)?;

        Some(Entry {
            guid,
            title,
            author,
            link,
            summary,
            summary_type,
            content,
            content_type,
            pub_date,
            update_date,
            enclosures,
        })
    }
}

/// `text/plain` iff the upstream text construct declares itself plain
/// text; everything else (html, xhtml) normalizes to `text/html` (§3).
fn media_type_of(t: atom_syndication::TextType) -> MediaType {
    match t {
        atom_syndication::TextType::Text => MediaType::Text,
        atom_syndication::TextType::Html | atom_syndication::TextType::Xhtml => MediaType::Html,
    }
}

fn media_type_of_str(t: &str) -> MediaType {
    if t.eq_ignore_ascii_case("text") {
        MediaType::Text
    } else {
        MediaType::Html
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn non_empty_opt(s: Option<String>) -> Option<String> {
    s.and_then(non_empty)
}

/// Use the upstream guid if present and non-empty; otherwise synthesize
/// one from title+content+summary. Returns `None` (discard signal) when
/// there is no upstream guid and no identity material at all (§3).
fn synthesize_guid(
    upstream: Option<String>,
    title: &Option<String>,
    content: &Option<String>,
    summary: &Option<String>,
) -> Option<String> {
    if let Some(guid) = upstream {
        return Some(guid);
    }

    let mut material = String::new();
    if let Some(title) = title {
        material.push_str(title);
    }
    if let Some(content) = content {
        material.push_str(content);
    }
    if let Some(summary) = summary {
        material.push_str(summary);
    }
    if material.is_empty() {
        return None;
    }

    let mut hasher = Md5::new();
    hasher.update(material.as_bytes());
    Some(hex::encode(hasher.finalize()))
}
