//! Republishing a fused feed as Atom or RSS (§4.F).
//!
//! A single-source fused feed republishes under that source's own
//! `html_uri` as its alternate link; a multi-source fused feed has no
//! single natural home page, so it omits one.

use super::*;

/// An entry's displayed title, falling back to its link when the upstream
/// entry had none at all (§4.F).
fn entry_title(entry: &Entry) -> String {
    entry
        .title
        .clone()
        .or_else(|| entry.link.clone())
        .unwrap_or_else(|| entry.guid.clone())
}

impl FusedFeed {
    fn alternate_link(&self) -> Option<String> {
        match self.sources.as_slice() {
            [source] => source.html_uri.clone(),
            _ => None,
        }
    }

    /// Build an Atom 1.0 representation of this fused feed's current
    /// entries.
    pub fn to_atom(&self) -> atom_syndication::Feed {
        let mut feed = atom_syndication::Feed {
            title: atom_syndication::Text::plain(self.name.clone()),
            updated: now(),
            ..Default::default()
        };

        if let Some(alternate) = self.alternate_link() {
            feed.links.push(atom_syndication::Link {
                href: alternate,
                rel: "alternate".to_string(),
                ..Default::default()
            });
        }

        feed.entries = self.entries().iter().map(entry_to_atom).collect();
        feed
    }

    /// Build an RSS 2.0 representation of this fused feed's current
    /// entries.
    pub fn to_rss(&self) -> rss::Channel {
        let alternate = self.alternate_link().unwrap_or_default();
        let mut channel = rss::Channel {
            title: self.name.clone(),
            link: alternate,
            description: self.name.clone(),
            ..Default::default()
        };

        channel.items = self.entries().iter().map(entry_to_rss).collect();
        channel
    }
}

fn entry_to_atom(entry: &Entry) -> atom_syndication::Entry {
    let mut atom_entry = atom_syndication::Entry {
        id: entry.guid.clone(),
        title: atom_syndication::Text::plain(entry_title(entry)),
        updated: entry.update_date,
        published: entry.pub_date,
        ..Default::default()
    };

    if let Some(author) = &entry.author {
        atom_entry.authors.push(atom_syndication::Person {
            name: author.clone(),
            ..Default::default()
        });
    }

    if let Some(link) = &entry.link {
        atom_entry.links.push(atom_syndication::Link {
            href: link.clone(),
            rel: "alternate".to_string(),
            ..Default::default()
        });
    }

    if let Some(summary) = &entry.summary {
        atom_entry.summary = Some(match entry.summary_type {
            MediaType::Text => atom_syndication::Text::plain(summary.clone()),
            MediaType::Html => atom_syndication::Text::html(summary.clone()),
        });
    }

    if let Some(content) = &entry.content {
        atom_entry.content = Some(atom_syndication::Content {
            value: Some(content.clone()),
            content_type: Some(match entry.content_type {
                MediaType::Text => "text".to_string(),
                MediaType::Html => "html".to_string(),
            }),
            ..Default::default()
        });
    }

    for enclosure in &entry.enclosures {
        atom_entry.links.push(atom_syndication::Link {
            href: enclosure.href.clone(),
            rel: "enclosure".to_string(),
            mime_type: enclosure.r#type.clone(),
            length: enclosure.length.clone(),
            ..Default::default()
        });
    }

    atom_entry
}

fn entry_to_rss(entry: &Entry) -> rss::Item {
    let mut item = rss::Item {
        title: Some(entry_title(entry)),
        link: entry.link.clone(),
        author: entry.author.clone(),
        description: entry.summary.clone(),
        content: entry.content.clone(),
        pub_date: entry.pub_date.map(|d| d.to_rfc2822()),
        guid: Some(rss::Guid {
            value: entry.guid.clone(),
            permalink: false,
        }),
        ..Default::default()
    };

    if let Some(enclosure) = entry.enclosures.first() {
        item.enclosure = Some(rss::Enclosure {
            url: enclosure.href.clone(),
            length: enclosure.length.clone().unwrap_or_default(),
            mime_type: enclosure.r#type.clone().unwrap_or_default(),
        });
    }

    item
}
