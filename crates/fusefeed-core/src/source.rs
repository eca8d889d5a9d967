//! A single fetchable upstream feed (§4.C).

use super::*;

/// One upstream Atom/RSS feed: the fetch transport configuration, its
/// per-source filters, and the cached conditional-GET state from the last
/// fetch that produced something usable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    #[serde(default)]
    pub html_uri: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub filters: Vec<Filter>,

    #[serde(skip)]
    pub etag: Option<String>,
    #[serde(skip)]
    pub last_modified: Option<String>,
    #[serde(skip)]
    pub raw: Option<String>,
    #[serde(skip)]
    pub entries: Vec<Entry>,
}

/// Untagged so a source in the spec document can be either a bare uri
/// string or an object with a uri and extra options (§4.E).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceSpec {
    Bare(String),
    Full {
        uri: String,
        #[serde(default)]
        html_uri: Option<String>,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
        #[serde(default)]
        headers: HashMap<String, String>,
        #[serde(default)]
        user_agent: Option<String>,
        #[serde(default)]
        filters: Vec<Filter>,
    },
}

impl From<SourceSpec> for Source {
    fn from(spec: SourceSpec) -> Self {
        match spec {
            SourceSpec::Bare(uri) => Source::new(uri),
            SourceSpec::Full {
                uri,
                html_uri,
                username,
                password,
                headers,
                user_agent,
                filters,
            } => Source {
                uri,
                html_uri,
                username,
                password,
                headers,
                user_agent,
                filters,
                etag: None,
                last_modified: None,
                raw: None,
                entries: Vec::new(),
            },
        }
    }
}

/// The outcome of dereferencing the server response for one fetch.
enum FetchOutcome {
    /// A body we can try to parse, plus the cache validators to remember.
    Body {
        text: String,
        etag: Option<String>,
        last_modified: Option<String>,
    },
    /// 304 Not Modified — reuse whatever we cached from the prior fetch.
    NotModified,
    /// Anything we should treat as "nothing new" (non-2xx/304, transport
    /// error, timeout).
    Nothing,
}

impl Source {
    pub fn new(uri: impl Into<String>) -> Self {
        Source {
            uri: uri.into(),
            html_uri: None,
            username: None,
            password: None,
            headers: HashMap::new(),
            user_agent: None,
            filters: Vec::new(),
            etag: None,
            last_modified: None,
            raw: None,
            entries: Vec::new(),
        }
    }

    /// Fetch and normalize this source's entries, following the state
    /// table in §4.C. On any failure this leaves `self` untouched besides
    /// clearing stale entries — the caller (the fused feed's coordinator)
    /// is responsible for isolating a failed source from the merge.
    pub async fn fetch(
        &mut self,
        client: &reqwest::Client,
        timeout: Duration,
    ) -> bool {
        let parse_time = now();

        let outcome = match tokio::time::timeout(
            timeout,
            self.request(client),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(uri = %self.uri, "fetch timed out");
                FetchOutcome::Nothing
            }
        };

        // Cache validators from a fresh 2xx body are held here, not written
        // to `self` yet — they only become the source's cache metadata
        // once `parse_feed` below confirms the body parses cleanly (§3
        // invariant 3, §4.C's "2xx / bozo -> cache metadata untouched" row).
        let (body, fresh_validators) = match outcome {
            FetchOutcome::Body {
                text,
                etag,
                last_modified,
            } => (Some(text), Some((etag, last_modified))),
            FetchOutcome::NotModified => (self.raw.clone(), None),
            FetchOutcome::Nothing => (None, None),
        };

        let Some(body) = body else {
            return false;
        };

        let Some((entries, html_uri)) = parse_feed(&body, parse_time) else {
            tracing::warn!(uri = %self.uri, "failed to parse feed, returning nothing");
            return false;
        };

        if let Some((etag, last_modified)) = fresh_validators {
            if let Some(etag) = etag {
                self.etag = Some(etag);
            }
            if let Some(last_modified) = last_modified {
                self.last_modified = Some(last_modified);
            }
            self.raw = Some(body);
        }

        if let Some(html_uri) = html_uri {
            self.html_uri = Some(html_uri);
        }

        let mut entries = entries;
        for filter in &self.filters {
            entries = filter.apply(entries);
        }
        self.entries = entries;
        true
    }

    async fn request(&self, client: &reqwest::Client) -> FetchOutcome {
        let mut request = client.get(&self.uri);
        for (name, value) in &self.headers {
            request = request.header(name, value);
        }
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            request = request.basic_auth(username, Some(password));
        }
        if let Some(user_agent) = &self.user_agent {
            request = request.header(reqwest::header::USER_AGENT, user_agent);
        }
        if let Some(etag) = &self.etag {
            request = request.header(reqwest::header::IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = &self.last_modified {
            request = request.header(reqwest::header::IF_MODIFIED_SINCE, last_modified);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(uri = %self.uri, error = %e, "fetch failed");
                return FetchOutcome::Nothing;
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_MODIFIED {
            return FetchOutcome::NotModified;
        }
        if !status.is_success() {
            tracing::warn!(uri = %self.uri, %status, "fetch returned non-success status");
            return FetchOutcome::Nothing;
        }

        let etag = response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let last_modified = response
            .headers()
            .get(reqwest::header::LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        match response.text().await {
            Ok(text) if !text.is_empty() => FetchOutcome::Body {
                text,
                etag,
                last_modified,
            },
            _ => FetchOutcome::Nothing,
        }
    }
}

/// Try atom first, then rss; the first parse that succeeds wins. Returns
/// the normalized entries plus the feed's self-described html link, if it
/// has one.
fn parse_feed(body: &str, parse_time: Timestamp) -> Option<(Vec<Entry>, Option<String>)> {
    if let Ok(atom_feed) = body.parse::<atom_syndication::Feed>() {
        let entries = atom_feed
            .entries()
            .iter()
            .filter_map(Entry::from_atom)
            .collect();
        let html_uri = atom_feed
            .links()
            .iter()
            .find(|l| l.rel == "alternate")
            .or_else(|| atom_feed.links().first())
            .map(|l| l.href.clone());
        return Some((entries, html_uri));
    }

    if let Ok(rss_feed) = body.parse::<rss::Channel>() {
        let entries = rss_feed
            .items()
            .iter()
            .filter_map(|item| Entry::from_rss(item, parse_time))
            .collect();
        let html_uri = non_empty(rss_feed.link().to_string());
        return Some((entries, html_uri));
    }

    None
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
