//! The HTTP listener (§4.H): routes `GET /feeds/{id}` and
//! `GET /feeds/{id}/rss`, drives a fetch cycle against the feed store, and
//! serializes the result to wire Atom/RSS.
//!
//! This module only routes, loads, and serializes — none of the
//! fetch/merge/filter logic lives here; it all belongs to `fusefeed-core`.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use rss::extension::{Extension, ExtensionMap};

use crate::feed_store::{FeedStore, FeedStoreError};

pub fn router(store: Arc<FeedStore>) -> Router {
    Router::new()
        .route("/feeds/{id}", get(get_atom))
        .route("/feeds/{id}/rss", get(get_rss))
        .with_state(store)
}

async fn get_atom(
    State(store): State<Arc<FeedStore>>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    match render(&store, &id, &uri).await {
        Ok(fused) => {
            let mut feed = fused.to_atom();
            feed.links.push(atom_syndication::Link {
                href: self_url(&headers, &uri),
                rel: "self".to_string(),
                mime_type: Some("application/atom+xml".to_string()),
                ..Default::default()
            });
            (
                [(header::CONTENT_TYPE, "application/atom+xml")],
                feed.to_string(),
            )
                .into_response()
        }
        Err(status) => status.into_response(),
    }
}

async fn get_rss(
    State(store): State<Arc<FeedStore>>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    match render(&store, &id, &uri).await {
        Ok(fused) => {
            let mut channel = fused.to_rss();
            attach_rss_self_link(&mut channel, &self_url(&headers, &uri));
            (
                [(header::CONTENT_TYPE, "application/rss+xml")],
                channel.to_string(),
            )
                .into_response()
        }
        Err(status) => status.into_response(),
    }
}

/// RSS 2.0 has no native self-link field; attach one the conventional way,
/// as an `atom:link rel="self"` extension element (§6).
fn attach_rss_self_link(channel: &mut rss::Channel, self_url: &str) {
    let mut link = Extension::default();
    link.name = "atom:link".to_string();
    link.attrs
        .insert("href".to_string(), self_url.to_string());
    link.attrs.insert("rel".to_string(), "self".to_string());
    link.attrs
        .insert("type".to_string(), "application/rss+xml".to_string());

    let mut atom_elements = BTreeMap::new();
    atom_elements.insert("link".to_string(), vec![link]);

    let mut extensions: ExtensionMap = BTreeMap::new();
    extensions.insert("atom".to_string(), atom_elements);

    channel
        .namespaces
        .insert("atom".to_string(), "http://www.w3.org/2005/Atom".to_string());
    channel.extensions = extensions;
}

/// Load the feed, run a fetch cycle against the store's persistent
/// `Source` state, and hand back a snapshot ready for serialization.
async fn render(
    store: &FeedStore,
    id: &str,
    uri: &Uri,
) -> Result<fusefeed_core::FusedFeed, StatusCode> {
    tracing::debug!(%id, path = %uri.path(), "serving fused feed");

    let fused = store.get(id).await.map_err(|e| match e {
        FeedStoreError::NotFound(_) | FeedStoreError::InvalidId(_) => StatusCode::NOT_FOUND,
        FeedStoreError::Spec(e) => {
            tracing::warn!(%id, error = %e, "spec file failed to parse");
            StatusCode::BAD_REQUEST
        }
    })?;

    let mut guard = fused.write().await;
    guard.fetch_default().await;
    Ok(guard.clone())
}

/// Reconstruct the absolute request URL from the `Host` header (axum's
/// `Uri` extractor only ever carries the request-target's path+query, not
/// scheme/host). Falls back to `X-Forwarded-Proto`/`http` and `localhost`
/// when a header is missing, which only matters for local, header-bare
/// testing — a real deployment always sends `Host`. Matches the original's
/// `request.url` (`examples/original_source/feedfuser.py`) for §6's
/// "self-link pointing to the request URL".
fn self_url(headers: &HeaderMap, uri: &Uri) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    format!("{scheme}://{host}{path_and_query}")
}
