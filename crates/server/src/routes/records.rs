//! Generic CRUD handlers, mounted once per collection schema at `/{collection}`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header::HOST, HeaderMap},
    routing::get,
    Json, Router,
};
use common::types::Href;
use models::{Record, Schema};
use serde::Serialize;
use service::{
    pagination::{PageLinks, Pagination},
    record::RecordService,
};

use crate::errors::ApiError;

pub struct RecordState<S: Schema> {
    pub service: Arc<RecordService<S>>,
    /// Configured absolute base for links; `None` means derive from `Host`.
    pub public_url: Option<Arc<str>>,
}

impl<S: Schema> Clone for RecordState<S> {
    fn clone(&self) -> Self {
        Self { service: Arc::clone(&self.service), public_url: self.public_url.clone() }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Links {
    #[serde(rename = "self")]
    pub current: Href,
    pub last: Href,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<Href>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Href>,
}

impl Links {
    pub fn render(list_url: &str, links: PageLinks) -> Self {
        let href = |page: u64| Href::new(format!("{list_url}?page={page}"));
        Self {
            current: href(links.current),
            last: href(links.last),
            prev: links.prev.map(href),
            next: links.next.map(href),
        }
    }
}

/// First `page` value in the query string. Later repeats are ignored.
fn page_param(params: &[(String, String)]) -> Option<&str> {
    params.iter().find(|(k, _)| k == "page").map(|(_, v)| v.as_str())
}

/// A `Host` value usable as the authority of an absolute URL.
fn valid_host(host: &str) -> bool {
    !host.is_empty()
        && !host
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '\\' | '?' | '#' | '@'))
}

fn base_url(public_url: Option<&str>, headers: &HeaderMap) -> String {
    match public_url {
        Some(url) => url.to_string(),
        None => {
            // plain http: behind a TLS terminator, configure `server.public_url`
            let host = headers
                .get(HOST)
                .and_then(|h| h.to_str().ok())
                .filter(|h| valid_host(h))
                .unwrap_or("localhost");
            format!("http://{host}")
        }
    }
}

pub async fn list<S: Schema>(
    State(state): State<RecordState<S>>,
    Query(params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pagination = Pagination::from_query(page_param(&params));
    let page = state.service.list(pagination).await?;

    let list_url = format!("{}/{}/", base_url(state.public_url.as_deref(), &headers), S::COLLECTION);
    let mut body = serde_json::Map::new();
    body.insert(S::COLLECTION.to_string(), serde_json::to_value(&page.items)?);
    body.insert("_links".to_string(), serde_json::to_value(Links::render(&list_url, page.links))?);
    Ok(Json(serde_json::Value::Object(body)))
}

pub async fn create<S: Schema>(
    State(state): State<RecordState<S>>,
    Json(body): Json<Record<S>>,
) -> Result<Json<Record<S>>, ApiError> {
    Ok(Json(state.service.create(body).await?))
}

pub async fn get_one<S: Schema>(
    State(state): State<RecordState<S>>,
    Path(slug): Path<String>,
) -> Result<Json<Record<S>>, ApiError> {
    Ok(Json(state.service.get(&slug).await?))
}

pub async fn update<S: Schema>(
    State(state): State<RecordState<S>>,
    Path(slug): Path<String>,
    Json(body): Json<Record<S>>,
) -> Result<Json<Record<S>>, ApiError> {
    Ok(Json(state.service.update(&slug, body).await?))
}

pub async fn delete<S: Schema>(
    State(state): State<RecordState<S>>,
    Path(slug): Path<String>,
) -> Result<Json<Record<S>>, ApiError> {
    Ok(Json(state.service.delete(&slug).await?))
}

/// Routes for one collection: `/{c}/` (+ `/{c}`) and `/{c}/:slug`.
pub fn router<S: Schema>(state: RecordState<S>) -> Router {
    let collection = format!("/{}/", S::COLLECTION);
    let bare = format!("/{}", S::COLLECTION);
    let item = format!("/{}/:slug", S::COLLECTION);
    Router::new()
        .route(&collection, get(list::<S>).post(create::<S>))
        .route(&bare, get(list::<S>).post(create::<S>))
        .route(&item, get(get_one::<S>).put(update::<S>).delete(delete::<S>))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn links_render_only_present_neighbours() {
        let links = Pagination::new(1).links(25);
        let rendered = Links::render("http://localhost:8080/cocktails/", links);
        let v = serde_json::to_value(&rendered).unwrap();
        assert_eq!(v["self"]["href"], "http://localhost:8080/cocktails/?page=1");
        assert_eq!(v["last"]["href"], "http://localhost:8080/cocktails/?page=3");
        assert_eq!(v["next"]["href"], "http://localhost:8080/cocktails/?page=2");
        assert!(v.get("prev").is_none());
    }

    #[test]
    fn base_url_prefers_configured_value() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("internal:8080"));
        assert_eq!(base_url(Some("https://api.example.com"), &headers), "https://api.example.com");
        assert_eq!(base_url(None, &headers), "http://internal:8080");
        assert_eq!(base_url(None, &HeaderMap::new()), "http://localhost");
    }

    #[test]
    fn host_that_would_break_the_url_falls_back_to_localhost() {
        for bad in ["evil.com/phish", "a b", "user@evil.com", "x?y", "x#y"] {
            let mut headers = HeaderMap::new();
            headers.insert(HOST, HeaderValue::from_str(bad).unwrap());
            assert_eq!(base_url(None, &headers), "http://localhost", "{bad}");
        }
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("[::1]:8080"));
        assert_eq!(base_url(None, &headers), "http://[::1]:8080");
    }

    #[test]
    fn first_page_value_wins() {
        let params = vec![
            ("sort".to_string(), "name".to_string()),
            ("page".to_string(), "2".to_string()),
            ("page".to_string(), "3".to_string()),
        ];
        assert_eq!(page_param(&params), Some("2"));
        assert_eq!(page_param(&[]), None);
    }
}
