//! Lazy pagination over list endpoints.
//!
//! Most collections advertise the next page in an RFC 8288 `Link` header;
//! search instead takes `page`/`per_page` and signals more results by
//! returning a full page. Either way pages are fetched one at a time, only
//! when the consumer asks for them.

use std::collections::HashMap;
use std::sync::LazyLock;

use futures_util::stream::{self, Stream, TryStreamExt};
use log::debug;
use regex::Regex;
use reqwest::Method;
use serde_json::Value;

use super::client::ApiClient;
use crate::errors::{BasecampError, Result};

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([^>]+)>\s*;\s*rel="([^"]+)""#).expect("link header pattern is valid")
});

/// How an endpoint exposes its next page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStyle {
    LinkHeader,
    PageNumber { per_page: u32 },
}

/// Where the next page lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    Url(String),
    Number(u32),
}

/// A listing request that can be replayed page by page
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub style: PageStyle,
}

impl PageRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            params: Vec::new(),
            style: PageStyle::LinkHeader,
        }
    }

    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    pub fn with_style(mut self, style: PageStyle) -> Self {
        self.style = style;
        self
    }

    fn first_page_number(&self) -> u32 {
        self.params
            .iter()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(1)
    }
}

/// One page of results
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Value>,
    pub next: Option<NextPage>,
}

impl Page {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// `rel` to URL for every entry in a `Link` header
pub fn parse_link_header(header: &str) -> HashMap<String, String> {
    LINK_RE
        .captures_iter(header)
        .map(|caps| (caps[2].to_string(), caps[1].to_string()))
        .collect()
}

/// Items of a page body; anything but an array contributes nothing
fn page_items(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        other => {
            debug!("Page body is not a list: {}", other);
            Vec::new()
        }
    }
}

struct PagerState {
    request: PageRequest,
    next: Option<NextPage>,
    fetched: usize,
    exhausted: bool,
}

/// A full page implies another one; the largest page number is always last
fn next_page_number(per_page: u32, item_count: usize, page_number: u32) -> Option<u32> {
    if per_page == 0 || item_count < per_page as usize {
        return None;
    }
    page_number.checked_add(1)
}

impl ApiClient {
    /// Fetch a single page. `cursor` is `None` for the first page.
    pub async fn fetch_page(&self, request: &PageRequest, cursor: Option<&NextPage>) -> Result<Page> {
        let (path, params, page_number) = match cursor {
            None => (
                request.path.clone(),
                request.params.clone(),
                request.first_page_number(),
            ),
            Some(NextPage::Url(url)) => (url.clone(), Vec::new(), 0),
            Some(NextPage::Number(n)) => {
                let mut params: Vec<_> = request
                    .params
                    .iter()
                    .filter(|(k, _)| k != "page")
                    .cloned()
                    .collect();
                params.push(("page".to_string(), n.to_string()));
                (request.path.clone(), params, *n)
            }
        };

        let response = self
            .send(request.method.clone(), &path, &params, None)
            .await?;
        let items = page_items(response.body);

        let next = match request.style {
            PageStyle::LinkHeader => response
                .link
                .as_deref()
                .and_then(|header| parse_link_header(header).remove("next"))
                .map(NextPage::Url),
            PageStyle::PageNumber { per_page } => {
                next_page_number(per_page, items.len(), page_number).map(NextPage::Number)
            }
        };

        Ok(Page { items, next })
    }

    /// Pages in server order. At most `max_pages` requests are made; with no
    /// bound, paging stops only when the server offers no next page. Errors
    /// end the stream.
    pub fn pages(
        &self,
        request: PageRequest,
        max_pages: Option<usize>,
    ) -> impl Stream<Item = Result<Page>> + '_ {
        let state = PagerState {
            request,
            next: None,
            fetched: 0,
            exhausted: false,
        };

        stream::try_unfold(state, move |mut state| async move {
            if state.exhausted || max_pages.is_some_and(|max| state.fetched >= max) {
                return Ok::<_, BasecampError>(None);
            }

            let page = self.fetch_page(&state.request, state.next.as_ref()).await?;
            state.fetched += 1;
            state.next = page.next.clone();
            state.exhausted = state.next.is_none();
            debug!(
                "Fetched page {} ({} items, more: {})",
                state.fetched,
                page.items.len(),
                !state.exhausted
            );
            Ok(Some((page, state)))
        })
    }

    /// Items across all pages, flattened in order
    pub fn paginate(
        &self,
        request: PageRequest,
        max_pages: Option<usize>,
    ) -> impl Stream<Item = Result<Value>> + '_ {
        self.pages(request, max_pages)
            .map_ok(|page| stream::iter(page.items.into_iter().map(Ok::<Value, BasecampError>)))
            .try_flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_link_header() {
        let header = r#"<https://3.basecampapi.com/1/projects.json?page=2>; rel="next", <https://3.basecampapi.com/1/projects.json?page=9>; rel="last""#;
        let links = parse_link_header(header);
        assert_eq!(
            links.get("next").map(String::as_str),
            Some("https://3.basecampapi.com/1/projects.json?page=2")
        );
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_parse_link_header_without_next() {
        assert!(parse_link_header(r#"<https://x/1>; rel="prev""#).get("next").is_none());
        assert!(parse_link_header("").is_empty());
    }

    #[test]
    fn test_page_items_ignores_objects() {
        assert_eq!(page_items(serde_json::json!([1, 2])).len(), 2);
        assert!(page_items(serde_json::json!({"id": 1})).is_empty());
    }

    #[test]
    fn test_next_page_number() {
        assert_eq!(next_page_number(2, 2, 1), Some(2));
        assert_eq!(next_page_number(2, 1, 1), None);
        assert_eq!(next_page_number(0, 5, 1), None);
        assert_eq!(next_page_number(2, 2, u32::MAX), None);
    }

    #[test]
    fn test_first_page_number() {
        let request = PageRequest::get("/1/search.json")
            .with_params(vec![("page".to_string(), "3".to_string())]);
        assert_eq!(request.first_page_number(), 3);
        assert_eq!(PageRequest::get("/1/projects.json").first_page_number(), 1);
    }
}
