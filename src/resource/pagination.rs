//! Pagination envelope and cursor protocol
//!
//! List endpoints answer `{"results": [...], "nextPageToken": "..."}`. The
//! token is opaque: it is only ever copied into the next request's
//! `next-page-token` parameter. The gateway alone decides whether a token is
//! still valid.

use super::filter::{Filter, NEXT_PAGE_TOKEN, PAGE_SIZE};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::future::Future;

/// Wire envelope of a list response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Cursor state after a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    HasMore(String),
    Exhausted,
}

/// One page of model objects, in server order
#[derive(Debug)]
pub struct Page<R> {
    pub results: Vec<R>,
    pub next_page_token: Option<String>,
}

impl<R> Page<R> {
    pub fn cursor(&self) -> Cursor {
        match &self.next_page_token {
            Some(token) => Cursor::HasMore(token.clone()),
            None => Cursor::Exhausted,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.next_page_token.is_none()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn into_parts(self) -> (Vec<R>, Option<String>) {
        (self.results, self.next_page_token)
    }
}

impl<R> IntoIterator for Page<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

/// Pagination controls shared by every typed filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub page_size: Option<u32>,
    pub next_page_token: Option<String>,
}

impl PageRequest {
    pub fn size(page_size: u32) -> Self {
        Self {
            page_size: Some(page_size),
            next_page_token: None,
        }
    }

    /// Continue after a previous page
    pub fn after(mut self, token: impl Into<String>) -> Self {
        self.next_page_token = Some(token.into());
        self
    }

    pub(crate) fn apply(&self, filter: &mut Filter) {
        if let Some(size) = self.page_size {
            filter.set(PAGE_SIZE, super::filter::Matcher::equals(size));
        }
        if let Some(token) = &self.next_page_token {
            filter.set(NEXT_PAGE_TOKEN, super::filter::Matcher::equals(token));
        }
    }
}

/// Drain a cursor into one vector, one request per page.
///
/// `fetch` receives the token of the page to load (`None` for the first).
/// A token seen earlier in the walk means the gateway's cursor cycles, which
/// is reported as a contract violation.
pub async fn collect_all<R, F, Fut>(mut fetch: F) -> Result<Vec<R>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<R>>>,
{
    let mut all_items = Vec::new();
    let mut seen_tokens = HashSet::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = fetch(page_token.take()).await?;
        let (results, next_token) = page.into_parts();
        all_items.extend(results);

        match next_token {
            None => break,
            Some(token) => {
                if !seen_tokens.insert(token.clone()) {
                    return Err(Error::contract(format!(
                        "gateway page tokens form a cycle at: {}",
                        token
                    )));
                }
                page_token = Some(token);
            }
        }
    }

    Ok(all_items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(items: &[u32], token: Option<&str>) -> Page<u32> {
        Page {
            results: items.to_vec(),
            next_page_token: token.map(str::to_string),
        }
    }

    #[test]
    fn test_envelope_without_cursor() {
        let data: PageData<u32> =
            serde_json::from_value(serde_json::json!({ "results": [] })).unwrap();
        assert!(data.results.is_empty());
        assert!(data.next_page_token.is_none());
    }

    #[test]
    fn test_envelope_requires_results() {
        let err = serde_json::from_value::<PageData<u32>>(
            serde_json::json!({ "nextPageToken": "x" }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("results"));
    }

    #[test]
    fn test_cursor_states() {
        assert_eq!(page(&[1], Some("t")).cursor(), Cursor::HasMore("t".to_string()));
        assert_eq!(page(&[], None).cursor(), Cursor::Exhausted);
    }

    #[tokio::test]
    async fn test_collect_all_follows_tokens() {
        let mut seen = Vec::new();
        let items = collect_all(|token| {
            seen.push(token.clone());
            let result = match token.as_deref() {
                None => page(&[1, 2], Some("p2")),
                Some("p2") => page(&[3], Some("p3")),
                _ => page(&[4], None),
            };
            async move { Ok(result) }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4]);
        assert_eq!(seen, vec![None, Some("p2".to_string()), Some("p3".to_string())]);
    }

    #[tokio::test]
    async fn test_collect_all_rejects_repeated_token() {
        let result = collect_all(|token| {
            let result = match token {
                None => page(&[1], Some("same")),
                Some(_) => page(&[2], Some("same")),
            };
            async move { Ok(result) }
        })
        .await;

        assert!(matches!(result, Err(Error::ContractViolation(_))));
    }

    #[tokio::test]
    async fn test_collect_all_rejects_token_cycle() {
        let mut calls = 0;
        let result = collect_all(|token| {
            calls += 1;
            let result = match token.as_deref() {
                None => page(&[1], Some("a")),
                Some("a") => page(&[2], Some("b")),
                _ => page(&[3], Some("a")),
            };
            async move { Ok(result) }
        })
        .await;

        assert!(matches!(result, Err(Error::ContractViolation(_))));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_page_request_applies_to_filter() {
        let mut filter = Filter::new();
        PageRequest::size(10).after("abc").apply(&mut filter);
        assert_eq!(filter.to_query_string(), "next-page-token=abc&page-size=10");
    }
}
