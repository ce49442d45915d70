//! Cursor pagination over `next` URLs

use super::context::ExecutionContext;
use super::dispatcher::spotify_api_request;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

/// Outcome of reading a page's `next` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Fetch this absolute URL next
    Continue(String),
    /// `next` is `null` or empty
    Done,
    /// `next` is absent from the page
    Missing,
}

/// Read the `next` pointer of a page.
///
/// Anything other than a string, `null` or an absent field is an error.
pub fn next_page(page: &JsonValue) -> Result<NextPage> {
    match page.get("next") {
        None => Ok(NextPage::Missing),
        Some(JsonValue::Null) => Ok(NextPage::Done),
        Some(JsonValue::String(url)) if url.is_empty() => Ok(NextPage::Done),
        Some(JsonValue::String(url)) => Ok(NextPage::Continue(url.clone())),
        Some(other) => Err(Error::pagination(format!(
            "'next' must be a URL string or null, got {other}"
        ))),
    }
}

/// Take the named item array out of a page
fn take_items(page: &mut JsonValue, property_name: &str) -> Result<Vec<JsonValue>> {
    match page.get_mut(property_name).map(JsonValue::take) {
        Some(JsonValue::Array(items)) => Ok(items),
        None | Some(JsonValue::Null) => Err(Error::pagination(format!(
            "Page is missing the '{property_name}' field"
        ))),
        Some(other) => Err(Error::pagination(format!(
            "Field '{property_name}' is not an array: {other}"
        ))),
    }
}

/// Caller query entries to send along with a `next` URL.
///
/// Keys already present in `next` win, so Spotify's `offset`/`limit` are not
/// duplicated.
fn query_for_next(next: &str, query: Option<&JsonObject>) -> Result<Option<JsonObject>> {
    let Some(query) = query else {
        return Ok(None);
    };

    let carried: HashSet<String> = Url::parse(next)?
        .query_pairs()
        .map(|(key, _)| key.into_owned())
        .collect();

    Ok(Some(
        query
            .iter()
            .filter(|(key, _)| !carried.contains(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    ))
}

/// Fetch every page of a list endpoint and concatenate `property_name`
/// across pages in fetch order.
///
/// The first call composes `endpoint` with the base URL; later calls target
/// each page's `next` URL. `query` is sent on every call, minus keys the
/// `next` URL already carries. Pagination stops when `next` is `null`. A page
/// without a `next` field also ends pagination.
pub async fn spotify_api_request_all_items(
    ctx: &ExecutionContext,
    property_name: &str,
    method: &str,
    endpoint: &str,
    body: &JsonValue,
    query: Option<&JsonObject>,
) -> Result<Vec<JsonValue>> {
    let mut return_data = Vec::new();
    let mut uri: Option<String> = None;
    let mut page_number = 0usize;

    loop {
        let page_query = match uri.as_deref() {
            Some(next) => query_for_next(next, query)?,
            None => query.cloned(),
        };
        let mut page = spotify_api_request(
            ctx,
            method,
            endpoint,
            body,
            page_query.as_ref(),
            uri.as_deref(),
        )
        .await?;
        page_number += 1;

        let items = take_items(&mut page, property_name)?;
        debug!(
            "Fetched page {} with {} '{}' items",
            page_number,
            items.len(),
            property_name
        );
        return_data.extend(items);

        match next_page(&page)? {
            NextPage::Continue(next) => uri = Some(next),
            NextPage::Done => break,
            NextPage::Missing => {
                warn!(
                    "Page {} of {} has no 'next' field, stopping pagination",
                    page_number, endpoint
                );
                break;
            }
        }
    }

    Ok(return_data)
}
