//! Page envelope returned by paginated endpoints.

use serde::Serialize;
use url::Url;

/// Navigation links for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationLinks {
    /// Link that reproduces the current page.
    #[serde(rename = "self")]
    pub self_link: String,
    /// Link to the following page, absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl PaginationLinks {
    /// Build links from the request URL and the next cursor.
    ///
    /// The `cursor` and `limit` query parameters of `request` are replaced;
    /// every other parameter is preserved.
    ///
    /// ```
    /// use pagination::PaginationLinks;
    /// use url::Url;
    ///
    /// let url = Url::parse("http://host/items?view=all&cursor=old").expect("url");
    /// let links = PaginationLinks::from_request(&url, 20, Some("abc"));
    /// assert_eq!(
    ///     links.next.as_deref(),
    ///     Some("http://host/items?view=all&limit=20&cursor=abc")
    /// );
    /// ```
    pub fn from_request(request: &Url, limit: usize, next_cursor: Option<&str>) -> Self {
        let next = next_cursor.map(|cursor| with_page_query(request, limit, Some(cursor)));
        Self {
            self_link: request.to_string(),
            next,
        }
    }
}

fn with_page_query(request: &Url, limit: usize, cursor: Option<&str>) -> String {
    let retained: Vec<(String, String)> = request
        .query_pairs()
        .filter(|(key, _)| key != "cursor" && key != "limit")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let mut url = request.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("limit", &limit.to_string());
        if let Some(cursor) = cursor {
            pairs.append_pair("cursor", cursor);
        }
    }
    url.to_string()
}

/// Envelope wrapping one page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Effective page size.
    pub limit: usize,
    /// Opaque cursor for the next page, absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Navigation links.
    pub links: PaginationLinks,
}

impl<T> Paginated<T> {
    /// Assemble an envelope.
    pub fn new(data: Vec<T>, limit: usize, next_cursor: Option<String>, request: &Url) -> Self {
        let links = PaginationLinks::from_request(request, limit, next_cursor.as_deref());
        Self {
            data,
            limit,
            next_cursor,
            links,
        }
    }
}
