//! Outbound request construction
//!
//! Builds the form-encoded requests used by the OAuth device flow and the
//! release API. Content is submitted as `x-www-form-urlencoded` and accepted
//! back as JSON. Pure construction - nothing here performs I/O.

use std::collections::HashMap;

use reqwest::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Request};
use url::Url;

use crate::error::{GitrelError, Result};

/// Build a `POST` request carrying `params` as a form-encoded body.
///
/// Caller-supplied headers are merged in last and win on key collision.
pub fn post_form(
    client: &Client,
    url: &str,
    params: &[(&str, &str)],
    headers: Option<&HashMap<String, String>>,
) -> Result<Request> {
    let url = parse_url(url)?;
    let body = serde_urlencoded::to_string(params)
        .map_err(|e| GitrelError::InvalidRequest(e.to_string()))?;

    let mut request = client
        .request(Method::POST, url)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(ACCEPT, "application/json")
        .body(body)
        .build()
        .map_err(|e| GitrelError::InvalidRequest(e.to_string()))?;

    merge_headers(&mut request, headers)?;
    Ok(request)
}

/// Build a `GET` request with `params` encoded into the query string.
pub fn get(
    client: &Client,
    url: &str,
    params: &[(&str, &str)],
    headers: Option<&HashMap<String, String>>,
) -> Result<Request> {
    let mut url = parse_url(url)?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params.iter().copied());
    }

    let mut request = client
        .request(Method::GET, url)
        .header(ACCEPT, "application/json")
        .build()
        .map_err(|e| GitrelError::InvalidRequest(e.to_string()))?;

    merge_headers(&mut request, headers)?;
    Ok(request)
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| GitrelError::InvalidRequest(format!("{url}: {e}")))
}

fn merge_headers(request: &mut Request, headers: Option<&HashMap<String, String>>) -> Result<()> {
    let Some(headers) = headers else {
        return Ok(());
    };

    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| GitrelError::InvalidRequest(format!("header '{key}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| GitrelError::InvalidRequest(format!("header '{key}': {e}")))?;
        request.headers_mut().insert(name, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_string(request: &Request) -> String {
        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap_or(&[]);
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn test_post_form_encodes_params_in_body() {
        let client = Client::new();
        let request = post_form(
            &client,
            "https://api.example.org/api/testendpoint",
            &[("client_id", "abc123"), ("scope", "repo")],
            None,
        )
        .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(
            request.headers()[CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
        assert_eq!(request.headers()[ACCEPT], "application/json");
        assert_eq!(body_string(&request), "client_id=abc123&scope=repo");
    }

    #[test]
    fn test_caller_headers_win_on_collision() {
        let client = Client::new();
        let mut headers = HashMap::new();
        headers.insert("Accept".to_string(), "application/vnd.github+json".to_string());
        headers.insert("Authorization".to_string(), "bearer abc123".to_string());

        let request = post_form(
            &client,
            "https://api.example.org/releases",
            &[("tag_name", "v1.0")],
            Some(&headers),
        )
        .unwrap();

        assert_eq!(request.headers()[ACCEPT], "application/vnd.github+json");
        assert_eq!(request.headers()["Authorization"], "bearer abc123");
    }

    #[test]
    fn test_get_puts_params_in_query() {
        let client = Client::new();
        let request = get(
            &client,
            "https://api.example.org/releases",
            &[("per_page", "100")],
            None,
        )
        .unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.url().query(), Some("per_page=100"));
    }

    #[test]
    fn test_malformed_url_is_rejected() {
        let client = Client::new();
        let err = post_form(&client, "not a url", &[], None).unwrap_err();
        assert!(matches!(err, GitrelError::InvalidRequest(_)));
    }
}
