use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::document::FeedDocument;

/// Client-agent header sent with every fetch, so feed operators can tell
/// who is polling them.
pub const USER_AGENT: &str = concat!("graze/", env!("CARGO_PKG_VERSION"));

/// Errors from fetching and decoding one feed document.
///
/// Each phase of a fetch fails distinctly: building the request, the
/// transport, the response status, reading the body, and decoding the
/// document. All of them are recovered at the cycle boundary — none aborts
/// the fetch loop.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The feed URL could not be parsed
    #[error("invalid feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The request exceeded the configured overall timeout
    #[error("request timed out")]
    Timeout,
    /// Transport-level failure (DNS, connection, TLS)
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),
    /// The server answered with something other than 200
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    /// The response body could not be read
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
    /// The body was not a parseable RSS document
    #[error("malformed feed document: {0}")]
    Decode(#[from] quick_xml::DeError),
}

/// Build the HTTP client shared by every fetch. `timeout` bounds each
/// request as a whole, from connect through the last body byte.
pub fn client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// Fetch and decode one feed document with a single GET request.
///
/// On success every text field of the document has been entity-decoded
/// once (see [`FeedDocument::decode_entities`]).
pub async fn fetch_document(
    client: &reqwest::Client,
    url: &str,
) -> Result<FeedDocument, FetchError> {
    let url = Url::parse(url)?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(e)
        }
    })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::Status(status.as_u16()));
    }

    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Body(e)
        }
    })?;

    let mut document: FeedDocument = quick_xml::de::from_str(&body)?;
    document.decode_entities();
    Ok(document)
}
