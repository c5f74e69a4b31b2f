//! HTTP fetch for remote documents.
//!
//! The tree builder never performs I/O; this is the collaborator the document
//! loader calls when it is handed a URL instead of markup.

use std::time::Duration;

use thiserror::Error;

/// User-Agent header sent with all requests.
const USER_AGENT: &str = concat!("arbor/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Failure to retrieve a remote document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The client could not be built or the request could not be sent.
    #[error("request to {url} failed: {source}")]
    Request {
        /// URL that was requested.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("{url} answered with HTTP {status}")]
    Status {
        /// URL that was requested.
        url: String,
        /// Status code returned by the server.
        status: u16,
    },
}

/// Fetch a URL and return its body as text.
///
/// # Errors
///
/// Returns [`FetchError::Request`] if the client cannot be created, the request
/// fails or the body cannot be decoded, and [`FetchError::Status`] for any
/// non-success status.
pub fn fetch_text(url: &str) -> Result<String, FetchError> {
    let request_error = |source| FetchError::Request {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(request_error)?;

    let response = client.get(url).send().map_err(request_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().map_err(request_error)
}
