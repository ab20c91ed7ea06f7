mod auditor;
mod client;
mod link;
mod transport;

pub use auditor::{AuditReport, Auditor, FlaggedFile, PullRequestReport};
pub use client::Client;
pub use link::next_url;
pub use transport::{HttpTransport, Response, Transport};

/// Errors talking to the GitHub REST API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The access token cannot be sent as an HTTP header.
    #[error("access token contains characters that are not allowed in an HTTP header")]
    InvalidToken,

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Build(#[source] reqwest::Error),

    /// The request could not be sent or its body could not be read.
    #[error("request to {url} failed")]
    Request {
        /// The requested URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with something other than `200 OK`.
    #[error("GET {url} returned {status}: {body}")]
    Status {
        /// The requested URL.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// The response body, usually a JSON error message.
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("unexpected response body from {url}")]
    Decode {
        /// The requested URL.
        url: String,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },
}
