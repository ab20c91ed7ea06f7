use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK};

use super::{Error, link::next_url};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const GITHUB_JSON: &str = "application/vnd.github.v3+json";

/// A response from the REST API, reduced to what the client reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
    /// The `rel="next"` target of the `Link` header, if any.
    pub next: Option<String>,
}

/// Sends authenticated `GET` requests.
///
/// [`HttpTransport`] is the real implementation; tests substitute canned
/// responses.
pub trait Transport {
    /// Performs `GET url` with `query` appended to the URL.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received. Non-success
    /// statuses are returned as a [`Response`].
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response, Error>;
}

/// Blocking HTTP transport carrying a bearer token.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Builds a transport that authenticates every request with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client cannot be initialised.
    pub fn new(token: &str) -> Result<Self, Error> {
        let mut authorization =
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| Error::InvalidToken)?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));

        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(Error::Build)?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response, Error> {
        let request_error = |source| Error::Request {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(request_error)?;

        let status = response.status().as_u16();
        let next = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_url);
        let body = response.text().map_err(request_error)?;

        tracing::trace!("GET {url} -> {status}");

        Ok(Response { status, body, next })
    }
}
