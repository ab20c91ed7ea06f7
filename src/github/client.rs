use std::collections::HashSet;

use serde::de::DeserializeOwned;

use super::{Error, HttpTransport, Response, Transport};
use crate::{
    domain::{PullRequest, PullRequestFile, RepoSlug},
    storage::AuditConfig,
};

const PAGE_SIZE: &str = "100";

/// A minimal GitHub REST client for reading pull requests.
#[derive(Debug, Clone)]
pub struct Client<T = HttpTransport> {
    transport: T,
    api_url: String,
}

impl Client<HttpTransport> {
    /// Creates a client for the API and token named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be built.
    pub fn new(config: &AuditConfig) -> Result<Self, Error> {
        Ok(Self::with_transport(
            HttpTransport::new(&config.token)?,
            config.api_url.clone(),
        ))
    }
}

impl<T: Transport> Client<T> {
    /// Creates a client sending requests through `transport`.
    #[must_use]
    pub fn with_transport(transport: T, api_url: impl Into<String>) -> Self {
        Self {
            transport,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetches every pull request of `repo`, open and closed, following
    /// `Link: rel="next"` until the last page.
    ///
    /// A pull request appearing on more than one page is kept once.
    ///
    /// # Errors
    ///
    /// Any failed or non-200 page fails the whole listing.
    pub fn pull_requests(&self, repo: &RepoSlug) -> Result<Vec<PullRequest>, Error> {
        let mut url = format!("{}/pulls", self.repo_url(repo));
        let mut query: &[(&str, &str)] = &[("state", "all"), ("per_page", PAGE_SIZE)];
        let mut visited = HashSet::new();
        let mut seen = HashSet::new();
        let mut pull_requests = Vec::new();

        loop {
            let response = self.get(&url, query)?;
            let page: Vec<PullRequest> = decode(&url, &response.body)?;
            tracing::debug!("Fetched {} pull requests from {url}", page.len());

            pull_requests.extend(page.into_iter().filter(|pr| seen.insert(pr.number)));
            visited.insert(url);

            match response.next {
                Some(next) if visited.contains(&next) => {
                    tracing::warn!("Pagination loops back to {next}; stopping");
                    break;
                }
                Some(next) => {
                    url = next;
                    query = &[];
                }
                None => break,
            }
        }

        Ok(pull_requests)
    }

    /// Fetches the changed files of one pull request.
    ///
    /// This is a single request: files beyond the first page are not
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not 200, or the
    /// body is not a file list.
    pub fn pull_request_files(
        &self,
        repo: &RepoSlug,
        number: u64,
    ) -> Result<Vec<PullRequestFile>, Error> {
        let url = format!("{}/pulls/{number}/files", self.repo_url(repo));
        let response = self.get(&url, &[("per_page", PAGE_SIZE)])?;
        decode(&url, &response.body)
    }

    fn repo_url(&self, repo: &RepoSlug) -> String {
        format!("{}/repos/{}/{}", self.api_url, repo.owner(), repo.name())
    }

    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response, Error> {
        let response = self.transport.get(url, query)?;
        if response.status != 200 {
            return Err(Error::Status {
                url: url.to_string(),
                status: response.status,
                body: response.body,
            });
        }
        Ok(response)
    }
}

fn decode<D: DeserializeOwned>(url: &str, body: &str) -> Result<D, Error> {
    serde_json::from_str(body).map_err(|source| Error::Decode {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{cell::RefCell, collections::HashMap};

    use super::*;

    /// Serves canned responses keyed by URL and records every request.
    #[derive(Debug, Default)]
    pub struct FakeTransport {
        responses: HashMap<String, Response>,
        pub requests: RefCell<Vec<(String, Vec<(String, String)>)>>,
    }

    impl FakeTransport {
        pub fn respond(mut self, url: &str, status: u16, body: &str, next: Option<&str>) -> Self {
            self.responses.insert(
                url.to_string(),
                Response {
                    status,
                    body: body.to_string(),
                    next: next.map(ToString::to_string),
                },
            );
            self
        }

        pub fn requested_urls(&self) -> Vec<String> {
            self.requests
                .borrow()
                .iter()
                .map(|(url, _)| url.clone())
                .collect()
        }
    }

    impl Transport for FakeTransport {
        fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response, Error> {
            self.requests.borrow_mut().push((
                url.to_string(),
                query
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            ));
            Ok(self.responses.get(url).cloned().unwrap_or(Response {
                status: 404,
                body: r#"{"message": "Not Found"}"#.to_string(),
                next: None,
            }))
        }
    }

    pub const API: &str = "https://api.test";
    pub const PULLS: &str = "https://api.test/repos/acme/infra/pulls";

    pub fn repo() -> RepoSlug {
        "acme/infra".parse().unwrap()
    }

    pub fn prs(numbers: &[u64]) -> String {
        let prs: Vec<_> = numbers
            .iter()
            .map(|n| PullRequest {
                number: *n,
                title: format!("Change {n}"),
            })
            .collect();
        serde_json::to_string(&prs).unwrap()
    }

    #[test]
    fn follows_next_links_until_exhausted() {
        let transport = FakeTransport::default()
            .respond(PULLS, 200, &prs(&[5, 4]), Some("https://api.test/pulls?page=2"))
            .respond("https://api.test/pulls?page=2", 200, &prs(&[3, 2]), Some("https://api.test/pulls?page=3"))
            .respond("https://api.test/pulls?page=3", 200, &prs(&[1]), None);
        let client = Client::with_transport(transport, API);

        let pull_requests = client.pull_requests(&repo()).unwrap();

        assert_eq!(
            pull_requests.iter().map(|pr| pr.number).collect::<Vec<_>>(),
            vec![5, 4, 3, 2, 1]
        );
        assert_eq!(
            client.transport.requested_urls(),
            vec![
                PULLS.to_string(),
                "https://api.test/pulls?page=2".to_string(),
                "https://api.test/pulls?page=3".to_string(),
            ]
        );
    }

    #[test]
    fn first_page_requests_all_states_and_full_pages() {
        let transport = FakeTransport::default().respond(PULLS, 200, "[]", None);
        let client = Client::with_transport(transport, API);

        client.pull_requests(&repo()).unwrap();

        let requests = client.transport.requests.borrow();
        assert_eq!(
            requests[0].1,
            vec![
                ("state".to_string(), "all".to_string()),
                ("per_page".to_string(), "100".to_string()),
            ]
        );
    }

    #[test]
    fn duplicates_across_pages_are_dropped() {
        let transport = FakeTransport::default()
            .respond(PULLS, 200, &prs(&[3, 2]), Some("https://api.test/pulls?page=2"))
            .respond("https://api.test/pulls?page=2", 200, &prs(&[2, 1]), None);
        let client = Client::with_transport(transport, API);

        let numbers: Vec<_> = client
            .pull_requests(&repo())
            .unwrap()
            .into_iter()
            .map(|pr| pr.number)
            .collect();

        assert_eq!(numbers, vec![3, 2, 1]);
    }

    #[test]
    fn self_referencing_next_link_terminates() {
        let transport = FakeTransport::default().respond(PULLS, 200, &prs(&[1]), Some(PULLS));
        let client = Client::with_transport(transport, API);

        assert_eq!(client.pull_requests(&repo()).unwrap().len(), 1);
        assert_eq!(client.transport.requested_urls().len(), 1);
    }

    #[test]
    fn failed_page_fails_listing() {
        let transport = FakeTransport::default()
            .respond(PULLS, 200, &prs(&[2]), Some("https://api.test/pulls?page=2"))
            .respond("https://api.test/pulls?page=2", 502, "Bad Gateway", None);
        let client = Client::with_transport(transport, API);

        match client.pull_requests(&repo()) {
            Err(Error::Status { status, body, .. }) => {
                assert_eq!(status, 502);
                assert_eq!(body, "Bad Gateway");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let transport = FakeTransport::default().respond(PULLS, 200, "{\"not\": \"a list\"}", None);
        let client = Client::with_transport(transport, API);

        assert!(matches!(
            client.pull_requests(&repo()),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn fetches_files_of_one_pull_request() {
        let transport = FakeTransport::default().respond(
            "https://api.test/repos/acme/infra/pulls/7/files",
            200,
            r#"[{"filename": "network.tf", "patch": "+resource \"aws_vpc\" \"x\" {}"}, {"filename": "logo.png"}]"#,
            None,
        );
        let client = Client::with_transport(transport, "https://api.test/");

        let files = client.pull_request_files(&repo(), 7).unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].filename, "network.tf");
        assert_eq!(files[1].patch, None);
    }
}
