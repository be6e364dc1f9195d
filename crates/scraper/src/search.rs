use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::ScrapeError;
use crate::record::{RepoRecord, SearchItem};

pub const GITHUB_API: &str = "https://api.github.com";
pub const MAX_PER_PAGE: usize = 100;

const USER_AGENT: &str = "repo-tidy/0.1 (https://github.com/Hydepwns/repo-tidy)";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

/// Repository search against the GitHub REST API, most-starred first.
pub struct SearchClient {
    client: Client,
    token: String,
    base_url: String,
}

impl SearchClient {
    pub fn new(token: impl Into<String>) -> Result<Self, ScrapeError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ScrapeError::MissingToken);
        }

        Ok(Self {
            client: Client::builder().user_agent(USER_AGENT).build()?,
            token,
            base_url: GITHUB_API.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// One page of results. `limit` is clamped to what a single page holds.
    pub fn search(&self, keyword: &str, limit: usize) -> Result<Vec<RepoRecord>, ScrapeError> {
        let per_page = limit.clamp(1, MAX_PER_PAGE);
        let url = format!(
            "{}/search/repositories?q={}&sort=stars&order=desc&per_page={}",
            self.base_url,
            urlencoding::encode(keyword),
            per_page
        );
        tracing::debug!(%url, "searching repositories");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .header("Authorization", format!("token {}", self.token))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ScrapeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let data: SearchResponse = response.json()?;
        Ok(data
            .items
            .unwrap_or_default()
            .into_iter()
            .map(RepoRecord::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const BODY: &str = r#"{
        "total_count": 2,
        "items": [
            {
                "name": "ripgrep",
                "full_name": "BurntSushi/ripgrep",
                "description": "ripgrep recursively searches directories",
                "language": "Rust",
                "created_at": "2016-03-11T02:02:33Z",
                "clone_url": "https://github.com/BurntSushi/ripgrep.git",
                "stargazers_count": 48000,
                "forks_count": 2000
            },
            {
                "name": "empty",
                "full_name": "someone/empty",
                "description": null,
                "language": null,
                "created_at": "2020-01-01T00:00:00Z",
                "clone_url": "https://github.com/someone/empty.git",
                "stargazers_count": 3
            }
        ]
    }"#;

    fn client(server: &mockito::Server) -> SearchClient {
        SearchClient::new("secret").unwrap().with_base_url(server.url())
    }

    #[test]
    fn search_returns_records_in_response_order() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/search/repositories")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "grep tool".into()),
                Matcher::UrlEncoded("sort".into(), "stars".into()),
                Matcher::UrlEncoded("order".into(), "desc".into()),
                Matcher::UrlEncoded("per_page".into(), "10".into()),
            ]))
            .match_header("authorization", "token secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BODY)
            .create();

        let records = client(&server).search("grep tool", 10).unwrap();

        mock.assert();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].full_name, "BurntSushi/ripgrep");
        assert_eq!(records[0].stars, 48000);
        assert_eq!(records[1].description, "");
        assert_eq!(records[1].language, None);
    }

    #[test]
    fn limit_is_clamped_to_one_page() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/search/repositories")
            .match_query(Matcher::UrlEncoded("per_page".into(), "100".into()))
            .with_status(200)
            .with_body(r#"{"items": []}"#)
            .create();

        let records = client(&server).search("x", 500).unwrap();

        mock.assert();
        assert!(records.is_empty());
    }

    #[test]
    fn missing_items_means_no_results() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/search/repositories")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"total_count": 0}"#)
            .create();

        assert!(client(&server).search("nothing", 5).unwrap().is_empty());
    }

    #[test]
    fn non_success_status_is_an_api_error() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/search/repositories")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("API rate limit exceeded")
            .create();

        match client(&server).search("rust", 10) {
            Err(ScrapeError::Api { status, body }) => {
                assert_eq!(status, 403);
                assert_eq!(body, "API rate limit exceeded");
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[test]
    fn empty_token_is_rejected() {
        assert!(matches!(
            SearchClient::new("  "),
            Err(ScrapeError::MissingToken)
        ));
    }
}
