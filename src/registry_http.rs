use crate::registry::{ProjectCheck, ProjectInfo, SearchQuery, SearchResponse, Version};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

pub struct HttpRegistryClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpRegistryClient {
    /// Create a client whose every request is bounded by `timeout`
    pub fn new(base_url: String, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            Error::Validation(format!("Invalid registry URL '{}': {}", self.base_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                Error::Validation(format!(
                    "Registry URL '{}' cannot be used as a base",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// GET a JSON document; non-success statuses yield `Ok(None)`
    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        log::debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().map_err(|e| {
            if e.is_connect() {
                Error::Other(format!(
                    "Cannot connect to registry at {}\n\
                        Please check your network connection and the registry URL.",
                    self.base_url
                ))
            } else if e.is_timeout() {
                Error::Other(format!("Registry request timed out: {}", url))
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            match status.as_u16() {
                404 => log::debug!("{} -> not found", url),
                429 => log::warn!("Registry rate limit reached while requesting {}", url),
                500 | 502 | 503 | 504 => log::warn!(
                    "Registry server error (HTTP {}) while requesting {}",
                    status.as_u16(),
                    url
                ),
                code => log::warn!("Registry error: HTTP {} for {}", code, url),
            }
            return Ok(None);
        }

        let payload = response
            .json()
            .map_err(|e| Error::Other(format!("Failed to parse registry response: {}", e)))?;

        Ok(Some(payload))
    }

    pub fn project_exists(&self, id: &str) -> Result<Option<ProjectCheck>> {
        let url = self.endpoint(&["v2", "project", id, "check"])?;
        self.get_json(url)
    }

    pub fn get_project(&self, id: &str) -> Result<Option<ProjectInfo>> {
        if self.project_exists(id)?.is_none() {
            return Ok(None);
        }

        let url = self.endpoint(&["v2", "project", id])?;
        self.get_json(url)
    }

    pub fn list_versions(
        &self,
        id: &str,
        loaders: Option<&[String]>,
        game_versions: Option<&[String]>,
    ) -> Result<Option<Vec<Version>>> {
        if self.project_exists(id)?.is_none() {
            return Ok(None);
        }

        let mut params = Vec::new();
        if let Some(loaders) = loaders {
            params.push(("loaders", serde_json::to_string(loaders)?));
        }
        if let Some(game_versions) = game_versions {
            params.push(("game_versions", serde_json::to_string(game_versions)?));
        }

        let url = self.endpoint(&["v2", "project", id, "version"])?;
        self.get_json(with_query(url, &params))
    }

    pub fn search(&self, query: &SearchQuery) -> Result<Option<SearchResponse>> {
        let mut params = Vec::new();
        // An empty query string is treated differently from no query by the registry
        if let Some(text) = query.query.as_deref().filter(|q| !q.is_empty()) {
            params.push(("query", text.to_string()));
        }
        if let Some(facets) = query.facets_json()? {
            params.push(("facets", facets));
        }
        if let Some(index) = query.index {
            params.push(("index", index.as_str().to_string()));
        }
        if let Some(offset) = query.offset {
            params.push(("offset", offset.to_string()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }

        let url = self.endpoint(&["v2", "search"])?;
        self.get_json(with_query(url, &params))
    }

    pub fn get_version(&self, version_id: &str) -> Result<Option<Version>> {
        let url = self.endpoint(&["v2", "version", version_id])?;
        self.get_json(url)
    }
}

fn with_query(mut url: Url, params: &[(&str, String)]) -> Url {
    if !params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
    }
    url
}
