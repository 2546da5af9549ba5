//! HTTP client for the Harbor v1 API.
//!
//! One `reqwest::Client` is built at construction and shared by every call.
//! Credentials are encoded once and attached to each request.

use std::collections::HashSet;
use std::hash::Hash;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tagsweep_core::{sort_by_creation, SortedTags, Tag, Validate};
use tracing::{debug, warn};

use crate::api::{ProjectId, ProjectRecord, RegistryApi, RepositoryRecord};
use crate::config::{RegistryAuth, RegistryConfig};
use crate::error::{describe_transport, RegistryError};

/// Longest error body excerpt carried into an error message.
const MAX_ERROR_BODY: usize = 200;

/// Paging hints carried by a listing response.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct PageInfo {
    /// `X-Total-Count`: items across all pages.
    total: Option<usize>,
    /// Whether the `Link` header names a next page; `None` without a `Link` header.
    has_next: Option<bool>,
}

impl PageInfo {
    fn from_headers(headers: &HeaderMap) -> Self {
        let total = headers
            .get("x-total-count")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        // Link: </api/repositories?page=2&page_size=10>; rel="next", <...>; rel="prev"
        let has_next = headers
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(|link| link.split(',').any(|part| part.contains("rel=\"next\"")));
        Self { total, has_next }
    }
}

/// Client for a Harbor registry.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    config: RegistryConfig,
    http: reqwest::Client,
}

impl RegistryClient {
    /// Creates a new registry client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the credentials
    /// cannot be encoded, or the HTTP client cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tagsweep_registry::{RegistryAuth, RegistryClient, RegistryConfig};
    ///
    /// let config = RegistryConfig::new("https://harbor.example.com")
    ///     .with_auth(RegistryAuth::basic("admin", "secret"));
    /// let client = RegistryClient::new(config)?;
    /// # Ok::<(), tagsweep_registry::RegistryError>(())
    /// ```
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        config.validate()?;
        let http = Self::build_http_client(&config)?;
        Ok(Self { config, http })
    }

    /// Builds the HTTP client with timeouts, default headers and TLS.
    fn build_http_client(config: &RegistryConfig) -> Result<reqwest::Client, RegistryError> {
        let mut headers = Self::auth_headers(&config.auth)?;
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers);

        if let Some(ref tls) = config.tls {
            if tls.insecure_skip_verify {
                warn!(url = %config.url, "TLS certificate verification disabled");
                builder = builder.danger_accept_invalid_certs(true);
            }

            if let Some(ref ca_cert) = tls.ca_cert {
                let pem = std::fs::read(ca_cert).map_err(|e| RegistryError::Io {
                    path: ca_cert.clone(),
                    source: e,
                })?;
                let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| RegistryError::Tls {
                    message: format!("invalid CA certificate {}: {e}", ca_cert.display()),
                })?;
                builder = builder.add_root_certificate(cert);
            }
        }

        builder.build().map_err(|e| RegistryError::ConnectionFailed {
            url: config.url.clone(),
            source: e,
        })
    }

    /// Encodes the configured credentials as request headers.
    fn auth_headers(auth: &RegistryAuth) -> Result<HeaderMap, RegistryError> {
        let mut headers = HeaderMap::new();

        if let RegistryAuth::Basic { username, password } = auth {
            let credentials = base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                format!("{username}:{password}"),
            );
            let mut value = HeaderValue::from_str(&format!("Basic {credentials}")).map_err(|_| {
                RegistryError::AuthenticationFailed {
                    message: "credentials cannot be encoded as a header".to_string(),
                }
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.url)
    }

    /// Sends a GET request and decodes a JSON body that may be `null`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<(Option<T>, PageInfo), RegistryError> {
        let response = request
            .send()
            .await
            .map_err(|e| RegistryError::protocol(operation, describe_transport(&e)))?;

        let response = Self::check_status(response)
            .await
            .map_err(|message| RegistryError::protocol(operation, message))?;

        let info = PageInfo::from_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| RegistryError::protocol(operation, describe_transport(&e)))?;

        let decoded = serde_json::from_slice(&body).map_err(|e| {
            RegistryError::protocol(operation, format!("undecodable response body: {e}"))
        })?;
        Ok((decoded, info))
    }

    /// Walks a paginated listing.
    ///
    /// Stops on an empty page, once `X-Total-Count` items are collected, when
    /// the `Link` header has no next page, when a page adds nothing new, or as
    /// soon as `found` matches an item. A short page alone does not end the
    /// walk: the registry may cap `page_size` below the requested value.
    /// Returns `None` if the first page is `null`.
    async fn get_pages<T, K>(
        &self,
        operation: &str,
        path: &str,
        params: &[(&str, String)],
        key: impl Fn(&T) -> K + Send,
        found: impl Fn(&T) -> bool + Send,
    ) -> Result<Option<Vec<T>>, RegistryError>
    where
        T: DeserializeOwned + Send,
        K: Eq + Hash + Send,
    {
        let page_size = self.config.page_size.to_string();
        let mut items = Vec::new();
        let mut seen = HashSet::new();

        for page in 1u32.. {
            let request = self
                .http
                .get(self.url(path))
                .query(params)
                .query(&[("page", page.to_string()), ("page_size", page_size.clone())]);
            let (batch, info) = self.get_json::<Vec<T>>(operation, request).await?;

            let Some(batch) = batch else {
                if page == 1 {
                    return Ok(None);
                }
                break;
            };

            let received = batch.len();
            let before = items.len();
            let mut done = false;
            for item in batch {
                done |= found(&item);
                if seen.insert(key(&item)) {
                    items.push(item);
                }
            }
            debug!(operation, page, received, total = ?info.total, "Fetched listing page");

            if done || received == 0 {
                break;
            }
            let complete = info.total.is_some_and(|total| items.len() >= total);
            if complete || info.has_next == Some(false) {
                break;
            }
            if items.len() == before {
                warn!(operation, page, "Registry repeated a listing page, stopping pagination");
                break;
            }
        }

        Ok(Some(items))
    }

    /// Passes 2xx responses through; otherwise describes the failure.
    async fn check_status(response: Response) -> Result<Response, String> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let body = body.trim();
        if body.is_empty() {
            Err(format!("HTTP {status}"))
        } else {
            let excerpt: String = body.chars().take(MAX_ERROR_BODY).collect();
            Err(format!("HTTP {status}: {excerpt}"))
        }
    }
}

#[async_trait]
impl RegistryApi for RegistryClient {
    async fn resolve_project_id(&self, name: &str) -> Result<ProjectId, RegistryError> {
        let operation = format!("resolve project {name}");
        debug!(project = name, "Resolving project");

        let projects = self
            .get_pages(
                &operation,
                "/api/projects",
                &[("name", name.to_string())],
                |p: &ProjectRecord| p.project_id,
                |p: &ProjectRecord| p.name == name,
            )
            .await?;

        let Some(projects) = projects else {
            return Err(RegistryError::protocol(
                operation,
                "registry returned a null project listing",
            ));
        };

        // The name filter is a substring match on the server side.
        projects
            .into_iter()
            .find(|p| p.name == name)
            .map(|p| p.project_id)
            .ok_or_else(|| RegistryError::ProjectNotFound {
                name: name.to_string(),
            })
    }

    async fn list_repositories(&self, project: ProjectId) -> Result<Vec<String>, RegistryError> {
        let operation = format!("list repositories of project {project}");
        let records = self
            .get_pages(
                &operation,
                "/api/repositories",
                &[("project_id", project.to_string())],
                |r: &RepositoryRecord| r.name.clone(),
                |_| false,
            )
            .await?
            .unwrap_or_default();

        Ok(records.into_iter().map(|r| r.name).collect())
    }

    async fn list_tags(&self, repository: &str) -> Result<SortedTags, RegistryError> {
        let operation = format!("list tags of {repository}");
        let request = self
            .http
            .get(self.url(&format!("/api/repositories/{repository}/tags")));

        let (tags, _) = self.get_json::<Vec<Tag>>(&operation, request).await?;
        let tags = tags.unwrap_or_default();
        debug!(repository, count = tags.len(), "Fetched tags");

        sort_by_creation(tags).map_err(|source| RegistryError::Ordering {
            repository: repository.to_string(),
            source,
        })
    }

    async fn delete_tag(&self, repository: &str, tag: &str) -> Result<(), RegistryError> {
        let delete_failed = |reason: String| RegistryError::DeleteFailed {
            repository: repository.to_string(),
            tag: tag.to_string(),
            reason,
        };

        let response = self
            .http
            .delete(self.url(&format!("/api/repositories/{repository}/tags/{tag}")))
            .send()
            .await
            .map_err(|e| delete_failed(describe_transport(&e)))?;

        Self::check_status(response).await.map_err(delete_failed)?;
        debug!(repository, tag, "Deleted tag");
        Ok(())
    }
}
