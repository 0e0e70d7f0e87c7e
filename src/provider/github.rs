//! GitHub Gist provider over the REST API.

use crate::config::GitHubSettings;
use crate::error::ApiError;
use crate::provider::StorageProvider;
use crate::types::{BlockSummary, FileContent, StorageBlock};
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

const USER_AGENT: &str = concat!("blockpad/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
enum Credentials {
    Token(String),
    Basic { username: String, password: String },
}

#[derive(Debug, Deserialize)]
struct GistFile {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    raw_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Gist {
    id: String,
    url: String,
    html_url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    public: bool,
    #[serde(default)]
    files: IndexMap<String, GistFile>,
}

impl Gist {
    fn into_block(self) -> StorageBlock {
        let files = self
            .files
            .into_iter()
            .map(|(name, file)| {
                (
                    name,
                    FileContent {
                        content: file.content.unwrap_or_default(),
                        raw_url: file.raw_url,
                    },
                )
            })
            .collect();
        StorageBlock {
            id: self.id,
            description: self.description.unwrap_or_default(),
            is_private: !self.public,
            html_url: self.html_url,
            files,
        }
    }

    fn summary(&self) -> BlockSummary {
        BlockSummary {
            id: self.id.clone(),
            url: self.url.clone(),
            description: self.description.clone().unwrap_or_default(),
            is_private: !self.public,
            file_count: self.files.len(),
        }
    }
}

/// Gist-backed provider.
pub struct GitHubProvider {
    client: Client,
    api_url: String,
    credentials: RwLock<Option<Credentials>>,
}

impl GitHubProvider {
    pub const NAME: &'static str = "github";

    pub fn new(api_url: &str, token: Option<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            credentials: RwLock::new(token.filter(|t| !t.is_empty()).map(Credentials::Token)),
        })
    }

    pub fn from_settings(settings: &GitHubSettings) -> Result<Self, ApiError> {
        Self::new(&settings.api_url, settings.token.clone())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    fn gist_endpoint(&self, block_id: &str) -> String {
        self.endpoint(&format!("gists/{}", block_id))
    }

    fn star_endpoint(&self, block_id: &str) -> String {
        self.endpoint(&format!("gists/{}/star", block_id))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/vnd.github+json");
        match self.credentials.read().clone() {
            Some(Credentials::Token(token)) => builder.bearer_auth(token),
            Some(Credentials::Basic { username, password }) => {
                builder.basic_auth(username, Some(password))
            }
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| status.to_string());
        tracing::warn!(%status, what, "GitHub request failed: {}", message);

        Err(match status {
            StatusCode::UNAUTHORIZED => ApiError::AuthError(message),
            StatusCode::NOT_FOUND => {
                ApiError::ProviderError(format!("Failed to {}: unknown code block", what))
            }
            _ => ApiError::ProviderError(format!("Failed to {}: {}", what, message)),
        })
    }

    async fn patch_gist(&self, block_id: &str, body: Value, what: &str) -> Result<(), ApiError> {
        let builder = self
            .request(Method::PATCH, &self.gist_endpoint(block_id))
            .json(&body);
        self.send(builder, what).await?;
        Ok(())
    }
}

fn edit_file_body(file_name: &str, content: &str) -> Value {
    json!({ "files": { file_name: { "content": content } } })
}

fn remove_file_body(file_name: &str) -> Value {
    json!({ "files": { file_name: Value::Null } })
}

fn create_body(file_name: &str, description: &str, content: &str, is_private: bool) -> Value {
    json!({
        "description": description,
        "public": !is_private,
        "files": { file_name: { "content": content } },
    })
}

#[async_trait]
impl StorageProvider for GitHubProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn is_authenticated(&self) -> bool {
        self.credentials.read().is_some()
    }

    async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let builder = self
            .client
            .get(self.endpoint("user"))
            .header("Accept", "application/vnd.github+json")
            .basic_auth(username, Some(password));
        match self.send(builder, "log in").await {
            Ok(_) => {
                *self.credentials.write() = Some(Credentials::Basic {
                    username: username.to_string(),
                    password: password.to_string(),
                });
                tracing::info!(username, "Logged in to GitHub");
                Ok(())
            }
            Err(ApiError::AuthError(message)) => Err(ApiError::AuthError(format!(
                "GitHub rejected the credentials for {}: {}",
                username, message
            ))),
            Err(e) => Err(e),
        }
    }

    async fn list(&self, favorite_only: bool) -> Result<Vec<BlockSummary>, ApiError> {
        let path = if favorite_only {
            "gists/starred"
        } else {
            "gists"
        };
        let builder = self
            .request(Method::GET, &self.endpoint(path))
            .query(&[("per_page", "100")]);
        let gists: Vec<Gist> = self.send(builder, "list gists").await?.json().await?;
        Ok(gists.iter().map(Gist::summary).collect())
    }

    async fn get_storage_block(&self, url: &str) -> Result<StorageBlock, ApiError> {
        let builder = self.request(Method::GET, url);
        let gist: Gist = self.send(builder, "fetch gist").await?.json().await?;
        Ok(gist.into_block())
    }

    async fn get_storage_block_by_id(&self, id: &str) -> Result<StorageBlock, ApiError> {
        let url = self.gist_endpoint(id);
        self.get_storage_block(&url).await
    }

    async fn create_file(
        &self,
        file_name: &str,
        description: &str,
        content: &str,
        is_private: bool,
    ) -> Result<StorageBlock, ApiError> {
        let builder = self
            .request(Method::POST, &self.endpoint("gists"))
            .json(&create_body(file_name, description, content, is_private));
        let gist: Gist = self.send(builder, "create gist").await?.json().await?;
        tracing::info!(block_id = %gist.id, file_name, "Created gist");
        Ok(gist.into_block())
    }

    async fn edit_file(
        &self,
        block_id: &str,
        file_name: &str,
        content: &str,
    ) -> Result<(), ApiError> {
        self.patch_gist(block_id, edit_file_body(file_name, content), "update gist file")
            .await
    }

    async fn remove_file_from_storage_block(
        &self,
        block_id: &str,
        file_name: &str,
    ) -> Result<(), ApiError> {
        self.patch_gist(block_id, remove_file_body(file_name), "remove gist file")
            .await
    }

    async fn delete_storage_block(&self, block_id: &str) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, &self.gist_endpoint(block_id));
        self.send(builder, "delete gist").await?;
        tracing::info!(block_id, "Deleted gist");
        Ok(())
    }

    async fn change_description(
        &self,
        block_id: &str,
        description: &str,
    ) -> Result<(), ApiError> {
        self.patch_gist(
            block_id,
            json!({ "description": description }),
            "change gist description",
        )
        .await
    }

    async fn set_starred(&self, block_id: &str, starred: bool) -> Result<(), ApiError> {
        let (method, what) = if starred {
            (Method::PUT, "star gist")
        } else {
            (Method::DELETE, "unstar gist")
        };
        let builder = self
            .request(method, &self.star_endpoint(block_id))
            .header("Content-Length", "0");
        self.send(builder, what).await?;
        tracing::info!(block_id, starred, "Updated gist star");
        Ok(())
    }
}
