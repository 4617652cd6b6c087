use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::ports::{RepositoryError, RepositoryResult};

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("todo-board/0.1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> RepositoryResult<Vec<T>> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    pub async fn post<T: DeserializeOwned, R: serde::Serialize>(
        &self,
        path: &str,
        body: &R,
    ) -> RepositoryResult<T> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    pub async fn put<T: DeserializeOwned, R: serde::Serialize>(
        &self,
        path: &str,
        body: &R,
    ) -> RepositoryResult<T> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .put(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    /// PUT with an empty body, for endpoints whose response carries nothing
    /// the caller needs.
    pub async fn put_empty(&self, path: &str) -> RepositoryResult<()> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .put(&url)
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        self.check_status(response).await?;
        Ok(())
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> RepositoryResult<T> {
        let response = self.check_status(response).await?;

        let response_text = response
            .text()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        tracing::debug!("API response: {}", response_text);

        serde_json::from_str(&response_text).map_err(|e| {
            RepositoryError::Serialization(format!(
                "Failed to parse response: {}. Response was: {}",
                e, response_text
            ))
        })
    }

    async fn check_status(&self, response: Response) -> RepositoryResult<Response> {
        let status = response.status();

        match status.as_u16() {
            200..=299 => Ok(response),
            404 => Err(RepositoryError::NotFound("Resource not found".to_string())),
            _ => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(RepositoryError::Api(format!("HTTP {status}: {error_text}")))
            }
        }
    }
}
