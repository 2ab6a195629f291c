//! Appwrite-style REST client for the routine collection.

use crate::config::StoreConfig;
use crate::error::{ClassbellError, Result};
use crate::routine::{Routine, RoutineFields};
use crate::store::DocumentStore;
use crate::store::document::{DocumentData, ListDocumentsResponse, RoutineDocument};
use async_trait::async_trait;

/// REST client for one routine collection.
pub struct StoreClient {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
    api_key: Option<String>,
    database_id: String,
    collection_id: String,
}

impl StoreClient {
    /// Build a client from store settings.
    #[must_use]
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_owned(),
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
            database_id: config.database_id.clone(),
            collection_id: config.collection_id.clone(),
        }
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint, self.database_id, self.collection_id
        )
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/{}", self.documents_url(), id)
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, url)
            .header("X-Appwrite-Project", &self.project_id);
        if let Some(key) = &self.api_key {
            builder = builder.header("X-Appwrite-Key", key);
        }
        builder
    }

    async fn check(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(ClassbellError::Store(format!(
            "{action} failed ({status}): {body}"
        )))
    }
}

#[async_trait]
impl DocumentStore for StoreClient {
    async fn list(&self) -> Result<Vec<Routine>> {
        let response = self
            .request(reqwest::Method::GET, self.documents_url())
            .send()
            .await
            .map_err(|e| ClassbellError::Store(e.to_string()))?;
        let response = Self::check(response, "list").await?;
        let parsed: ListDocumentsResponse = response
            .json()
            .await
            .map_err(|e| ClassbellError::Store(format!("malformed list response: {e}")))?;
        Ok(parsed.documents.into_iter().map(Routine::from).collect())
    }

    async fn create(&self, fields: &RoutineFields) -> Result<Routine> {
        let body = serde_json::json!({
            // The store mints the identifier.
            "documentId": "unique()",
            "data": DocumentData::from(fields),
        });
        let response = self
            .request(reqwest::Method::POST, self.documents_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| ClassbellError::Store(e.to_string()))?;
        let response = Self::check(response, "create").await?;
        let doc: RoutineDocument = response
            .json()
            .await
            .map_err(|e| ClassbellError::Store(format!("malformed create response: {e}")))?;
        Ok(Routine::from(doc))
    }

    async fn update(&self, id: &str, fields: &RoutineFields) -> Result<Routine> {
        let body = serde_json::json!({ "data": DocumentData::from(fields) });
        let response = self
            .request(reqwest::Method::PATCH, self.document_url(id))
            .json(&body)
            .send()
            .await
            .map_err(|e| ClassbellError::Store(e.to_string()))?;
        let response = Self::check(response, "update").await?;
        let doc: RoutineDocument = response
            .json()
            .await
            .map_err(|e| ClassbellError::Store(format!("malformed update response: {e}")))?;
        Ok(Routine::from(doc))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .request(reqwest::Method::DELETE, self.document_url(id))
            .send()
            .await
            .map_err(|e| ClassbellError::Store(e.to_string()))?;
        Self::check(response, "delete").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_config() {
        let client = StoreClient::new(&StoreConfig {
            endpoint: "https://store.example.test/v1/".to_owned(),
            project_id: "proj".to_owned(),
            api_key: None,
            database_id: "db".to_owned(),
            collection_id: "routines".to_owned(),
        });
        assert_eq!(
            client.documents_url(),
            "https://store.example.test/v1/databases/db/collections/routines/documents"
        );
        assert_eq!(
            client.document_url("doc-1"),
            "https://store.example.test/v1/databases/db/collections/routines/documents/doc-1"
        );
    }
}
