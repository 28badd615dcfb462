use crate::config::BackendConfig;
use crate::error::ClientError;
use crate::JsonMap;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::Value;
use std::error::Error as _;

/// Thin client over the indexing backend's `/upload` and `/query` endpoints.
///
/// Each call is a single request: no retries, no caching. Any non-2xx status,
/// transport failure or non-object JSON body comes back as a [`ClientError`].
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    config: BackendConfig,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Sends a PDF as the multipart field `file` to `POST <base>/upload`.
    pub async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<JsonMap, ClientError> {
        let url = self.config.endpoint("upload");
        log::info!("Uploading {} ({} bytes) to {}", filename, bytes.len(), url);

        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("application/pdf")
            .map_err(|e| ClientError::transport(&url, e))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(self.config.upload_timeout())
            .send()
            .await
            .map_err(|e| ClientError::transport(&url, e))?;

        read_json_object(&url, response).await
    }

    /// Asks `GET <base>/query?question=...`.
    pub async fn query(&self, question: &str) -> Result<JsonMap, ClientError> {
        let url = self.config.endpoint("query");
        log::info!("Querying {} with a {} character question", url, question.chars().count());

        let response = self
            .client
            .get(&url)
            .query(&[("question", question)])
            .timeout(self.config.query_timeout())
            .send()
            .await
            .map_err(|e| ClientError::transport(&url, e))?;

        read_json_object(&url, response).await
    }
}

async fn read_json_object(url: &str, response: Response) -> Result<JsonMap, ClientError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log::warn!("Backend answered {} for {}", status, url);
        return Err(ClientError::Status {
            status,
            url: url.to_string(),
            body,
        });
    }

    let value: Value = response.json().await.map_err(|e| {
        if e.is_decode() {
            ClientError::Malformed {
                url: url.to_string(),
                reason: e.source().map_or_else(|| e.to_string(), |cause| cause.to_string()),
            }
        } else {
            ClientError::transport(url, e)
        }
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ClientError::Malformed {
            url: url.to_string(),
            reason: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
