//! HTTP client for the document question-answering backend.
//!
//! The backend indexes an uploaded PDF (`POST /upload`) and answers questions
//! about it (`GET /query`). Both calls return a JSON object which is handed back
//! untouched; interpreting the fields is up to the caller.

pub mod backend_client;
pub mod config;
pub mod error;

pub use backend_client::BackendClient;
pub use config::{BackendConfig, DEFAULT_BACKEND_URL};
pub use error::ClientError;

/// A JSON object as returned by the backend.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
