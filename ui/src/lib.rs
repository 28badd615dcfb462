//! Web front-end for document question answering.
//!
//! Serves a single page where a user uploads a PDF for indexing and then asks
//! questions about it. All retrieval and generation happens in the backend,
//! reached through [`rag_client::BackendClient`].

pub mod render;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;

pub use routes::build_router;
pub use state::AppState;
