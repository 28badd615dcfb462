//! Router and handlers: one route per user action, each redirecting back to `/`.

use crate::render::{render_page, PageView};
use crate::session::SessionState;
use crate::state::{AppState, SharedState};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::response::{Html, Redirect};
use axum::routing::{get, post};
use axum::{Form, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

pub const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/", get(index))
        .route(
            "/upload",
            post(process_pdf).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/ask", post(ask))
        .route("/clear", post(clear_session))
        .with_state(shared)
}

pub async fn index(State(state): State<SharedState>, jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, session) = state.sessions.resolve(jar).await;
    let mut session = session.state().await;
    let notices = session.take_notices();

    let html = render_page(&PageView {
        backend_url: state.client.config().base_url(),
        session: &session,
        notices: &notices,
    });
    (jar, Html(html))
}

struct SelectedFile {
    filename: String,
    bytes: Vec<u8>,
}

// Browsers send an empty `file` part with no filename when nothing was picked.
async fn read_selected_file(multipart: &mut Multipart) -> Result<Option<SelectedFile>, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        if !SessionState::can_process(Some(&filename)) {
            return Ok(None);
        }
        let bytes = field.bytes().await.map_err(|e| e.to_string())?;
        return Ok(Some(SelectedFile {
            filename,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

pub async fn process_pdf(
    State(state): State<SharedState>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> (CookieJar, Redirect) {
    let (jar, session) = state.sessions.resolve(jar).await;
    let _action = session.begin_action().await;

    match read_selected_file(&mut multipart).await {
        Ok(Some(file)) if !file.filename.to_lowercase().ends_with(".pdf") => {
            let reason = format!("{} is not a PDF file", file.filename);
            session.state().await.reject_upload(reason);
        }
        Ok(Some(file)) => {
            let result = state.client.upload(file.bytes, &file.filename).await;
            session.state().await.record_upload(result);
        }
        Ok(None) => log::debug!("Process PDF without a selected file, ignoring"),
        Err(reason) => session.state().await.reject_upload(reason),
    }

    (jar, Redirect::to("/"))
}

#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub question: String,
}

pub async fn ask(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<AskForm>,
) -> (CookieJar, Redirect) {
    let (jar, session) = state.sessions.resolve(jar).await;
    let _action = session.begin_action().await;

    let enabled = {
        let mut current = session.state().await;
        current.set_question_draft(&form.question);
        current.can_ask(&form.question)
    };

    if enabled {
        let result = state.client.query(form.question.trim()).await;
        session.state().await.record_answer(&form.question, result);
    } else {
        log::debug!("Ask while disabled, ignoring");
    }

    (jar, Redirect::to("/"))
}

pub async fn clear_session(State(state): State<SharedState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let (jar, session) = state.sessions.resolve(jar).await;
    let _action = session.begin_action().await;
    session.state().await.clear();
    log::info!("Session cleared");

    (jar, Redirect::to("/"))
}
