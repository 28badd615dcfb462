//! Per-browser session state and the rules for updating it.
//!
//! Every action either succeeds and updates the state, or fails and only
//! queues a notice. There is no partial update.

use rag_client::{ClientError, JsonMap};
use serde_json::Value;

/// One recorded question/answer exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub question: String,
    pub filter: JsonMap,
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Page section a notice belongs to, so it can be shown next to its control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Upload,
    Ask,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub section: Section,
    pub message: String,
}

impl Notice {
    fn success(section: Section, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            section,
            message: message.into(),
        }
    }

    fn error(section: Section, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            section,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pdf_uploaded: bool,
    last_stats: Option<JsonMap>,
    history: Vec<Turn>,
    question_draft: String,
    notices: Vec<Notice>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops everything, back to a freshly initialized session.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn pdf_uploaded(&self) -> bool {
        self.pdf_uploaded
    }

    pub fn last_stats(&self) -> Option<&JsonMap> {
        self.last_stats.as_ref()
    }

    /// Turns in the order they were asked.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn turns_latest_first(&self) -> impl Iterator<Item = &Turn> {
        self.history.iter().rev()
    }

    pub fn question_draft(&self) -> &str {
        &self.question_draft
    }

    pub fn set_question_draft(&mut self, question: &str) {
        self.question_draft = question.to_string();
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn can_process(filename: Option<&str>) -> bool {
        filename.is_some_and(|name| !name.is_empty())
    }

    pub fn can_ask(&self, question: &str) -> bool {
        self.pdf_uploaded && !question.trim().is_empty()
    }

    pub fn reject_upload(&mut self, reason: impl std::fmt::Display) {
        log::warn!("Upload rejected: {}", reason);
        self.notices
            .push(Notice::error(Section::Upload, format!("Upload failed: {reason}")));
    }

    pub fn record_upload(&mut self, result: Result<JsonMap, ClientError>) {
        match result {
            Ok(response) => {
                self.pdf_uploaded = true;
                self.last_stats = stats_from_upload(response);
                log::info!("Document indexed, stats: {:?}", self.last_stats);
                self.notices
                    .push(Notice::success(Section::Upload, "PDF processed successfully."));
            }
            Err(e) => {
                log::warn!("Upload failed: {}", e);
                self.notices
                    .push(Notice::error(Section::Upload, format!("Upload failed: {e}")));
            }
        }
    }

    /// `question` is the text as typed; it only serves as a fallback when the
    /// backend does not echo a `query`.
    pub fn record_answer(&mut self, question: &str, result: Result<JsonMap, ClientError>) {
        match result {
            Ok(response) => {
                let turn = turn_from_response(question, response);
                log::info!("Answer received ({} chars)", turn.answer.chars().count());
                self.history.push(turn);
            }
            Err(e) => {
                log::warn!("Query failed: {}", e);
                self.notices
                    .push(Notice::error(Section::Ask, format!("Query failed: {e}")));
            }
        }
    }

    /// "Indexed — Texts: …" once a document with non-empty stats is indexed.
    pub fn status_line(&self) -> Option<String> {
        let stats = self.last_stats.as_ref().filter(|s| !s.is_empty())?;
        if !self.pdf_uploaded {
            return None;
        }

        Some(format!(
            "Indexed — Texts: {}, Tables: {}, Images: {}.",
            stat_value(stats, "texts"),
            stat_value(stats, "tables"),
            stat_value(stats, "images"),
        ))
    }
}

// A missing `stats` key means the whole body is the stats mapping.
fn stats_from_upload(mut response: JsonMap) -> Option<JsonMap> {
    match response.remove("stats") {
        None => Some(response),
        Some(Value::Object(stats)) => Some(stats),
        Some(Value::Null) => None,
        Some(other) => {
            log::warn!("Ignoring non-object stats in upload response: {}", other);
            None
        }
    }
}

fn turn_from_response(question: &str, mut response: JsonMap) -> Turn {
    let question = match response.remove("query") {
        None | Some(Value::Null) => question.to_string(),
        Some(value) => display_value(&value),
    };

    let filter = match response.remove("filter") {
        Some(Value::Object(filter)) => filter,
        _ => JsonMap::new(),
    };

    let answer = match response.remove("answer") {
        None | Some(Value::Null) => String::new(),
        Some(value) => display_value(&value),
    };

    Turn {
        question,
        filter,
        answer,
    }
}

fn stat_value(stats: &JsonMap, key: &str) -> String {
    match stats.get(key) {
        None | Some(Value::Null) => "?".to_string(),
        Some(value) => display_value(value),
    }
}

/// Strings verbatim, everything else as JSON text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> JsonMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn backend_down() -> ClientError {
        ClientError::Malformed {
            url: "http://127.0.0.1:8000/query".to_string(),
            reason: "expected value at line 1 column 1".to_string(),
        }
    }

    #[test]
    fn starts_empty() {
        let session = SessionState::new();
        assert!(!session.pdf_uploaded());
        assert!(session.last_stats().is_none());
        assert!(session.history().is_empty());
        assert!(session.status_line().is_none());
    }

    #[test]
    fn ask_needs_upload_and_non_blank_question() {
        let mut session = SessionState::new();
        assert!(!session.can_ask("What is X?"));

        session.record_upload(Ok(map(json!({"stats": {"texts": 1}}))));
        assert!(session.can_ask("What is X?"));
        assert!(!session.can_ask(""));
        assert!(!session.can_ask("   \t\n"));
    }

    #[test]
    fn process_needs_a_selected_file() {
        assert!(!SessionState::can_process(None));
        assert!(!SessionState::can_process(Some("")));
        assert!(SessionState::can_process(Some("paper.pdf")));
    }

    #[test]
    fn upload_with_stats() {
        let mut session = SessionState::new();
        session.record_upload(Ok(map(json!({"stats": {"texts": 3, "tables": 1, "images": 0}}))));

        assert!(session.pdf_uploaded());
        assert_eq!(
            session.status_line().as_deref(),
            Some("Indexed — Texts: 3, Tables: 1, Images: 0.")
        );
        assert_eq!(
            session.take_notices(),
            vec![Notice::success(Section::Upload, "PDF processed successfully.")]
        );
        assert!(session.take_notices().is_empty());
    }

    #[test]
    fn upload_without_stats_uses_whole_body() {
        let mut session = SessionState::new();
        session.record_upload(Ok(map(json!({"texts": 7, "doc_id": "abc"}))));

        assert_eq!(session.last_stats().unwrap()["doc_id"], "abc");
        assert_eq!(
            session.status_line().as_deref(),
            Some("Indexed — Texts: 7, Tables: ?, Images: ?.")
        );
    }

    #[test]
    fn null_stats_hide_status_line() {
        let mut session = SessionState::new();
        session.record_upload(Ok(map(json!({"stats": null}))));

        assert!(session.pdf_uploaded());
        assert!(session.last_stats().is_none());
        assert!(session.status_line().is_none());
    }

    #[test]
    fn non_object_stats_are_dropped() {
        for stats in [json!(5), json!(["texts", 3]), json!("3 texts")] {
            let mut session = SessionState::new();
            session.record_upload(Ok(map(json!({"stats": stats}))));

            assert!(session.pdf_uploaded());
            assert!(session.last_stats().is_none());
            assert!(session.status_line().is_none());
        }
    }

    #[test]
    fn empty_body_hides_status_line() {
        let mut session = SessionState::new();
        session.record_upload(Ok(JsonMap::new()));

        assert!(session.pdf_uploaded());
        assert!(session.status_line().is_none());
    }

    #[test]
    fn string_stats_are_shown_verbatim() {
        let mut session = SessionState::new();
        session.record_upload(Ok(map(json!({"stats": {"texts": "many", "tables": 2.5, "images": null}}))));

        assert_eq!(
            session.status_line().as_deref(),
            Some("Indexed — Texts: many, Tables: 2.5, Images: ?.")
        );
    }

    #[test]
    fn failed_upload_leaves_state_alone() {
        let mut session = SessionState::new();
        session.record_upload(Ok(map(json!({"stats": {"texts": 1}}))));
        session.take_notices();

        session.record_upload(Err(backend_down()));

        assert!(session.pdf_uploaded());
        assert_eq!(session.last_stats().unwrap()["texts"], 1);
        let notices = session.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Error);
        assert!(notices[0].message.starts_with("Upload failed: malformed response"));
    }

    #[test]
    fn answer_becomes_turn() {
        let mut session = SessionState::new();
        session.record_answer(
            "what is x?",
            Ok(map(json!({"query": "What is X?", "filter": {}, "answer": "X is Y."}))),
        );

        assert_eq!(
            session.history(),
            &[Turn {
                question: "What is X?".to_string(),
                filter: JsonMap::new(),
                answer: "X is Y.".to_string(),
            }]
        );
    }

    #[test]
    fn missing_fields_fall_back() {
        let mut session = SessionState::new();
        session.record_answer(" raw question ", Ok(map(json!({"filter": ["not", "a", "map"]}))));

        let turn = &session.history()[0];
        assert_eq!(turn.question, " raw question ");
        assert!(turn.filter.is_empty());
        assert_eq!(turn.answer, "");
    }

    #[test]
    fn non_string_answer_is_rendered_as_json() {
        let mut session = SessionState::new();
        session.record_answer("count?", Ok(map(json!({"answer": 42}))));
        assert_eq!(session.history()[0].answer, "42");
    }

    #[test]
    fn failed_query_does_not_append() {
        let mut session = SessionState::new();
        session.record_answer("q", Err(backend_down()));

        assert!(session.history().is_empty());
        let notices = session.take_notices();
        assert_eq!(notices[0].section, Section::Ask);
        assert!(notices[0].message.starts_with("Query failed: "));
    }

    #[test]
    fn history_is_shown_latest_first() {
        let mut session = SessionState::new();
        for q in ["T1", "T2", "T3"] {
            session.record_answer(q, Ok(map(json!({"answer": format!("{q} answer")}))));
        }

        let order: Vec<_> = session.turns_latest_first().map(|t| t.question.as_str()).collect();
        assert_eq!(order, ["T3", "T2", "T1"]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut session = SessionState::new();
        session.record_upload(Ok(map(json!({"stats": {"texts": 3}}))));
        session.record_answer("q", Ok(map(json!({"answer": "a"}))));
        session.set_question_draft("q");

        session.clear();

        assert!(!session.pdf_uploaded());
        assert!(session.last_stats().is_none());
        assert!(session.history().is_empty());
        assert!(session.take_notices().is_empty());
        assert_eq!(session.question_draft(), "");
        assert!(!session.can_ask("q"));
    }
}
