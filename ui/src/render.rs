//! Server-side HTML for the single page of the UI.

use crate::session::{Notice, NoticeKind, Section, SessionState, Turn};

/// Everything the page needs to draw itself once.
pub struct PageView<'a> {
    pub backend_url: &'a str,
    pub session: &'a SessionState,
    pub notices: &'a [Notice],
}

pub fn render_page(view: &PageView<'_>) -> String {
    let session = view.session;

    let status_html = session
        .status_line()
        .map(|line| format!(r#"<div class="alert alert-info" id="status-line">{}</div>"#, escape_html(&line)))
        .unwrap_or_default();

    let ask_disabled = disabled_attr(!session.can_ask(session.question_draft()));

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>ResearchRAG</title>
    <style>{STYLE}</style>
</head>
<body>
<div class="layout">
<aside class="sidebar">
    <h3>Backend</h3>
    <p><code>BACKEND_URL</code>: <span id="backend-url">{backend_url}</span></p>
    <hr>
    <p>1) Upload a PDF</p>
    <p>2) Ask a question</p>
</aside>
<main class="content">
    <h1>ResearchRAG</h1>
    <p class="caption">Upload a PDF, then ask questions about it.</p>

    <h2>1) Upload PDF</h2>
    <div class="row">
        <form action="/upload" method="post" enctype="multipart/form-data" data-busy="Uploading and indexing…">
            <input type="file" name="file" accept=".pdf,application/pdf" id="pdf-file"
                   onchange="document.getElementById('process-btn').disabled = this.files.length === 0">
            <button type="submit" id="process-btn" disabled>Process PDF</button>
        </form>
        <form action="/clear" method="post">
            <button type="submit" id="clear-btn">Clear Session</button>
        </form>
    </div>
    {upload_notices}
    {status_html}

    <h2>2) Ask a Question</h2>
    <form action="/ask" method="post" data-busy="Retrieving and generating answer…">
        <input type="text" name="question" id="question" placeholder="Enter your question"
               value="{draft}" data-uploaded="{uploaded}" oninput="toggleAsk(this)">
        <button type="submit" id="ask-btn"{ask_disabled}>Ask</button>
    </form>
    {ask_notices}

    {history_html}
</main>
</div>
<script>{SCRIPT}</script>
</body>
</html>"#,
        backend_url = escape_html(view.backend_url),
        upload_notices = render_notices(view.notices, Section::Upload),
        draft = escape_html(session.question_draft()),
        uploaded = session.pdf_uploaded(),
        ask_notices = render_notices(view.notices, Section::Ask),
        history_html = render_history(session),
    )
}

fn render_notices(notices: &[Notice], section: Section) -> String {
    notices
        .iter()
        .filter(|n| n.section == section)
        .map(|n| {
            let class = match n.kind {
                NoticeKind::Success => "alert-success",
                NoticeKind::Error => "alert-error",
            };
            format!(r#"<div class="alert {class}">{}</div>"#, escape_html(&n.message))
        })
        .collect()
}

fn render_history(session: &SessionState) -> String {
    if session.history().is_empty() {
        return String::new();
    }

    let turns: String = session.turns_latest_first().map(render_turn).collect();
    format!(r#"<section id="history"><h2>History</h2>{turns}</section>"#)
}

fn render_turn(turn: &Turn) -> String {
    let filter_html = if turn.filter.is_empty() {
        String::new()
    } else {
        let pretty = serde_json::to_string_pretty(&turn.filter).unwrap_or_default();
        format!(
            r#"<details class="filter"><summary>Applied metadata filter</summary><pre>{}</pre></details>"#,
            escape_html(&pretty)
        )
    };

    format!(
        r#"<div class="turn">
    <p><strong>Q:</strong> {question}</p>
    {filter_html}
    <p><strong>A:</strong></p>
    <div class="answer">{answer}</div>
    <hr>
</div>"#,
        question = escape_html(&turn.question),
        answer = escape_html(&turn.answer),
    )
}

fn disabled_attr(disabled: bool) -> &'static str {
    if disabled {
        " disabled"
    } else {
        ""
    }
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; color: #1f2430; }
.layout { display: flex; min-height: 100vh; }
.sidebar { width: 260px; padding: 1.5rem; background: #f0f2f6; }
.content { flex: 1; max-width: 960px; padding: 1.5rem 3rem; }
.caption { color: #6b7280; }
.row { display: flex; gap: 1rem; align-items: center; }
input[type=text] { width: 100%; max-width: 640px; padding: .5rem; }
button { padding: .45rem 1rem; cursor: pointer; }
button:disabled { cursor: not-allowed; opacity: .5; }
.alert { margin: .75rem 0; padding: .75rem 1rem; border-radius: .4rem; }
.alert-info { background: #e8f0fe; }
.alert-success { background: #e6f4ea; }
.alert-error { background: #fce8e6; }
.answer { white-space: pre-wrap; }
.busy { margin-left: .75rem; color: #6b7280; }
pre { background: #f6f8fa; padding: .75rem; overflow-x: auto; }
"#;

const SCRIPT: &str = r#"
function toggleAsk(input) {
    document.getElementById('ask-btn').disabled =
        input.dataset.uploaded !== 'true' || input.value.trim() === '';
}
document.querySelectorAll('form[data-busy]').forEach(function (form) {
    form.addEventListener('submit', function () {
        var button = form.querySelector('button[type=submit]');
        button.disabled = true;
        var busy = document.createElement('span');
        busy.className = 'busy';
        busy.textContent = form.dataset.busy;
        button.after(busy);
    });
});
"#;
