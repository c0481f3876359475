//! Generation, routing and review against a mock backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use aifactory_client::{ApiClient, ClientConfig, ClientError, EventStream, StreamEvent};
use aifactory_core::reducer::{DISCARDED_TEXT, SECURITY_WARNING_SUFFIX};
use aifactory_core::{Attachment, ConversationKey, Message, Role};
use aifactory_studio::orchestrator::ATTACHMENTS_ONLY_TEXT;
use aifactory_studio::workspace::WELCOME_TEXT;
use aifactory_studio::{
    GenerationOutcome, LogLevel, Settings, StatusRefresh, Studio, StudioError, Workspace,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct CountingRefresh(AtomicUsize);

impl CountingRefresh {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusRefresh for CountingRefresh {
    async fn refresh(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn studio_with(server: &MockServer, ws: Workspace) -> (Studio, Arc<CountingRefresh>) {
    let client = ApiClient::new(ClientConfig::new(server.uri(), "test-key")).unwrap();
    let refresh = Arc::new(CountingRefresh::default());
    let studio = Studio::with_refresher(client, ws.shared(), refresh.clone());
    (studio, refresh)
}

fn workspace_with_files(paths: &[&str]) -> Workspace {
    let mut ws = Workspace::new(Settings::default());
    for p in paths {
        ws.insert_file(p, format!("# {p}\n"), (*p).to_string());
    }
    ws
}

fn ndjson(events: &[Value]) -> String {
    events.iter().map(|e| format!("{e}\n")).collect()
}

async fn mount_stream(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path("/stream-generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn names(attachments: &[Attachment]) -> Vec<&str> {
    attachments.iter().map(|a| a.name.as_str()).collect()
}

fn texts(messages: &[Message]) -> Vec<(Role, String, bool)> {
    messages
        .iter()
        .map(|m| (m.role, m.text.clone(), m.is_streaming))
        .collect()
}

// =============================================================================
// Streaming
// =============================================================================

#[tokio::test]
async fn chunks_accumulate_then_finalize() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        ndjson(&[
            json!({"type": "chunk", "content": "Hello"}),
            json!({"type": "chunk", "content": " world"}),
            json!({"type": "done"}),
        ]),
    )
    .await;

    let (studio, refresh) = studio_with(&server, Workspace::new(Settings::default()));
    studio.workspace().lock().prompt = "say hello".to_string();

    let outcome = studio.orchestrator().send().await.unwrap();
    assert!(outcome.is_completed());

    let ws = studio.workspace().lock();
    assert_eq!(
        texts(ws.active_buffer()),
        vec![
            (Role::Ai, WELCOME_TEXT.to_string(), false),
            (Role::User, "say hello".to_string(), false),
            (Role::Ai, "Hello world".to_string(), false),
        ]
    );
    assert!(ws.prompt.is_empty());
    assert!(!ws.is_generating());
    assert!(ws.activity().contains(LogLevel::Success, "Generation finished"));
    assert_eq!(refresh.count(), 1);
}

#[tokio::test]
async fn request_carries_target_model_mode_and_active_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stream-generate"))
        .and(body_partial_json(json!({
            "prompt": "refactor",
            "target_file": "src/x.py",
            "model": "gemini/gemini-3-flash-preview",
            "mode": "Planning",
            "attachments": [{"type": "file", "name": "x.py", "data": "# src/x.py\n"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(ndjson(&[json!({"type": "done"})])))
        .expect(1)
        .mount(&server)
        .await;

    let (studio, _) = studio_with(&server, workspace_with_files(&["src/x.py"]));
    studio.workspace().lock().prompt = "refactor".to_string();

    assert!(studio.orchestrator().send().await.unwrap().is_completed());
}

#[tokio::test]
async fn preview_replaces_streaming_message() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        ndjson(&[
            json!({"type": "chunk", "content": "Thinking..."}),
            json!({"type": "preview", "explanation": "Will edit X", "code": "print(1)", "filename": "x.py"}),
            json!({"type": "done"}),
        ]),
    )
    .await;

    let (studio, _) = studio_with(&server, workspace_with_files(&["x.py"]));
    studio.workspace().lock().prompt = "edit".to_string();
    studio.orchestrator().send().await.unwrap();

    let ws = studio.workspace().lock();
    let last = ws.active_buffer().last().unwrap();
    assert_eq!(last.text, "Will edit X");
    assert!(!last.is_streaming);
    let preview = last.preview.as_ref().unwrap();
    assert_eq!(preview.code, "print(1)");
    assert_eq!(preview.filename, "x.py");
    assert!(ws
        .activity()
        .contains(LogLevel::Warning, "asking for approval"));
}

#[tokio::test]
async fn security_warning_blocks_message() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        ndjson(&[
            json!({"type": "chunk", "content": "Here is code"}),
            json!({"type": "security_warning", "threats": ["os.system", "eval"]}),
        ]),
    )
    .await;

    let (studio, _) = studio_with(&server, Workspace::new(Settings::default()));
    studio.workspace().lock().prompt = "hack".to_string();
    studio.orchestrator().send().await.unwrap();

    let ws = studio.workspace().lock();
    let last = ws.active_buffer().last().unwrap();
    assert_eq!(last.text, format!("Here is code{SECURITY_WARNING_SUFFIX}"));
    assert!(!last.is_streaming);
    assert!(ws
        .activity()
        .contains(LogLevel::Error, "Threats detected: os.system, eval"));
}

#[tokio::test]
async fn malformed_lines_are_skipped() {
    let server = MockServer::start().await;
    let body = "{\"type\":\"chunk\",\"content\":\"A\"}\n{oops\n{\"type\":\"chunk\",\"content\":\"B\"}\n";
    mount_stream(&server, body.to_string()).await;

    let (studio, _) = studio_with(&server, Workspace::new(Settings::default()));
    studio.workspace().lock().prompt = "go".to_string();
    studio.orchestrator().send().await.unwrap();

    let ws = studio.workspace().lock();
    assert_eq!(ws.active_buffer().last().unwrap().text, "AB");
}

#[tokio::test]
async fn attachments_only_send_uses_placeholder_text() {
    let server = MockServer::start().await;
    mount_stream(&server, ndjson(&[json!({"type": "done"})])).await;

    let (studio, _) = studio_with(&server, Workspace::new(Settings::default()));
    studio
        .workspace()
        .lock()
        .attach(Attachment::file("notes.txt", "todo"));
    studio.orchestrator().send().await.unwrap();

    let ws = studio.workspace().lock();
    assert_eq!(ws.active_buffer()[1].text, ATTACHMENTS_ONLY_TEXT);
    assert!(ws.attachments().is_empty());
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn events_follow_origin_after_tab_switch() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        ndjson(&[
            json!({"type": "chunk", "content": "for F"}),
            json!({"type": "done"}),
        ]),
    )
    .await;

    let (studio, _) = studio_with(&server, workspace_with_files(&["src/f.py", "src/g.py"]));
    studio.switch_to("src/f.py").unwrap();
    studio.workspace().lock().prompt = "explain".to_string();

    let orchestrator = studio.orchestrator();
    let prepared = orchestrator.prepare().unwrap();
    studio.switch_to("SRC\\G.py").unwrap();
    orchestrator.run(prepared).await;

    let ws = studio.workspace().lock();
    let f = ws.buffer(&ConversationKey::for_path(Some("src/f.py"))).unwrap();
    let g = ws.buffer(&ConversationKey::for_path(Some("src/g.py"))).unwrap();
    assert_eq!(f.last().unwrap().text, "for F");
    assert!(!f.last().unwrap().is_streaming);
    assert_eq!(g.len(), 1);
}

#[tokio::test]
async fn closed_origin_drops_events() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        ndjson(&[json!({"type": "chunk", "content": "late"})]),
    )
    .await;

    let (studio, _) = studio_with(&server, workspace_with_files(&["a.py", "b.py"]));
    studio.switch_to("a.py").unwrap();
    studio.workspace().lock().prompt = "hi".to_string();

    let orchestrator = studio.orchestrator();
    let prepared = orchestrator.prepare().unwrap();
    studio.close_file("a.py").unwrap();

    let outcome = orchestrator.run(prepared).await;
    assert!(outcome.is_completed());

    let ws = studio.workspace().lock();
    assert!(ws.buffer(&ConversationKey::for_path(Some("a.py"))).is_none());
    assert_eq!(ws.active_path(), Some("b.py"));
    assert!(!ws.is_generating());
}

#[tokio::test]
async fn second_send_to_busy_conversation_is_refused() {
    let server = MockServer::start().await;
    mount_stream(&server, ndjson(&[json!({"type": "done"})])).await;

    let (studio, _) = studio_with(&server, workspace_with_files(&["a.py"]));
    studio.workspace().lock().prompt = "one".to_string();

    let orchestrator = studio.orchestrator();
    let first = orchestrator.prepare().unwrap();
    let second = orchestrator.prepare();
    assert!(matches!(second, Err(StudioError::AlreadyStreaming(_))));

    // Another conversation is free.
    studio.switch_global();
    let global = orchestrator.prepare().unwrap();

    orchestrator.run(first).await;
    orchestrator.run(global).await;
    assert!(!studio.workspace().lock().is_generating());
}

#[tokio::test]
async fn overlapping_sends_keep_their_own_attachments() {
    let server = MockServer::start().await;
    mount_stream(&server, ndjson(&[json!({"type": "done"})])).await;

    let (studio, _) = studio_with(&server, workspace_with_files(&["f.py"]));
    studio.switch_global();
    {
        let mut ws = studio.workspace().lock();
        ws.attach(Attachment::file("secret.txt", "s3cr3t"));
        ws.prompt = "first".to_string();
    }

    let orchestrator = studio.orchestrator();
    let first = orchestrator.prepare().unwrap();
    assert_eq!(names(&first.context().attachments), ["secret.txt"]);
    assert!(studio.workspace().lock().attachments().is_empty());

    studio.switch_to("f.py").unwrap();
    studio.workspace().lock().prompt = "second".to_string();
    let second = orchestrator.prepare().unwrap();
    assert_eq!(names(&second.context().attachments), ["f.py"]);

    studio
        .workspace()
        .lock()
        .attach(Attachment::file("later.txt", "l"));
    orchestrator.run(first).await;
    assert_eq!(names(studio.workspace().lock().attachments()), ["later.txt"]);

    orchestrator.run(second).await;
    assert_eq!(names(studio.workspace().lock().attachments()), ["later.txt"]);
}

#[tokio::test]
async fn empty_prompt_is_refused() {
    let server = MockServer::start().await;
    let (studio, _) = studio_with(&server, Workspace::new(Settings::default()));
    studio.workspace().lock().prompt = "   ".to_string();

    let result = studio.orchestrator().prepare();
    assert!(matches!(result, Err(StudioError::EmptyPrompt)));
    assert_eq!(studio.workspace().lock().active_buffer().len(), 1);
}

#[tokio::test]
async fn dropped_generation_is_finalized() {
    let server = MockServer::start().await;
    let (studio, _) = studio_with(&server, Workspace::new(Settings::default()));
    studio.workspace().lock().prompt = "hi".to_string();

    let prepared = studio.orchestrator().prepare().unwrap();
    assert!(studio.workspace().lock().is_generating());
    drop(prepared);

    let ws = studio.workspace().lock();
    assert!(!ws.is_generating());
    assert!(ws.active_buffer().iter().all(|m| !m.is_streaming));
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn http_error_is_logged_and_finalized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stream-generate"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "model overloaded"})))
        .mount(&server)
        .await;

    let (studio, refresh) = studio_with(&server, Workspace::new(Settings::default()));
    studio.workspace().lock().prompt = "hi".to_string();

    let outcome = studio.orchestrator().send().await.unwrap();
    match outcome {
        GenerationOutcome::Failed { error, .. } => assert!(error.contains("model overloaded")),
        GenerationOutcome::Completed { .. } => panic!("expected failure"),
    }

    let ws = studio.workspace().lock();
    assert!(ws.activity().contains(LogLevel::Error, "Service error"));
    assert!(ws.active_buffer().iter().all(|m| !m.is_streaming));
    assert!(!ws.is_generating());
    assert_eq!(ws.prompt, "hi");
    assert_eq!(refresh.count(), 0);
}

#[tokio::test]
async fn failed_send_hands_attachments_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stream-generate"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (studio, _) = studio_with(&server, Workspace::new(Settings::default()));
    studio
        .workspace()
        .lock()
        .attach(Attachment::file("notes.txt", "n"));

    let outcome = studio.orchestrator().send().await.unwrap();
    assert!(!outcome.is_completed());
    assert_eq!(names(studio.workspace().lock().attachments()), ["notes.txt"]);

    // Attachments added while the request was out win over the failed ones.
    let orchestrator = studio.orchestrator();
    let prepared = orchestrator.prepare().unwrap();
    studio
        .workspace()
        .lock()
        .attach(Attachment::file("newer.txt", "n"));
    orchestrator.run(prepared).await;
    assert_eq!(names(studio.workspace().lock().attachments()), ["newer.txt"]);
}

#[tokio::test]
async fn stream_breaking_mid_read_fails_and_finalizes() {
    let server = MockServer::start().await;
    let (studio, refresh) = studio_with(&server, Workspace::new(Settings::default()));
    studio.workspace().lock().prompt = "explain".to_string();

    let orchestrator = studio.orchestrator();
    let prepared = orchestrator.prepare().unwrap();
    let events: EventStream = Box::pin(futures::stream::iter(vec![
        Ok(StreamEvent::Chunk {
            content: "partial".to_string(),
        }),
        Err(ClientError::Stream("connection reset".to_string())),
        Ok(StreamEvent::Chunk {
            content: " never".to_string(),
        }),
    ]));

    match orchestrator.run_events(prepared, events).await {
        GenerationOutcome::Failed { error, .. } => assert!(error.contains("connection reset")),
        GenerationOutcome::Completed { .. } => panic!("expected failure"),
    }

    let ws = studio.workspace().lock();
    let last = ws.active_buffer().last().unwrap();
    assert_eq!(last.text, "partial");
    assert!(!last.is_streaming);
    assert!(!ws.is_generating());
    assert!(ws.activity().contains(LogLevel::Error, "Service error"));
    assert_eq!(ws.prompt, "explain");
    assert_eq!(refresh.count(), 0);
}

// =============================================================================
// Review
// =============================================================================

async fn preview_in(studio: &Studio, server: &MockServer, filename: &str) -> aifactory_core::MessageId {
    mount_stream(
        server,
        ndjson(&[json!({"type": "preview", "explanation": "Rewrite", "code": "print(2)\n", "filename": filename})]),
    )
    .await;
    studio.workspace().lock().prompt = "change it".to_string();
    studio.orchestrator().send().await.unwrap();
    let ws = studio.workspace().lock();
    ws.latest_preview(&ws.active_key()).unwrap()
}

#[tokio::test]
async fn apply_updates_open_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apply-changes"))
        .and(body_partial_json(json!({"filename": "x.py", "content": "print(2)\n"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let (studio, refresh) = studio_with(&server, workspace_with_files(&["src/x.py"]));
    studio.workspace().lock().edit_active("dirty".to_string()).unwrap();
    let id = preview_in(&studio, &server, "x.py").await;
    let key = studio.workspace().lock().active_key();

    studio.review().apply(&key, id).await.unwrap();

    let ws = studio.workspace().lock();
    let file = ws.active_file().unwrap();
    assert_eq!(file.content, "print(2)\n");
    assert!(!file.is_dirty);
    let message = ws.active_buffer().iter().find(|m| m.id == id).unwrap();
    assert_eq!(message.text, "✅ Changes approved and applied to x.py.");
    assert!(message.preview.is_none());
    assert!(ws.activity().contains(LogLevel::Success, "Changes applied"));
    // One refresh after the generation, one after the apply.
    assert_eq!(refresh.count(), 2);
}

#[tokio::test]
async fn apply_leaves_similarly_named_file_alone() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apply-changes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let (studio, _) = studio_with(&server, workspace_with_files(&["src/max.py"]));
    studio
        .workspace()
        .lock()
        .edit_active("user edits".to_string())
        .unwrap();
    studio.switch_global();
    let id = preview_in(&studio, &server, "x.py").await;

    studio
        .review()
        .apply(&ConversationKey::Global, id)
        .await
        .unwrap();

    let ws = studio.workspace().lock();
    let max = ws.find_open("src/max.py").unwrap();
    assert_eq!(max.content, "user edits");
    assert!(max.is_dirty);
}

#[tokio::test]
async fn rejected_apply_keeps_preview() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apply-changes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let (studio, _) = studio_with(&server, workspace_with_files(&["x.py"]));
    let id = preview_in(&studio, &server, "x.py").await;
    let key = studio.workspace().lock().active_key();

    let result = studio.review().apply(&key, id).await;
    assert!(matches!(result, Err(StudioError::ApplyRejected(f)) if f == "x.py"));

    let ws = studio.workspace().lock();
    assert_eq!(ws.latest_preview(&key), Some(id));
    assert_eq!(ws.active_file().unwrap().content, "# x.py\n");
    assert!(ws.activity().contains(LogLevel::Error, "Failed to apply changes"));
}

#[tokio::test]
async fn discard_clears_preview_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apply-changes"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (studio, _) = studio_with(&server, workspace_with_files(&["x.py"]));
    let id = preview_in(&studio, &server, "x.py").await;
    let key = studio.workspace().lock().active_key();

    studio.review().discard(&key, id).unwrap();

    let ws = studio.workspace().lock();
    let message = ws.active_buffer().iter().find(|m| m.id == id).unwrap();
    assert_eq!(message.text, DISCARDED_TEXT);
    assert!(message.preview.is_none());
    assert_eq!(ws.latest_preview(&key), None);
    drop(ws);
    assert!(matches!(
        studio.review().discard(&key, id),
        Err(StudioError::NoPendingPreview(_))
    ));
}

// =============================================================================
// Files and attachments
// =============================================================================

#[tokio::test]
async fn open_file_reads_and_seeds_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/read-file"))
        .and(query_param("path", "/proj/src/app.py"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": "x = 1\n"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut ws = Workspace::new(Settings::default());
    ws.status = Some(
        serde_json::from_value(json!({
            "total_tokens": 0,
            "project_dir": "/proj",
            "model": "m",
            "files": ["src/app.py"]
        }))
        .unwrap(),
    );
    let (studio, _) = studio_with(&server, ws);

    studio.open_file("/proj/src/app.py").await.unwrap();
    // Opening again only activates.
    studio.open_file("/proj/src/app.py").await.unwrap();

    let ws = studio.workspace().lock();
    let file = ws.active_file().unwrap();
    assert_eq!(file.content, "x = 1\n");
    assert_eq!(file.target_file, "src/app.py");
    assert_eq!(
        ws.active_buffer()[0].text,
        "Started a conversation about file: app.py"
    );
}

#[tokio::test]
async fn save_refused_by_security_scan_keeps_dirty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/save-file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Security check failed",
            "threats": ["os.system"]
        })))
        .mount(&server)
        .await;

    let (studio, _) = studio_with(&server, workspace_with_files(&["x.py"]));
    studio
        .workspace()
        .lock()
        .edit_active("import os; os.system('rm')".to_string())
        .unwrap();

    assert!(!studio.save_active().await.unwrap());
    let ws = studio.workspace().lock();
    assert!(ws.active_file().unwrap().is_dirty);
    assert!(ws.activity().contains(LogLevel::Error, "os.system"));
}

#[tokio::test]
async fn attach_reads_text_and_images() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    let image = dir.path().join("shot.png");
    std::fs::write(&notes, "remember this").unwrap();
    std::fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();

    let (studio, _) = studio_with(&server, Workspace::new(Settings::default()));
    studio.attach(&notes).await.unwrap();
    studio.attach(&image).await.unwrap();

    let ws = studio.workspace().lock();
    let attachments = ws.attachments();
    assert_eq!(attachments.len(), 2);
    assert_eq!(attachments[0].name, "notes.txt");
    assert_eq!(attachments[0].data, "remember this");
    assert_eq!(attachments[1].data, "data:image/png;base64,iVBORw==");
}

// =============================================================================
// Target file and transcript
// =============================================================================

#[tokio::test]
async fn chosen_target_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stream-generate"))
        .and(body_partial_json(json!({"target_file": "lib/out.py"})))
        .respond_with(ResponseTemplate::new(200).set_body_string(ndjson(&[json!({"type": "done"})])))
        .expect(1)
        .mount(&server)
        .await;

    let mut ws = Workspace::new(Settings::default());
    ws.status = Some(
        serde_json::from_value(json!({
            "total_tokens": 0,
            "project_dir": "/proj",
            "model": "m",
            "files": []
        }))
        .unwrap(),
    );
    let (studio, _) = studio_with(&server, ws);

    assert_eq!(studio.set_target("/proj/lib/out.py"), "lib/out.py");
    studio.workspace().lock().prompt = "write it".to_string();
    assert!(studio.orchestrator().send().await.unwrap().is_completed());
    assert!(studio
        .workspace()
        .lock()
        .activity()
        .contains(LogLevel::Success, "Target file: out.py"));
}

#[tokio::test]
async fn copy_chat_writes_transcript() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        ndjson(&[json!({"type": "chunk", "content": "Hi there"})]),
    )
    .await;

    let (studio, _) = studio_with(&server, Workspace::new(Settings::default()));
    studio.workspace().lock().prompt = "hello".to_string();
    studio.orchestrator().send().await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("chat.md");
    assert!(studio.copy_chat(Some(&dest)).await.unwrap());

    let written = std::fs::read_to_string(&dest).unwrap();
    assert_eq!(
        written,
        format!(
            "### AI Agent\n{WELCOME_TEXT}\n\n---\n\n### User\nhello\n\n---\n\n### AI Agent\nHi there\n"
        )
    );
}
