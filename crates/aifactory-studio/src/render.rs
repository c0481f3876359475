//! Terminal rendering of conversations and workspace state.
//!
//! Message text is markdown and goes through [`render_markdown`]; everything
//! else is plain text.

use aifactory_core::{Message, Role};

use crate::log::ActivityLog;
use crate::markdown::render_markdown;
use crate::workspace::Workspace;

/// Render one message. A streaming message ends with a cursor.
#[must_use]
pub fn message(m: &Message, color: bool) -> String {
    let header = match (m.role, m.agent_model.as_deref()) {
        (Role::Ai, Some(model)) => format!("[ai · {model}]"),
        (role, _) => format!("[{}]", role.as_str()),
    };

    let mut lines = vec![header];
    lines.extend(render_markdown(&m.text, color));
    if m.is_streaming {
        if let Some(last) = lines.last_mut() {
            last.push('▌');
        }
    }

    if let Some(preview) = &m.preview {
        lines.push(format!("  ── proposed change to {} ──", preview.filename));
        lines.extend(preview.code.lines().map(|l| format!("  │ {l}")));
        lines.push("  ── /apply or /discard ──".to_string());
    }
    lines.join("\n")
}

/// Render the active conversation with a header line.
#[must_use]
pub fn conversation(ws: &Workspace, color: bool) -> String {
    let mut out = format!("── {} ──", ws.active_key());
    for m in ws.active_buffer() {
        out.push('\n');
        out.push_str(&message(m, color));
    }
    out
}

/// Export a conversation as a markdown transcript.
///
/// Returns `None` for an empty conversation.
#[must_use]
pub fn transcript(messages: &[Message]) -> Option<String> {
    if messages.is_empty() {
        return None;
    }
    let sections: Vec<String> = messages
        .iter()
        .map(|m| {
            let sender = if m.is_user() { "User" } else { "AI Agent" };
            format!("### {sender}\n{}\n", m.text)
        })
        .collect();
    Some(sections.join("\n---\n\n"))
}

/// Render the open files, marking the active and dirty ones.
#[must_use]
pub fn tabs(ws: &Workspace) -> String {
    if ws.open_files().is_empty() {
        return "(no open files)".to_string();
    }
    let active = ws.active_file().map(|f| f.path.as_str());
    ws.open_files()
        .iter()
        .map(|f| {
            let marker = if Some(f.path.as_str()) == active { '*' } else { ' ' };
            let dirty = if f.is_dirty { " (modified)" } else { "" };
            format!("{marker} {}{dirty}", f.path)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the activity log.
#[must_use]
pub fn activity(log: &ActivityLog) -> String {
    log.entries()
        .map(|e| format!("{} [{}] {}", e.time.format("%H:%M:%S"), e.level.as_str(), e.message))
        .collect::<Vec<_>>()
        .join("\n")
}
