//! Markdown to terminal text conversion.
//!
//! Converts message markdown into printable lines. With `color` set, emphasis,
//! headings, inline code and code blocks carry ANSI styling; without it the
//! markup is dropped and only the text layout remains.

use std::fmt::Write;

use crossterm::style::{Attribute, Color, ContentStyle};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Convert markdown text to terminal lines.
#[must_use]
pub fn render_markdown(text: &str, color: bool) -> Vec<String> {
    MarkdownRenderer::new(color).render(text)
}

/// Markdown renderer state.
struct MarkdownRenderer {
    color: bool,
    lines: Vec<String>,
    current: String,
    style_stack: Vec<ContentStyle>,
    in_code_block: bool,
    code_block_content: String,
    code_block_lang: Option<String>,
    list_depth: usize,
    ordered_list_index: Option<u64>,
}

impl MarkdownRenderer {
    fn new(color: bool) -> Self {
        Self {
            color,
            lines: Vec::new(),
            current: String::new(),
            style_stack: vec![ContentStyle::new()],
            in_code_block: false,
            code_block_content: String::new(),
            code_block_lang: None,
            list_depth: 0,
            ordered_list_index: None,
        }
    }

    fn current_style(&self) -> ContentStyle {
        self.style_stack.last().copied().unwrap_or_default()
    }

    fn push_attribute(&mut self, attribute: Attribute) {
        let mut style = self.current_style();
        style.attributes.set(attribute);
        self.style_stack.push(style);
    }

    fn push_color(&mut self, fg: Color) {
        let mut style = self.current_style();
        style.foreground_color = Some(fg);
        self.style_stack.push(style);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn styled(&self, text: &str, style: ContentStyle) -> String {
        if self.color && style != ContentStyle::new() {
            style.apply(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn push_span(&mut self, text: &str, style: ContentStyle) {
        let span = self.styled(text, style);
        self.current.push_str(&span);
    }

    fn flush_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
    }

    fn add_blank_line(&mut self) {
        self.flush_line();
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }
    }

    fn add_text(&mut self, text: &str) {
        if self.in_code_block {
            self.code_block_content.push_str(text);
            return;
        }

        let style = self.current_style();
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                self.flush_line();
            }
            if !part.is_empty() {
                self.push_span(part, style);
            }
        }
    }

    fn render_code_block(&mut self) {
        let content = std::mem::take(&mut self.code_block_content);
        let lang = self.code_block_lang.take().unwrap_or_default();
        self.flush_line();

        let mut gutter = ContentStyle::new();
        gutter.foreground_color = Some(Color::DarkGrey);
        let mut code = ContentStyle::new();
        code.foreground_color = Some(Color::Yellow);

        let header = if lang.is_empty() {
            "┌".to_string()
        } else {
            format!("┌─ {lang}")
        };
        let header = self.styled(&header, gutter);
        self.lines.push(header);

        for line in content.lines() {
            let mut out = self.styled("│ ", gutter);
            let _ = write!(out, "{}", self.styled(line, code));
            self.lines.push(out);
        }

        let footer = self.styled("└", gutter);
        self.lines.push(footer);
    }

    fn render(mut self, text: &str) -> Vec<String> {
        let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;

        for event in Parser::new_ext(text, options) {
            match event {
                Event::Start(tag) => self.handle_start_tag(tag),
                Event::End(tag) => self.handle_end_tag(tag),
                Event::Text(text) => self.add_text(&text),
                Event::Code(code) => {
                    let mut style = self.current_style();
                    style.foreground_color = Some(Color::Yellow);
                    let span = if self.color {
                        code.to_string()
                    } else {
                        format!("`{code}`")
                    };
                    self.push_span(&span, style);
                }
                // Soft breaks stay line breaks in a terminal.
                Event::SoftBreak | Event::HardBreak => self.flush_line(),
                Event::Rule => {
                    self.flush_line();
                    self.lines.push("─".repeat(40));
                }
                _ => {}
            }
        }

        self.flush_line();
        while self.lines.last().is_some_and(String::is_empty) {
            self.lines.pop();
        }
        self.lines
    }

    fn handle_start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { level, .. } => {
                self.add_blank_line();
                let prefix = match level {
                    HeadingLevel::H1 => "# ",
                    HeadingLevel::H2 => "## ",
                    HeadingLevel::H3 => "### ",
                    _ => "#### ",
                };
                self.push_attribute(Attribute::Bold);
                self.push_color(Color::Magenta);
                let style = self.current_style();
                self.push_span(prefix, style);
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.push_color(Color::Blue);
                let style = self.current_style();
                self.push_span("│ ", style);
            }
            Tag::CodeBlock(kind) => {
                self.in_code_block = true;
                self.code_block_content.clear();
                self.code_block_lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
            }
            Tag::List(first_item) => {
                self.flush_line();
                self.list_depth += 1;
                self.ordered_list_index = first_item;
            }
            Tag::Item => {
                let indent = "  ".repeat(self.list_depth.saturating_sub(1));
                let bullet = match self.ordered_list_index.as_mut() {
                    Some(idx) => {
                        let bullet = format!("{indent}{idx}. ");
                        *idx += 1;
                        bullet
                    }
                    None => format!("{indent}• "),
                };
                let mut style = ContentStyle::new();
                style.foreground_color = Some(Color::Cyan);
                self.push_span(&bullet, style);
            }
            Tag::Emphasis => self.push_attribute(Attribute::Italic),
            Tag::Strong => self.push_attribute(Attribute::Bold),
            Tag::Strikethrough => self.push_attribute(Attribute::CrossedOut),
            Tag::Link { .. } => self.push_attribute(Attribute::Underlined),
            _ => {}
        }
    }

    fn handle_end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.pop_style();
                self.pop_style();
                self.flush_line();
            }
            TagEnd::Paragraph => self.add_blank_line(),
            TagEnd::BlockQuote(_) => {
                self.pop_style();
                self.flush_line();
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.render_code_block();
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.list_depth = self.list_depth.saturating_sub(1);
                if self.list_depth == 0 {
                    self.ordered_list_index = None;
                    self.add_blank_line();
                }
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.pop_style();
            }
            _ => {}
        }
    }
}
