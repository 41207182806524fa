//! Plain-text ⇄ story markup helpers used by the editor surface.

use chrono::{DateTime, Utc};

/// Words are whitespace-separated runs, the same rule the editor's
/// character-count extension uses.
pub fn word_count(text: &str) -> i64 {
    text.split_whitespace().count() as i64
}

pub fn character_count(text: &str) -> i64 {
    text.chars().count() as i64
}

/// Render editor text as story markup: blank-line separated paragraphs
/// become `<p>` blocks, single newlines become `<br>`.
pub fn text_to_html(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    let mut html = String::new();
    for paragraph in normalized.split("\n\n") {
        let trimmed = paragraph.trim_matches('\n');
        if trimmed.trim().is_empty() {
            continue;
        }
        html.push_str("<p>");
        let lines: Vec<String> = trimmed.split('\n').map(escape_html).collect();
        html.push_str(&lines.join("<br>"));
        html.push_str("</p>");
    }
    html
}

/// Recover editable text from stored markup. Block ends become paragraph
/// breaks, `<br>` becomes a newline, other tags are dropped.
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        out.push_str(&unescape_html(&rest[..start]));
        let Some(end) = rest[start..].find('>') else {
            out.push_str(&unescape_html(&rest[start..]));
            rest = "";
            break;
        };
        let tag = rest[start + 1..start + end]
            .trim()
            .trim_end_matches('/')
            .trim()
            .to_ascii_lowercase();
        let name = tag.split_whitespace().next().unwrap_or_default();
        match name {
            "br" => out.push('\n'),
            "/p" | "/h1" | "/h2" | "/h3" | "/blockquote" | "/li" => out.push_str("\n\n"),
            _ => {}
        }
        rest = &rest[start + end + 1..];
    }
    out.push_str(&unescape_html(rest));
    out.trim_end_matches('\n').to_string()
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Relative "last saved" label for the editor header.
pub fn format_last_saved(last_saved: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(saved) = last_saved else {
        return "Never".to_string();
    };
    let minutes = (now - saved).num_minutes();
    match minutes {
        m if m < 1 => "Just now".to_string(),
        1 => "1 minute ago".to_string(),
        m => format!("{m} minutes ago"),
    }
}
