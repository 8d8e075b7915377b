// src/chat/markdown.rs — Markdown subset → display HTML, and HTML → plain text
//
// `render` is applied exactly once to raw model output. Running it on its
// own output is not safe: literal asterisks in the HTML would be
// re-transformed.

use regex::Regex;
use std::sync::OnceLock;

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern"))
}

/// Single-star emphasis. The opener must touch a non-space character so
/// that `* ` bullet markers are never consumed as emphasis delimiters.
fn italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*([^*\s][^*\n]*?)\*").expect("italic pattern"))
}

fn ordered_item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\.\s+(.*)$").expect("ordered item pattern"))
}

fn line_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("line break pattern"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern"))
}

pub const LINE_BREAK: &str = "<br>";

/// Convert the markdown subset used by model answers to HTML.
///
/// Passes, in order:
///   1. `**bold**` → `<strong>`, then `*italic*` → `<em>` (non-greedy, left to right)
///   2. runs of `- ` / `* ` lines → one `<ul>` each
///   3. `N. text` lines → `<li><strong>N.</strong> text</li>`, runs wrapped in `<ol>`
///   4. every remaining newline → `<br>`
pub fn render(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = bold_re().replace_all(text, "<strong>$1</strong>");
    let text = italic_re().replace_all(&text, "<em>$1</em>");

    let lines = group_unordered(&text);
    let lines = group_ordered(lines);

    lines.join(LINE_BREAK)
}

fn group_unordered(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut in_list = false;

    for line in text.split('\n') {
        let stripped = line.trim();
        let item = stripped
            .strip_prefix("- ")
            .or_else(|| stripped.strip_prefix("* "));

        match item {
            Some(content) => {
                if !in_list {
                    out.push("<ul>".to_string());
                    in_list = true;
                }
                out.push(format!("<li>{}</li>", content.trim()));
            }
            None => {
                if in_list {
                    out.push("</ul>".to_string());
                    in_list = false;
                }
                out.push(line.to_string());
            }
        }
    }

    if in_list {
        out.push("</ul>".to_string());
    }
    out
}

fn group_ordered(lines: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut in_list = false;

    for line in lines {
        match ordered_item_re().captures(&line) {
            Some(caps) => {
                if !in_list {
                    out.push("<ol>".to_string());
                    in_list = true;
                }
                out.push(format!(
                    "<li><strong>{}.</strong> {}</li>",
                    &caps[1], &caps[2]
                ));
            }
            None => {
                if in_list {
                    out.push("</ol>".to_string());
                    in_list = false;
                }
                out.push(line);
            }
        }
    }

    if in_list {
        out.push("</ol>".to_string());
    }
    out
}

/// Reduce display HTML to prose for the PDF path: tags dropped, the four
/// common entities unescaped, whitespace collapsed, `<br>` back to `\n`.
pub fn strip_for_plaintext(markup: &str) -> String {
    if markup.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = line_break_re()
        .split(markup)
        .map(|segment| {
            let text = tag_re().replace_all(segment, "");
            let text = text
                .replace("&nbsp;", " ")
                .replace("&lt;", "<")
                .replace("&gt;", ">")
                .replace("&amp;", "&");
            whitespace_re().replace_all(&text, " ").trim().to_string()
        })
        .collect();

    lines.join("\n").trim().to_string()
}
