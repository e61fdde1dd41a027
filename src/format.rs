//! Presentation helpers
//!
//! `format_message` turns chat text into a small inline markup:
//! - newline → `<br>`
//! - `**x**` → `<strong>x</strong>`
//! - `*x*` → `<em>x</em>`
//! - `` `x` `` → `<code>x</code>`
//!
//! applied in that order, non-recursively. `&`, `<` and `>` in the text are
//! escaped first so user content can never produce markup of its own.
//! `parse_markup` reads the result back into styled fragments for the
//! terminal renderer.

use chrono::{DateTime, Local, TimeZone};
use regex::Regex;
use std::sync::LazyLock;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("italic pattern is valid"));
static CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`(.*?)`").expect("code pattern is valid"));
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<br>|</?strong>|</?em>|</?code>").expect("tag pattern is valid")
});

/// Escape the characters that would otherwise be read as markup
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape`]
pub fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Apply the inline markup transforms to `text`
pub fn format_message(text: &str) -> String {
    let escaped = escape(text).replace('\n', "<br>");
    let bold = BOLD.replace_all(&escaped, "<strong>$1</strong>");
    let italic = ITALIC.replace_all(&bold, "<em>$1</em>");
    CODE.replace_all(&italic, "<code>$1</code>").into_owned()
}

/// Render `t` as hour:minute in the viewer's local time
pub fn format_timestamp<Tz: TimeZone>(t: &DateTime<Tz>) -> String {
    t.with_timezone(&Local).format("%H:%M").to_string()
}

/// A run of text sharing one style
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// Unescaped text
    pub text: String,
    /// Inside `<strong>`
    pub bold: bool,
    /// Inside `<em>`
    pub italic: bool,
    /// Inside `<code>`
    pub code: bool,
}

/// Parse markup produced by [`format_message`] into lines of fragments
///
/// Each `<br>` starts a new line. Unbalanced tags are tolerated: a closing
/// tag without an opener is ignored and an unclosed tag runs to the end.
pub fn parse_markup(markup: &str) -> Vec<Vec<Fragment>> {
    let mut lines = vec![Vec::new()];
    let (mut bold, mut italic, mut code) = (0usize, 0usize, 0usize);
    let mut cursor = 0;

    for tag in TAG.find_iter(markup) {
        push_fragment(&mut lines, &markup[cursor..tag.start()], bold, italic, code);
        cursor = tag.end();

        match tag.as_str() {
            "<br>" => lines.push(Vec::new()),
            "<strong>" => bold += 1,
            "</strong>" => bold = bold.saturating_sub(1),
            "<em>" => italic += 1,
            "</em>" => italic = italic.saturating_sub(1),
            "<code>" => code += 1,
            "</code>" => code = code.saturating_sub(1),
            _ => {}
        }
    }
    push_fragment(&mut lines, &markup[cursor..], bold, italic, code);

    lines
}

fn push_fragment(lines: &mut [Vec<Fragment>], raw: &str, bold: usize, italic: usize, code: usize) {
    if raw.is_empty() {
        return;
    }
    if let Some(line) = lines.last_mut() {
        line.push(Fragment {
            text: unescape(raw),
            bold: bold > 0,
            italic: italic > 0,
            code: code > 0,
        });
    }
}
