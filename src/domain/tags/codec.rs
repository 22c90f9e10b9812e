//! Inline tag codec for annotated clinical text
//!
//! Annotated documents carry entity markup inline, e.g.
//! `Pasienten er <Age>54</Age> år gammel.` This module converts such text
//! into the three derived forms downstream tooling needs: the plain text a
//! reader sees, a redacted surrogate, and labeled character-offset spans
//! into the plain text.
//!
//! The matching rule is deliberately simple and identical across all three
//! operations: `<name>` where name is a (possibly empty) run of word
//! characters, content without any `<`, then `</name>` with the same name.
//! Nested or malformed markup therefore never matches; it passes through
//! untouched rather than failing the whole document, because the texts come
//! from a language model and are routinely imperfect.
//!
//! All offsets are CHARACTER offsets, never bytes. The corpus is Norwegian
//! and multi-byte letters are everywhere; annotation-review tools count
//! characters.

use serde::Serialize;

/// A labeled character range in plain (untagged) text.
///
/// Offsets are half-open `[start, end)` character indices into the output
/// of [`strip_tags`] for the same document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl Span {
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Span {
            start,
            end,
            label: label.into(),
        }
    }
}

/// One matched tag pair, positioned by byte offsets into the source text.
#[derive(Debug, Clone, PartialEq)]
struct TagMatch<'a> {
    /// Byte offset of the opening `<`.
    start: usize,
    /// Byte offset one past the closing `>`.
    end: usize,
    name: &'a str,
    content: &'a str,
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Try to match a complete tag pair whose opening `<` sits at byte offset
/// `open`. Returns `None` when the text at that position is not a pair.
fn match_at(text: &str, open: usize) -> Option<TagMatch<'_>> {
    let name_start = open + 1;
    let mut name_end = name_start;
    for c in text[name_start..].chars() {
        if !is_name_char(c) {
            break;
        }
        name_end += c.len_utf8();
    }
    if !text[name_end..].starts_with('>') {
        return None;
    }

    // Content may not contain '<'; the first '<' after the open marker must
    // begin the close marker or the match fails. This is what makes nested
    // markup unsupported.
    let content_start = name_end + 1;
    let content_end = content_start + text[content_start..].find('<')?;

    let name = &text[name_start..name_end];
    let close = &text[content_end..];
    if close.starts_with("</")
        && close[2..].starts_with(name)
        && close[2 + name.len()..].starts_with('>')
    {
        Some(TagMatch {
            start: open,
            end: content_end + name.len() + 3,
            name,
            content: &text[content_start..content_end],
        })
    } else {
        None
    }
}

/// Iterate matched tag pairs left to right, non-overlapping. After a failed
/// attempt scanning resumes at the next `<`; after a success, at the match
/// end.
fn matches(text: &str) -> impl Iterator<Item = TagMatch<'_>> {
    let mut pos = 0;
    std::iter::from_fn(move || {
        while let Some(rel) = text[pos..].find('<') {
            let open = pos + rel;
            if let Some(m) = match_at(text, open) {
                pos = m.end;
                return Some(m);
            }
            pos = open + 1;
        }
        None
    })
}

/// Remove all tag markup, keeping the enclosed content.
///
/// Unmatched or nested markup is left in place verbatim.
///
/// # Examples
///
/// ```
/// use deidgen::domain::tags::strip_tags;
///
/// let tagged = "Innlagt ved <Health_Care_Unit>Ullevål</Health_Care_Unit>.";
/// assert_eq!(strip_tags(tagged), "Innlagt ved Ullevål.");
/// ```
pub fn strip_tags(doc: &str) -> String {
    let mut output = String::with_capacity(doc.len());
    let mut tail = 0;
    for m in matches(doc) {
        output.push_str(&doc[tail..m.start]);
        output.push_str(m.content);
        tail = m.end;
    }
    output.push_str(&doc[tail..]);
    output
}

/// Replace each matched tag pair (markup and content) with a bracketed
/// label token, producing a de-identified surrogate text.
///
/// # Examples
///
/// ```
/// use deidgen::domain::tags::redact_tags;
///
/// let tagged = "Pasienten heter <First_Name>Kari</First_Name>.";
/// assert_eq!(redact_tags(tagged), "Pasienten heter [First_Name].");
/// ```
pub fn redact_tags(doc: &str) -> String {
    let mut output = String::with_capacity(doc.len());
    let mut tail = 0;
    for m in matches(doc) {
        output.push_str(&doc[tail..m.start]);
        output.push('[');
        output.push_str(m.name);
        output.push(']');
        tail = m.end;
    }
    output.push_str(&doc[tail..]);
    output
}

/// List the annotated spans of a tagged document, with offsets into the
/// corresponding [`strip_tags`] output rather than into `doc` itself.
///
/// Each matched pair consumes `2 * chars(name) + 5` characters of markup
/// (`<name>` plus `</name>`); a running total of markup consumed so far is
/// subtracted from the raw match offsets. When `allowed` is given, spans
/// with other labels are dropped from the result, but their markup still
/// advances the running total since it is still removed from the text.
///
/// # Examples
///
/// ```
/// use deidgen::domain::tags::{list_annotations, Span};
///
/// let spans = list_annotations("Alder: <Age>54</Age>", None);
/// assert_eq!(spans, vec![Span::new(7, 9, "Age")]);
/// ```
pub fn list_annotations(doc: &str, allowed: Option<&[&str]>) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut markup_offset = 0;
    // Byte and character positions of the previous match end, so each raw
    // character offset is computed from the gap since the last match instead
    // of rescanning from the start of the document.
    let mut prev_end_byte = 0;
    let mut prev_end_char = 0;

    for m in matches(doc) {
        let match_start = prev_end_char + doc[prev_end_byte..m.start].chars().count();
        let match_chars = doc[m.start..m.end].chars().count();
        let markup_chars = 2 * m.name.chars().count() + 5;

        let start = match_start - markup_offset;
        let end = match_start + match_chars - markup_offset - markup_chars;

        markup_offset += markup_chars;
        prev_end_byte = m.end;
        prev_end_char = match_start + match_chars;

        if let Some(allowed) = allowed {
            if !allowed.contains(&m.name) {
                continue;
            }
        }
        spans.push(Span::new(start, end, m.name));
    }
    spans
}
