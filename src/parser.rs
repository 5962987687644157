use tracing::warn;

use crate::block::{Document, Paragraph, Span};

/// Parse review text into paragraphs of inline spans.
pub fn parse<C>(text: &str) -> Document<C> {
    let paragraphs = split_paragraphs(text)
        .into_iter()
        .map(parse_paragraph)
        .collect();
    Document::new(paragraphs)
}

/// Decode raw input. Bytes that are not valid UTF-8 count as no text at all.
pub fn decode_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| {
        warn!(
            valid_up_to = e.utf8_error().valid_up_to(),
            "input is not valid UTF-8, treating it as empty"
        );
        String::new()
    })
}

/// Split on blank lines (`\r?\n\r?\n`).
pub(crate) fn split_paragraphs(text: &str) -> Vec<&str> {
    split_on(text, |bytes, i| {
        let end = line_break_at(bytes, i)?;
        line_break_at(bytes, end)
    })
}

fn split_lines(paragraph: &str) -> Vec<&str> {
    split_on(paragraph, line_break_at)
}

/// End of a `\r?\n` starting at `i`, if there is one.
fn line_break_at(bytes: &[u8], i: usize) -> Option<usize> {
    let mut j = i;
    if bytes.get(j) == Some(&b'\r') {
        j += 1;
    }
    (bytes.get(j) == Some(&b'\n')).then_some(j + 1)
}

/// Split at every leftmost, non-overlapping separator match.
///
/// Separators are ASCII, so every index handed back by `separator` lands on a
/// char boundary.
fn split_on<'a>(text: &'a str, separator: impl Fn(&[u8], usize) -> Option<usize>) -> Vec<&'a str> {
    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match separator(bytes, i) {
            Some(end) => {
                pieces.push(&text[start..i]);
                start = end;
                i = end;
            }
            None => i += 1,
        }
    }
    pieces.push(&text[start..]);
    pieces
}

fn parse_paragraph<C>(source: &str) -> Paragraph<C> {
    let lines = split_lines(source);
    let mut content = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        parse_line(line, &mut content);
        if i + 1 < lines.len() {
            content.push(Span::LineBreak);
        }
    }

    Paragraph::new(content)
}

/// Scan one line left to right. At each position the markers are tried in
/// priority order; unmatched text accumulates into a single `Text` span.
fn parse_line<C>(line: &str, spans: &mut Vec<Span<C>>) {
    let mut plain_start = 0;
    let mut pos = 0;

    while pos < line.len() {
        match match_marker(&line[pos..]) {
            Some((span, len)) => {
                if plain_start < pos {
                    spans.push(Span::Text(line[plain_start..pos].to_string()));
                }
                spans.push(span);
                pos += len;
                plain_start = pos;
            }
            None => {
                pos += line[pos..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    if plain_start < line.len() {
        spans.push(Span::Text(line[plain_start..].to_string()));
    }
}

/// Try each marker at the start of `rest`. Returns the span and the number of
/// bytes it consumed.
fn match_marker<C>(rest: &str) -> Option<(Span<C>, usize)> {
    // `**` has to win over a single `*`
    if let Some((inner, len)) = nearest_close(rest, "**", "**") {
        return Some((Span::Bold(vec![Span::Text(inner.to_string())]), len));
    }
    let italic = exclusive_run(rest, '_')
        .or_else(|| exclusive_run(rest, '*'))
        .or_else(|| nearest_close(rest, "<em>", "</em>"));

    italic.map(|(inner, len)| (Span::Italic(vec![Span::Text(inner.to_string())]), len))
}

/// `open`, then a non-empty run ending at the nearest `close`. The run may not
/// cross a line terminator.
fn nearest_close<'a>(rest: &'a str, open: &str, close: &str) -> Option<(&'a str, usize)> {
    let body = rest.strip_prefix(open)?;
    let first = body.chars().next()?;
    let skip = first.len_utf8();
    let close_at = skip + body[skip..].find(close)?;
    let inner = &body[..close_at];

    if inner.chars().any(is_line_terminator) {
        return None;
    }
    Some((inner, open.len() + close_at + close.len()))
}

/// `marker`, then a non-empty run without `marker`, then `marker`.
fn exclusive_run(rest: &str, marker: char) -> Option<(&str, usize)> {
    let body = rest.strip_prefix(marker)?;
    let close_at = body.find(marker)?;
    if close_at == 0 {
        return None;
    }
    Some((&body[..close_at], close_at + 2 * marker.len_utf8()))
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}
