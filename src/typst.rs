use crate::block::{Continuation, Document, Span};
use crate::config::Config;

/// Convert a document to Typst markup
pub fn document_to_typst<C: Continuation>(document: &Document<C>, config: &Config) -> String {
    let mut out = String::new();

    // Knuth-Plass line breaking across each paragraph
    out.push_str("#set par(linebreaks: \"optimized\")\n");
    if config.page.numbers {
        out.push_str("#set page(numbering: \"1\")\n");
    }
    push_link_style(config, &mut out);
    out.push('\n');

    for paragraph in &document.paragraphs {
        spans_to_typst(&paragraph.content, &mut out);
        out.push('\n');
        out.push('\n');
    }

    out
}

fn push_link_style(config: &Config, out: &mut String) {
    out.push_str("#show link: set text(fill: rgb(");
    push_string_literal(&config.links.color, out);
    out.push_str("))\n");
    if config.links.underline {
        out.push_str("#show link: underline\n");
    }
}

fn spans_to_typst<C: Continuation>(spans: &[Span<C>], out: &mut String) {
    let mut line_start = true;
    for span in spans {
        span_to_typst(span, line_start, out);
        line_start = matches!(span, Span::LineBreak);
    }
}

// Embedded calls end in `;` so a following `(` or `.x` stays text
fn span_to_typst<C: Continuation>(span: &Span<C>, line_start: bool, out: &mut String) {
    match span {
        Span::Text(text) if line_start => push_line_start(text, out),
        Span::Text(text) => push_escaped(text, out),
        // Function syntax, since `*`/`_` markup does not open inside a word
        Span::Bold(inner) => {
            out.push_str("#strong[");
            spans_to_typst(inner, out);
            out.push_str("];");
        }
        Span::Italic(inner) => {
            out.push_str("#emph[");
            spans_to_typst(inner, out);
            out.push_str("];");
        }
        Span::LineBreak => {
            out.push_str(" \\\n");
        }
        Span::Continuation(continuation) => match continuation.href() {
            Some(href) => {
                out.push_str("#link(");
                push_string_literal(href, out);
                out.push_str(")[");
                push_escaped(continuation.label(), out);
                out.push_str("];");
            }
            None => push_escaped(continuation.label(), out),
        },
    }
}

/// Text opening a line: `12.` there would start a numbered list.
fn push_line_start(text: &str, out: &mut String) {
    let indent = text.len() - text.trim_start_matches([' ', '\t']).len();
    let digits = text[indent..].bytes().take_while(u8::is_ascii_digit).count();
    let dot = indent + digits;

    if digits > 0 && text[dot..].starts_with('.') {
        push_escaped(&text[..dot], out);
        out.push_str("\\.");
        push_escaped(&text[dot + 1..], out);
    } else {
        push_escaped(text, out);
    }
}

/// Escape special Typst characters in markup
fn push_escaped(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '#' | '*' | '_' | '@' | '$' | '\\' | '`' | '<' | '>' | '[' | ']' | '=' | '-' | '+'
            | '/' | '~' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' | '\r' | '\u{2028}' | '\u{2029}' => out.push(' '),
            _ => out.push(ch),
        }
    }
}

fn push_string_literal(value: &str, out: &mut String) {
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out.push('"');
}
