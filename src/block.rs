use std::convert::Infallible;

/// Text appended before a continuation when a preview is cut short.
pub const ELLIPSIS: &str = "...";

/// Inline text spans with formatting
///
/// `C` is the caller's continuation type. Documents parsed without a preview
/// use `Infallible`, so they can never hold one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span<C = Infallible> {
    Text(String),
    /// Bold and italic content is never re-parsed for further markers.
    Bold(Vec<Span<C>>),
    Italic(Vec<Span<C>>),
    LineBreak,
    Continuation(C),
}

/// One block of text, separated from its neighbours by a blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph<C = Infallible> {
    pub content: Vec<Span<C>>,
}

/// Paragraphs in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<C = Infallible> {
    pub paragraphs: Vec<Paragraph<C>>,
}

/// Something a renderer can draw at the end of a preview.
pub trait Continuation {
    fn label(&self) -> &str;

    /// Link target, if the continuation should render as a link.
    fn href(&self) -> Option<&str> {
        None
    }
}

impl Continuation for Infallible {
    fn label(&self) -> &str {
        match *self {}
    }
}

/// The stock "read the rest" link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadMore {
    pub label: String,
    pub href: Option<String>,
}

impl ReadMore {
    pub fn new(label: impl Into<String>, href: Option<String>) -> Self {
        Self {
            label: label.into(),
            href,
        }
    }
}

impl Continuation for ReadMore {
    fn label(&self) -> &str {
        &self.label
    }

    fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }
}

impl<C> Paragraph<C> {
    pub fn new(content: Vec<Span<C>>) -> Self {
        Self { content }
    }

    /// Returns this paragraph with an ellipsis and the continuation appended inline.
    pub fn with_trailer(mut self, continuation: C) -> Self {
        self.content.push(Span::Text(ELLIPSIS.to_string()));
        self.content.push(Span::Continuation(continuation));
        self
    }
}

impl<C: Continuation> Paragraph<C> {
    /// Flatten back to text, with line breaks as `\n`.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        push_plain_text(&self.content, &mut out);
        out
    }
}

impl<C> Document<C> {
    pub fn new(paragraphs: Vec<Paragraph<C>>) -> Self {
        Self { paragraphs }
    }

    /// Rebuild the last paragraph with the continuation spliced onto its end.
    pub fn append_continuation(mut self, continuation: C) -> Self {
        if let Some(last) = self.paragraphs.pop() {
            self.paragraphs.push(last.with_trailer(continuation));
        }
        self
    }

    /// Number of `LineBreak` spans across all paragraphs.
    #[cfg(test)]
    pub(crate) fn line_break_count(&self) -> usize {
        self.paragraphs
            .iter()
            .flat_map(|p| p.content.iter())
            .filter(|span| matches!(span, Span::LineBreak))
            .count()
    }
}

impl<C: Continuation> Document<C> {
    /// Flatten back to text, with paragraphs joined by a blank line.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn push_plain_text<C: Continuation>(spans: &[Span<C>], out: &mut String) {
    for span in spans {
        match span {
            Span::Text(text) => out.push_str(text),
            Span::Bold(inner) | Span::Italic(inner) => push_plain_text(inner, out),
            Span::LineBreak => out.push('\n'),
            Span::Continuation(continuation) => out.push_str(continuation.label()),
        }
    }
}
