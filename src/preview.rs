use tracing::debug;

use crate::block::{Document, ELLIPSIS, Paragraph, Span};
use crate::parser;

/// Markers a preview must not leave dangling, `**` first so its halves are
/// not mistaken for single `*`.
const MARKERS: [&str; 3] = ["**", "*", "_"];

/// Paragraphs are rejoined with a blank line, which costs two characters.
const SEPARATOR_COST: usize = 2;

/// A review as it should be shown by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview<C> {
    pub document: Document<C>,
    /// Whether text was cut and the continuation appended.
    pub truncated: bool,
}

/// Cut `text` to at most `limit` characters, then drop any dangling `**`, `*`
/// or `_` together with everything after it.
///
/// Each marker is checked against the output of the previous check. The check
/// anchors on the last occurrence of the marker, so a marker that is present
/// is always cut back to.
pub fn safe_truncate(text: &str, limit: usize) -> &str {
    let mut current = match text.char_indices().nth(limit) {
        Some((end, _)) => &text[..end],
        None => text,
    };

    for marker in MARKERS {
        let Some(open) = current.rfind(marker) else {
            continue;
        };
        let closed = current[open + marker.len()..].contains(marker);
        if !closed {
            current = &current[..open];
        }
    }

    current
}

/// Build a paragraph-structured preview of roughly `max_chars` characters.
///
/// Paragraphs are taken whole while they fit the remaining budget; the first
/// one that does not fit is cut with [`safe_truncate`] and the rest dropped.
/// The continuation, if any, lands after an ellipsis at the end of the last
/// paragraph.
pub fn build_preview<C>(full_text: &str, max_chars: usize, continuation: Option<C>) -> Document<C> {
    let mut remaining = max_chars;
    let mut kept = Vec::new();

    for paragraph in parser::split_paragraphs(full_text) {
        if remaining == 0 {
            break;
        }

        let len = paragraph.chars().count();
        if len <= remaining {
            kept.push(paragraph);
            remaining = remaining.saturating_sub(len + SEPARATOR_COST);
        } else {
            let cut = safe_truncate(paragraph, remaining);
            debug!(
                paragraph = kept.len(),
                budget = remaining,
                kept_chars = cut.chars().count(),
                "truncating paragraph"
            );
            kept.push(cut);
            remaining = 0;
        }
    }

    let document = parser::parse(&kept.join("\n\n"));
    match continuation {
        Some(continuation) => document.append_continuation(continuation),
        None => document,
    }
}

/// Trim the review and, if it is longer than `max_chars`, shorten it to a
/// preview ending in `continuation`. Short reviews come back whole.
pub fn review_preview<C>(content: &str, max_chars: usize, continuation: C) -> Preview<C> {
    let text = content.trim();

    if text.chars().count() <= max_chars {
        return Preview {
            document: parser::parse(text),
            truncated: false,
        };
    }

    debug!(max_chars, "review exceeds preview size");
    Preview {
        document: build_preview(text, max_chars, Some(continuation)),
        truncated: true,
    }
}

/// Split a biography on literal blank lines. Biographies carry no inline
/// formatting, so each paragraph is a single text span.
pub fn parse_biography(biography: &str) -> Document {
    Document::new(biography_paragraphs(biography))
}

/// Cut a biography longer than `max_chars` characters, mark the cut with an
/// ellipsis and put the continuation in a paragraph of its own after the text.
pub fn biography_preview<C>(biography: &str, max_chars: usize, continuation: C) -> Preview<C> {
    let end = match biography.char_indices().nth(max_chars) {
        Some((end, _)) => end,
        None => {
            return Preview {
                document: Document::new(biography_paragraphs(biography)),
                truncated: false,
            };
        }
    };

    debug!(max_chars, "biography exceeds preview size");
    let shortened = format!("{}{ELLIPSIS}", &biography[..end]);
    let mut paragraphs = biography_paragraphs(&shortened);
    paragraphs.push(Paragraph::new(vec![Span::Continuation(continuation)]));

    Preview {
        document: Document::new(paragraphs),
        truncated: true,
    }
}

fn biography_paragraphs<C>(biography: &str) -> Vec<Paragraph<C>> {
    biography
        .split("\n\n")
        .map(|para| match para {
            "" => Paragraph::new(Vec::new()),
            para => Paragraph::new(vec![Span::Text(para.to_string())]),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Paragraph, ReadMore, Span};

    fn text<C>(s: &str) -> Span<C> {
        Span::Text(s.to_string())
    }

    fn link() -> ReadMore {
        ReadMore::new("Read the rest", Some("/review/42".to_string()))
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(safe_truncate("hello world", 5), "hello");
        assert_eq!(safe_truncate("h\u{e9}llo", 2), "h\u{e9}");
        assert_eq!(safe_truncate("short", 50), "short");
        assert_eq!(safe_truncate("anything", 0), "");
    }

    #[test]
    fn truncate_inside_bold_drops_open_marker() {
        let text = "A solid film. **bold text** more";
        // lands between "bo" and "ld"
        let cut = safe_truncate(text, 18);
        assert_eq!(cut, "A solid film. ");
        assert!(!cut.contains("**"));
    }

    #[test]
    fn truncate_inside_italic() {
        assert_eq!(safe_truncate("see *this bit* here", 9), "see ");
        assert_eq!(safe_truncate("see _this bit_ here", 9), "see ");
    }

    #[test]
    fn truncate_cuts_at_last_marker_even_when_closed() {
        // The last `**` is taken as the opener and nothing follows it
        assert_eq!(safe_truncate("**a** b", 7), "*");
        assert_eq!(safe_truncate("x _y_ z", 7), "x _y");
    }

    #[test]
    fn truncate_asterisk_inside_bold() {
        assert_eq!(safe_truncate("**a*b**", 100), "**a");
    }

    #[test]
    fn preview_budget_accounting() {
        let first = "a".repeat(100);
        let second = "b".repeat(50);
        let full = format!("{first}\n\n{second}");

        let doc = build_preview(&full, 120, Some(link()));

        assert_eq!(
            doc,
            Document::new(vec![
                Paragraph::new(vec![text(&first)]),
                Paragraph::new(vec![
                    text(&"b".repeat(18)),
                    text("..."),
                    Span::Continuation(link()),
                ]),
            ])
        );
    }

    #[test]
    fn preview_drops_later_paragraphs() {
        let full = format!("{}\n\nsecond\n\nthird", "x".repeat(40));
        let doc = build_preview(&full, 10, Some(link()));
        assert_eq!(
            doc,
            Document::new(vec![Paragraph::new(vec![
                text(&"x".repeat(10)),
                text("..."),
                Span::Continuation(link()),
            ])])
        );
    }

    #[test]
    fn preview_stops_when_budget_spent_exactly() {
        // 8 + 2 uses the whole budget, so the next paragraph is never started
        let doc = build_preview("12345678\n\nnext", 10, Some(link()));
        assert_eq!(doc.paragraphs.len(), 1);
        assert_eq!(
            doc.paragraphs[0].content,
            vec![text("12345678"), text("..."), Span::Continuation(link())]
        );
    }

    #[test]
    fn preview_of_empty_text() {
        let doc = build_preview("", 50, Some(link()));
        assert_eq!(
            doc,
            Document::new(vec![Paragraph::new(vec![
                text("..."),
                Span::Continuation(link()),
            ])])
        );
    }

    #[test]
    fn zero_budget_keeps_only_continuation() {
        let doc = build_preview("some text", 0, Some(link()));
        assert_eq!(
            doc,
            Document::new(vec![Paragraph::new(vec![
                text("..."),
                Span::Continuation(link()),
            ])])
        );
    }

    #[test]
    fn short_text_without_continuation_matches_full_parse() {
        let full = "**Great** film.\n\nWould watch _again_.";
        let doc: Document<ReadMore> = build_preview(full, 500, None);
        assert_eq!(doc, parser::parse(full));
    }

    #[test]
    fn preview_keeps_formatting_in_whole_paragraphs() {
        let doc = build_preview("*Wow*\n\nwhat a ride", 12, Some(link()));
        assert_eq!(
            doc,
            Document::new(vec![
                Paragraph::new(vec![Span::Italic(vec![text("Wow")])]),
                Paragraph::new(vec![text("what "), text("..."), Span::Continuation(link())]),
            ])
        );
    }

    #[test]
    fn cut_paragraph_loses_its_markers() {
        // "*Wow*, w" ends with a closed pair, but the last `*` is still cut
        let doc = build_preview("*Wow*, what a ride", 8, Some(link()));
        assert_eq!(
            doc.paragraphs[0].content,
            vec![text("*Wow"), text("..."), Span::Continuation(link())]
        );
    }

    #[test]
    fn review_preview_leaves_short_reviews_alone() {
        let preview = review_preview("  Loved it.\n", 500, link());
        assert!(!preview.truncated);
        assert_eq!(
            preview.document,
            Document::new(vec![Paragraph::new(vec![text("Loved it.")])])
        );
    }

    #[test]
    fn review_preview_cuts_long_reviews() {
        let review = format!("{}\n\nThe end.", "word ".repeat(120));
        let preview = review_preview(&review, 500, link());

        assert!(preview.truncated);
        assert_eq!(preview.document.paragraphs.len(), 1);
        let last = preview.document.paragraphs[0].content.last();
        assert_eq!(last, Some(&Span::Continuation(link())));
    }

    #[test]
    fn short_biography_is_split_but_not_parsed() {
        let preview = biography_preview("Born in *Paris*.\n\nActor.", 850, link());
        assert!(!preview.truncated);
        assert_eq!(
            preview.document,
            Document::new(vec![
                Paragraph::new(vec![text("Born in *Paris*.")]),
                Paragraph::new(vec![text("Actor.")]),
            ])
        );
    }

    #[test]
    fn long_biography_is_cut_by_characters() {
        let bio = format!("{}\n\n{}", "a".repeat(6), "b".repeat(10));
        let preview = biography_preview(&bio, 10, link());

        assert!(preview.truncated);
        assert_eq!(
            preview.document,
            Document::new(vec![
                Paragraph::new(vec![text("aaaaaa")]),
                Paragraph::new(vec![text("bb...")]),
                Paragraph::new(vec![Span::Continuation(link())]),
            ])
        );
    }

    #[test]
    fn biography_cut_on_blank_line_gets_bare_ellipsis() {
        let preview = biography_preview("abc\n\ndef", 5, link());
        assert_eq!(
            preview.document.paragraphs[..2],
            [Paragraph::new(vec![text("abc")]), Paragraph::new(vec![text("...")])]
        );
    }

    #[test]
    fn biography_keeps_single_newlines_and_crlf() {
        let doc = parse_biography("one\ntwo\r\n\r\nthree");
        assert_eq!(
            doc,
            Document::new(vec![Paragraph::new(vec![text("one\ntwo\r\n\r\nthree")])])
        );
    }
}
