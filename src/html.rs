use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd, html};

use crate::block::{Continuation, Document, Span};

/// Render a document as HTML fragments (`<p>`, `<strong>`, `<em>`, `<br />`).
pub fn document_to_html<C: Continuation>(document: &Document<C>) -> String {
    let mut out = String::new();
    html::push_html(&mut out, document_events(document).into_iter());
    out
}

/// Lower the tree to the event stream pulldown-cmark renders from.
fn document_events<C: Continuation>(document: &Document<C>) -> Vec<Event<'_>> {
    let mut events = Vec::new();
    for paragraph in &document.paragraphs {
        events.push(Event::Start(Tag::Paragraph));
        spans_to_events(&paragraph.content, &mut events);
        events.push(Event::End(TagEnd::Paragraph));
    }
    events
}

fn spans_to_events<'a, C: Continuation>(spans: &'a [Span<C>], events: &mut Vec<Event<'a>>) {
    for span in spans {
        match span {
            Span::Text(text) => events.push(Event::Text(CowStr::Borrowed(text))),
            Span::Bold(inner) => {
                events.push(Event::Start(Tag::Strong));
                spans_to_events(inner, events);
                events.push(Event::End(TagEnd::Strong));
            }
            Span::Italic(inner) => {
                events.push(Event::Start(Tag::Emphasis));
                spans_to_events(inner, events);
                events.push(Event::End(TagEnd::Emphasis));
            }
            Span::LineBreak => events.push(Event::HardBreak),
            Span::Continuation(continuation) => continuation_events(continuation, events),
        }
    }
}

fn continuation_events<'a, C: Continuation>(continuation: &'a C, events: &mut Vec<Event<'a>>) {
    let label = Event::Text(CowStr::Borrowed(continuation.label()));
    match continuation.href() {
        Some(href) => {
            events.push(Event::Start(Tag::Link {
                link_type: LinkType::Inline,
                dest_url: CowStr::Borrowed(href),
                title: CowStr::Borrowed(""),
                id: CowStr::Borrowed(""),
            }));
            events.push(label);
            events.push(Event::End(TagEnd::Link));
        }
        None => events.push(label),
    }
}
