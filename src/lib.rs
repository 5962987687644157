mod block;
mod config;
mod error;
mod html;
mod parser;
mod preview;
mod typst;

pub use block::{Continuation, Document, ELLIPSIS, Paragraph, ReadMore, Span};
pub use config::{Config, LinksConfig, PageConfig, PreviewConfig};
pub use error::{Error, Result};
pub use html::document_to_html;
pub use parser::decode_text;
pub use preview::{
    Preview, biography_preview, build_preview, parse_biography, review_preview, safe_truncate,
};
pub use typst::document_to_typst;

use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_pdf::PdfOptions;

/// Parse review text into a vector of paragraphs.
pub fn parse_document(text: &str) -> Document {
    parser::parse(text)
}

/// Convert a document to PDF bytes.
pub fn document_to_pdf<C: Continuation>(document: &Document<C>, config: &Config) -> Result<Vec<u8>> {
    use typst_library::layout::PagedDocument;

    let typst_content = document_to_typst(document, config);

    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(false);

    let engine = TypstEngine::builder()
        .main_file(typst_content)
        .search_fonts_with(font_options)
        .build();

    let doc: PagedDocument = engine
        .compile()
        .output
        .map_err(|e| Error::Compile(format!("{:?}", e)))?;

    typst_pdf::pdf(&doc, &PdfOptions::default()).map_err(|e| Error::Pdf(format!("{:?}", e)))
}
