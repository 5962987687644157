/// Failures while rendering a document to PDF. Parsing and previewing never fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Typst compilation failed: {0}")]
    Compile(String),
    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
