use std::fmt::Debug;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use reviewfmt::{
    Config, Continuation, Document, Preview, ReadMore, biography_preview, decode_text,
    document_to_html, document_to_pdf, document_to_typst, parse_biography, parse_document,
    review_preview,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reviewfmt")]
#[command(about = "Format review text, cutting long reviews down to a preview")]
struct Cli {
    /// Input text file, or `-` for stdin
    input: PathBuf,

    /// Output file (defaults to stdout, or the input name with .pdf for PDF)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Render the whole text instead of a preview
    #[arg(long)]
    full: bool,

    /// Treat the input as a biography: plain paragraphs, no inline formatting
    #[arg(long)]
    biography: bool,

    /// Preview size in characters (overrides the config)
    #[arg(long)]
    max_chars: Option<usize>,

    /// Link target for the "read the rest" continuation
    #[arg(long)]
    read_more_url: Option<String>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log preview decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Html,
    Typst,
    Pdf,
    /// Plain text with formatting markers removed
    Text,
    /// Debug dump of the parsed tree
    Tree,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load(path),
        None => Config::compiled_default(),
    };
    debug!(?config, "loaded config");

    // Read input
    let text = match read_input(&cli.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading {}: {}", cli.input.display(), e);
            std::process::exit(1);
        }
    };

    let preview_config = &config.preview;
    let rendered = match (cli.full, cli.biography) {
        (true, false) => render(&parse_document(&text), cli.format, &config),
        (true, true) => render(&parse_biography(&text), cli.format, &config),
        (false, false) => {
            let max_chars = cli.max_chars.unwrap_or(preview_config.max_chars);
            let link = ReadMore::new(&preview_config.read_more_label, cli.read_more_url.clone());
            render_preview(review_preview(&text, max_chars, link), cli.format, &config)
        }
        (false, true) => {
            let max_chars = cli.max_chars.unwrap_or(preview_config.biography_max_chars);
            let link = ReadMore::new(
                &preview_config.biography_read_more_label,
                cli.read_more_url.clone(),
            );
            render_preview(biography_preview(&text, max_chars, link), cli.format, &config)
        }
    };

    let bytes = match rendered {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // PDF never goes to stdout
    let output = match (cli.output, cli.format) {
        (Some(path), _) => Some(path),
        (None, Format::Pdf) => Some(default_pdf_path(&cli.input)),
        (None, _) => None,
    };

    match output {
        Some(path) => {
            if let Err(e) = fs::write(&path, bytes) {
                eprintln!("Error writing {}: {}", path.display(), e);
                std::process::exit(1);
            }
            println!("Created {}", path.display());
        }
        None => {
            if let Err(e) = io::stdout().write_all(&bytes) {
                eprintln!("Error writing output: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "reviewfmt=debug"
    } else {
        "reviewfmt=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(input: &Path) -> io::Result<String> {
    let bytes = if input.as_os_str() == "-" {
        let mut bytes = Vec::new();
        io::stdin().read_to_end(&mut bytes)?;
        bytes
    } else {
        fs::read(input)?
    };
    Ok(decode_text(bytes))
}

fn default_pdf_path(input: &Path) -> PathBuf {
    if input.as_os_str() == "-" {
        PathBuf::from("review.pdf")
    } else {
        input.with_extension("pdf")
    }
}

fn render_preview<C: Continuation + Debug>(
    preview: Preview<C>,
    format: Format,
    config: &Config,
) -> reviewfmt::Result<Vec<u8>> {
    if preview.truncated {
        info!("rendering preview");
    }
    render(&preview.document, format, config)
}

fn render<C: Continuation + Debug>(
    document: &Document<C>,
    format: Format,
    config: &Config,
) -> reviewfmt::Result<Vec<u8>> {
    match format {
        Format::Html => Ok(document_to_html(document).into_bytes()),
        Format::Typst => Ok(document_to_typst(document, config).into_bytes()),
        Format::Pdf => document_to_pdf(document, config),
        Format::Text => Ok(format!("{}\n", document.plain_text()).into_bytes()),
        Format::Tree => Ok(format!("{:#?}\n", document).into_bytes()),
    }
}
