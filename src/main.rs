use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mdpdf::{Config, DocumentMeta};

#[derive(Parser)]
#[command(name = "mdpdf")]
#[command(about = "Convert Markdown files to paginated PDF documents")]
struct Cli {
    /// Input Markdown files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output PDF file (only with a single input; defaults to input name with .pdf extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (defaults to mdpdf.toml in the working directory, if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the generated Typst markup instead of writing a PDF
    #[arg(long)]
    typst: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.output.is_some() && cli.inputs.len() > 1 {
        eprintln!("Error: --output can only be used with a single input");
        return ExitCode::FAILURE;
    }

    let config = match &cli.config {
        Some(path) => Config::load(path),
        None => Config::load(Path::new("mdpdf.toml")),
    };

    let mut failed = false;
    for input in &cli.inputs {
        let result = if cli.typst {
            print_typst(input, &config)
        } else {
            let output = cli
                .output
                .clone()
                .unwrap_or_else(|| input.with_extension("pdf"));
            mdpdf::render_document_with_config(input, &output, &config)
                .map(|_| println!("Generated PDF: {}", output.display()))
        };

        // One bad document does not stop the rest.
        if let Err(e) = result {
            eprintln!("Error converting {}: {}", input.display(), e);
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_typst(input: &Path, config: &Config) -> mdpdf::Result<()> {
    let markdown = fs::read_to_string(input).map_err(|e| mdpdf::Error::ReadSource {
        path: input.to_path_buf(),
        source: e,
    })?;
    let base_dir = input.parent().unwrap_or(Path::new(""));
    let meta = DocumentMeta::for_source(input, config);
    println!("{}", mdpdf::markdown_to_typst(&markdown, base_dir, meta, config));
    Ok(())
}
