use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doc_model::PdfFormat;
use md_editor_ui::{compose_document, extract_rules_containing};
use pdf_export::{PdfPrinter, PrintJob};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Parser)]
#[command(name = "md-editor-cli")]
#[command(about = "Markdown editor CLI")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Open a Markdown file in the desktop app.
    Open {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print machine-readable document metadata.
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Render a Markdown file to a standalone HTML document.
    Render {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long)]
        stylesheet: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Export a Markdown file to PDF.
    ExportPdf {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long)]
        stylesheet: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "a4")]
        paper_format: String,
        #[arg(long)]
        landscape: bool,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct InfoOutput {
    path: String,
    title: Option<String>,
    headings: usize,
    words: usize,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Open { file } => run_open(&file),
        Commands::Info { file } => run_info(&file),
        Commands::Render { file, stylesheet, output } => {
            run_render(&file, stylesheet.as_deref(), output.as_deref())
        }
        Commands::ExportPdf { file, stylesheet, output, paper_format, landscape } => {
            run_export_pdf(&file, stylesheet.as_deref(), output.as_deref(), &paper_format, landscape)
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_open(file: &Path) -> Result<()> {
    ensure_markdown_exists(file)?;

    if std::env::var_os("MD_EDITOR_TEST_NO_SPAWN").is_some() {
        println!("open:{}", file.display());
        return Ok(());
    }

    let desktop_bin =
        std::env::var_os("MD_EDITOR_APP_BIN").unwrap_or_else(|| OsString::from("md-editor"));

    let status =
        Command::new(desktop_bin).arg(file).status().context("failed to launch desktop app")?;

    if !status.success() {
        anyhow::bail!("desktop app exited with status {status}");
    }

    Ok(())
}

fn run_info(file: &Path) -> Result<()> {
    ensure_markdown_exists(file)?;

    let source = fs::read_to_string(file).context("failed to read Markdown file")?;

    let payload = InfoOutput {
        path: file.display().to_string(),
        title: markdown_render::first_heading(&source),
        headings: markdown_render::heading_count(&source),
        words: source.split_whitespace().count(),
    };

    let json = serde_json::to_string_pretty(&payload)?;
    println!("{json}");

    Ok(())
}

fn read_stylesheet(stylesheet: Option<&Path>) -> Result<String> {
    match stylesheet {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read stylesheet {}", path.display())),
        None => Ok(String::new()),
    }
}

fn render_document(file: &Path, css: &str) -> Result<String> {
    let source = fs::read_to_string(file).context("failed to read Markdown file")?;
    let rendered = markdown_render::render(&source);

    Ok(compose_document(&rendered.html, rendered.title.as_deref(), css))
}

fn run_render(file: &Path, stylesheet: Option<&Path>, output: Option<&Path>) -> Result<()> {
    ensure_markdown_exists(file)?;

    let css = read_stylesheet(stylesheet)?;
    let document = render_document(file, &css)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, document)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("{}", path.display());
        }
        None => println!("{document}"),
    }

    Ok(())
}

fn run_export_pdf(
    file: &Path,
    stylesheet: Option<&Path>,
    output: Option<&Path>,
    paper_format: &str,
    landscape: bool,
) -> Result<()> {
    ensure_markdown_exists(file)?;

    let css = read_stylesheet(stylesheet)?;
    let html = render_document(file, &css)?;

    let format = PdfFormat {
        paper_format: paper_format.to_owned(),
        landscape,
        ..PdfFormat::default()
    };
    let job = PrintJob {
        html,
        header: style_fragment(&extract_rules_containing(&css, "header")),
        footer: style_fragment(&extract_rules_containing(&css, "footer")),
        format,
    };

    let mut printer = pdf_export::default_printer();
    let bytes = printer.print(&job).context("failed to print PDF")?;

    let output = output.map(ToOwned::to_owned).unwrap_or_else(|| file.with_extension("pdf"));
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, bytes)
        .with_context(|| format!("failed to write PDF to {}", output.display()))?;

    println!("{}", output.display());

    Ok(())
}

fn style_fragment(rules: &str) -> String {
    if rules.is_empty() {
        String::new()
    } else {
        format!("<style>{rules}</style>")
    }
}

fn ensure_markdown_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}
