//! PDF Form Fill CLI tool
//!
//! A command-line tool for merging PDFs and filling PDF forms.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use pdf_formfill::form::{editable_fields, values_template, Control, FormIndex, FormValues};
use pdf_formfill::pdf::{extract_metadata, fill_pdf, merge_pdfs, FillOptions, MergeOptions};

/// PDF Form Fill - Merge PDFs and fill PDF forms
#[derive(Parser)]
#[command(name = "pdf-formfill")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Merge numbered PDFs in order
    pdf-formfill merge -o packet.pdf \"[0-9]*.pdf\"

    # Fill a form from a JSON file and flatten it
    pdf-formfill fill form.pdf filled.pdf --values values.json

    # Write a values template to edit
    pdf-formfill fields form.pdf --template > values.json

    # Fill but keep the form editable
    pdf-formfill fill form.pdf filled.pdf --values values.json --no-flatten")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge multiple PDF files into one
    Merge {
        /// Input PDF files (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Fill form fields and flatten the result
    Fill {
        /// PDF containing the form
        input: PathBuf,

        /// Output PDF file path
        output: PathBuf,

        /// JSON object mapping field keys to values (built-in example values if omitted)
        #[arg(long)]
        values: Option<PathBuf>,

        /// Keep the form interactive instead of baking values into the pages
        #[arg(long)]
        no_flatten: bool,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// List the editable fields of a form
    Fields {
        /// PDF containing the form
        input: PathBuf,

        /// Print a JSON values template instead of the field list
        #[arg(long)]
        template: bool,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Merge { inputs, output, open } => cmd_merge(inputs, output, open),
        Commands::Fill {
            input,
            output,
            values,
            no_flatten,
            open,
        } => cmd_fill(input, output, values, !no_flatten, open),
        Commands::Fields { input, template } => cmd_fields(input, template),
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Log to stderr, `warn` unless `RUST_LOG` says otherwise
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Expand glob patterns in input paths
///
/// Matches of one pattern are sorted; arguments keep their command-line order.
fn expand_globs(patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matches = Vec::new();
            for entry in glob(&pattern).with_context(|| format!("Invalid pattern: {}", pattern))? {
                match entry {
                    Ok(path) => matches.push(path),
                    Err(e) => eprintln!("Warning: glob error for {}: {}", pattern, e),
                }
            }
            if matches.is_empty() {
                bail!("No files matched pattern: {}", pattern);
            }
            matches.sort();
            paths.extend(matches);
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }

    Ok(paths)
}

/// Open a file with the system default application
fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("Input file not found: {}", path.display());
    }
    Ok(())
}

/// Merge multiple PDFs into one
fn cmd_merge(inputs: Vec<String>, output: PathBuf, open: bool) -> Result<()> {
    let inputs = expand_globs(inputs)?;
    for path in &inputs {
        ensure_exists(path)?;
    }

    eprintln!("Merging {} PDF files...", inputs.len());

    let options = MergeOptions {
        input_paths: inputs,
        output_path: output.clone(),
    };
    merge_pdfs(&options).context("Failed to merge PDFs")?;

    eprintln!("Merged to: {}", output.display());

    if open {
        open_file(&output)?;
    }

    Ok(())
}

/// Fill a form, flattening unless asked not to
fn cmd_fill(
    input: PathBuf,
    output: PathBuf,
    values: Option<PathBuf>,
    flatten: bool,
    open: bool,
) -> Result<()> {
    ensure_exists(&input)?;

    let values = match values {
        Some(path) => FormValues::load(&path)
            .with_context(|| format!("Failed to read values from {}", path.display()))?,
        None => {
            eprintln!("No --values given, using example values");
            FormValues::example()
        }
    };

    eprintln!(
        "Filling {} with {} values{}...",
        input.display(),
        values.len(),
        if flatten { " and flattening" } else { "" }
    );

    let options = FillOptions {
        input_path: input.clone(),
        output_path: output.clone(),
        flatten,
        ..Default::default()
    };
    let report = fill_pdf(&options, &values)
        .with_context(|| format!("Failed to fill {}", input.display()))?;

    eprintln!(
        "Filled {} widgets ({} text, {} checkboxes, {} choices), {} left untouched",
        report.filled(),
        report.text,
        report.checkboxes,
        report.choices,
        report.untouched
    );
    eprintln!("Output: {}", output.display());

    if open {
        open_file(&output)?;
    }

    Ok(())
}

/// List editable fields or print a values template
fn cmd_fields(input: PathBuf, template: bool) -> Result<()> {
    ensure_exists(&input)?;

    let doc = lopdf::Document::load(&input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let index = FormIndex::build(&doc)?;
    let fields = editable_fields(&index);

    if template {
        println!("{}", values_template(&fields).to_json_pretty()?);
        return Ok(());
    }

    if fields.is_empty() {
        eprintln!("No fillable fields found");
        return Ok(());
    }

    for field in &fields {
        let control = match &field.control {
            Control::Entry => "text".to_string(),
            Control::Checkbox => "checkbox".to_string(),
            Control::Combo { labels } => format!("combo [{}]", labels.join(", ")),
            Control::MultiSelect { labels } => format!("multi-select [{}]", labels.join(", ")),
        };
        println!("p{}\t{}\t{}", field.page_number, field.label, control);
    }

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> Result<()> {
    ensure_exists(&input)?;

    let metadata = extract_metadata(&input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }
    if metadata.has_acroform || metadata.form_widgets > 0 {
        println!("Form widgets: {}", metadata.form_widgets);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_expand_globs_keeps_argument_order() {
        let paths = expand_globs(vec!["b.pdf".to_string(), "a.pdf".to_string()]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("b.pdf"), PathBuf::from("a.pdf")]);
    }

    #[test]
    fn test_expand_globs_sorts_within_a_pattern() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for name in ["2.pdf", "1.pdf", "3.pdf"] {
            fs::write(temp_dir.path().join(name), b"").unwrap();
        }
        let pattern = temp_dir.path().join("*.pdf").display().to_string();
        let last = temp_dir.path().join("0-cover.pdf").display().to_string();

        let paths = expand_globs(vec![pattern, last]).unwrap();
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["1.pdf", "2.pdf", "3.pdf", "0-cover.pdf"]);
    }

    #[test]
    fn test_expand_globs_unmatched_pattern() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let pattern = temp_dir.path().join("*.pdf").display().to_string();
        assert!(expand_globs(vec![pattern]).is_err());
    }
}
