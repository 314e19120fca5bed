//! Flattening filled forms into static page content

use std::path::{Path, PathBuf};

use lopdf::{Document, Object};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::form::classify::{inherited, FieldKind};
use crate::form::fill::{fill_fields, FillReport};
use crate::form::index::{FieldEntry, FormIndex, OFF_STATE};
use crate::form::value::FormValues;
use crate::layout::{check_mark, single_line, stacked_lines, FlattenOptions, Rect};
use crate::pdf::overlay::{stamp_overlay, OverlayCanvas};
use crate::pdf::page::media_box;
use crate::text::object_text;

/// Options for filling a form file
#[derive(Debug, Clone)]
pub struct FillOptions {
    /// PDF with the form to fill
    pub input_path: PathBuf,
    /// Where the filled PDF is written
    pub output_path: PathBuf,
    /// Bake values into page content and drop the form
    pub flatten: bool,
    /// Layout used when flattening
    pub layout: FlattenOptions,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            input_path: PathBuf::new(),
            output_path: PathBuf::new(),
            flatten: true,
            layout: FlattenOptions::default(),
        }
    }
}

/// Fill a PDF form from `values` and save it, flattened unless disabled.
///
/// # Example
///
/// ```no_run
/// use pdf_formfill::form::FormValues;
/// use pdf_formfill::pdf::{fill_pdf, FillOptions};
/// use std::path::PathBuf;
///
/// let options = FillOptions {
///     input_path: PathBuf::from("form.pdf"),
///     output_path: PathBuf::from("filled.pdf"),
///     ..Default::default()
/// };
///
/// fill_pdf(&options, &FormValues::example()).expect("Failed to fill form");
/// ```
pub fn fill_pdf(options: &FillOptions, values: &FormValues) -> Result<FillReport> {
    if !options.input_path.exists() {
        return Err(Error::FileNotFound(options.input_path.clone()));
    }

    let mut doc = Document::load(&options.input_path)?;
    if doc.get_pages().is_empty() {
        return Err(Error::EmptyPdf(options.input_path.clone()));
    }

    let index = FormIndex::build(&doc)?;
    let report = fill_fields(&mut doc, &index, values)?;

    let mut doc = if options.flatten {
        flatten(doc, &options.layout)?
    } else {
        doc
    };

    doc.compress();
    save(&mut doc, &options.output_path)?;
    Ok(report)
}

fn save(doc: &mut Document, path: &Path) -> Result<()> {
    doc.save(path)?;
    info!(path = %path.display(), "saved document");
    Ok(())
}

/// Draw every widget's current value onto its page and remove the form.
///
/// Page order and geometry are unchanged. Flattening a document without
/// widgets only removes an empty AcroForm, so a second pass is a no-op.
pub fn flatten(mut doc: Document, options: &FlattenOptions) -> Result<Document> {
    let index = FormIndex::build(&doc)?;
    let pages = doc.get_pages();

    let mut canvas = OverlayCanvas::new();
    let mut drawn = 0usize;
    for page_id in pages.values() {
        canvas.start_page(media_box(&doc, *page_id));
        for entry in index.on_page(*page_id) {
            if draw_entry(&doc, entry, &mut canvas, options)? {
                drawn += 1;
            }
        }
    }

    let overlay = canvas.finish()?;
    stamp_overlay(&mut doc, &overlay)?;

    for page_id in pages.values() {
        doc.get_dictionary_mut(*page_id)?.remove(b"Annots");
    }
    doc.catalog_mut()?.remove(b"AcroForm");
    let pruned = doc.prune_objects();

    info!(
        widgets = index.len(),
        drawn,
        pruned = pruned.len(),
        "flattened form"
    );
    Ok(doc)
}

/// Draw one widget; returns whether anything was drawn
fn draw_entry(
    doc: &Document,
    entry: &FieldEntry,
    canvas: &mut OverlayCanvas,
    options: &FlattenOptions,
) -> Result<bool> {
    let Some(rect) = entry.rect else {
        debug!(widget = ?entry.widget_id, "widget has no rectangle, nothing to draw");
        return Ok(false);
    };

    match entry.kind {
        FieldKind::Text => {
            let Some(text) = current_values(doc, entry).into_iter().next() else {
                return Ok(false);
            };
            canvas.draw_text(&single_line(&rect, &text, options))?;
        }
        FieldKind::Checkbox { .. } => {
            if !is_checked(doc, entry) {
                return Ok(false);
            }
            canvas.draw_check_mark(&check_mark(&rect, options))?;
        }
        FieldKind::Choice { .. } => {
            let labels: Vec<String> = current_values(doc, entry)
                .iter()
                .map(|value| entry.options.display_for(value))
                .collect();
            if labels.is_empty() {
                return Ok(false);
            }
            draw_labels(canvas, &rect, &labels, options)?;
        }
    }

    debug!(name = ?entry.name, kind = entry.kind.label(), "drew widget value");
    Ok(true)
}

fn draw_labels(
    canvas: &mut OverlayCanvas,
    rect: &Rect,
    labels: &[String],
    options: &FlattenOptions,
) -> Result<()> {
    match labels {
        [only] => canvas.draw_text(&single_line(rect, only, options)),
        several => {
            for line in stacked_lines(rect, several, options) {
                canvas.draw_text(&line)?;
            }
            Ok(())
        }
    }
}

/// Non-empty strings stored in the field's `/V`
fn current_values(doc: &Document, entry: &FieldEntry) -> Vec<String> {
    let Some(value) = inherited(doc, entry.field_id, b"V") else {
        return Vec::new();
    };

    let values: Vec<String> = match value {
        Object::Array(items) => items
            .iter()
            .filter_map(|item| doc.dereference(item).ok())
            .filter_map(|(_, item)| object_text(item))
            .collect(),
        single => object_text(single).into_iter().collect(),
    };

    values
        .into_iter()
        .filter(|value| !value.is_empty())
        .collect()
}

/// A checkbox is checked when its widget's `/AS` is set and not `Off`
fn is_checked(doc: &Document, entry: &FieldEntry) -> bool {
    doc.get_dictionary(entry.widget_id)
        .ok()
        .and_then(|widget| widget.get(b"AS").ok())
        .and_then(|state| state.as_name().ok())
        .map(|state| state != OFF_STATE)
        .unwrap_or(false)
}
