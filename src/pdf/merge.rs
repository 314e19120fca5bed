//! PDF merging functionality using lopdf

use std::collections::BTreeMap;
use std::path::PathBuf;

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::pdf::page::inherited_page_attribute;

/// Page attributes a page may inherit from its page tree ancestors
const INHERITABLE_PAGE_KEYS: [&[u8]; 4] = [b"MediaBox", b"Resources", b"CropBox", b"Rotate"];

/// Options for merging PDFs
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Input PDF file paths in the order they should be merged
    pub input_paths: Vec<PathBuf>,
    /// Output PDF file path
    pub output_path: PathBuf,
}

/// Merge multiple PDF files into a single PDF
///
/// Based on the lopdf merge example:
/// https://github.com/J-F-Liu/lopdf/blob/main/examples/merge.rs
///
/// # Example
///
/// ```no_run
/// use pdf_formfill::pdf::{MergeOptions, merge_pdfs};
/// use std::path::PathBuf;
///
/// let options = MergeOptions {
///     input_paths: vec![
///         PathBuf::from("1. first.pdf"),
///         PathBuf::from("2. second.pdf"),
///     ],
///     output_path: PathBuf::from("merged.pdf"),
/// };
///
/// merge_pdfs(&options).expect("Failed to merge");
/// ```
pub fn merge_pdfs(options: &MergeOptions) -> Result<()> {
    if options.input_paths.is_empty() {
        return Err(Error::NoInputFiles);
    }

    // Validate all input files exist before loading any
    for path in &options.input_paths {
        if !path.exists() {
            return Err(Error::FileNotFound(path.clone()));
        }
    }

    let mut documents = Vec::with_capacity(options.input_paths.len());
    for path in &options.input_paths {
        let doc = Document::load(path)?;
        if doc.get_pages().is_empty() {
            return Err(Error::EmptyPdf(path.clone()));
        }
        debug!(path = %path.display(), pages = doc.get_pages().len(), "loaded merge input");
        documents.push(doc);
    }

    let mut merged = merge_documents(documents)?;
    merged.compress();
    merged.save(&options.output_path)?;

    info!(
        inputs = options.input_paths.len(),
        output = %options.output_path.display(),
        "merged PDFs"
    );
    Ok(())
}

/// Concatenate the pages of `documents`, in order, into a new document.
///
/// Objects are renumbered so nothing collides; the result gets a fresh
/// catalog and page tree. Interactive forms of the inputs are not merged.
pub fn merge_documents(documents: Vec<Document>) -> Result<Document> {
    if documents.is_empty() {
        return Err(Error::NoInputFiles);
    }

    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for (position, mut doc) in documents.into_iter().enumerate() {
        if doc.get_pages().is_empty() {
            return Err(Error::General(format!(
                "Document {} has no pages",
                position + 1
            )));
        }

        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        // The old page tree is dropped, so inherited values move onto the pages
        for page_id in doc.get_pages().into_values() {
            pin_inherited_attributes(&mut doc, page_id)?;
        }

        page_ids.extend(doc.get_pages().into_values());
        objects.extend(doc.objects);
    }

    let mut merged = Document::with_version("1.5");
    merged.objects.extend(objects);

    // new_object_id() must hand out ids above everything just inserted
    merged.max_id = max_id - 1;

    let pages_id = merged.new_object_id();
    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(page_ids.len() as i64));
    pages.set("Kids", Object::Array(kids));

    let catalog_id = merged.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    merged.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged.objects.insert(pages_id, Object::Dictionary(pages));
    merged.trailer.set("Root", Object::Reference(catalog_id));

    for &page_id in &page_ids {
        merged
            .get_dictionary_mut(page_id)?
            .set("Parent", Object::Reference(pages_id));
    }

    // Old catalogs and page tree nodes are no longer reachable
    merged.prune_objects();

    Ok(merged)
}

/// Copy inherited page attributes onto the page itself
fn pin_inherited_attributes(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut inherited = Vec::new();
    {
        let page = doc.get_dictionary(page_id)?;
        for key in INHERITABLE_PAGE_KEYS {
            if page.has(key) {
                continue;
            }
            if let Some(value) = inherited_page_attribute(doc, page_id, key) {
                inherited.push((key, value.clone()));
            }
        }
    }

    if !inherited.is_empty() {
        debug!(?page_id, keys = inherited.len(), "copied inherited page attributes");
    }
    let page = doc.get_dictionary_mut(page_id)?;
    for (key, value) in inherited {
        page.set(key.to_vec(), value);
    }
    Ok(())
}
