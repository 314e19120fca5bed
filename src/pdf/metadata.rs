//! PDF metadata extraction

use std::path::Path;

use lopdf::{Dictionary, Document, Object};

use crate::error::{Error, Result};
use crate::form::index::FormIndex;
use crate::text::object_text;

/// Count pages by reading the Count field from the Pages dictionary
/// This is more reliable than get_pages() which doesn't handle nested page trees
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let catalog = doc
        .catalog()
        .map_err(|_| Error::MalformedDocument("No catalog".to_string()))?;

    let pages = match catalog.get(b"Pages") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id)?,
        Ok(_) => {
            return Err(Error::MalformedDocument(
                "Pages is not a reference".to_string(),
            ))
        }
        Err(_) => return Err(Error::MalformedDocument("No Pages in catalog".to_string())),
    };

    match pages.get(b"Count") {
        Ok(Object::Integer(n)) if *n >= 0 => Ok(*n as usize),
        Ok(_) => Err(Error::MalformedDocument(
            "Count is not a non-negative integer".to_string(),
        )),
        Err(_) => Err(Error::MalformedDocument("No Count in Pages".to_string())),
    }
}

/// PDF metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
    /// Fillable widget annotations found on the pages
    pub form_widgets: usize,
    /// Whether the catalog carries an AcroForm
    pub has_acroform: bool,
}

fn load_existing(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    Ok(Document::load(path)?)
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    let doc = load_existing(path)?;
    let metadata = document_metadata(&doc)?;

    if metadata.page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }
    Ok(metadata)
}

/// Metadata of an already loaded document
pub fn document_metadata(doc: &Document) -> Result<PdfMetadata> {
    let page_count = count_pages_from_catalog(doc)?;

    let info = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|info| doc.dereference(info).ok())
        .and_then(|(_, info)| info.as_dict().ok());

    let has_acroform = doc
        .catalog()
        .map(|catalog| catalog.has(b"AcroForm"))
        .unwrap_or(false);

    Ok(PdfMetadata {
        page_count,
        title: info.and_then(|info| info_text(doc, info, b"Title")),
        author: info.and_then(|info| info_text(doc, info, b"Author")),
        form_widgets: FormIndex::build(doc)?.len(),
        has_acroform,
    })
}

fn info_text(doc: &Document, info: &Dictionary, key: &[u8]) -> Option<String> {
    let value = info.get(key).ok()?;
    let (_, value) = doc.dereference(value).ok()?;
    object_text(value)
}

/// Count the number of pages in a PDF file
///
/// This is a quick operation that reads the Count field from the Pages dictionary.
pub fn count_pages(path: &Path) -> Result<usize> {
    let doc = load_existing(path)?;
    let page_count = count_pages_from_catalog(&doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    Ok(page_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_count_pages_nonexistent_file() {
        let result = count_pages(Path::new("nonexistent.pdf"));
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_extract_metadata_nonexistent_file() {
        let result = extract_metadata(Path::new("nonexistent.pdf"));
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_document_metadata_reads_info_and_form() {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let page_id = doc.new_object_id();
        let widget_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Tx",
            "T" => Object::string_literal("Name"),
            "P" => page_id,
        });
        doc.objects.insert(
            page_id,
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Annots" => vec![Object::Reference(widget_id)],
            }),
        );
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );
        let acro_form = doc.add_object(dictionary! {
            "Fields" => vec![Object::Reference(widget_id)],
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
            "AcroForm" => acro_form,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Intake form"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let metadata = document_metadata(&doc).unwrap();

        assert_eq!(metadata.page_count, 1);
        assert_eq!(metadata.title.as_deref(), Some("Intake form"));
        assert_eq!(metadata.author, None);
        assert_eq!(metadata.form_widgets, 1);
        assert!(metadata.has_acroform);
    }
}
