//! Page dictionary helpers: boxes, content streams and resources

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::Result;
use crate::layout::Rect;

/// Guard against `/Parent` cycles in the page tree
const MAX_TREE_DEPTH: usize = 32;

/// Look up a page attribute, falling back to inherited values from the page tree
pub(crate) fn inherited_page_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_dictionary(current).ok()?;
        if let Ok(value) = dict.get(key) {
            return doc.dereference(value).ok().map(|(_, object)| object);
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => current = *parent_id,
            _ => return None,
        }
    }
    None
}

/// The page's MediaBox, or US Letter when none is declared
pub fn media_box(doc: &Document, page_id: ObjectId) -> Rect {
    inherited_page_attribute(doc, page_id, b"MediaBox")
        .and_then(|object| object.as_array().ok())
        .and_then(|values| Rect::from_pdf_array(values))
        .unwrap_or_else(Rect::letter)
}

/// Current content stream references of a page
fn content_refs(doc: &Document, page_dict: &Dictionary) -> Vec<Object> {
    match page_dict.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            // An indirect array of streams
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// Append content streams to a page's Contents
///
/// Appended content is drawn on top of the existing page content.
pub fn append_content_to_page(doc: &mut Document, page_id: ObjectId, new_content: &[Object]) -> Result<()> {
    let mut contents = content_refs(doc, doc.get_dictionary(page_id)?);
    contents.extend_from_slice(new_content);
    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Wrap the existing page content in `q`/`Q`.
///
/// Whatever transformation the original content leaves behind is restored
/// before any appended content runs.
pub fn isolate_page_content(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let existing = content_refs(doc, doc.get_dictionary(page_id)?);
    if existing.is_empty() {
        return Ok(());
    }

    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(save_id));
    contents.extend(existing);
    contents.push(Object::Reference(restore_id));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// The page's effective Resources dictionary, with references resolved
pub fn page_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    inherited_page_attribute(doc, page_id, b"Resources")
        .and_then(|object| object.as_dict().ok())
        .cloned()
        .unwrap_or_default()
}

/// Merge extra resources into the page's Resources dictionary
///
/// Resource categories present on both sides (Font, XObject, ...) are merged
/// entry by entry; incoming entries win on name clashes. The result is set
/// directly on the page so shared or inherited Resources stay untouched.
pub fn merge_resources(doc: &mut Document, page_id: ObjectId, extra: &Dictionary) -> Result<()> {
    let mut merged = page_resources(doc, page_id);

    for (category, value) in extra.iter() {
        let incoming = match doc.dereference(value) {
            Ok((_, object)) => object.clone(),
            Err(_) => value.clone(),
        };

        let existing = merged
            .get(category)
            .ok()
            .and_then(|object| doc.dereference(object).ok())
            .map(|(_, object)| object.clone());

        let combined = match (existing, incoming) {
            (Some(Object::Dictionary(mut existing)), Object::Dictionary(incoming)) => {
                for (key, entry) in incoming.iter() {
                    existing.set(key.clone(), entry.clone());
                }
                Object::Dictionary(existing)
            }
            (_, incoming) => incoming,
        };

        merged.set(category.clone(), combined);
    }

    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(merged));
    Ok(())
}
