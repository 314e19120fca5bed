//! Overlay documents for baking marks onto existing pages
//!
//! Drawing happens on a separate document with one page per source page.
//! Each overlay page is then stamped onto its source page: the overlay's
//! objects are renumbered into the source document, its content streams are
//! appended after the (isolated) original content and its resources merged in.

use std::collections::HashMap;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

use crate::error::{Error, Result};
use crate::layout::{CheckMark, Rect, TextLine};
use crate::pdf::page::{append_content_to_page, isolate_page_content, merge_resources};
use crate::text::encode_win_ansi;

/// Resource name of the overlay font, chosen not to clash with page fonts
pub const OVERLAY_FONT: &str = "FlatHelv";

/// One overlay page being drawn
#[derive(Debug, Clone)]
struct OverlayPage {
    media_box: Rect,
    operations: Vec<Operation>,
}

/// Collects drawings page by page and produces the overlay document
#[derive(Debug, Default)]
pub struct OverlayCanvas {
    pages: Vec<OverlayPage>,
}

impl OverlayCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new page; later drawing calls go to it
    pub fn start_page(&mut self, media_box: Rect) {
        self.pages.push(OverlayPage {
            media_box,
            operations: Vec::new(),
        });
    }

    fn current(&mut self) -> Result<&mut Vec<Operation>> {
        self.pages
            .last_mut()
            .map(|page| &mut page.operations)
            .ok_or_else(|| Error::General("overlay drawing before start_page".to_string()))
    }

    /// Draw one line of black Helvetica text
    pub fn draw_text(&mut self, line: &TextLine) -> Result<()> {
        let ops = self.current()?;
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![
                Object::Name(OVERLAY_FONT.as_bytes().to_vec()),
                Object::Real(line.font_size),
            ],
        ));
        ops.push(Operation::new("Td", vec![Object::Real(line.x), Object::Real(line.y)]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(&line.text), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
        Ok(())
    }

    /// Stroke both diagonals of a check mark in black
    pub fn draw_check_mark(&mut self, mark: &CheckMark) -> Result<()> {
        let ops = self.current()?;
        ops.push(Operation::new("w", vec![Object::Real(mark.line_width)]));
        for stroke in &mark.strokes {
            ops.push(Operation::new(
                "m",
                vec![Object::Real(stroke.from.0), Object::Real(stroke.from.1)],
            ));
            ops.push(Operation::new(
                "l",
                vec![Object::Real(stroke.to.0), Object::Real(stroke.to.1)],
            ));
            ops.push(Operation::new("S", vec![]));
        }
        Ok(())
    }

    /// Write every page into a standalone document.
    ///
    /// Pages without drawings get no content stream at all.
    pub fn finish(self) -> Result<Document> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = add_helvetica_font(&mut doc);

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in self.pages {
            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => page.media_box.to_pdf_array(),
                "Resources" => dictionary! {
                    "Font" => dictionary! { OVERLAY_FONT => font_id },
                },
            };

            if !page.operations.is_empty() {
                let mut operations = Vec::with_capacity(page.operations.len() + 4);
                operations.push(Operation::new("q", vec![]));
                operations.push(Operation::new("g", vec![Object::Integer(0)]));
                operations.push(Operation::new("G", vec![Object::Integer(0)]));
                operations.extend(page.operations);
                operations.push(Operation::new("Q", vec![]));

                let content = Content { operations }.encode()?;
                let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
                page_dict.set("Contents", Object::Reference(content_id));
            }

            kids.push(Object::Reference(doc.add_object(page_dict)));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(count),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        Ok(doc)
    }
}

/// Helvetica is one of the 14 standard fonts, so nothing needs embedding
fn add_helvetica_font(doc: &mut Document) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Stamp each overlay page onto the matching page of `source`.
///
/// Both documents must have the same number of pages.
pub fn stamp_overlay(source: &mut Document, overlay: &Document) -> Result<()> {
    let source_pages: Vec<ObjectId> = source.get_pages().into_values().collect();
    let overlay_pages: Vec<ObjectId> = overlay.get_pages().into_values().collect();

    if source_pages.len() != overlay_pages.len() {
        return Err(Error::General(format!(
            "Page count mismatch: source has {} pages, overlay has {} pages",
            source_pages.len(),
            overlay_pages.len()
        )));
    }

    // Renumber overlay objects above everything in the source
    let id_offset = source.max_id + 1;
    let id_map: HashMap<ObjectId, ObjectId> = overlay
        .objects
        .keys()
        .map(|old_id| (*old_id, (old_id.0 + id_offset, old_id.1)))
        .collect();

    for (old_id, object) in overlay.objects.iter() {
        source
            .objects
            .insert(id_map[old_id], renumber_object_references(object, &id_map));
    }
    source.max_id = overlay.max_id + id_offset;

    for (source_page_id, overlay_page_id) in source_pages.into_iter().zip(overlay_pages) {
        let overlay_page = overlay.get_dictionary(overlay_page_id)?;

        let contents = match overlay_page.get(b"Contents") {
            Ok(contents) => match renumber_object_references(contents, &id_map) {
                Object::Array(items) => items,
                single => vec![single],
            },
            Err(_) => continue,
        };

        let resources = match overlay_page.get(b"Resources") {
            Ok(resources) => match renumber_object_references(resources, &id_map) {
                Object::Dictionary(dict) => dict,
                _ => Dictionary::new(),
            },
            Err(_) => Dictionary::new(),
        };

        isolate_page_content(source, source_page_id)?;
        append_content_to_page(source, source_page_id, &contents)?;
        merge_resources(source, source_page_id, &resources)?;
        debug!(?source_page_id, "stamped overlay page");
    }

    Ok(())
}

/// Renumber all object references in an object
fn renumber_object_references(object: &Object, id_map: &HashMap<ObjectId, ObjectId>) -> Object {
    match object {
        Object::Reference(old_id) => Object::Reference(*id_map.get(old_id).unwrap_or(old_id)),
        Object::Array(items) => Object::Array(
            items
                .iter()
                .map(|item| renumber_object_references(item, id_map))
                .collect(),
        ),
        Object::Dictionary(dict) => Object::Dictionary(renumber_dictionary(dict, id_map)),
        Object::Stream(stream) => {
            let mut renumbered = stream.clone();
            renumbered.dict = renumber_dictionary(&stream.dict, id_map);
            Object::Stream(renumbered)
        }
        _ => object.clone(),
    }
}

fn renumber_dictionary(dict: &Dictionary, id_map: &HashMap<ObjectId, ObjectId>) -> Dictionary {
    let mut renumbered = Dictionary::new();
    for (key, value) in dict.iter() {
        renumbered.set(key.clone(), renumber_object_references(value, id_map));
    }
    renumbered
}
