//! Ordered index of a document's form widgets
//!
//! The index is built once from a single traversal (pages in order, then
//! each page's `/Annots` in order). Checkbox occurrence numbers are assigned
//! here and nowhere else, so every consumer sees the same `name__N` keys.

use std::collections::HashMap;

use lopdf::{Document, Object, ObjectId};
use tracing::{debug, warn};

use crate::error::Result;
use crate::form::classify::{classify_field, inherited, owning_field, qualified_name, FieldKind};
use crate::form::options::ChoiceOptions;
use crate::layout::Rect;

/// Appearance state name that means "unchecked"
pub const OFF_STATE: &[u8] = b"Off";

/// Default on-state when a checkbox has no appearance dictionary
pub const DEFAULT_ON_STATE: &[u8] = b"Yes";

/// One widget annotation together with its owning field
#[derive(Debug, Clone)]
pub struct FieldEntry {
    /// 1-based page number
    pub page_number: u32,
    pub page_id: ObjectId,
    pub widget_id: ObjectId,
    pub field_id: ObjectId,
    /// Fully-qualified field name, `None` for unnamed fields
    pub name: Option<String>,
    pub kind: FieldKind,
    /// 1-based position among same-name checkbox widgets
    pub occurrence: Option<usize>,
    pub rect: Option<Rect>,
    /// Appearance state used when the box is checked
    pub on_state: Vec<u8>,
    /// Options of choice fields; empty for other kinds
    pub options: ChoiceOptions,
}

impl FieldEntry {
    /// Key a value submission uses for this widget.
    ///
    /// Checkboxes get `name__N`, everything else the plain name.
    pub fn key(&self) -> Option<String> {
        let name = self.name.as_ref()?;
        match self.occurrence {
            Some(index) => Some(occurrence_key(name, index)),
            None => Some(name.clone()),
        }
    }

    pub fn on_state_str(&self) -> String {
        String::from_utf8_lossy(&self.on_state).into_owned()
    }
}

/// Build a `name__N` key
pub fn occurrence_key(name: &str, index: usize) -> String {
    format!("{}__{}", name, index)
}

/// All fillable widgets of a document, in traversal order
#[derive(Debug, Clone, Default)]
pub struct FormIndex {
    entries: Vec<FieldEntry>,
}

impl FormIndex {
    /// Walk every page's widget annotations and classify them
    pub fn build(doc: &Document) -> Result<Self> {
        let mut entries = Vec::new();
        let mut name_counts: HashMap<String, usize> = HashMap::new();

        for (page_number, page_id) in doc.get_pages() {
            for widget_id in widget_ids(doc, page_id)? {
                let widget = doc.get_dictionary(widget_id)?;
                let field_id = owning_field(widget_id, widget);

                let Some(kind) = classify_field(doc, field_id) else {
                    debug!(?widget_id, "skipping widget without a fillable field type");
                    continue;
                };

                let name = qualified_name(doc, field_id);

                let occurrence = match (kind, &name) {
                    (FieldKind::Checkbox { .. }, Some(name)) => {
                        let count = name_counts.entry(name.clone()).or_insert(0);
                        *count += 1;
                        Some(*count)
                    }
                    _ => None,
                };

                let rect = match widget.get(b"Rect") {
                    Ok(rect) => doc
                        .dereference(rect)
                        .ok()
                        .and_then(|(_, rect)| rect.as_array().ok())
                        .and_then(|values| Rect::from_pdf_array(values)),
                    Err(_) => None,
                };

                let options = match kind {
                    FieldKind::Choice { .. } => choice_options(doc, field_id),
                    _ => ChoiceOptions::default(),
                };

                entries.push(FieldEntry {
                    page_number,
                    page_id,
                    widget_id,
                    field_id,
                    name,
                    kind,
                    occurrence,
                    rect,
                    on_state: checkbox_on_state(doc, widget),
                    options,
                });
            }
        }

        debug!(widgets = entries.len(), "indexed form widgets");
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldEntry> {
        self.entries.iter()
    }

    /// Entries placed on one page
    pub fn on_page(&self, page_id: ObjectId) -> impl Iterator<Item = &FieldEntry> {
        self.entries.iter().filter(move |e| e.page_id == page_id)
    }

    /// Every entry whose field has the given name
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FieldEntry> {
        self.entries
            .iter()
            .filter(move |e| e.name.as_deref() == Some(name))
    }
}

/// Indirect widget annotations of a page, in `/Annots` order
pub(crate) fn widget_ids(doc: &Document, page_id: ObjectId) -> Result<Vec<ObjectId>> {
    let page = doc.get_dictionary(page_id)?;
    let annots = match page.get(b"Annots") {
        Ok(annots) => doc.dereference(annots)?.1,
        Err(_) => return Ok(Vec::new()),
    };
    let Ok(annots) = annots.as_array() else {
        warn!(?page_id, "/Annots is not an array");
        return Ok(Vec::new());
    };

    let mut ids = Vec::new();
    for annot in annots {
        let Object::Reference(annot_id) = annot else {
            debug!(?page_id, "skipping direct annotation dictionary");
            continue;
        };
        let Ok(dict) = doc.get_dictionary(*annot_id) else {
            continue;
        };
        let is_widget = matches!(dict.get(b"Subtype"), Ok(Object::Name(subtype)) if subtype == b"Widget");
        if is_widget {
            ids.push(*annot_id);
        }
    }
    Ok(ids)
}

/// Options of a choice field; unusable `/Opt` entries give an empty list
fn choice_options(doc: &Document, field_id: ObjectId) -> ChoiceOptions {
    let Some(opt) = inherited(doc, field_id, b"Opt") else {
        return ChoiceOptions::default();
    };
    match ChoiceOptions::parse(doc, opt) {
        Ok(options) => options,
        Err(e) => {
            warn!(?field_id, error = %e, "ignoring unreadable choice options");
            ChoiceOptions::default()
        }
    }
}

/// The first normal-appearance state that is not `Off`
fn checkbox_on_state(doc: &Document, widget: &lopdf::Dictionary) -> Vec<u8> {
    let normal = widget
        .get(b"AP")
        .ok()
        .and_then(|ap| doc.dereference(ap).ok())
        .and_then(|(_, ap)| ap.as_dict().ok())
        .and_then(|ap| ap.get(b"N").ok())
        .and_then(|n| doc.dereference(n).ok())
        .and_then(|(_, n)| n.as_dict().ok());

    normal
        .and_then(|states| {
            states
                .iter()
                .map(|(state, _)| state)
                .find(|state| state.as_slice() != OFF_STATE)
                .cloned()
        })
        .unwrap_or_else(|| DEFAULT_ON_STATE.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    /// One page whose `/Annots` references each given dictionary
    fn single_page(widgets: Vec<lopdf::Dictionary>) -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let page_id = doc.new_object_id();

        let annots: Vec<Object> = widgets
            .into_iter()
            .map(|mut w| {
                w.set("P", Object::Reference(page_id));
                Object::Reference(doc.add_object(w))
            })
            .collect();

        doc.objects.insert(
            page_id,
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Annots" => annots,
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
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        (doc, page_id)
    }

    fn checkbox(name: &str, on: &str) -> lopdf::Dictionary {
        dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Btn",
            "T" => Object::string_literal(name),
            "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
            "AP" => dictionary! {
                "N" => dictionary! {
                    "Off" => Object::Null,
                    on => Object::Null,
                },
            },
        }
    }

    #[test]
    fn test_checkbox_occurrences_counted_per_name() {
        let (doc, _) = single_page(vec![
            checkbox("Agree", "Yes"),
            checkbox("Other", "Yes"),
            checkbox("Agree", "Yes"),
        ]);

        let index = FormIndex::build(&doc).unwrap();
        let keys: Vec<String> = index.iter().filter_map(|e| e.key()).collect();

        assert_eq!(keys, vec!["Agree__1", "Other__1", "Agree__2"]);
    }

    #[test]
    fn test_on_state_skips_off() {
        let (doc, _) = single_page(vec![checkbox("Color", "Blue")]);
        let index = FormIndex::build(&doc).unwrap();
        assert_eq!(index.entries()[0].on_state_str(), "Blue");
    }

    #[test]
    fn test_on_state_defaults_to_yes() {
        let (doc, _) = single_page(vec![dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Btn",
            "T" => Object::string_literal("Bare"),
        }]);
        let index = FormIndex::build(&doc).unwrap();
        assert_eq!(index.entries()[0].on_state, b"Yes".to_vec());
        assert!(index.entries()[0].rect.is_none());
    }

    #[test]
    fn test_non_widget_annotations_ignored() {
        let (doc, _) = single_page(vec![
            dictionary! {
                "Type" => "Annot",
                "Subtype" => "Link",
                "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
            },
            dictionary! {
                "Type" => "Annot",
                "Subtype" => "Widget",
                "FT" => "Tx",
                "T" => Object::string_literal("Name"),
            },
        ]);
        let index = FormIndex::build(&doc).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.entries()[0].key().as_deref(), Some("Name"));
        assert_eq!(index.entries()[0].occurrence, None);
    }

    #[test]
    fn test_choice_with_bad_options_gets_empty_list() {
        let (doc, _) = single_page(vec![dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Ch",
            "T" => Object::string_literal("Broken"),
            "Opt" => Object::Integer(3),
        }]);
        let index = FormIndex::build(&doc).unwrap();
        assert!(index.entries()[0].options.is_empty());
    }

    #[test]
    fn test_named_and_on_page() {
        let (doc, page_id) = single_page(vec![checkbox("A", "Yes"), checkbox("A", "Yes")]);
        let index = FormIndex::build(&doc).unwrap();
        assert_eq!(index.named("A").count(), 2);
        assert_eq!(index.on_page(page_id).count(), 2);
    }
}
