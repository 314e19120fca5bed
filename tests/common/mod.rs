//! Builders for test PDFs
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

pub fn rect(x1: i64, y1: i64, x2: i64, y2: i64) -> Object {
    Object::Array(vec![x1.into(), y1.into(), x2.into(), y2.into()])
}

pub fn text_field(name: &str, area: Object) -> Dictionary {
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => Object::string_literal(name),
        "Rect" => area,
    }
}

pub fn checkbox(name: &str, on_state: &str, area: Object) -> Dictionary {
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Btn",
        "T" => Object::string_literal(name),
        "AS" => "Off",
        "Rect" => area,
        "AP" => dictionary! {
            "N" => dictionary! {
                "Off" => Object::Null,
                on_state => Object::Null,
            },
        },
    }
}

/// A choice field; `options` are `(export, display)` pairs
pub fn choice_field(name: &str, flags: i64, options: &[(&str, &str)], area: Object) -> Dictionary {
    let opt: Vec<Object> = options
        .iter()
        .map(|(export, display)| {
            Object::Array(vec![
                Object::string_literal(*export),
                Object::string_literal(*display),
            ])
        })
        .collect();

    let mut field = dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Ch",
        "Ff" => Object::Integer(flags),
        "T" => Object::string_literal(name),
        "Rect" => area,
    };
    if !opt.is_empty() {
        field.set("Opt", opt);
    }
    field
}

/// Build a form document, one inner vec of widgets per page.
///
/// Every page also carries a small content stream that scales the CTM, so
/// flattening has to isolate it.
pub fn form_document(pages: Vec<Vec<Dictionary>>) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();
    let mut fields = Vec::new();

    for widgets in pages {
        let page_id = doc.new_object_id();
        let annots: Vec<Object> = widgets
            .into_iter()
            .map(|mut widget| {
                widget.set("P", page_id);
                Object::Reference(doc.add_object(widget))
            })
            .collect();
        fields.extend(annots.iter().cloned());

        let content = Content {
            operations: vec![Operation::new(
                "cm",
                vec![2.into(), 0.into(), 0.into(), 2.into(), 0.into(), 0.into()],
            )],
        };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().expect("encode content"),
        ));

        doc.objects.insert(
            page_id,
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => rect(0, 0, 612, 792),
                "Contents" => content_id,
                "Annots" => annots,
            }),
        );
        kids.push(Object::Reference(page_id));
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
    let acro_form = doc.add_object(dictionary! { "Fields" => fields });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => acro_form,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// A document whose pages each show one label with `Tj`
pub fn labelled_document(labels: &[&str]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = labels
        .iter()
        .map(|label| {
            let content = Content {
                operations: vec![Operation::new("Tj", vec![Object::string_literal(*label)])],
            };
            let content_id = doc.add_object(Stream::new(
                Dictionary::new(),
                content.encode().expect("encode content"),
            ));
            Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => rect(0, 0, 612, 792),
                "Contents" => content_id,
            }))
        })
        .collect();

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
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Save a document into `dir` and return its path
pub fn write_pdf(dir: &Path, name: &str, mut doc: Document) -> PathBuf {
    let path = dir.join(name);
    doc.save(&path).expect("save test PDF");
    path
}

pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

pub fn page_operations(doc: &Document, page_id: ObjectId) -> Vec<Operation> {
    let bytes = doc.get_page_content(page_id).expect("page content");
    Content::decode(&bytes).expect("decode content").operations
}

/// Text shown with `Tj` on a page, in content order
pub fn page_text(doc: &Document, page_id: ObjectId) -> Vec<String> {
    page_operations(doc, page_id)
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| op.operands.first())
        .filter_map(|operand| operand.as_str().ok())
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .collect()
}

/// Number of stroke operators on a page
pub fn stroke_count(doc: &Document, page_id: ObjectId) -> usize {
    page_operations(doc, page_id)
        .iter()
        .filter(|op| op.operator == "S")
        .count()
}

/// Move a page-level attribute onto the page tree root so pages inherit it
pub fn hoist_to_page_tree(doc: &mut Document, key: &str, value: Object) {
    let pages_id = doc
        .catalog()
        .expect("catalog")
        .get(b"Pages")
        .and_then(|pages| pages.as_reference())
        .expect("pages reference");
    for page_id in page_ids(doc) {
        doc.get_dictionary_mut(page_id)
            .expect("page")
            .remove(key.as_bytes());
    }
    doc.get_dictionary_mut(pages_id)
        .expect("pages")
        .set(key, value);
}

pub fn times_roman_resources() -> Dictionary {
    dictionary! {
        "Font" => dictionary! {
            "F1" => dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Times-Roman",
            },
        },
    }
}
