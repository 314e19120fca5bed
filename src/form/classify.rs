//! Field classification
//!
//! A widget annotation either is its field (it carries `/T`) or hangs below
//! one through `/Parent`. Field attributes such as `/FT`, `/Ff`, `/V` and
//! `/Opt` are inheritable, so lookups walk up the `/Parent` chain.
//!
//! Nothing in here mutates the document.

use lopdf::{Dictionary, Document, Object, ObjectId};

/// Guard against `/Parent` cycles in broken files
const MAX_FIELD_DEPTH: usize = 32;

/// Field flags (`/Ff`), PDF 1.7 section 12.7.4
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldFlags(pub u32);

impl FieldFlags {
    pub const READ_ONLY: u32 = 1;
    pub const RADIO: u32 = 1 << 15;
    pub const PUSH_BUTTON: u32 = 1 << 16;
    pub const COMBO: u32 = 1 << 17;
    pub const EDIT: u32 = 1 << 18;
    pub const MULTI_SELECT: u32 = 1 << 21;

    fn has(&self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    pub fn is_push_button(&self) -> bool {
        self.has(Self::PUSH_BUTTON)
    }

    pub fn is_radio(&self) -> bool {
        self.has(Self::RADIO)
    }

    pub fn is_combo(&self) -> bool {
        self.has(Self::COMBO)
    }

    pub fn is_editable(&self) -> bool {
        self.has(Self::EDIT)
    }

    pub fn is_multi_select(&self) -> bool {
        self.has(Self::MULTI_SELECT)
    }
}

/// The kinds of field this tool fills and flattens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `/FT /Tx`
    Text,
    /// `/FT /Btn` without the push-button flag.
    /// Radio buttons are handled exactly like checkboxes.
    Checkbox { radio: bool },
    /// `/FT /Ch`
    Choice {
        multi: bool,
        combo: bool,
        editable: bool,
    },
}

impl FieldKind {
    /// Classify by field type name and flags.
    ///
    /// Push buttons, signatures and unknown types yield `None`.
    pub fn classify(field_type: &[u8], flags: FieldFlags) -> Option<Self> {
        match field_type {
            b"Tx" => Some(FieldKind::Text),
            b"Btn" if !flags.is_push_button() => Some(FieldKind::Checkbox {
                radio: flags.is_radio(),
            }),
            b"Ch" => Some(FieldKind::Choice {
                multi: flags.is_multi_select(),
                combo: flags.is_combo(),
                editable: flags.is_editable(),
            }),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Checkbox { radio: false } => "checkbox",
            FieldKind::Checkbox { radio: true } => "radio",
            FieldKind::Choice { multi: true, .. } => "multi-select",
            FieldKind::Choice { combo: true, .. } => "combo",
            FieldKind::Choice { .. } => "list",
        }
    }
}

/// Resolve the field that owns a widget.
///
/// The widget is its own field when it has `/T`; otherwise its `/Parent` is.
pub fn owning_field(widget_id: ObjectId, widget: &Dictionary) -> ObjectId {
    if widget.has(b"T") {
        return widget_id;
    }
    match widget.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => *parent_id,
        _ => widget_id,
    }
}

/// Look up an inheritable attribute, starting at `field_id` and walking up `/Parent`.
pub fn inherited<'a>(doc: &'a Document, field_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = field_id;
    for _ in 0..MAX_FIELD_DEPTH {
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

/// Field type name (`Tx`, `Btn`, `Ch`, ...) of a field
pub fn field_type(doc: &Document, field_id: ObjectId) -> Option<Vec<u8>> {
    inherited(doc, field_id, b"FT")
        .and_then(|object| object.as_name().ok())
        .map(|name| name.to_vec())
}

/// Field flags of a field, zero when absent
pub fn field_flags(doc: &Document, field_id: ObjectId) -> FieldFlags {
    inherited(doc, field_id, b"Ff")
        .and_then(|object| object.as_i64().ok())
        .map(|ff| FieldFlags(ff as u32))
        .unwrap_or_default()
}

/// Classify the field owning `field_id`
pub fn classify_field(doc: &Document, field_id: ObjectId) -> Option<FieldKind> {
    let field_type = field_type(doc, field_id)?;
    FieldKind::classify(&field_type, field_flags(doc, field_id))
}

/// Fully-qualified field name: partial names from the root down, joined with `.`
pub fn qualified_name(doc: &Document, field_id: ObjectId) -> Option<String> {
    let mut parts = Vec::new();
    let mut current = field_id;

    for _ in 0..MAX_FIELD_DEPTH {
        let Ok(dict) = doc.get_dictionary(current) else {
            break;
        };
        if let Some(name) = dict
            .get(b"T")
            .ok()
            .and_then(|t| doc.dereference(t).ok())
            .and_then(|(_, t)| crate::text::object_text(t))
        {
            parts.push(name);
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => current = *parent_id,
            _ => break,
        }
    }

    if parts.is_empty() {
        return None;
    }
    parts.reverse();
    Some(parts.join("."))
}
