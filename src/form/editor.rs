//! Editable field descriptors
//!
//! Describes which control each field gets in an editing front end and turns
//! edits back into a [`FormValues`] submission. Keys come straight from the
//! shared [`FormIndex`], so checkbox `name__N` keys always line up with the
//! ones the filler looks for.

use std::collections::HashSet;

use crate::form::classify::FieldKind;
use crate::form::index::FormIndex;
use crate::form::options::ChoiceOptions;
use crate::form::value::{FieldValue, FormValues};

/// The control used to edit one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Free text entry
    Entry,
    /// On/off toggle
    Checkbox,
    /// Pick one display label
    Combo { labels: Vec<String> },
    /// Pick any number of display labels
    MultiSelect { labels: Vec<String> },
}

/// One editable field, in document order
#[derive(Debug, Clone)]
pub struct EditableField {
    /// Submission key (`name` or `name__N`)
    pub key: String,
    /// Text shown next to the control
    pub label: String,
    pub control: Control,
    pub page_number: u32,
    options: ChoiceOptions,
}

/// An edit made through a control
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Text(String),
    Checked(bool),
    /// A selected display label
    Selected(String),
    /// Selected display labels
    SelectedMany(Vec<String>),
}

impl EditableField {
    /// Convert an edit into the submission entry for this field.
    ///
    /// Display labels are mapped back to export values.
    pub fn submit(&self, edit: Edit) -> (String, FieldValue) {
        let value = match edit {
            Edit::Text(text) => FieldValue::Text(text),
            Edit::Checked(checked) => FieldValue::Checked(checked),
            Edit::Selected(label) => FieldValue::ChoiceSingle(self.options.export_for(&label)),
            Edit::SelectedMany(labels) => FieldValue::ChoiceMulti(
                labels
                    .iter()
                    .map(|label| self.options.export_for(label))
                    .collect(),
            ),
        };
        (self.key.clone(), value)
    }

    /// The value a freshly built control starts with
    pub fn initial_value(&self) -> FieldValue {
        match &self.control {
            Control::Entry => FieldValue::Text(String::new()),
            Control::Checkbox => FieldValue::Checked(false),
            Control::Combo { labels } => {
                let first = labels.first().cloned().unwrap_or_default();
                FieldValue::ChoiceSingle(self.options.export_for(&first))
            }
            Control::MultiSelect { .. } => FieldValue::ChoiceMulti(Vec::new()),
        }
    }
}

/// Build editable descriptors for every named field in the index.
///
/// Checkboxes get one entry per widget. Text and choice fields get one entry
/// per name. A choice field without options is edited as plain text.
pub fn editable_fields(index: &FormIndex) -> Vec<EditableField> {
    let mut seen = HashSet::new();
    let mut fields = Vec::new();

    for entry in index.iter() {
        let Some(key) = entry.key() else {
            continue;
        };
        if !seen.insert(key.clone()) {
            continue;
        }

        let (control, label) = match entry.kind {
            FieldKind::Text => (Control::Entry, key.clone()),
            FieldKind::Checkbox { .. } => (Control::Checkbox, key.clone()),
            FieldKind::Choice { .. } if entry.options.is_empty() => (Control::Entry, key.clone()),
            FieldKind::Choice { multi: true, .. } => (
                Control::MultiSelect {
                    labels: entry.options.labels(),
                },
                format!("{} (multi)", key),
            ),
            FieldKind::Choice { .. } => (
                Control::Combo {
                    labels: entry.options.labels(),
                },
                key.clone(),
            ),
        };

        fields.push(EditableField {
            key,
            label,
            control,
            page_number: entry.page_number,
            options: entry.options.clone(),
        });
    }

    fields
}

/// A submission pre-filled with each control's initial value
pub fn values_template(fields: &[EditableField]) -> FormValues {
    fields
        .iter()
        .map(|field| (field.key.clone(), field.initial_value()))
        .collect()
}
