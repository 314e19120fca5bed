//! Writing submitted values into field dictionaries
//!
//! Filling is an additive merge: fields without a submitted value are left
//! alone and unknown choice values are stored verbatim. Only document
//! structure problems are errors.

use lopdf::{Document, Object};
use tracing::{debug, info};

use crate::error::Result;
use crate::form::classify::FieldKind;
use crate::form::index::{occurrence_key, FieldEntry, FormIndex, OFF_STATE};
use crate::form::value::{FieldValue, FormValues};
use crate::text::text_string_object;

/// What a fill pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Text widgets whose field got a value
    pub text: usize,
    /// Checkbox widgets whose state was set
    pub checkboxes: usize,
    /// Choice widgets whose field got a value
    pub choices: usize,
    /// Widgets with no matching submitted value
    pub untouched: usize,
}

impl FillReport {
    pub fn filled(&self) -> usize {
        self.text + self.checkboxes + self.choices
    }
}

/// Apply `values` to every widget in `index`, in index order.
///
/// Sets `/NeedAppearances` on the AcroForm afterwards so viewers regenerate
/// appearances if the document is saved without flattening.
pub fn fill_fields(doc: &mut Document, index: &FormIndex, values: &FormValues) -> Result<FillReport> {
    let mut report = FillReport::default();

    for entry in index.iter() {
        let applied = match entry.kind {
            FieldKind::Text => fill_text(doc, entry, values)?,
            FieldKind::Checkbox { .. } => fill_checkbox(doc, entry, values)?,
            FieldKind::Choice { .. } => fill_choice(doc, entry, values)?,
        };

        match (applied, entry.kind) {
            (false, _) => report.untouched += 1,
            (true, FieldKind::Text) => report.text += 1,
            (true, FieldKind::Checkbox { .. }) => report.checkboxes += 1,
            (true, FieldKind::Choice { .. }) => report.choices += 1,
        }
    }

    set_need_appearances(doc)?;

    info!(
        filled = report.filled(),
        untouched = report.untouched,
        "applied field values"
    );
    Ok(report)
}

fn fill_text(doc: &mut Document, entry: &FieldEntry, values: &FormValues) -> Result<bool> {
    let Some(value) = entry.name.as_deref().and_then(|name| values.get(name)) else {
        return Ok(false);
    };

    let text = value.to_text();
    debug!(name = ?entry.name, %text, "filling text field");
    doc.get_dictionary_mut(entry.field_id)?
        .set("V", text_string_object(&text));
    Ok(true)
}

fn fill_checkbox(doc: &mut Document, entry: &FieldEntry, values: &FormValues) -> Result<bool> {
    let Some(checked) = checkbox_state(entry, values) else {
        return Ok(false);
    };

    let state = if checked {
        entry.on_state.clone()
    } else {
        OFF_STATE.to_vec()
    };
    debug!(key = ?entry.key(), checked, "setting checkbox");
    doc.get_dictionary_mut(entry.widget_id)?
        .set("AS", Object::Name(state));
    Ok(true)
}

/// Decide a checkbox widget's state from the submission.
///
/// `name__N` wins, then a collection of on-states under `name`, then a
/// boolean under `name`. `None` leaves the widget as it is.
pub fn checkbox_state(entry: &FieldEntry, values: &FormValues) -> Option<bool> {
    let name = entry.name.as_deref()?;

    if let Some(index) = entry.occurrence {
        if let Some(value) = values.get(&occurrence_key(name, index)) {
            return Some(value.is_truthy());
        }
    }

    let value = values.get(name)?;
    if let Some(states) = value.as_collection() {
        let on = entry.on_state_str();
        let marked = format!("/{}", on);
        return Some(states.iter().any(|s| *s == on || *s == marked));
    }
    match value {
        FieldValue::Checked(checked) => Some(*checked),
        _ => None,
    }
}

fn fill_choice(doc: &mut Document, entry: &FieldEntry, values: &FormValues) -> Result<bool> {
    let Some(value) = entry.name.as_deref().and_then(|name| values.get(name)) else {
        return Ok(false);
    };

    let stored = match value {
        FieldValue::ChoiceMulti(items) => Object::Array(
            items
                .iter()
                .map(|item| text_string_object(&entry.options.export_for(item)))
                .collect(),
        ),
        scalar => text_string_object(&entry.options.export_for(&scalar.to_text())),
    };

    debug!(name = ?entry.name, "filling choice field");
    doc.get_dictionary_mut(entry.field_id)?.set("V", stored);
    Ok(true)
}

/// Mark the AcroForm as needing appearance regeneration
fn set_need_appearances(doc: &mut Document) -> Result<()> {
    let acro_form = match doc.catalog()?.get(b"AcroForm") {
        Ok(Object::Reference(id)) => Some(*id),
        Ok(Object::Dictionary(_)) => None,
        _ => return Ok(()),
    };

    let acro_form = match acro_form {
        Some(id) => doc.get_dictionary_mut(id)?,
        None => doc.catalog_mut()?.get_mut(b"AcroForm")?.as_dict_mut()?,
    };
    acro_form.set("NeedAppearances", Object::Boolean(true));
    Ok(())
}
