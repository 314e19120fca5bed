//! Choice field options (`/Opt`)

use lopdf::{Document, Object};

use crate::error::{Error, Result};
use crate::text::object_text;

/// One entry of a choice field's option list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    /// Value stored in `/V` when selected
    pub export: String,
    /// Label shown to the user
    pub display: String,
}

impl ChoiceOption {
    pub fn new(export: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            export: export.into(),
            display: display.into(),
        }
    }
}

/// The ordered option list of a choice field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceOptions {
    options: Vec<ChoiceOption>,
}

impl ChoiceOptions {
    pub fn new(options: Vec<ChoiceOption>) -> Self {
        Self { options }
    }

    /// Parse an `/Opt` array.
    ///
    /// Entries are either a text string (export and display are equal) or a
    /// two-element array `[export display]`. A one-element array uses its only
    /// entry for both. Anything else is an error so the caller can decide what
    /// a field without usable options becomes.
    pub fn parse(doc: &Document, opt: &Object) -> Result<Self> {
        let (_, opt) = doc.dereference(opt)?;
        let entries = opt
            .as_array()
            .map_err(|_| Error::MalformedDocument("/Opt is not an array".to_string()))?;

        let mut options = Vec::with_capacity(entries.len());
        for entry in entries {
            let (_, entry) = doc.dereference(entry)?;
            let option = match entry {
                Object::Array(pair) => {
                    let export = pair
                        .first()
                        .and_then(|o| doc.dereference(o).ok())
                        .and_then(|(_, o)| object_text(o))
                        .ok_or_else(|| {
                            Error::MalformedDocument("empty /Opt pair".to_string())
                        })?;
                    let display = pair
                        .get(1)
                        .and_then(|o| doc.dereference(o).ok())
                        .and_then(|(_, o)| object_text(o))
                        .unwrap_or_else(|| export.clone());
                    ChoiceOption { export, display }
                }
                other => {
                    let text = object_text(other).ok_or_else(|| {
                        Error::MalformedDocument(format!("unexpected /Opt entry: {:?}", other))
                    })?;
                    ChoiceOption::new(text.clone(), text)
                }
            };
            options.push(option);
        }

        Ok(Self { options })
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChoiceOption> {
        self.options.iter()
    }

    /// Display labels in option order
    pub fn labels(&self) -> Vec<String> {
        self.options.iter().map(|o| o.display.clone()).collect()
    }

    /// Resolve user input to an export value.
    ///
    /// An exact export match wins, then a display label match; unknown input
    /// is returned unchanged.
    pub fn export_for(&self, input: &str) -> String {
        if self.options.iter().any(|o| o.export == input) {
            return input.to_string();
        }
        self.options
            .iter()
            .find(|o| o.display == input)
            .map(|o| o.export.clone())
            .unwrap_or_else(|| input.to_string())
    }

    /// Display label for a stored export value, or the value itself
    pub fn display_for(&self, export: &str) -> String {
        self.options
            .iter()
            .find(|o| o.export == export)
            .map(|o| o.display.clone())
            .unwrap_or_else(|| export.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn countries() -> ChoiceOptions {
        ChoiceOptions::new(vec![
            ChoiceOption::new("US", "United States"),
            ChoiceOption::new("FR", "France"),
        ])
    }

    #[test]
    fn test_export_and_label_resolve_to_same_export() {
        let options = countries();
        assert_eq!(options.export_for("US"), "US");
        assert_eq!(options.export_for("United States"), "US");
        assert_eq!(options.display_for(&options.export_for("United States")), "United States");
    }

    #[test]
    fn test_export_match_preferred_over_label() {
        // "FR" is a label of one option and the export of another
        let options = ChoiceOptions::new(vec![
            ChoiceOption::new("F", "FR"),
            ChoiceOption::new("FR", "France"),
        ]);
        assert_eq!(options.export_for("FR"), "FR");
    }

    #[test]
    fn test_unknown_values_pass_through() {
        let options = countries();
        assert_eq!(options.export_for("Atlantis"), "Atlantis");
        assert_eq!(options.display_for("XX"), "XX");
    }

    #[test]
    fn test_parse_strings_and_pairs() {
        let doc = Document::with_version("1.7");
        let opt = Object::Array(vec![
            Object::string_literal("Red"),
            Object::Array(vec![Object::string_literal("gr"), Object::string_literal("Green")]),
            Object::Array(vec![Object::string_literal("bl")]),
        ]);

        let options = ChoiceOptions::parse(&doc, &opt).unwrap();

        assert_eq!(options.len(), 3);
        assert_eq!(options.labels(), vec!["Red", "Green", "bl"]);
        assert_eq!(options.export_for("Green"), "gr");
    }

    #[test]
    fn test_parse_follows_references() {
        let mut doc = Document::with_version("1.7");
        let label_id = doc.add_object(Object::string_literal("Blue"));
        let opt_id = doc.add_object(Object::Array(vec![Object::Reference(label_id)]));

        let options = ChoiceOptions::parse(&doc, &Object::Reference(opt_id)).unwrap();
        assert_eq!(options.labels(), vec!["Blue"]);
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let doc = Document::with_version("1.7");
        let result = ChoiceOptions::parse(&doc, &Object::Integer(7));
        assert!(matches!(result, Err(Error::MalformedDocument(_))));
    }

    #[test]
    fn test_parse_rejects_odd_entries() {
        let doc = Document::with_version("1.7");
        let opt = Object::Array(vec![Object::Integer(1)]);
        assert!(ChoiceOptions::parse(&doc, &opt).is_err());
    }
}
