//! Submitted field values

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// A value submitted for one field key
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text field content
    Text(String),
    /// Checkbox state
    Checked(bool),
    /// One choice, given as export value or display label
    ChoiceSingle(String),
    /// Several choices (multi-select) or several checkbox on-states
    ChoiceMulti(Vec<String>),
}

impl FieldValue {
    /// Read the value as a checkbox state.
    ///
    /// Strings are false when empty or spelled `false`, `off`, `no` or `0`
    /// (case-insensitive, surrounding whitespace ignored). This is stricter
    /// than plain string truthiness: a values file holding `"Off"` or `"no"`
    /// for a checkbox leaves it unchecked, where a non-empty check would tick
    /// it. Any other non-empty string checks the box.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Checked(checked) => *checked,
            FieldValue::Text(s) | FieldValue::ChoiceSingle(s) => {
                let s = s.trim();
                !(s.is_empty()
                    || s.eq_ignore_ascii_case("false")
                    || s.eq_ignore_ascii_case("off")
                    || s.eq_ignore_ascii_case("no")
                    || s == "0")
            }
            FieldValue::ChoiceMulti(items) => !items.is_empty(),
        }
    }

    /// String form written into a text field
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Text(s) | FieldValue::ChoiceSingle(s) => s.clone(),
            FieldValue::Checked(checked) => checked.to_string(),
            FieldValue::ChoiceMulti(items) => items.join(", "),
        }
    }

    /// The items of a multi-value entry
    pub fn as_collection(&self) -> Option<&[String]> {
        match self {
            FieldValue::ChoiceMulti(items) => Some(items),
            _ => None,
        }
    }
}

/// Shape of a value in a JSON values file
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFieldValue {
    Flag(bool),
    Text(String),
    Number(serde_json::Number),
    List(Vec<String>),
}

impl From<RawFieldValue> for FieldValue {
    fn from(raw: RawFieldValue) -> Self {
        match raw {
            RawFieldValue::Flag(checked) => FieldValue::Checked(checked),
            RawFieldValue::Text(text) => FieldValue::Text(text),
            RawFieldValue::Number(number) => FieldValue::Text(number.to_string()),
            RawFieldValue::List(items) => FieldValue::ChoiceMulti(items),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        RawFieldValue::deserialize(deserializer).map(FieldValue::from)
    }
}

/// Mapping from field key (`name` or `name__N`) to submitted value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues {
    values: BTreeMap<String, FieldValue>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of field values
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON values file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Values used by the `fill` command when no values file is given
    pub fn example() -> Self {
        let mut values = Self::new();
        values.insert("Name", FieldValue::Text("Alice".to_string()));
        values.insert("Email", FieldValue::Text("alice@example.com".to_string()));
        values
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.values.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.values.iter()
    }
}

impl FromIterator<(String, FieldValue)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_maps_to_variants() {
        let values = FormValues::from_json_str(
            r#"{
                "Name": "Alice",
                "Agree__1": true,
                "Languages": ["English", "French"],
                "Age": 42
            }"#,
        )
        .unwrap();

        assert_eq!(values.get("Name"), Some(&FieldValue::Text("Alice".to_string())));
        assert_eq!(values.get("Agree__1"), Some(&FieldValue::Checked(true)));
        assert_eq!(
            values.get("Languages"),
            Some(&FieldValue::ChoiceMulti(vec!["English".to_string(), "French".to_string()]))
        );
        assert_eq!(values.get("Age"), Some(&FieldValue::Text("42".to_string())));
    }

    #[test]
    fn test_json_rejects_nested_objects() {
        let result = FormValues::from_json_str(r#"{"Name": {"first": "Alice"}}"#);
        assert!(matches!(result, Err(Error::Values(_))));
    }

    #[test]
    fn test_truthiness() {
        assert!(FieldValue::Checked(true).is_truthy());
        assert!(!FieldValue::Checked(false).is_truthy());
        assert!(FieldValue::Text("yes".to_string()).is_truthy());
        assert!(!FieldValue::Text("Off".to_string()).is_truthy());
        assert!(!FieldValue::Text(String::new()).is_truthy());
        assert!(!FieldValue::ChoiceMulti(vec![]).is_truthy());
    }

    #[test]
    fn test_truthiness_reads_off_spellings_as_unchecked() {
        for unchecked in ["off", " NO ", "False", "0", "  "] {
            assert!(
                !FieldValue::Text(unchecked.to_string()).is_truthy(),
                "{:?} should be unchecked",
                unchecked
            );
        }
        for checked in ["on", "1", "anything", "offline"] {
            assert!(
                FieldValue::ChoiceSingle(checked.to_string()).is_truthy(),
                "{:?} should be checked",
                checked
            );
        }
    }

    #[test]
    fn test_as_collection() {
        let multi = FieldValue::ChoiceMulti(vec!["a".to_string()]);
        assert_eq!(multi.as_collection(), Some(&["a".to_string()][..]));
        assert_eq!(FieldValue::Text("a".to_string()).as_collection(), None);
    }

    #[test]
    fn test_to_text() {
        assert_eq!(FieldValue::Checked(true).to_text(), "true");
        assert_eq!(
            FieldValue::ChoiceMulti(vec!["a".to_string(), "b".to_string()]).to_text(),
            "a, b"
        );
    }

    #[test]
    fn test_json_round_trip_keeps_shape() {
        let mut values = FormValues::new();
        values.insert("Agree__2", FieldValue::Checked(false));
        values.insert("Country", FieldValue::ChoiceSingle("US".to_string()));

        let json = values.to_json_pretty().unwrap();
        assert!(json.contains("\"Agree__2\": false"));
        assert!(json.contains("\"Country\": \"US\""));
    }

    #[test]
    fn test_load_missing_file() {
        let result = FormValues::load(Path::new("does-not-exist.json"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }
}
