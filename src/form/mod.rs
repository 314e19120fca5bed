//! AcroForm fields: discovery, classification and filling

pub mod classify;
pub mod editor;
pub mod fill;
pub mod index;
pub mod options;
pub mod value;

// Re-export commonly used items
pub use classify::{FieldFlags, FieldKind};
pub use editor::{editable_fields, values_template, Control, Edit, EditableField};
pub use fill::{fill_fields, FillReport};
pub use index::{FieldEntry, FormIndex};
pub use options::{ChoiceOption, ChoiceOptions};
pub use value::{FieldValue, FormValues};
