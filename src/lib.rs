//! PDF Form Fill Library
//!
//! A small library for merging PDFs and filling PDF forms.
//! This library provides functionality to:
//! - Merge multiple PDF files
//! - Index and classify AcroForm fields (text, checkbox, dropdown, multi-select)
//! - Fill fields from a JSON values mapping
//! - Flatten filled forms into static page content
//! - Extract metadata (page counts, form widgets)
//!
//! # Example
//!
//! ```no_run
//! use pdf_formfill::form::{FieldValue, FormValues};
//! use pdf_formfill::pdf::{fill_pdf, FillOptions};
//! use std::path::PathBuf;
//!
//! let mut values = FormValues::new();
//! values.insert("Name", FieldValue::Text("Alice".to_string()));
//! values.insert("Agree__1", FieldValue::Checked(true));
//!
//! let options = FillOptions {
//!     input_path: PathBuf::from("form.pdf"),
//!     output_path: PathBuf::from("filled.pdf"),
//!     ..Default::default()
//! };
//!
//! fill_pdf(&options, &values).expect("Failed to fill form");
//! ```

pub mod error;
pub mod form;
pub mod layout;
pub mod pdf;
pub mod text;

// Re-export commonly used items
pub use error::{Error, Result};
