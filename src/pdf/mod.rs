//! PDF manipulation module

pub mod flatten;
pub mod merge;
pub mod metadata;
pub mod overlay;
pub mod page;

// Re-export commonly used items
pub use flatten::{fill_pdf, flatten, FillOptions};
pub use merge::{merge_documents, merge_pdfs, MergeOptions};
pub use metadata::{count_pages, document_metadata, extract_metadata, PdfMetadata};
pub use overlay::{stamp_overlay, OverlayCanvas};
