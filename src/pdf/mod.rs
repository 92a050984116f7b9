//! PDF manipulation module

pub mod merge;
pub mod metadata;

// Re-export commonly used items
pub use merge::{merge_pdfs, with_default_extension, MergeReport, MergeRequest};
pub use metadata::{count_pages, verify_page_count};
