//! PDF Combine Library
//!
//! Collects PDF files from drag-and-drop payloads or plain paths, keeps them in
//! a user-ordered list and merges them into a single document.
//! This library provides functionality to:
//! - Split drop payloads and normalize `file://` URLs, UNC shares and paths
//! - Maintain an ordered, selectable file list with change notifications
//! - Merge the listed PDFs, page order preserved
//! - Drive all of the above from a [`session::Session`] that reports outcomes
//!   through a [`session::Notifier`]
//!
//! # Example
//!
//! ```no_run
//! use pdf_combine::pdf::{merge_pdfs, MergeRequest};
//! use std::path::PathBuf;
//!
//! let request = MergeRequest {
//!     input_paths: vec![
//!         PathBuf::from("1. intro.pdf"),
//!         PathBuf::from("2. advanced.pdf"),
//!     ],
//!     output_path: PathBuf::from("merged.pdf"),
//! };
//!
//! merge_pdfs(&request).expect("Failed to merge PDFs");
//! ```

pub mod error;
pub mod list;
pub mod paths;
pub mod pdf;
pub mod session;

// Re-export commonly used items
pub use error::{Error, Result};
pub use list::{FileEntry, FileList, ListChange};
pub use paths::PathStyle;
pub use session::{MergeOutcome, Notice, NoticeKind, Notifier, Session};
