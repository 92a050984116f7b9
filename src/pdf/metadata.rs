//! PDF page counting

use std::path::Path;
use lopdf::{Document, Object};
use crate::error::{Error, Result};
use super::merge::MergeReport;

/// Count pages by reading the Count field from the Pages dictionary
/// This is more reliable than get_pages() which doesn't handle nested page trees
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let catalog_id = doc.trailer.get(b"Root").and_then(Object::as_reference)?;
    let pages_id = doc
        .get_dictionary(catalog_id)?
        .get(b"Pages")
        .and_then(Object::as_reference)?;
    let count = doc.get_dictionary(pages_id)?.get(b"Count").and_then(Object::as_i64)?;

    Ok(usize::try_from(count).unwrap_or(0))
}

/// Count the number of pages in a PDF file
///
/// This is a quick operation that reads the Count field from the Pages dictionary.
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path).map_err(|source| Error::Load {
        path: path.to_path_buf(),
        source,
    })?;
    count_pages_from_catalog(&doc)
}

/// Re-read a merged file and check it holds every page that went into it
pub fn verify_page_count(report: &MergeReport) -> Result<usize> {
    let found = count_pages(&report.output_path)?;
    if found != report.page_count {
        return Err(Error::PageCountMismatch {
            path: report.output_path.clone(),
            expected: report.page_count,
            found,
        });
    }
    Ok(found)
}
