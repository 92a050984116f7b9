//! PDF merging functionality using lopdf

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::list::FileList;

/// Attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against malformed, cyclic `Parent` chains
const MAX_TREE_DEPTH: usize = 64;

/// A snapshot of the file list plus the chosen destination
#[derive(Debug, Clone)]
pub struct MergeRequest {
    /// Input PDF file paths in the order they should be merged
    pub input_paths: Vec<PathBuf>,
    /// Output PDF file path
    pub output_path: PathBuf,
}

impl MergeRequest {
    /// Snapshot `list` in its current order
    pub fn from_list(list: &FileList, output_path: impl Into<PathBuf>) -> Result<Self> {
        if list.is_empty() {
            return Err(Error::NoInputFiles);
        }
        Ok(Self {
            input_paths: list.paths(),
            output_path: output_path.into(),
        })
    }
}

/// What a successful merge produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub output_path: PathBuf,
    pub file_count: usize,
    pub page_count: usize,
}

/// Append `.pdf` when the chosen output path has no extension
pub fn with_default_extension(path: impl Into<PathBuf>) -> PathBuf {
    let mut path = path.into();
    if path.extension().is_none() {
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".pdf");
        path.set_file_name(name);
    }
    path
}

/// Merge multiple PDF files into a single PDF
///
/// Pages are written in request order: every page of the first input, then
/// every page of the second, and so on. The output is written to a temporary
/// file beside the destination and only moved into place once complete.
///
/// Based on the lopdf merge example:
/// https://github.com/J-F-Liu/lopdf/blob/main/examples/merge.rs
///
/// # Example
///
/// ```no_run
/// use pdf_combine::pdf::{MergeRequest, merge_pdfs};
/// use std::path::PathBuf;
///
/// let request = MergeRequest {
///     input_paths: vec![
///         PathBuf::from("1. first.pdf"),
///         PathBuf::from("2. second.pdf"),
///     ],
///     output_path: PathBuf::from("merged.pdf"),
/// };
///
/// let report = merge_pdfs(&request).expect("Failed to merge");
/// println!("{} pages", report.page_count);
/// ```
pub fn merge_pdfs(request: &MergeRequest) -> Result<MergeReport> {
    if request.input_paths.is_empty() {
        return Err(Error::NoInputFiles);
    }

    // Validate all input files exist
    for path in &request.input_paths {
        if !path.exists() {
            return Err(Error::FileNotFound(path.clone()));
        }
    }

    // Load all documents
    let mut documents: Vec<Document> = Vec::with_capacity(request.input_paths.len());
    for path in &request.input_paths {
        let doc = Document::load(path).map_err(|source| Error::Load {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), pages = doc.get_pages().len(), "loaded input");
        documents.push(doc);
    }

    let (mut merged_doc, page_count) = concatenate(documents);

    merged_doc.compress();
    save_atomically(&mut merged_doc, &request.output_path)?;

    info!(
        output = %request.output_path.display(),
        files = request.input_paths.len(),
        pages = page_count,
        "merged PDFs"
    );

    Ok(MergeReport {
        output_path: request.output_path.clone(),
        file_count: request.input_paths.len(),
        page_count,
    })
}

/// Build one document holding every page of `documents`, in order
fn concatenate(documents: Vec<Document>) -> (Document, usize) {
    // Define a starting max_id for merged document
    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        // Renumber objects in this document to avoid conflicts
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        // Pages are about to lose their tree, so pull inherited values down first
        let pages = doc.get_pages();
        for &page_id in pages.values() {
            flatten_inherited_attributes(&mut doc, page_id);
        }
        page_ids.extend(pages.into_values());

        // The old catalog and page tree nodes are replaced below
        objects.extend(
            doc.objects
                .into_iter()
                .filter(|(_, object)| !is_tree_node(object)),
        );
    }

    let mut merged_doc = Document::with_version("1.5");
    merged_doc.objects.extend(objects);

    // new_object_id() must hand out ids above everything just added
    merged_doc.max_id = max_id - 1;

    let pages_id = merged_doc.new_object_id();

    let kids: Vec<Object> = page_ids
        .iter()
        .map(|&id| Object::Reference(id))
        .collect();

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(page_ids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));

    let catalog_id = merged_doc.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    merged_doc.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged_doc.objects.insert(pages_id, Object::Dictionary(pages_object));
    merged_doc.trailer.set("Root", Object::Reference(catalog_id));

    for &page_id in &page_ids {
        if let Ok(Object::Dictionary(ref mut dict)) = merged_doc.get_object_mut(page_id) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    (merged_doc, page_ids.len())
}

fn is_tree_node(object: &Object) -> bool {
    match object.as_dict().and_then(|dict| dict.get(b"Type")).and_then(Object::as_name) {
        Ok(name) => name == b"Catalog" || name == b"Pages",
        Err(_) => false,
    }
}

fn parent_of(dict: &Dictionary) -> Option<ObjectId> {
    dict.get(b"Parent").and_then(Object::as_reference).ok()
}

/// Copy inheritable attributes the page lacks from its nearest ancestor
fn flatten_inherited_attributes(doc: &mut Document, page_id: ObjectId) {
    let (mut missing, mut next): (Vec<&[u8]>, Option<ObjectId>) = match doc.get_object(page_id) {
        Ok(Object::Dictionary(page)) => (
            INHERITABLE_KEYS.iter().copied().filter(|key| !page.has(key)).collect(),
            parent_of(page),
        ),
        _ => return,
    };

    let mut inherited: Vec<(&[u8], Object)> = Vec::new();
    let mut depth = 0;

    while let Some(node_id) = next {
        if missing.is_empty() || depth >= MAX_TREE_DEPTH {
            break;
        }
        let Ok(Object::Dictionary(node)) = doc.get_object(node_id) else {
            break;
        };

        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                inherited.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });

        next = parent_of(node);
        depth += 1;
    }

    if inherited.is_empty() {
        return;
    }

    if let Ok(Object::Dictionary(ref mut page)) = doc.get_object_mut(page_id) {
        for (key, value) in inherited {
            page.set(key, value);
        }
    }
}

/// Write `doc` next to `output` and rename it into place
fn save_atomically(doc: &mut Document, output: &Path) -> Result<()> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".pdf-combine-").suffix(".pdf");
    // Created like a plain new file: 0666 less the umask, not tempfile's 0600
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut temp = builder.tempfile_in(dir)?;

    // An overwritten output keeps its mode
    if let Ok(existing) = std::fs::metadata(output) {
        temp.as_file().set_permissions(existing.permissions())?;
    }

    doc.save_to(&mut temp)?;
    temp.persist(output).map_err(|e| e.error)?;

    Ok(())
}
