//! Ordered, selectable list of PDF files awaiting a merge

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A normalized path accepted into the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    path: PathBuf,
}

impl FileEntry {
    /// Accept `path` if it ends in `.pdf` (any case)
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !has_pdf_extension(&path) {
            return Err(Error::NotPdf(path));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

impl fmt::Display for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Check the textual suffix, so `.pdf` and paths written in a foreign
/// separator style are judged the same way on every platform.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.to_string_lossy().to_lowercase().ends_with(".pdf")
}

/// A single effective mutation of a [`FileList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    Appended { index: usize },
    Moved { from: usize, to: usize },
    Removed { index: usize },
}

type Listener = Box<dyn FnMut(&ListChange, &[FileEntry])>;

/// Insertion-ordered file list with an optional selection
///
/// Order is merge order. Duplicates are allowed. Every mutation that changes
/// the list is returned to the caller and pushed to subscribers; operations
/// that would do nothing return `None` and notify no one.
#[derive(Default)]
pub struct FileList {
    entries: Vec<FileEntry>,
    selected: Option<usize>,
    listeners: Vec<Listener>,
}

impl FileList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked after every change with the new contents
    pub fn subscribe(&mut self, listener: impl FnMut(&ListChange, &[FileEntry]) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Snapshot of the paths in merge order
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }

    pub fn append(&mut self, entry: FileEntry) -> Option<ListChange> {
        self.entries.push(entry);
        self.emit(ListChange::Appended {
            index: self.entries.len() - 1,
        })
    }

    /// Select `index`; out-of-range indices are ignored
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Swap the selected entry with its predecessor; the selection follows it
    pub fn move_up(&mut self) -> Option<ListChange> {
        let index = self.selected.filter(|&i| i > 0)?;
        self.swap_selected(index, index - 1)
    }

    /// Swap the selected entry with its successor; the selection follows it
    pub fn move_down(&mut self) -> Option<ListChange> {
        let index = self.selected.filter(|&i| i + 1 < self.entries.len())?;
        self.swap_selected(index, index + 1)
    }

    /// Remove the selected entry and clear the selection
    pub fn remove(&mut self) -> Option<ListChange> {
        let index = self.selected.filter(|&i| i < self.entries.len())?;
        self.entries.remove(index);
        self.selected = None;
        self.emit(ListChange::Removed { index })
    }

    fn swap_selected(&mut self, from: usize, to: usize) -> Option<ListChange> {
        self.entries.swap(from, to);
        self.selected = Some(to);
        self.emit(ListChange::Moved { from, to })
    }

    fn emit(&mut self, change: ListChange) -> Option<ListChange> {
        for listener in &mut self.listeners {
            listener(&change, &self.entries);
        }
        Some(change)
    }
}

impl fmt::Debug for FileList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileList")
            .field("entries", &self.entries)
            .field("selected", &self.selected)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn list_of(names: &[&str]) -> FileList {
        let mut list = FileList::new();
        for name in names {
            list.append(FileEntry::new(*name).unwrap());
        }
        list
    }

    fn names(list: &FileList) -> Vec<String> {
        list.entries().iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_entry_requires_pdf_extension() {
        assert!(FileEntry::new("a.pdf").is_ok());
        assert!(FileEntry::new("A.PDF").is_ok());
        assert!(FileEntry::new(r"C:\My Docs\a.Pdf").is_ok());
        assert!(matches!(FileEntry::new("notes.txt"), Err(Error::NotPdf(_))));
        assert!(FileEntry::new("pdf").is_err());
    }

    #[test]
    fn test_append_keeps_order_and_duplicates() {
        let list = list_of(&["A.pdf", "B.pdf", "A.pdf"]);
        assert_eq!(names(&list), vec!["A.pdf", "B.pdf", "A.pdf"]);
        assert_eq!(list.paths().len(), 3);
    }

    #[test]
    fn test_move_up_at_top_is_noop() {
        let mut list = list_of(&["A.pdf", "B.pdf", "C.pdf"]);
        list.select(0);
        for _ in 0..3 {
            assert_eq!(list.move_up(), None);
        }
        assert_eq!(names(&list), vec!["A.pdf", "B.pdf", "C.pdf"]);
        assert_eq!(list.selected(), Some(0));
    }

    #[test]
    fn test_move_down_at_bottom_is_noop() {
        let mut list = list_of(&["A.pdf", "B.pdf", "C.pdf"]);
        list.select(2);
        assert_eq!(list.move_down(), None);
        assert_eq!(names(&list), vec!["A.pdf", "B.pdf", "C.pdf"]);
    }

    #[test]
    fn test_moves_without_selection_are_noops() {
        let mut list = list_of(&["A.pdf", "B.pdf"]);
        assert_eq!(list.move_up(), None);
        assert_eq!(list.move_down(), None);
        assert_eq!(list.remove(), None);
        assert_eq!(names(&list), vec!["A.pdf", "B.pdf"]);
    }

    #[test]
    fn test_selection_follows_moves() {
        let mut list = list_of(&["A.pdf", "B.pdf", "C.pdf"]);
        list.select(2);

        assert_eq!(list.move_up(), Some(ListChange::Moved { from: 2, to: 1 }));
        assert_eq!(list.selected(), Some(1));
        assert_eq!(list.move_up(), Some(ListChange::Moved { from: 1, to: 0 }));
        assert_eq!(names(&list), vec!["C.pdf", "A.pdf", "B.pdf"]);

        assert_eq!(list.move_down(), Some(ListChange::Moved { from: 0, to: 1 }));
        assert_eq!(names(&list), vec!["A.pdf", "C.pdf", "B.pdf"]);
        assert_eq!(list.selected(), Some(1));
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut list = list_of(&["A.pdf", "B.pdf", "C.pdf"]);
        list.select(1);
        assert_eq!(list.remove(), Some(ListChange::Removed { index: 1 }));
        assert_eq!(names(&list), vec!["A.pdf", "C.pdf"]);
        assert_eq!(list.selected(), None);
        assert_eq!(list.remove(), None);
    }

    #[test]
    fn test_select_out_of_range_is_ignored() {
        let mut list = list_of(&["A.pdf"]);
        assert!(!list.select(1));
        assert_eq!(list.selected(), None);
        assert!(list.select(0));
        list.clear_selection();
        assert_eq!(list.selected(), None);
    }

    #[test]
    fn test_listeners_see_effective_changes_only() {
        let seen: Rc<RefCell<Vec<(ListChange, usize)>>> = Rc::default();
        let mut list = FileList::new();
        let sink = Rc::clone(&seen);
        list.subscribe(move |change, entries| sink.borrow_mut().push((*change, entries.len())));

        list.append(FileEntry::new("A.pdf").unwrap());
        list.append(FileEntry::new("B.pdf").unwrap());
        list.select(0);
        list.move_up();
        list.move_down();
        list.remove();

        assert_eq!(
            *seen.borrow(),
            vec![
                (ListChange::Appended { index: 0 }, 1),
                (ListChange::Appended { index: 1 }, 2),
                (ListChange::Moved { from: 0, to: 1 }, 2),
                (ListChange::Removed { index: 1 }, 1),
            ]
        );
    }
}
