//! Interactive merge session
//!
//! A [`Session`] is the core behind any front end: it owns the file list,
//! turns drop payloads into list entries and runs merges. Everything the user
//! should be told goes through a [`Notifier`], so no error ever escapes to
//! the caller and the session stays usable after any failure.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::Error;
use crate::list::{FileEntry, FileList, ListChange};
use crate::paths::{split_payload, to_local_path, PathStyle};
use crate::pdf::{merge_pdfs, with_default_extension, MergeReport, MergeRequest};

/// Severity of a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Warning,
    Success,
    Error,
}

/// A modal message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Warning, title, message)
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, title, message)
    }

    fn new(kind: NoticeKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Receives every notice a session produces
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

/// Collects notices in memory
impl Notifier for Vec<Notice> {
    fn notify(&mut self, notice: Notice) {
        self.push(notice);
    }
}

/// One item of a drop payload that did not make it into the list
#[derive(Debug)]
pub struct Rejection {
    pub item: String,
    pub reason: Error,
}

/// Result of one drop batch
#[derive(Debug, Default)]
pub struct DropOutcome {
    pub accepted: Vec<FileEntry>,
    pub rejected: Vec<Rejection>,
}

/// How a merge attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Output written
    Merged(MergeReport),
    /// The list was empty; nothing was attempted
    NoFiles,
    /// The user declined to choose an output path
    Cancelled,
    /// Loading or writing failed; carries the message shown to the user
    Failed(String),
}

/// Normalize and filter a drop payload without touching any list
///
/// A malformed payload is rejected as a whole; otherwise each item is judged
/// on its own and one bad item never stops the rest.
pub fn parse_drop(payload: &str, style: PathStyle) -> DropOutcome {
    let items = match split_payload(payload) {
        Ok(items) => items,
        Err(reason) => {
            return DropOutcome {
                accepted: Vec::new(),
                rejected: vec![Rejection {
                    item: payload.to_string(),
                    reason,
                }],
            }
        }
    };

    parse_items(items, style)
}

/// Normalize and filter items that are already separated, e.g. command-line
/// arguments
pub fn parse_items<I>(items: I, style: PathStyle) -> DropOutcome
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut outcome = DropOutcome::default();
    for item in items {
        let item: String = item.into();
        match to_local_path(&item, style).and_then(|path| FileEntry::new(path)) {
            Ok(entry) => {
                debug!(item = %item, path = %entry, "accepted drop item");
                outcome.accepted.push(entry);
            }
            Err(reason) => {
                warn!(item = %item, %reason, "rejected drop item");
                outcome.rejected.push(Rejection { item, reason });
            }
        }
    }
    outcome
}

/// File list plus the policy for reporting what happens to it
#[derive(Debug)]
pub struct Session<N: Notifier> {
    list: FileList,
    style: PathStyle,
    notifier: N,
}

impl<N: Notifier> Session<N> {
    pub fn new(style: PathStyle, notifier: N) -> Self {
        Self {
            list: FileList::new(),
            style,
            notifier,
        }
    }

    pub fn list(&self) -> &FileList {
        &self.list
    }

    /// Mutable access, e.g. to subscribe to list changes
    pub fn list_mut(&mut self) -> &mut FileList {
        &mut self.list
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn into_notifier(self) -> N {
        self.notifier
    }

    /// Append every PDF in `payload` to the list, warning once per rejection
    pub fn drop_payload(&mut self, payload: &str) -> DropOutcome {
        let outcome = parse_drop(payload, self.style);
        self.accept(outcome)
    }

    /// Like [`Session::drop_payload`] for items that need no splitting
    pub fn add_items<I>(&mut self, items: I) -> DropOutcome
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let outcome = parse_items(items, self.style);
        self.accept(outcome)
    }

    fn accept(&mut self, outcome: DropOutcome) -> DropOutcome {
        for entry in &outcome.accepted {
            self.list.append(entry.clone());
        }
        for rejection in &outcome.rejected {
            let message = match &rejection.reason {
                Error::NotPdf(path) => format!("Not a PDF: {}", path.display()),
                other => other.to_string(),
            };
            self.notifier.notify(Notice::warning("Invalid file", message));
        }

        outcome
    }

    pub fn select(&mut self, index: usize) -> bool {
        self.list.select(index)
    }

    pub fn move_up(&mut self) -> Option<ListChange> {
        self.list.move_up()
    }

    pub fn move_down(&mut self) -> Option<ListChange> {
        self.list.move_down()
    }

    pub fn remove(&mut self) -> Option<ListChange> {
        self.list.remove()
    }

    /// Merge the list in its current order
    ///
    /// `choose_output` is asked for a destination only when there is something
    /// to merge; returning `None` abandons the merge without a notice. A path
    /// without an extension gets `.pdf`. The list is never modified.
    pub fn merge<F>(&mut self, choose_output: F) -> MergeOutcome
    where
        F: FnOnce() -> Option<PathBuf>,
    {
        if self.list.is_empty() {
            self.notifier
                .notify(Notice::warning("No files", "Please add PDF files first."));
            return MergeOutcome::NoFiles;
        }

        let Some(output) = choose_output() else {
            debug!("output selection cancelled");
            return MergeOutcome::Cancelled;
        };

        let result = MergeRequest::from_list(&self.list, with_default_extension(output))
            .and_then(|request| merge_pdfs(&request));

        match result {
            Ok(report) => {
                self.notifier.notify(Notice::success(
                    "Success",
                    format!("Merged PDF saved at:\n{}", report.output_path.display()),
                ));
                MergeOutcome::Merged(report)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "merge failed");
                self.notifier.notify(Notice::error("Error", message.clone()));
                MergeOutcome::Failed(message)
            }
        }
    }
}
