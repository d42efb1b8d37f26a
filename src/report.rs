//! Observational progress and event reporting.
//!
//! A [`Reporter`] sees coarse progress counts and non-fatal events while
//! files are decoded, resolved and encoded. It never affects control flow.

use parking_lot::Mutex;

use crate::meta::ClassId;

/// Non-fatal occurrence worth surfacing to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Pointer whose target file or object is absent.
    DanglingPointer { file: String, file_index: i32, path_id: i64 },
    /// No decoder registered; the object was kept raw.
    UnknownClass { file: String, path_id: i64, class_id: ClassId },
    /// Typed decoding failed; the object was kept raw.
    DecodeFailed { file: String, path_id: i64, class_id: ClassId, reason: String },
    /// Declared revision has no layout rule; every object was kept raw.
    UnsupportedRevision { file: String, version: String },
    /// Object written with the closest representation the target allows.
    EncodeWarning { file: String, path_id: i64, message: String },
    /// Whole file could not be loaded.
    LoadFailed { file: String, reason: String },
}

/// Sink for progress and events. Must tolerate calls from worker threads.
pub trait Reporter: Send + Sync {
    /// `done` of `total` objects of `file` decoded.
    fn progress(&self, _file: &str, _done: usize, _total: usize) {}

    fn event(&self, _event: &Event) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn progress(&self, file: &str, done: usize, total: usize) {
        tracing::trace!(file, done, total, "decode progress");
    }

    fn event(&self, event: &Event) {
        match event {
            Event::UnknownClass { file, path_id, class_id } => {
                tracing::debug!(file = %file, path_id, class_id = class_id.0, "no decoder, keeping raw bytes");
            }
            Event::DanglingPointer { file, file_index, path_id } => {
                tracing::warn!(file = %file, file_index, path_id, "dangling pointer");
            }
            Event::DecodeFailed { file, path_id, class_id, reason } => {
                tracing::warn!(file = %file, path_id, class_id = class_id.0, reason = %reason, "decode failed, keeping raw bytes");
            }
            Event::UnsupportedRevision { file, version } => {
                tracing::warn!(file = %file, version = %version, "unsupported revision, objects kept raw");
            }
            Event::EncodeWarning { file, path_id, message } => {
                tracing::warn!(file = %file, path_id, "{}", message);
            }
            Event::LoadFailed { file, reason } => {
                tracing::warn!(file = %file, reason = %reason, "load failed");
            }
        }
    }
}

/// Snapshot of a [`StatusReporter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    /// Objects decoded across all files.
    pub decoded: usize,
    /// Objects announced across all files.
    pub total: usize,
    pub events: Vec<Event>,
}

impl Status {
    pub fn dangling(&self) -> usize {
        self.count(|e| matches!(e, Event::DanglingPointer { .. }))
    }

    pub fn decode_failures(&self) -> usize {
        self.count(|e| matches!(e, Event::DecodeFailed { .. }))
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

/// Collects progress and events in memory.
#[derive(Debug, Default)]
pub struct StatusReporter {
    state: Mutex<StatusState>,
}

#[derive(Debug, Default)]
struct StatusState {
    // file -> (done, total), insertion ordered
    files: Vec<(String, usize, usize)>,
    events: Vec<Event>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Status {
        let state = self.state.lock();
        Status {
            decoded: state.files.iter().map(|f| f.1).sum(),
            total: state.files.iter().map(|f| f.2).sum(),
            events: state.events.clone(),
        }
    }

    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.files.clear();
        state.events.clear();
    }
}

impl Reporter for StatusReporter {
    fn progress(&self, file: &str, done: usize, total: usize) {
        let mut state = self.state.lock();
        match state.files.iter_mut().find(|f| f.0 == file) {
            Some(entry) => {
                entry.1 = entry.1.max(done);
                entry.2 = total;
            }
            None => state.files.push((file.to_string(), done, total)),
        }
    }

    fn event(&self, event: &Event) {
        self.state.lock().events.push(event.clone());
    }
}

impl<R: Reporter + ?Sized> Reporter for std::sync::Arc<R> {
    fn progress(&self, file: &str, done: usize, total: usize) {
        (**self).progress(file, done, total)
    }

    fn event(&self, event: &Event) {
        (**self).event(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accumulates() {
        let status = StatusReporter::new();
        status.progress("a", 1, 3);
        status.progress("a", 3, 3);
        status.progress("b", 2, 2);
        status.event(&Event::DanglingPointer { file: "a".into(), file_index: 0, path_id: 9 });

        let snap = status.snapshot();
        assert_eq!(snap.decoded, 5);
        assert_eq!(snap.total, 5);
        assert_eq!(snap.dangling(), 1);
        assert_eq!(snap.decode_failures(), 0);

        status.reset();
        assert_eq!(status.snapshot(), Status::default());
    }

    #[test]
    fn test_progress_never_goes_backwards() {
        // Parallel decoding may deliver counts out of order.
        let status = StatusReporter::new();
        status.progress("a", 4, 4);
        status.progress("a", 2, 4);
        assert_eq!(status.snapshot().decoded, 4);
    }
}
