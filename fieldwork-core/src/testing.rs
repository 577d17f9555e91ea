//! Test utilities for fieldwork applications
//!
//! - [`ChangeRecorder`]: captures `OnChange` commits over a channel so tests
//!   can assert on what a field committed, and when
//! - [`settle`]: lets spawned effect drivers process their queues before a
//!   test asserts
//!
//! # Example
//!
//! ```ignore
//! use fieldwork_core::testing::ChangeRecorder;
//!
//! let mut recorder = ChangeRecorder::<MapValue>::new();
//! let field = MapField::mount(props_with(recorder.handler()), geocoder);
//!
//! field.handle_map_change(LocationPatch::coords(5.0, 6.0));
//!
//! let commits = recorder.drain();
//! assert_eq!(commits.len(), 1);
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::component::OnChange;

/// Captures commits made through an [`OnChange`] handle.
///
/// The recorder hands out cloneable handlers; every `(id, value)` pair a
/// field commits is queued and can be drained or awaited by the test.
pub struct ChangeRecorder<V> {
    tx: mpsc::UnboundedSender<(String, V)>,
    rx: mpsc::UnboundedReceiver<(String, V)>,
}

impl<V: Send + 'static> Default for ChangeRecorder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Send + 'static> ChangeRecorder<V> {
    /// Create a new recorder.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// An `OnChange` handle that records into this recorder.
    pub fn handler(&self) -> OnChange<V> {
        let tx = self.tx.clone();
        Arc::new(move |id: &str, value: V| {
            let _ = tx.send((id.to_string(), value));
        })
    }

    /// Drain every commit recorded so far.
    pub fn drain(&mut self) -> Vec<(String, V)> {
        let mut drained = Vec::new();
        while let Ok(commit) = self.rx.try_recv() {
            drained.push(commit);
        }
        drained
    }

    /// Await the next commit, failing the test pattern with `None` when
    /// nothing arrives within `deadline`.
    pub async fn next_within(&mut self, deadline: Duration) -> Option<(String, V)> {
        tokio::time::timeout(deadline, self.rx.recv()).await.ok()?
    }

    /// Assert that no commit arrives within `window`.
    pub async fn assert_silent_for(&mut self, window: Duration) {
        if let Ok(Some((id, _))) = tokio::time::timeout(window, self.rx.recv()).await {
            panic!("unexpected commit for field {:?}", id);
        }
    }
}

/// Give spawned drivers a chance to process queued emissions.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recorder_captures_commits_in_order() {
        let mut recorder = ChangeRecorder::<String>::new();
        let handler = recorder.handler();

        handler("a", "first".into());
        handler("a", "second".into());

        let commits = recorder.drain();
        assert_eq!(
            commits,
            vec![
                ("a".to_string(), "first".to_string()),
                ("a".to_string(), "second".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_next_within_times_out_when_silent() {
        let mut recorder = ChangeRecorder::<String>::new();

        assert!(recorder
            .next_within(Duration::from_millis(20))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_handler_survives_recorder_side_clone() {
        let mut recorder = ChangeRecorder::<u32>::new();
        let handler = recorder.handler();
        let handler2 = handler.clone();

        handler("x", 1);
        handler2("y", 2);

        assert_eq!(recorder.drain().len(), 2);
    }
}
