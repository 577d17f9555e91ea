//! Task manager and debouncer for async field work
//!
//! Provides lifecycle management for the async side of a field instance:
//! - [`TaskManager`]: keyed tasks with automatic cancellation on re-spawn
//! - [`Debouncer`]: an explicit last-call-wins scheduler owned by the
//!   component instance
//!
//! # Example
//!
//! ```ignore
//! use fieldwork_core::tasks::{Debouncer, TaskKey, TaskManager};
//! use std::time::Duration;
//!
//! let (action_tx, mut action_rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut tasks = TaskManager::new(action_tx);
//!
//! // Spawn a task - any existing task with same key is cancelled
//! tasks.spawn(TaskKey::new("geocode"), async {
//!     let coords = provider.geocode(&address).await;
//!     MapTaskAction::DidGeocode { address, result: coords }
//! });
//!
//! // Debounce user input - only the last scheduled call runs
//! let mut debouncer = Debouncer::new(Duration::from_millis(250));
//! debouncer.schedule(async move { dispatch.fire(address) });
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};

use crate::Action;

/// Identifies a task for cancellation and replacement.
///
/// Tasks with the same key are mutually exclusive - spawning a new task
/// with a key that's already running will cancel the existing task.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TaskKey(String);

impl TaskKey {
    /// Create a new task key.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the key name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for TaskKey {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Manages async task lifecycle with automatic cancellation.
///
/// The task manager maintains a registry of running tasks by key.
/// When a new task is spawned with a key that already exists,
/// the existing task is cancelled before the new one starts. Keying an
/// in-flight external lookup this way means a superseded request can
/// never deliver its completion - only the latest request commits.
///
/// # Type Parameters
///
/// - `A`: The action type that tasks produce
pub struct TaskManager<A> {
    tasks: HashMap<TaskKey, AbortHandle>,
    action_tx: mpsc::UnboundedSender<A>,
}

impl<A> TaskManager<A>
where
    A: Action,
{
    /// Create a new task manager.
    ///
    /// The `action_tx` channel is used to send actions back to the driving
    /// loop when tasks complete.
    pub fn new(action_tx: mpsc::UnboundedSender<A>) -> Self {
        Self {
            tasks: HashMap::new(),
            action_tx,
        }
    }

    /// Spawn a task, cancelling any existing task with the same key.
    ///
    /// The future should return an action that will be sent to the action
    /// channel when the task completes. If the task is cancelled before
    /// completion, no action is sent.
    ///
    /// # Example
    ///
    /// ```ignore
    /// tasks.spawn(TaskKey::new("geocode"), async move {
    ///     let result = provider.geocode(&address).await;
    ///     MapTaskAction::DidGeocode { address, result }
    /// });
    /// ```
    pub fn spawn<F>(&mut self, key: impl Into<TaskKey>, future: F) -> &mut Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        let key = key.into();

        // Cancel existing task with this key
        self.cancel(&key);

        let tx = self.action_tx.clone();
        let handle: JoinHandle<()> = tokio::spawn(async move {
            let action = future.await;
            let _ = tx.send(action);
        });

        self.tasks.insert(key, handle.abort_handle());
        self
    }

    /// Cancel a task by key.
    ///
    /// If no task exists with the given key, this is a no-op.
    pub fn cancel(&mut self, key: &TaskKey) {
        if let Some(handle) = self.tasks.remove(key) {
            handle.abort();
        }
    }

    /// Cancel all running tasks.
    ///
    /// Useful for cleanup on unmount.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }

    /// Check if a task with the given key is currently registered.
    pub fn is_running(&self, key: &TaskKey) -> bool {
        self.tasks.contains_key(key)
    }

    /// Get the number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if there are no registered tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<A> Drop for TaskManager<A> {
    fn drop(&mut self) {
        // Abort all running tasks on drop
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}

/// Last-call-wins scheduler for noisy input.
///
/// An explicit stateful object owned by the component instance: each
/// `schedule` call aborts the previously armed dispatch (if it has not run
/// yet) and arms a new one that waits out the quiet period before running.
/// Repeated calls within the window therefore collapse to the last one.
///
/// The scheduled work is fire-and-forget; nothing is returned to the caller.
/// Any emptiness or validity check belongs in the caller, before
/// `schedule` - a value that should not be dispatched must never be armed
/// in the first place.
pub struct Debouncer {
    delay: Duration,
    pending: Option<AbortHandle>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// The configured quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm `work` to run after the quiet period elapses.
    ///
    /// A previously armed dispatch that has not yet run is aborted, so only
    /// the latest call's work executes.
    pub fn schedule<F>(&mut self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        let handle: JoinHandle<()> = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
        });
        self.pending = Some(handle.abort_handle());
    }

    /// Abort the armed dispatch, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a dispatch is armed and not yet finished.
    pub fn is_armed(&self) -> bool {
        self.pending
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Debug)]
    enum TestAction {
        Done(usize),
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            "Done"
        }
    }

    #[test]
    fn test_task_key() {
        let k1 = TaskKey::new("test");
        let k2 = TaskKey::from("test");
        let k3: TaskKey = "test".into();

        assert_eq!(k1, k2);
        assert_eq!(k2, k3);
        assert_eq!(k1.name(), "test");
    }

    #[tokio::test]
    async fn test_spawn_sends_action() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);

        tasks.spawn("test", async { TestAction::Done(42) });

        let action = tokio::time::timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("timeout")
            .expect("channel closed");

        assert!(matches!(action, TestAction::Done(42)));
    }

    #[tokio::test]
    async fn test_spawn_cancels_previous() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);

        let counter = Arc::new(AtomicUsize::new(0));

        // Spawn first task that takes a while
        let c1 = counter.clone();
        tasks.spawn("test", async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            c1.fetch_add(1, Ordering::SeqCst);
            TestAction::Done(1)
        });

        // Immediately spawn second task with same key
        let c2 = counter.clone();
        tasks.spawn("test", async move {
            c2.fetch_add(10, Ordering::SeqCst);
            TestAction::Done(2)
        });

        // Only second task should complete
        let action = tokio::time::timeout(Duration::from_millis(200), rx.recv())
            .await
            .expect("timeout")
            .expect("channel closed");

        assert!(matches!(action, TestAction::Done(2)));
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_cancel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);

        tasks.spawn("test", async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            TestAction::Done(1)
        });

        assert!(tasks.is_running(&TaskKey::new("test")));

        tasks.cancel(&TaskKey::new("test"));

        assert!(!tasks.is_running(&TaskKey::new("test")));

        // Should not receive action
        let result = tokio::time::timeout(Duration::from_millis(150), rx.recv()).await;
        assert!(result.is_err() || result.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);

        tasks.spawn("a", async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            TestAction::Done(1)
        });
        tasks.spawn("b", async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            TestAction::Done(2)
        });

        assert_eq!(tasks.len(), 2);

        tasks.cancel_all();

        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_debouncer_waits_out_quiet_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(50));

        let tx2 = tx.clone();
        debouncer.schedule(async move {
            let _ = tx2.send(1u32);
        });

        // Should not run yet
        let early = tokio::time::timeout(Duration::from_millis(30), rx.recv()).await;
        assert!(early.is_err());

        // Runs after the quiet period
        let value = tokio::time::timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("timeout")
            .expect("channel closed");
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn test_debouncer_collapses_to_last_call() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(50));

        for i in 0..3u32 {
            let tx = tx.clone();
            debouncer.schedule(async move {
                let _ = tx.send(i);
            });
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let value = tokio::time::timeout(Duration::from_millis(150), rx.recv())
            .await
            .expect("timeout")
            .expect("channel closed");
        assert_eq!(value, 2);

        // Nothing else was dispatched
        drop(tx);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_debouncer_cancel() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u32>();
        let mut debouncer = Debouncer::new(Duration::from_millis(30));

        debouncer.schedule(async move {
            let _ = tx.send(1);
        });
        assert!(debouncer.is_armed());

        debouncer.cancel();
        assert!(!debouncer.is_armed());

        let result = tokio::time::timeout(Duration::from_millis(80), rx.recv()).await;
        assert!(result.is_err() || result.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_debouncer_aborts_on_drop() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u32>();

        {
            let mut debouncer = Debouncer::new(Duration::from_millis(30));
            debouncer.schedule(async move {
                let _ = tx.send(1);
            });
        }

        let result = tokio::time::timeout(Duration::from_millis(80), rx.recv()).await;
        assert!(result.is_err() || result.unwrap().is_none());
    }
}
