use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

/// Background work owned by one screen.
///
/// Every spawned future reports back through the scope's channel and the
/// screen drains it between frames. Dropping the scope aborts whatever is
/// still running, so a response that arrives after teardown never touches
/// the screen's state.
pub struct TaskScope<M> {
    tx: mpsc::UnboundedSender<M>,
    rx: mpsc::UnboundedReceiver<M>,
    handles: Vec<AbortHandle>,
}

impl<M: Send + 'static> TaskScope<M> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            handles: Vec::new(),
        }
    }

    /// Run `fut` in the background and deliver its output as a message.
    pub fn spawn<F>(&mut self, fut: F) -> AbortHandle
    where
        F: Future<Output = M> + Send + 'static,
    {
        let tx = self.tx.clone();
        let join = tokio::spawn(async move {
            // Receiver gone means the screen was torn down.
            let _ = tx.send(fut.await);
        });
        self.handles.retain(|h| !h.is_finished());
        self.handles.push(join.abort_handle());
        join.abort_handle()
    }

    /// Deliver `msg` after `delay` unless aborted first.
    pub fn schedule(&mut self, delay: Duration, msg: M) -> AbortHandle {
        self.spawn(async move {
            tokio::time::sleep(delay).await;
            msg
        })
    }

    pub fn try_next(&mut self) -> Option<M> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next message. The scope keeps a sender alive, so this
    /// only returns `None` if the runtime is shutting down.
    #[cfg(test)]
    pub async fn next(&mut self) -> Option<M> {
        self.rx.recv().await
    }

    /// Number of tasks that have not completed yet.
    #[cfg(test)]
    pub fn running(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// Abort everything and drop messages that were already queued.
    pub fn cancel_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        while self.rx.try_recv().is_ok() {}
    }
}

impl<M: Send + 'static> Default for TaskScope<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Drop for TaskScope<M> {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_spawned_result_is_delivered() {
        let mut scope = TaskScope::new();
        scope.spawn(async { 41 + 1 });
        assert_eq!(scope.next().await, Some(42));
        assert!(scope.try_next().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_message_waits_for_delay() {
        let mut scope = TaskScope::new();
        let start = tokio::time::Instant::now();
        scope.schedule(Duration::from_secs(3), "tick");
        assert_eq!(scope.next().await, Some("tick"));
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_timer_never_fires() {
        let mut scope = TaskScope::new();
        let first = scope.schedule(Duration::from_secs(3), 1);
        scope.schedule(Duration::from_secs(5), 2);
        first.abort();
        assert_eq!(scope.next().await, Some(2));
        assert!(scope.try_next().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_scope_aborts_work() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let mut scope: TaskScope<()> = TaskScope::new();
        scope.spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            flag.store(true, Ordering::SeqCst);
        });
        drop(scope);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_all_discards_queued_messages() {
        let mut scope = TaskScope::new();
        scope.spawn(async { "late" });
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        scope.cancel_all();
        assert!(scope.try_next().is_none());
        assert_eq!(scope.running(), 0);
    }
}
