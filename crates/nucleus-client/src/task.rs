// Fire-and-forget task seam
//
// `send_async` hands its work to whatever runner the host supplies. The
// library only depends on the capability, not on a particular queue; the
// provided implementation spawns onto the ambient tokio runtime.

use futures::future::BoxFuture;

/// Pluggable runner for fire-and-forget work
pub trait TaskSubmitter: Send + Sync {
    fn submit(&self, task: BoxFuture<'static, ()>);
}

/// TaskSubmitter backed by `tokio::spawn`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawner;

impl TaskSubmitter for TokioSpawner {
    fn submit(&self, task: BoxFuture<'static, ()>) {
        tokio::spawn(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_tokio_spawner_runs_submitted_task() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);

        TokioSpawner.submit(Box::pin(async move {
            flag.store(true, Ordering::SeqCst);
        }));

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(ran.load(Ordering::SeqCst));
    }
}
