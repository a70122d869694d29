use super::synchronizer::DrainTarget;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, sleep_until};
use tracing::debug;

enum DebounceCommand {
    Touch,
    ExecuteNow,
}

/// Coalesces drain requests: each `touch` restarts the delay, `execute_now`
/// skips it. Pending work is drained once more when every handle is dropped.
#[derive(Clone)]
pub struct DebouncedDrain {
    tx: mpsc::UnboundedSender<DebounceCommand>,
}

impl DebouncedDrain {
    pub fn spawn(target: Arc<dyn DrainTarget>, delay: Duration) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(target, delay, rx));
        (Self { tx }, handle)
    }

    pub fn touch(&self) {
        // The worker only stops once every sender is gone, so a send cannot fail here.
        let _ = self.tx.send(DebounceCommand::Touch);
    }

    pub fn execute_now(&self) {
        let _ = self.tx.send(DebounceCommand::ExecuteNow);
    }
}

async fn run(
    target: Arc<dyn DrainTarget>,
    delay: Duration,
    mut rx: mpsc::UnboundedReceiver<DebounceCommand>,
) {
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(DebounceCommand::Touch) => {
                    deadline = Some(Instant::now() + delay);
                }
                Some(DebounceCommand::ExecuteNow) => {
                    deadline = None;
                    target.drain_now().await;
                }
                None => {
                    if deadline.is_some() {
                        target.drain_now().await;
                    }
                    break;
                }
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                debug!(target: "outbox::debounce", "debounce elapsed, draining");
                target.drain_now().await;
            }
        }
    }
}
