use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Initializing,
    Initialized,
}

/// One-shot readiness broadcast: waiters park until restore has finished.
pub struct InitGate {
    state: watch::Sender<InitState>,
}

impl InitGate {
    pub fn new() -> Self {
        let (state, _) = watch::channel(InitState::Uninitialized);
        Self { state }
    }

    /// Moves to `Initializing`; returns false when initialization already began.
    pub fn begin(&self) -> bool {
        self.state.send_if_modified(|state| {
            if *state == InitState::Uninitialized {
                *state = InitState::Initializing;
                true
            } else {
                false
            }
        })
    }

    pub fn complete(&self) {
        self.state.send_replace(InitState::Initialized);
    }

    pub fn state(&self) -> InitState {
        *self.state.borrow()
    }

    pub async fn wait_ready(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|state| *state == InitState::Initialized).await;
    }
}

impl Default for InitGate {
    fn default() -> Self {
        Self::new()
    }
}
