use whatsapp_client::ClientEvent;

/// Dispatcher lifecycle. Session events move it through the first half,
/// the send queue through the second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatcherState {
    Idle,
    Authenticating,
    Ready,
    Sending,
    Done,
    Disconnected(String),
    AuthFailed(String),
}

impl DispatcherState {
    pub fn start(&self) -> Self {
        match self {
            DispatcherState::Idle => DispatcherState::Authenticating,
            other => other.clone(),
        }
    }

    /// Next state after a session event. Events that don't move the
    /// lifecycle leave it unchanged.
    pub fn on_event(&self, event: &ClientEvent) -> Self {
        use DispatcherState::*;

        match (self, event) {
            (Authenticating, ClientEvent::Ready) => Ready,
            (Authenticating | Ready | Sending, ClientEvent::AuthFailure(reason)) => {
                AuthFailed(reason.clone())
            }
            (Authenticating | Ready | Sending, ClientEvent::Disconnected(reason)) => {
                Disconnected(reason.clone())
            }
            (state, _) => state.clone(),
        }
    }

    pub fn begin_sending(&self) -> Self {
        match self {
            DispatcherState::Ready => DispatcherState::Sending,
            other => other.clone(),
        }
    }

    pub fn finish(&self) -> Self {
        match self {
            DispatcherState::Sending => DispatcherState::Done,
            other => other.clone(),
        }
    }

    /// Inbound replies are only answered once the session is up.
    pub fn accepts_inbound(&self) -> bool {
        matches!(self, DispatcherState::Ready | DispatcherState::Sending)
    }

    pub fn is_halted(&self) -> bool {
        matches!(
            self,
            DispatcherState::Disconnected(_) | DispatcherState::AuthFailed(_)
        )
    }
}
