/// Handle of one requested animation-frame redraw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

/// Coalesces redraw requests to at most one pending token.
///
/// Requesting while a token is pending cancels it; a frame callback carrying
/// a cancelled token is a no-op.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    next: u64,
    pending: Option<FrameToken>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh token, replacing any pending one.
    pub fn request(&mut self) -> FrameToken {
        if let Some(old) = self.pending.take() {
            tracing::trace!(token = old.0, "superseding pending redraw");
        }
        self.next += 1;
        let token = FrameToken(self.next);
        self.pending = Some(token);
        token
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Consumes `token` if it is the pending one. Returns whether the frame should draw.
    pub fn fire(&mut self, token: FrameToken) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Consumes whatever token is pending, for hosts that tick once per frame.
    pub fn fire_pending(&mut self) -> bool {
        self.pending.take().is_some()
    }
}
