//! Idle tracking for partially received packets

/// Tracks time since the last received byte
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IdleTimer {
    /// Timeout in ms, or None to never expire
    timeout_ms: Option<u32>,
    /// Silence accumulated over whole intervals without a byte (ms)
    idle_ms: u32,
    /// A byte arrived since the last update
    fresh: bool,
}

impl IdleTimer {
    /// Create a timer expiring after `timeout_ms` of silence
    pub fn new(timeout_ms: Option<u32>) -> Self {
        Self {
            timeout_ms,
            idle_ms: 0,
            fresh: false,
        }
    }

    /// Record that a byte arrived
    pub fn byte_received(&mut self) {
        self.idle_ms = 0;
        self.fresh = true;
    }

    /// Forget all accumulated silence
    pub fn clear(&mut self) {
        self.idle_ms = 0;
        self.fresh = false;
    }

    /// Update time tracking
    ///
    /// # Arguments
    /// - `elapsed_ms`: Time elapsed since the last update
    ///
    /// Returns true once the silence reaches the timeout. An interval in
    /// which a byte arrived adds no silence, since the byte may have come at
    /// its very end.
    pub fn advance(&mut self, elapsed_ms: u32) -> bool {
        if self.fresh {
            self.fresh = false;
            return false;
        }
        self.idle_ms = self.idle_ms.saturating_add(elapsed_ms);
        self.is_expired()
    }

    /// Returns true if the silence has reached the timeout
    pub fn is_expired(&self) -> bool {
        matches!(self.timeout_ms, Some(timeout) if self.idle_ms >= timeout)
    }

    /// Time since the last byte (ms)
    pub fn idle_ms(&self) -> u32 {
        self.idle_ms
    }
}
