// Timer-coalescing slot for settings that arrive in bursts (held keys,
// slider drags). Only the latest value survives, and it becomes available
// `delay_ms` after the last update.

#[derive(Clone, Debug)]
pub struct Debounced<T> {
    delay_ms: u64,
    pending: Option<(T, u64)>, // value, due time
}

impl<T> Debounced<T> {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    /// Replace any pending value and restart the delay.
    pub fn set(&mut self, value: T, now_ms: u64) {
        self.pending = Some((value, now_ms + self.delay_ms));
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(value, _)| value)
    }

    pub fn due_at(&self) -> Option<u64> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    pub fn take_due(&mut self, now_ms: u64) -> Option<T> {
        let due = self.pending.as_ref()?.1;
        if due > now_ms {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
