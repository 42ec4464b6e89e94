use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cooperative cancellation shared between a supervisor and a checker.
///
/// Clones observe the same flag. The supervisor [`cancel`](Self::cancel)s it
/// once; the checker polls [`is_cancelled`](Self::is_cancelled) before every
/// rule and answers `false` from then on. The flag stays set afterwards, which
/// is how a caller tells "ran out of time" apart from "not a subtype".
#[derive(Clone, Debug, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
