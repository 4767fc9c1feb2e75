use std::cell::Cell;
use std::time::Duration;

/// Trailing debounce keyed by a generation counter.
///
/// Each `trigger` invalidates every earlier one; a timer armed for a stale
/// generation finds `is_current` false when it fires and does nothing.
#[derive(Debug)]
pub struct Debouncer {
    generation: Cell<u64>,
    delay: Cell<Duration>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            generation: Cell::new(0),
            delay: Cell::new(delay),
        }
    }

    /// Register a new event and return the generation its timer must carry.
    pub fn trigger(&self) -> u64 {
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        generation
    }

    /// Drop any pending timer.
    pub fn cancel(&self) {
        self.trigger();
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.get() == generation
    }

    pub fn delay(&self) -> Duration {
        self.delay.get()
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay.set(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_last_trigger_fires() {
        let debouncer = Debouncer::new(Duration::from_millis(600));
        let first = debouncer.trigger();
        let second = debouncer.trigger();
        assert!(!debouncer.is_current(first));
        assert!(debouncer.is_current(second));
    }

    #[test]
    fn test_cancel_invalidates_pending() {
        let debouncer = Debouncer::new(Duration::from_millis(200));
        let pending = debouncer.trigger();
        debouncer.cancel();
        assert!(!debouncer.is_current(pending));
    }

    #[test]
    fn test_delay_is_adjustable() {
        let debouncer = Debouncer::new(Duration::from_millis(600));
        debouncer.set_delay(Duration::from_millis(150));
        assert_eq!(debouncer.delay(), Duration::from_millis(150));
    }
}
