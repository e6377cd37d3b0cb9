//! Frame-driven one-shot timers for hosts without a scheduler.

use crate::host::{FragmentId, Timers};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    deadline: f64,
    fragment: FragmentId,
}

/// Deadline queue advanced by the host's frame delta.
///
/// Timers due in the same frame fire in deadline order, ties in scheduling
/// order.
#[derive(Debug, Clone, Default)]
pub struct FrameTimers {
    now: f64,
    pending: Vec<Pending>,
}

impl FrameTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds advanced so far.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Advance the clock by `dt` seconds and return every fragment whose
    /// timer fired.
    pub fn advance(&mut self, dt: f32) -> Vec<FragmentId> {
        if dt.is_finite() && dt > 0.0 {
            self.now += f64::from(dt);
        }
        let now = self.now;
        let (mut due, pending): (Vec<Pending>, Vec<Pending>) =
            self.pending.drain(..).partition(|p| p.deadline <= now);
        self.pending = pending;
        due.sort_by(|a, b| a.deadline.total_cmp(&b.deadline));
        due.into_iter().map(|p| p.fragment).collect()
    }
}

impl Timers for FrameTimers {
    fn schedule_once(&mut self, delay: f32, fragment: FragmentId) {
        // NaN fires on the next advance; infinity never fires.
        let delay = if delay.is_nan() { 0.0 } else { delay.max(0.0) };
        self.pending.push(Pending {
            deadline: self.now + f64::from(delay),
            fragment,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_delay() {
        let mut timers = FrameTimers::new();
        timers.schedule_once(1.0, FragmentId(1));

        assert!(timers.advance(0.5).is_empty());
        assert_eq!(timers.advance(0.5), vec![FragmentId(1)]);
        assert!(timers.advance(10.0).is_empty());
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let mut timers = FrameTimers::new();
        timers.schedule_once(3.0, FragmentId(1));
        timers.schedule_once(1.0, FragmentId(2));
        timers.schedule_once(1.0, FragmentId(3));
        timers.schedule_once(9.0, FragmentId(4));

        assert_eq!(
            timers.advance(5.0),
            vec![FragmentId(2), FragmentId(3), FragmentId(1)]
        );
        assert_eq!(timers.pending(), 1);
    }

    #[test]
    fn test_delay_relative_to_now() {
        let mut timers = FrameTimers::new();
        timers.advance(2.0);
        timers.schedule_once(1.0, FragmentId(7));
        assert!(timers.advance(0.9).is_empty());
        assert_eq!(timers.advance(0.2), vec![FragmentId(7)]);
    }

    #[test]
    fn test_bad_inputs() {
        let mut timers = FrameTimers::new();
        timers.schedule_once(f32::NAN, FragmentId(1));
        assert_eq!(timers.advance(-1.0), vec![FragmentId(1)]);
        assert_eq!(timers.now(), 0.0);
    }

    #[test]
    fn test_infinite_delay_never_fires() {
        let mut timers = FrameTimers::new();
        timers.schedule_once(f32::INFINITY, FragmentId(9));
        assert!(timers.advance(1.0 / 60.0).is_empty());
        assert!(timers.advance(1.0e6).is_empty());
        assert_eq!(timers.pending(), 1);
    }
}
