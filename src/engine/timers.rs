//! Timer queue shared by the tick, bubble and highlight domains.
//!
//! Time is an engine-relative `Duration`. Every timer belongs to a
//! `SessionToken`; cancelling a token removes all of its timers at once.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::program::source::SpriteId;
use crate::types::Bubble;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(u64);

#[derive(Debug, Default)]
pub struct TokenSource {
    next: u64,
}

impl TokenSource {
    pub fn issue(&mut self) -> SessionToken {
        self.next += 1;
        SessionToken(self.next)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    Tick,
    ShowBubble { sprite_id: SpriteId, bubble: Bubble },
    HideBubble { sprite_id: SpriteId },
    ClearHighlight,
}

#[derive(Debug)]
struct Timer {
    due: Duration,
    seq: u64,
    token: SessionToken,
    every: Option<Duration>,
    event: TimerEvent,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// A timer that came due.
#[derive(Debug, Clone, PartialEq)]
pub struct Fired {
    pub at: Duration,
    pub token: SessionToken,
    pub event: TimerEvent,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<Timer>>,
    next_seq: u64,
}

impl TimerQueue {
    fn push(&mut self, due: Duration, token: SessionToken, every: Option<Duration>, event: TimerEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Timer {
            due,
            seq,
            token,
            every,
            event,
        }));
    }

    pub fn schedule(&mut self, due: Duration, token: SessionToken, event: TimerEvent) {
        self.push(due, token, None, event);
    }

    /// First firing at `first`, then every `every` after that.
    pub fn schedule_repeating(
        &mut self,
        first: Duration,
        every: Duration,
        token: SessionToken,
        event: TimerEvent,
    ) {
        self.push(first, token, Some(every), event);
    }

    /// Drop every timer owned by `token`. Returns how many were pending.
    pub fn cancel(&mut self, token: SessionToken) -> usize {
        let before = self.heap.len();
        self.heap.retain(|Reverse(t)| t.token != token);
        before - self.heap.len()
    }

    /// Pop the earliest timer due at or before `now`. A repeating timer is
    /// re-queued for its next firing before being returned.
    pub fn pop_due(&mut self, now: Duration) -> Option<Fired> {
        if self.heap.peek().is_none_or(|Reverse(t)| t.due > now) {
            return None;
        }
        let Reverse(timer) = self.heap.pop()?;
        if let Some(every) = timer.every {
            let next = timer.due.saturating_add(every);
            // At the end of representable time a repeating timer stops.
            if next > timer.due {
                self.push(next, timer.token, Some(every), timer.event.clone());
            }
        }
        Some(Fired {
            at: timer.due,
            token: timer.token,
            event: timer.event,
        })
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.heap.peek().map(|Reverse(t)| t.due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn same_instant_fires_in_scheduling_order() {
        let mut tokens = TokenSource::default();
        let t = tokens.issue();
        let mut q = TimerQueue::default();
        q.schedule(ms(10), t, TimerEvent::HideBubble { sprite_id: SpriteId(1) });
        q.schedule(ms(10), t, TimerEvent::ClearHighlight);
        q.schedule(ms(5), t, TimerEvent::Tick);

        let order: Vec<_> = std::iter::from_fn(|| q.pop_due(ms(10)).map(|f| f.event)).collect();
        assert_eq!(
            order,
            vec![
                TimerEvent::Tick,
                TimerEvent::HideBubble { sprite_id: SpriteId(1) },
                TimerEvent::ClearHighlight,
            ]
        );
    }

    #[test]
    fn repeating_timer_requeues() {
        let mut tokens = TokenSource::default();
        let t = tokens.issue();
        let mut q = TimerQueue::default();
        q.schedule_repeating(ms(500), ms(500), t, TimerEvent::Tick);

        assert!(q.pop_due(ms(499)).is_none());
        let fired: Vec<_> = std::iter::from_fn(|| q.pop_due(ms(1600)).map(|f| f.at)).collect();
        assert_eq!(fired, vec![ms(500), ms(1000), ms(1500)]);
        assert_eq!(q.next_due(), Some(ms(2000)));
    }

    #[test]
    fn repeating_timer_stops_at_the_end_of_time() {
        let mut q = TimerQueue::default();
        let t = TokenSource::default().issue();
        q.schedule_repeating(Duration::MAX, ms(500), t, TimerEvent::Tick);

        assert!(q.pop_due(Duration::MAX).is_some());
        assert!(q.pop_due(Duration::MAX).is_none());
    }

    #[test]
    fn cancel_removes_only_that_token() {
        let mut tokens = TokenSource::default();
        let old = tokens.issue();
        let new = tokens.issue();
        let mut q = TimerQueue::default();
        q.schedule_repeating(ms(1), ms(1), old, TimerEvent::Tick);
        q.schedule(ms(2), old, TimerEvent::ClearHighlight);
        q.schedule(ms(3), new, TimerEvent::Tick);

        assert_eq!(q.cancel(old), 2);
        let fired = q.pop_due(ms(100)).unwrap();
        assert_eq!(fired.token, new);
        assert_eq!(q.next_due(), None);
    }
}
