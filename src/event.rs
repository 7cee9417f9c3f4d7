//! Event queue: a max-heap ordered by descending y (the directrix
//! descends from the topmost site), with a deterministic tie-break so no
//! two distinct events ever compare equal.
//!
//! Circle events are never removed from the heap when they go stale —
//! only their originating arc's generation counter moves on, which the
//! engine checks at pop time (see `engine::Engine::step`). This is what
//! lets `Snapshot` still report an invalidated circle event with
//! `is_valid = false` instead of it having silently vanished.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::geometry::{Point, F};
use crate::node::NodeId;
use crate::site::SiteId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    Site {
        site: SiteId,
    },
    Circle {
        arc: NodeId,
        generation: u64,
        center: Point,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct Event {
    pub y: F,
    pub x: F,
    seq: u64,
    pub kind: EventKind,
}

impl Event {
    fn site(site: SiteId, at: Point, seq: u64) -> Self {
        Self {
            y: at.y,
            x: at.x,
            seq,
            kind: EventKind::Site { site },
        }
    }

    fn circle(arc: NodeId, generation: u64, center: Point, trigger_y: F, seq: u64) -> Self {
        Self {
            y: trigger_y,
            x: center.x,
            seq,
            kind: EventKind::Circle {
                arc,
                generation,
                center,
            },
        }
    }

    pub fn is_site(&self) -> bool {
        matches!(self.kind, EventKind::Site { .. })
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.y == other.y && self.x == other.x && self.seq == other.seq
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Greatest y pops first (the sweep descends). Larger x breaks a
        // y-tie. Earlier-inserted events break a (y, x)-tie so the order
        // among simultaneous events is deterministic rather than
        // whatever the heap happens to do.
        self.y
            .cmp(&other.y)
            .then_with(|| self.x.cmp(&other.x))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub struct EventQueue {
    heap: BinaryHeap<Event>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    fn seq(&mut self) -> u64 {
        let s = self.next_seq;
        self.next_seq += 1;
        s
    }

    pub fn push_site(&mut self, site: SiteId, at: Point) {
        let seq = self.seq();
        self.heap.push(Event::site(site, at, seq));
    }

    pub fn push_circle(&mut self, arc: NodeId, generation: u64, center: Point, trigger_y: F) {
        let seq = self.seq();
        self.heap.push(Event::circle(arc, generation, center, trigger_y, seq));
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop()
    }

    pub fn peek(&self) -> Option<&Event> {
        self.heap.peek()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }

    /// Every circle event still sitting in the heap, valid or not. The
    /// caller (Snapshot) decides validity by comparing `generation`
    /// against the arc's current generation.
    pub fn circle_events(&self) -> impl Iterator<Item = (F, NodeId, u64)> + '_ {
        self.heap.iter().filter_map(|e| match e.kind {
            EventKind::Circle {
                arc, generation, ..
            } => Some((e.y, arc, generation)),
            _ => None,
        })
    }

    pub fn site_event_ys(&self) -> impl Iterator<Item = F> + '_ {
        self.heap
            .iter()
            .filter_map(|e| e.is_site().then_some(e.y))
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_largest_y_first() {
        let mut q = EventQueue::new();
        q.push_site(SiteId(0), Point::new(100.0, 100.0));
        q.push_site(SiteId(1), Point::new(200.0, 400.0));
        q.push_site(SiteId(2), Point::new(300.0, 250.0));

        let first = q.pop().unwrap();
        assert_eq!(first.y, F::from(400.0));
        let second = q.pop().unwrap();
        assert_eq!(second.y, F::from(250.0));
        let third = q.pop().unwrap();
        assert_eq!(third.y, F::from(100.0));
    }

    #[test]
    fn ties_break_by_larger_x_then_insertion_order() {
        let mut q = EventQueue::new();
        q.push_site(SiteId(0), Point::new(100.0, 400.0));
        q.push_site(SiteId(1), Point::new(300.0, 400.0));
        q.push_site(SiteId(2), Point::new(300.0, 400.0));

        let first = q.pop().unwrap();
        assert_eq!(first.x, F::from(300.0));
        match first.kind {
            EventKind::Site { site } => assert_eq!(site, SiteId(1)),
            _ => panic!("expected site event"),
        }
    }

    #[test]
    fn stale_circle_events_remain_visible() {
        let mut q = EventQueue::new();
        let arc = NodeId(3);
        q.push_circle(arc, 0, Point::new(50.0, 50.0), F::from(10.0));
        q.push_circle(arc, 1, Point::new(50.0, 50.0), F::from(20.0));

        let mut seen: Vec<_> = q.circle_events().collect();
        seen.sort_by_key(|(_, _, g)| *g);
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].2, 0);
        assert_eq!(seen[1].2, 1);
    }
}
