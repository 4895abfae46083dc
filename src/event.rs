//! The event queue of the sweep.
//!
//! Circle events are never removed from the heap when they become invalid. Instead their id is
//! recorded in a deleted-set, and [`EventQueue::pop`] drops them when they come out.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::beachline::ArcIdx;
use crate::heap::Heap;
use crate::{cmp_f64, Point, SiteIdx};

pub type CircleId = u32;

/// Three consecutive arcs converging to a point, which removes the middle one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleEvent {
    pub id: CircleId,
    /// x of the circle center.
    pub x: f64,
    /// y of the point where the sweep line leaves the circle.
    pub y: f64,
    pub y_center: f64,
    /// The arc that vanishes.
    pub arc: ArcIdx,
}
impl CircleEvent {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y_center)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Site { site: SiteIdx, pos: Point },
    Circle(CircleEvent),
}
impl Event {
    /// Return the position where this event happens.
    pub fn pos(&self) -> Point {
        match self {
            Event::Site { pos, .. } => *pos,
            Event::Circle(c) => Point::new(c.x, c.y),
        }
    }
}

/// Order by (y, x). At the exact same point a circle event goes before a site event, and ties
/// between events of the same kind are broken by id.
fn event_cmp(a: &Event, b: &Event) -> Ordering {
    let (pa, pb) = (a.pos(), b.pos());
    cmp_f64(pa.y, pb.y)
        .then_with(|| cmp_f64(pa.x, pb.x))
        .then_with(|| match (a, b) {
            (Event::Circle(a), Event::Circle(b)) => a.id.cmp(&b.id),
            (Event::Circle(_), Event::Site { .. }) => Ordering::Less,
            (Event::Site { .. }, Event::Circle(_)) => Ordering::Greater,
            (Event::Site { site: a, .. }, Event::Site { site: b, .. }) => a.cmp(b),
        })
}

pub struct EventQueue {
    heap: Heap<Event, fn(&Event, &Event) -> Ordering>,
    deleted: HashSet<CircleId>,
    next_circle: CircleId,
}

impl EventQueue {
    /// A queue holding a site event for every site.
    pub fn new(sites: &[Point]) -> Self {
        let cmp: fn(&Event, &Event) -> Ordering = event_cmp;
        let mut queue = EventQueue {
            heap: Heap::with_capacity(5 * sites.len(), cmp),
            deleted: HashSet::new(),
            next_circle: 0,
        };
        for (i, &pos) in sites.iter().enumerate() {
            queue.push_site(i as SiteIdx, pos);
        }
        queue
    }

    pub fn push_site(&mut self, site: SiteIdx, pos: Point) {
        self.heap.push(Event::Site { site, pos });
    }

    pub fn push_circle(&mut self, center: Point, radius: f64, arc: ArcIdx) -> CircleEvent {
        let event = CircleEvent {
            id: self.next_circle,
            x: center.x,
            y: center.y + radius,
            y_center: center.y,
            arc,
        };
        self.next_circle += 1;
        tracing::trace!(?event, "push circle event");
        self.heap.push(Event::Circle(event));
        event
    }

    /// Mark a pending circle event as invalid. It stays in the heap until popped.
    pub fn invalidate(&mut self, event: CircleEvent) {
        tracing::trace!(id = event.id, "invalidate circle event");
        self.deleted.insert(event.id);
    }

    pub fn is_invalidated(&self, event: &CircleEvent) -> bool {
        self.deleted.contains(&event.id)
    }

    /// Pop the next valid event, dropping invalidated circle events on the way.
    pub fn pop(&mut self) -> Option<Event> {
        loop {
            let event = self.heap.pop()?;
            if let Event::Circle(c) = &event {
                if self.deleted.remove(&c.id) {
                    tracing::trace!(id = c.id, "skip deleted circle event");
                    continue;
                }
            }
            return Some(event);
        }
    }

    /// Pending events, in heap order. May contain invalidated circle events.
    pub fn as_slice(&self) -> &[Event] {
        self.heap.as_slice()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of circle events created so far.
    pub fn circle_count(&self) -> usize {
        self.next_circle as usize
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("events", &self.heap)
            .field("deleted", &self.deleted)
            .finish()
    }
}
