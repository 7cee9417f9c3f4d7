//! The sweep driver (§4.7): owns the beachline, event queue, and
//! completed-edge list for one run, and exposes the stepping/inspection
//! surface external callers (a GUI shell, a demo binary, tests) use.
//!
//! Grounded on the teacher's `fortunes_algorithm` main loop for the
//! site/circle dispatch shape, and on `examples/original_source/forchun.py`'s
//! `Forchun` class for the parts the teacher never had at all: a stepping
//! API (`next_step`/`next_stop_by`/`all_steps`), restart/replay
//! (`_start_over`/`draw_by_prev_step`), and the snapshot surface
//! (`draw`/`_dive`).

use log::{debug, info};

use crate::beachline::{Beachline, BeachlineView};
use crate::error::EngineError;
use crate::event::{EventKind, EventQueue};
use crate::geometry::{round_to_i32, BoundingBox, Point, Segment, F};
use crate::node::NodeId;
use crate::site::{Site, SiteId};

/// Driver state, an ambient addition (§6) so a host can render "nothing
/// has happened yet" versus "finished" without inferring it from
/// `current_d`/queue emptiness.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SweepState {
    Idle,
    Running,
    Done,
}

/// Self-contained description of the sweep at some directrix `y`,
/// consumable by an external renderer without holding onto the engine
/// (§4.8).
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub site_event_ys: Vec<i32>,
    pub circle_events: Vec<(i32, bool)>,
    pub completed_segments: Vec<((i32, i32), (i32, i32))>,
    pub partial_polylines: Vec<Vec<(i32, i32)>>,
}

pub struct Engine {
    sites: Vec<Site>,
    frame: BoundingBox,
    beachline: Beachline,
    events: EventQueue,
    completed: Vec<Segment>,
    current_d: Option<F>,
    has_stepped: bool,
    finalized: bool,
}

impl Engine {
    /// Construct an engine over `sites`, rejecting non-positive widths and
    /// empty site lists at the boundary (§7) rather than panicking later.
    pub fn new(sites: impl IntoIterator<Item = (i32, i32)>, width: i32) -> Result<Self, EngineError> {
        if width <= 0 {
            return Err(EngineError::NonPositiveWidth(width));
        }

        let sites: Vec<Site> = sites.into_iter().map(|(x, y)| Site::new(x, y)).collect();
        if sites.is_empty() {
            return Err(EngineError::NoSites);
        }

        let mut engine = Self {
            sites,
            frame: BoundingBox::new(0.0, width as f64, 0.0, width as f64),
            beachline: Beachline::new(),
            events: EventQueue::new(),
            completed: Vec::new(),
            current_d: None,
            has_stepped: false,
            finalized: false,
        };
        engine.seed_events();
        Ok(engine)
    }

    fn seed_events(&mut self) {
        for (idx, site) in self.sites.iter().enumerate() {
            self.events.push_site(SiteId(idx), site.point());
        }
    }

    /// `i32::MAX` before any event has fired, since the directrix starts
    /// above every site and only descends from there.
    pub fn current_d(&self) -> i32 {
        self.current_d.map(round_to_i32).unwrap_or(i32::MAX)
    }

    pub fn state(&self) -> SweepState {
        if !self.has_stepped {
            SweepState::Idle
        } else if self.events.is_empty() {
            SweepState::Done
        } else {
            SweepState::Running
        }
    }

    /// Advance one valid event. A no-op once the queue is empty. Stale
    /// circle events (generation mismatch against their arc) are discarded
    /// in a loop, per §4.3, so one `step()` always either applies exactly
    /// one mutation or finds the queue drained.
    ///
    /// Draining the queue (here, or as a side effect of the seeding drain
    /// in `dispatch_site`) triggers a one-time extension of every edge
    /// still growing in the tree out to the frame boundary, so edges that
    /// never meet a second circle event (the two-site case has none at
    /// all) still end up in `completed`.
    pub fn step(&mut self) {
        self.has_stepped = true;
        loop {
            let event = match self.events.pop() {
                Some(e) => e,
                None => {
                    self.finalize_if_needed();
                    return;
                }
            };

            match event.kind {
                EventKind::Site { site } => {
                    self.dispatch_site(site, event.y);
                    self.current_d = Some(event.y);
                    if self.events.is_empty() {
                        self.finalize_if_needed();
                    }
                    return;
                }
                EventKind::Circle {
                    arc,
                    generation,
                    center,
                } => {
                    if self.beachline.arc_generation(arc) != generation {
                        continue;
                    }
                    self.dispatch_circle(arc, center, event.y);
                    self.current_d = Some(event.y);
                    if self.events.is_empty() {
                        self.finalize_if_needed();
                    }
                    return;
                }
            }
        }
    }

    fn finalize_if_needed(&mut self) {
        if !self.finalized {
            self.beachline.extend_edges_to_frame(&self.frame, &mut self.completed);
            self.finalized = true;
        }
    }

    /// Site event (§4.4): seeds the beachline on the very first call, then
    /// either drains a run of same-directrix siblings (the collinear
    /// seeding special case) or performs the general three-arc split.
    fn dispatch_site(&mut self, site_id: SiteId, d: F) {
        let site = self.sites[site_id.0].point();
        debug!("site event: {:?} at d={}", site_id, d.into_inner());

        if self.beachline.is_empty() {
            self.beachline.seed(site);
            while let Some(next) = self.events.peek() {
                if !next.is_site() || next.y != d {
                    break;
                }
                let ev = self.events.pop().expect("peeked event must pop");
                if let EventKind::Site {
                    site: next_site_id,
                } = ev.kind
                {
                    let next_site = self.sites[next_site_id.0].point();
                    let arc_idx = self
                        .beachline
                        .locate(next_site.x, d)
                        .expect("seeded beachline is non-empty");
                    self.beachline.split_arc_seeded(arc_idx, next_site, d);
                }
            }
            return;
        }

        let arc_idx = self
            .beachline
            .locate(site.x, d)
            .expect("non-empty beachline");
        let (left_idx, right_idx) = self.beachline.split_arc(arc_idx, site, d);
        self.beachline
            .register_circle_event(left_idx, d, &mut self.events);
        self.beachline
            .register_circle_event(right_idx, d, &mut self.events);
    }

    /// Circle event (§4.5): finalize the two segments meeting at the
    /// vertex, splice the surviving neighbors' bisector into the tree, and
    /// re-register circle events for the arcs that now flank each other.
    fn dispatch_circle(&mut self, arc_idx: NodeId, vertex: Point, d: F) {
        debug!(
            "circle event: arc {:?} vertex {:?} at d={}",
            arc_idx,
            vertex,
            d.into_inner()
        );
        let (left_idx, right_idx, seg_left, seg_right) = self.beachline.merge_arc(arc_idx, vertex);
        self.completed.push(seg_left);
        self.completed.push(seg_right);
        self.beachline
            .register_circle_event(left_idx, d, &mut self.events);
        self.beachline
            .register_circle_event(right_idx, d, &mut self.events);
    }

    /// Step through events while the next one still lies at or above
    /// `y` and the directrix has not yet descended to `y` (§4.7).
    pub fn run_until(&mut self, y: i32) {
        let target = F::from(y as f64);
        loop {
            if let Some(cd) = self.current_d {
                if target >= cd {
                    break;
                }
            }
            match self.events.peek() {
                Some(e) if e.y >= target => {}
                _ => break,
            }
            self.step();
        }
    }

    pub fn run_all(&mut self) {
        while !self.events.is_empty() {
            self.step();
        }
        self.has_stepped = true;
        info!(
            "sweep complete: {} sites, {} edges",
            self.sites.len(),
            self.completed.len()
        );
    }

    /// Discard the beachline, completed edges, and queue, and reseed from
    /// the original sites.
    pub fn restart(&mut self) {
        self.beachline = Beachline::new();
        self.events = EventQueue::new();
        self.completed.clear();
        self.current_d = None;
        self.has_stepped = false;
        self.finalized = false;
        self.seed_events();
    }

    /// Replay to just before the previously popped event. Not an
    /// incremental undo — the engine restarts and re-runs, since
    /// beachline surgery is not reversible in place (§4.7).
    pub fn step_back(&mut self) {
        let prev_d = self.current_d;
        self.restart();
        if let Some(prev) = prev_d {
            let target = round_to_i32(prev).saturating_add(1);
            self.run_until(target);
        }
    }

    /// Materialize the beachline/queue/completed-edge state at directrix
    /// `y` as a value the caller can hold onto after the engine mutates
    /// further (§4.8).
    pub fn snapshot(&self, y: i32) -> Snapshot {
        let d = F::from(y as f64);

        let site_event_ys = self.events.site_event_ys().map(round_to_i32).collect();
        let circle_events = self
            .events
            .circle_events()
            .map(|(ey, arc, generation)| {
                let is_valid = self.beachline.arc_generation(arc) == generation;
                (round_to_i32(ey), is_valid)
            })
            .collect();
        let completed_segments = self
            .completed
            .iter()
            .map(|seg| (point_to_tuple(seg[0]), point_to_tuple(seg[1])))
            .collect();
        let partial_polylines = self
            .beachline
            .snapshot_partials(d, &self.frame)
            .into_iter()
            .map(|poly| poly.into_iter().map(point_to_tuple).collect())
            .collect();

        Snapshot {
            site_event_ys,
            circle_events,
            completed_segments,
            partial_polylines,
        }
    }

    /// Read-only beachline walk for the graph-visualization collaborator
    /// (§4.9).
    pub fn beachline_view(&self) -> BeachlineView<'_> {
        self.beachline.view()
    }
}

fn point_to_tuple(p: Point) -> (i32, i32) {
    (round_to_i32(p.x), round_to_i32(p.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed_as_tuples(engine: &Engine) -> Vec<((i32, i32), (i32, i32))> {
        let mut segs: Vec<_> = engine
            .completed
            .iter()
            .map(|seg| (point_to_tuple(seg[0]), point_to_tuple(seg[1])))
            .collect();
        segs.sort();
        segs
    }

    #[test]
    fn rejects_non_positive_width() {
        let err = Engine::new(vec![(1, 1)], 0).unwrap_err();
        assert_eq!(err, EngineError::NonPositiveWidth(0));
    }

    #[test]
    fn rejects_empty_site_list() {
        let err = Engine::new(Vec::<(i32, i32)>::new(), 800).unwrap_err();
        assert_eq!(err, EngineError::NoSites);
    }

    #[test]
    fn idle_until_first_step() {
        let engine = Engine::new(vec![(400, 400)], 800).unwrap();
        assert_eq!(engine.state(), SweepState::Idle);
        assert_eq!(engine.current_d(), i32::MAX);
    }

    #[test]
    fn single_site_runs_to_done_with_no_edges() {
        let mut engine = Engine::new(vec![(400, 400)], 800).unwrap();
        engine.run_all();
        assert_eq!(engine.state(), SweepState::Done);
        assert_eq!(engine.current_d(), 400);
        assert!(engine.completed.is_empty());
    }

    #[test]
    fn two_sites_horizontal_pair_yields_one_vertical_bisector() {
        // §8 end-to-end scenario.
        let mut engine = Engine::new(vec![(200, 300), (600, 300)], 800).unwrap();
        engine.run_all();

        assert_eq!(engine.current_d(), 300);
        let segs = completed_as_tuples(&engine);
        assert_eq!(segs.len(), 1);
        let (p0, p1) = segs[0];
        assert_eq!(p0.0, 400);
        assert_eq!(p1.0, 400);
    }

    #[test]
    fn three_site_isoceles_triangle_yields_one_vertex() {
        // Apex off the base's perpendicular bisector so the circle event's
        // trigger directrix falls robustly below the apex's own y, rather
        // than landing exactly on it (a centered apex makes trigger_y
        // equal the apex y exactly, a floating-point boundary this test
        // has no reason to court).
        let sites = [(350, 100), (200, 400), (600, 400)];
        let mut engine = Engine::new(sites.to_vec(), 800).unwrap();
        engine.run_all();

        assert_eq!(engine.completed.len(), 3);

        let expected_vertex = crate::geometry::circumcenter(
            &Point::new(350.0, 100.0),
            &Point::new(200.0, 400.0),
            &Point::new(600.0, 400.0),
        )
        .map(point_to_tuple)
        .unwrap();

        for seg in &engine.completed {
            let a = point_to_tuple(seg[0]);
            let b = point_to_tuple(seg[1]);
            let near = |p: (i32, i32)| {
                (p.0 - expected_vertex.0).abs() <= 1 && (p.1 - expected_vertex.1).abs() <= 1
            };
            assert!(near(a) || near(b), "segment {:?}/{:?} misses vertex {:?}", a, b, expected_vertex);
        }
    }

    #[test]
    fn four_site_square_yields_edges_meeting_at_the_center() {
        // A perfect square is a degenerate, four-cocircular-points input:
        // two circle events fire at (very nearly) the same directrix, so
        // the exact segment count is implementation-sensitive. What must
        // hold regardless is that every emitted edge is incident to the
        // shared center.
        let mut engine = Engine::new(
            vec![(200, 200), (600, 200), (200, 600), (600, 600)],
            800,
        )
        .unwrap();
        engine.run_all();

        assert_eq!(engine.state(), SweepState::Done);
        assert!(!engine.completed.is_empty());
        for seg in &engine.completed {
            let a = point_to_tuple(seg[0]);
            let b = point_to_tuple(seg[1]);
            let near_center = |p: (i32, i32)| (p.0 - 400).abs() <= 1 && (p.1 - 400).abs() <= 1;
            assert!(near_center(a) || near_center(b));
        }
    }

    #[test]
    fn collinear_triple_on_directrix_seeds_two_vertical_edges() {
        let mut engine = Engine::new(vec![(100, 100), (400, 100), (700, 100)], 800).unwrap();
        engine.run_all();

        // No circle events ever fire for a perfectly collinear seeding:
        // the two seeded breakpoints never meet, surviving to be
        // extended to the frame at completion.
        assert_eq!(engine.completed.len(), 2);
        let view = engine.beachline_view();
        let root = view.root().unwrap();
        assert_ne!(view.kind(root), crate::beachline::NodeKind::Arc);
    }

    #[test]
    fn coincident_sites_do_not_crash_and_preserve_beachline_shape() {
        let mut engine = Engine::new(vec![(300, 200), (300, 200), (500, 400)], 800).unwrap();
        engine.run_all();
        // Invariant 1: arcs = edges + 1, reachable via any non-empty tree.
        assert!(engine.beachline_view().root().is_some());
    }

    #[test]
    fn restart_after_run_all_is_idempotent() {
        let sites = vec![(123, 77), (410, 250), (255, 333), (680, 440), (90, 500)];
        let mut engine = Engine::new(sites, 800).unwrap();
        engine.run_all();
        let first = engine.completed.clone();

        engine.restart();
        engine.run_all();
        let second = engine.completed.clone();

        assert!(crate::test_utils::compare_edges(&first, &second));
    }

    #[test]
    fn current_d_is_monotone_non_increasing_across_steps() {
        let mut engine = Engine::new(vec![(100, 500), (300, 200), (500, 600), (700, 100)], 800)
            .unwrap();
        let mut last = i32::MAX;
        while engine.state() != SweepState::Done {
            engine.step();
            let now = engine.current_d();
            assert!(now <= last);
            last = now;
        }
    }

    #[test]
    fn step_back_replays_to_just_before_the_last_event() {
        // Distinct y per site so each step strictly advances the
        // directrix; a tie would make the "< mid_d" check meaningless.
        let mut engine = Engine::new(vec![(400, 700), (200, 500), (600, 300)], 800).unwrap();
        engine.step();
        engine.step();
        let mid_d = engine.current_d();

        engine.step();
        assert!(engine.current_d() < mid_d);

        engine.step_back();
        assert!(engine.current_d() >= mid_d);
    }

    #[test]
    fn snapshot_reports_completed_segments_and_pending_events() {
        let mut engine = Engine::new(vec![(200, 300), (600, 300), (400, 700)], 800).unwrap();
        engine.run_all();
        let snap = engine.snapshot(engine.current_d());
        assert!(snap.site_event_ys.is_empty());
        assert_eq!(snap.completed_segments.len(), engine.completed.len());
    }
}
