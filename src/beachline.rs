//! The beachline: a binary tree whose leaves are parabolic arcs and
//! whose internal nodes are growing Voronoi edges (breakpoints). Backed
//! by one arena `Vec<BeachlineNode>` per engine instance, indexed by
//! `NodeId`; nodes are unlinked on death but never physically removed,
//! so a `NodeId` captured anywhere stays dereferenceable for the
//! engine's lifetime (see the circle-event generation scheme in
//! `event.rs`).
//!
//! Tree surgery (`split_arc`, `merge_arc`) is grounded directly on the
//! teacher's `replace_arc`/`replace_breakpoint`; the arc/edge payloads
//! themselves use the slope-intercept model the original reference uses
//! instead of the teacher's origin+direction-vector model.

use crate::event::EventQueue;
use crate::geometry::{
    distance, edge_edge_intersection, edge_parabola_intersection, parabola_y_at_x, BoundingBox,
    Edge, Point, Segment, Slope, F,
};
use crate::node::NodeId;

#[derive(Debug, Copy, Clone)]
pub struct ArcData {
    pub site: Point,
    pub generation: u64,
}

impl ArcData {
    fn new(site: Point) -> Self {
        Self { site, generation: 0 }
    }
}

#[derive(Debug, Copy, Clone)]
pub enum BeachlineData {
    Arc(ArcData),
    Edge(Edge),
}

/// Growth direction of a breakpoint, exposed for the graph-visualization
/// collaborator (the original reference labels these nodes "Edge L" /
/// "Edge R" in its tree dump).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Arc,
    EdgeLeft,
    EdgeRight,
}

/// Read-only walk over a beachline's arena, for the (out-of-scope) tree
/// visualizer. Allocates nothing and cannot mutate the beachline it
/// borrows from.
pub struct BeachlineView<'a> {
    beachline: &'a Beachline,
}

impl<'a> BeachlineView<'a> {
    pub fn root(&self) -> Option<NodeId> {
        self.beachline.root()
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.beachline.kind(id)
    }

    pub fn left_child(&self, id: NodeId) -> Option<NodeId> {
        self.beachline.left_child(id)
    }

    pub fn right_child(&self, id: NodeId) -> Option<NodeId> {
        self.beachline.right_child(id)
    }
}

pub struct BeachlineNode {
    left_child: Option<NodeId>,
    right_child: Option<NodeId>,
    parent: Option<NodeId>,
    data: BeachlineData,
}

impl BeachlineNode {
    fn leaf(parent: Option<NodeId>, data: BeachlineData) -> Self {
        Self {
            left_child: None,
            right_child: None,
            parent,
            data,
        }
    }

    fn internal(
        left_child: NodeId,
        right_child: NodeId,
        parent: Option<NodeId>,
        data: BeachlineData,
    ) -> Self {
        Self {
            left_child: Some(left_child),
            right_child: Some(right_child),
            parent,
            data,
        }
    }
}

pub struct Beachline {
    root: Option<NodeId>,
    nodes: Vec<BeachlineNode>,
}

impl Beachline {
    pub fn new() -> Self {
        Self {
            root: None,
            nodes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn arc(&self, idx: NodeId) -> &ArcData {
        match &self.nodes[idx.0].data {
            BeachlineData::Arc(a) => a,
            BeachlineData::Edge(_) => panic!("node {:?} is not an arc", idx),
        }
    }

    pub fn edge(&self, idx: NodeId) -> &Edge {
        match &self.nodes[idx.0].data {
            BeachlineData::Edge(e) => e,
            BeachlineData::Arc(_) => panic!("node {:?} is not an edge", idx),
        }
    }

    pub fn kind(&self, idx: NodeId) -> NodeKind {
        match &self.nodes[idx.0].data {
            BeachlineData::Arc(_) => NodeKind::Arc,
            BeachlineData::Edge(e) if e.grow_right => NodeKind::EdgeRight,
            BeachlineData::Edge(_) => NodeKind::EdgeLeft,
        }
    }

    pub fn left_child(&self, idx: NodeId) -> Option<NodeId> {
        self.nodes[idx.0].left_child
    }

    pub fn right_child(&self, idx: NodeId) -> Option<NodeId> {
        self.nodes[idx.0].right_child
    }

    /// Current generation of an arc's pending-circle-event slot, used by
    /// the engine to decide whether a popped circle event is stale (see
    /// `event.rs`).
    pub fn arc_generation(&self, idx: NodeId) -> u64 {
        self.arc(idx).generation
    }

    /// A read-only view of this beachline for the graph-visualization
    /// collaborator (§4.9): exposes node kind and child links only, no
    /// mutation.
    pub fn view(&self) -> BeachlineView<'_> {
        BeachlineView { beachline: self }
    }

    /// Invalidate any circle event currently pending for this arc and
    /// return the arc's new generation.
    fn invalidate_arc(&mut self, idx: NodeId) -> u64 {
        match &mut self.nodes[idx.0].data {
            BeachlineData::Arc(a) => {
                a.generation += 1;
                a.generation
            }
            BeachlineData::Edge(_) => panic!("node {:?} is not an arc", idx),
        }
    }

    pub fn seed(&mut self, site: Point) -> NodeId {
        assert!(self.root.is_none(), "seed called on a non-empty beachline");
        let idx = NodeId(self.nodes.len());
        self.nodes
            .push(BeachlineNode::leaf(None, BeachlineData::Arc(ArcData::new(site))));
        self.root = Some(idx);
        idx
    }

    /// Arc currently on the beachline directly above `x` at directrix
    /// `yl`. Descends via breakpoint/parabola intersections rather than
    /// stored focus points, falling back to the right-neighbor leaf when
    /// the left-neighbor intersection doesn't exist (see §4.2).
    pub fn locate(&self, x: F, yl: F) -> Option<NodeId> {
        let mut idx = self.root?;
        loop {
            let node = &self.nodes[idx.0];
            let (edge, lc, rc) = match &node.data {
                BeachlineData::Edge(e) => (*e, node.left_child.unwrap(), node.right_child.unwrap()),
                BeachlineData::Arc(_) => return Some(idx),
            };

            let left_focus = self.arc(self.rightmost(lc)).site;
            let bp_x = edge_parabola_intersection(&edge, &left_focus, yl)
                .map(|p| p.x)
                .or_else(|| {
                    let right_focus = self.arc(self.leftmost(rc)).site;
                    edge_parabola_intersection(&edge, &right_focus, yl).map(|p| p.x)
                })
                .unwrap_or(edge.start.x);

            idx = if x < bp_x { lc } else { rc };
        }
    }

    fn leftmost(&self, mut idx: NodeId) -> NodeId {
        loop {
            match &self.nodes[idx.0].data {
                BeachlineData::Edge(_) => idx = self.nodes[idx.0].left_child.unwrap(),
                BeachlineData::Arc(_) => return idx,
            }
        }
    }

    fn rightmost(&self, mut idx: NodeId) -> NodeId {
        loop {
            match &self.nodes[idx.0].data {
                BeachlineData::Edge(_) => idx = self.nodes[idx.0].right_child.unwrap(),
                BeachlineData::Arc(_) => return idx,
            }
        }
    }

    fn predecessor(&self, mut idx: NodeId) -> Option<NodeId> {
        while let Some(parent) = self.nodes[idx.0].parent {
            if self.nodes[parent.0].left_child == Some(idx) {
                idx = parent;
            } else {
                return Some(parent);
            }
        }
        None
    }

    fn successor(&self, mut idx: NodeId) -> Option<NodeId> {
        while let Some(parent) = self.nodes[idx.0].parent {
            if self.nodes[parent.0].right_child == Some(idx) {
                idx = parent;
            } else {
                return Some(parent);
            }
        }
        None
    }

    pub fn left_edge(&self, arc_idx: NodeId) -> Option<NodeId> {
        self.predecessor(arc_idx)
    }

    pub fn right_edge(&self, arc_idx: NodeId) -> Option<NodeId> {
        self.successor(arc_idx)
    }

    pub fn left_arc(&self, arc_idx: NodeId) -> Option<NodeId> {
        self.left_edge(arc_idx)
            .map(|edge_idx| self.rightmost(self.nodes[edge_idx.0].left_child.unwrap()))
    }

    pub fn right_arc(&self, arc_idx: NodeId) -> Option<NodeId> {
        self.right_edge(arc_idx)
            .map(|edge_idx| self.leftmost(self.nodes[edge_idx.0].right_child.unwrap()))
    }

    /// Site event on an existing, non-empty beachline: replace the arc
    /// above the new site with `leftEdge(A_left, rightEdge(newArc,
    /// A_right))`, per §4.4. Returns the ids of the two new flanking arcs
    /// so the caller can register circle events for them.
    pub fn split_arc(
        &mut self,
        arc_idx: NodeId,
        new_site: Point,
        yl: F,
    ) -> (NodeId, NodeId) {
        self.invalidate_arc(arc_idx);
        let split = self.arc(arc_idx).site;
        let parent = self.nodes[arc_idx.0].parent;

        let y0 = parabola_y_at_x(&split, yl, new_site.x);
        let start = Point::new(new_site.x, y0);
        let k = (new_site.x - split.x) / (split.y - yl);
        let b = y0 - k * new_site.x;

        let a_idx = NodeId(self.nodes.len());
        let xl_idx = NodeId(a_idx.0 + 1);
        let b_idx = NodeId(a_idx.0 + 2);
        let xr_idx = NodeId(a_idx.0 + 3);
        let c_idx = NodeId(a_idx.0 + 4);

        self.nodes
            .push(BeachlineNode::leaf(Some(xl_idx), BeachlineData::Arc(ArcData::new(split))));
        self.nodes.push(BeachlineNode::internal(
            a_idx,
            xr_idx,
            parent,
            BeachlineData::Edge(Edge::new(start, Slope::Finite(k), b, false)),
        ));
        self.nodes
            .push(BeachlineNode::leaf(Some(xr_idx), BeachlineData::Arc(ArcData::new(new_site))));
        self.nodes.push(BeachlineNode::internal(
            b_idx,
            c_idx,
            Some(xl_idx),
            BeachlineData::Edge(Edge::new(start, Slope::Finite(k), b, true)),
        ));
        self.nodes
            .push(BeachlineNode::leaf(Some(xr_idx), BeachlineData::Arc(ArcData::new(split))));

        if let Some(parent_idx) = parent {
            let parent_node = &mut self.nodes[parent_idx.0];
            if parent_node.left_child == Some(arc_idx) {
                parent_node.left_child = Some(xl_idx);
            } else {
                parent_node.right_child = Some(xl_idx);
            }
        } else {
            self.root = Some(xl_idx);
        }

        (a_idx, c_idx)
    }

    /// Seeding split for the empty-beachline / collinear-same-y special
    /// case (§4.4): the new breakpoint is a vertical edge, since both
    /// arcs are degenerate at the shared directrix.
    pub fn split_arc_seeded(&mut self, arc_idx: NodeId, new_site: Point, yl: F) {
        let arc = self.arc(arc_idx).site;
        let (left_site, right_site) = if new_site.x < arc.x {
            (new_site, arc)
        } else {
            (arc, new_site)
        };
        let mid_x = (left_site.x + right_site.x) / F::from(2.0);
        let start = Point::new(mid_x, yl);

        let parent = self.nodes[arc_idx.0].parent;
        let left_idx = NodeId(self.nodes.len());
        let right_idx = NodeId(left_idx.0 + 1);

        self.nodes
            .push(BeachlineNode::leaf(None, BeachlineData::Arc(ArcData::new(left_site))));
        self.nodes
            .push(BeachlineNode::leaf(None, BeachlineData::Arc(ArcData::new(right_site))));

        let edge_idx = NodeId(self.nodes.len());
        self.nodes.push(BeachlineNode::internal(
            left_idx,
            right_idx,
            parent,
            BeachlineData::Edge(Edge::new(start, Slope::Vertical, mid_x, true)),
        ));
        self.nodes[left_idx.0].parent = Some(edge_idx);
        self.nodes[right_idx.0].parent = Some(edge_idx);

        if let Some(parent_idx) = parent {
            let parent_node = &mut self.nodes[parent_idx.0];
            if parent_node.left_child == Some(arc_idx) {
                parent_node.left_child = Some(edge_idx);
            } else {
                parent_node.right_child = Some(edge_idx);
            }
        } else {
            self.root = Some(edge_idx);
        }
    }

    /// Circle event on arc `arc_idx`: finalize the two segments meeting
    /// at `vertex`, splice the surviving neighbors' bisector in where the
    /// "high" (deeper) of the two flanking edges used to sit, and remove
    /// the dying arc and its immediate parent. Returns the ids of the two
    /// surviving flanking arcs so the caller can register new circle
    /// events for them.
    pub fn merge_arc(&mut self, arc_idx: NodeId, vertex: Point) -> (NodeId, NodeId, Segment, Segment) {
        let left_arc_idx = self.left_arc(arc_idx).expect("merge_arc: no left arc");
        let right_arc_idx = self.right_arc(arc_idx).expect("merge_arc: no right arc");
        let left_site = self.arc(left_arc_idx).site;
        let right_site = self.arc(right_arc_idx).site;

        let xl_idx = self.left_edge(arc_idx).expect("merge_arc: no left edge");
        let xr_idx = self.right_edge(arc_idx).expect("merge_arc: no right edge");
        let seg_left = [self.edge(xl_idx).start, vertex];
        let seg_right = [self.edge(xr_idx).start, vertex];

        let denom = left_site.y - right_site.y;
        let new_edge = if denom == F::from(0.0) {
            Edge::new(vertex, Slope::Vertical, vertex.x, right_site.x >= left_site.x)
        } else {
            let k = (right_site.x - left_site.x) / denom;
            let b = vertex.y - k * vertex.x;
            let inherited_grow_right = {
                let l_grows = self.edge(xl_idx).grow_right;
                let r_grows = self.edge(xr_idx).grow_right;
                if l_grows == r_grows {
                    l_grows
                } else {
                    k >= F::from(0.0)
                }
            };
            Edge::new(vertex, Slope::Finite(k), b, inherited_grow_right)
        };

        let parent_idx = self.nodes[arc_idx.0]
            .parent
            .expect("merge_arc: arc has no parent");

        let high_idx = if parent_idx == xr_idx { xl_idx } else { xr_idx };
        self.nodes[high_idx.0].data = BeachlineData::Edge(new_edge);

        let parent_node = &self.nodes[parent_idx.0];
        let sibling = if parent_node.left_child == Some(arc_idx) {
            parent_node.right_child
        } else if parent_node.right_child == Some(arc_idx) {
            parent_node.left_child
        } else {
            panic!("merge_arc: parent does not claim arc as a child")
        }
        .expect("merge_arc: arc has no sibling");

        match self.nodes[parent_idx.0].parent {
            Some(granny_idx) => {
                let granny = &mut self.nodes[granny_idx.0];
                if granny.left_child == Some(parent_idx) {
                    granny.left_child = Some(sibling);
                } else {
                    granny.right_child = Some(sibling);
                }
                self.nodes[sibling.0].parent = Some(granny_idx);
            }
            None => {
                self.root = Some(sibling);
                self.nodes[sibling.0].parent = None;
            }
        }

        (left_arc_idx, right_arc_idx)
    }

    /// Compute and, if valid, register a circle event for `arc_idx`.
    /// Unconditionally invalidates any event already pending for this arc
    /// first — the teacher's reference removes the neighbors' old circle
    /// events up front, before re-checking convergence, so a stale event
    /// from a now-defunct triple never survives just because the new
    /// triple fails one of the checks below (fewer than two neighbors,
    /// coincident neighbor sites, non-converging edges, or a predicted
    /// trigger y above the current directrix) (§4.6).
    pub fn register_circle_event(&mut self, arc_idx: NodeId, yl: F, events: &mut EventQueue) {
        let generation = self.invalidate_arc(arc_idx);

        let (left_idx, right_idx) = match (self.left_arc(arc_idx), self.right_arc(arc_idx)) {
            (Some(l), Some(r)) => (l, r),
            _ => return,
        };
        if self.arc(left_idx).site == self.arc(right_idx).site {
            return;
        }

        let left_edge_idx = self.left_edge(arc_idx).unwrap();
        let right_edge_idx = self.right_edge(arc_idx).unwrap();
        let center = match edge_edge_intersection(self.edge(left_edge_idx), self.edge(right_edge_idx)) {
            Some(c) => c,
            None => return,
        };

        let radius = distance(&center, &self.arc(arc_idx).site);
        let trigger_y = center.y - radius;
        if trigger_y > yl {
            return;
        }

        events.push_circle(arc_idx, generation, center, trigger_y);
    }

    /// Materialize every arc and still-growing edge as a polyline at
    /// directrix `yl`, for `Snapshot` (§4.8). Unlike `extend_edges_to_frame`
    /// (used once, at completion), this clips edges to their *current*
    /// neighbor-arc intersection rather than running them all the way to
    /// the frame boundary, since the algorithm may still be mid-sweep.
    pub fn snapshot_partials(&self, yl: F, frame: &BoundingBox) -> Vec<Vec<Point>> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.snapshot_aux(root, yl, frame, &mut out);
        }
        out
    }

    fn snapshot_aux(&self, idx: NodeId, yl: F, frame: &BoundingBox, out: &mut Vec<Vec<Point>>) {
        match &self.nodes[idx.0].data {
            BeachlineData::Arc(arc) => out.push(self.arc_polyline(idx, arc.site, yl, frame)),
            BeachlineData::Edge(_) => {
                out.push(self.edge_polyline(idx, yl, frame));
                let node = &self.nodes[idx.0];
                let (lc, rc) = (node.left_child.unwrap(), node.right_child.unwrap());
                self.snapshot_aux(lc, yl, frame, out);
                self.snapshot_aux(rc, yl, frame, out);
            }
        }
    }

    /// Sampled polyline for the arc leaf `idx`, clipped to its flanking
    /// breakpoints (or the frame, lacking one). A degenerate arc
    /// (`site.y == yl`) is a vertical downward ray stub instead, per §4.8.
    fn arc_polyline(&self, idx: NodeId, site: Point, yl: F, frame: &BoundingBox) -> Vec<Point> {
        if site.y == yl {
            return vec![Point::new(site.x, yl), Point::new(site.x, frame.y_min)];
        }

        let mut min_x = frame.x_min;
        let mut max_x = frame.x_max;

        if let Some(left_edge_idx) = self.left_edge(idx) {
            if let Some(p) = edge_parabola_intersection(self.edge(left_edge_idx), &site, yl) {
                min_x = p.x.max(frame.x_min).min(frame.x_max);
            }
        }
        if let Some(right_edge_idx) = self.right_edge(idx) {
            if let Some(p) = edge_parabola_intersection(self.edge(right_edge_idx), &site, yl) {
                max_x = p.x.max(frame.x_min).min(frame.x_max);
            }
        }

        if max_x <= min_x {
            return vec![Point::new(min_x, parabola_y_at_x(&site, yl, min_x))];
        }

        let lo = min_x.into_inner().round() as i64;
        let hi = max_x.into_inner().round() as i64;
        (lo..=hi)
            .map(|x| {
                let xf = F::from(x as f64);
                Point::new(xf, parabola_y_at_x(&site, yl, xf))
            })
            .collect()
    }

    /// Segment for the growing edge `idx`, from its start to the nearer of
    /// its current intersection with the arc on its growth side, or the
    /// frame boundary.
    fn edge_polyline(&self, idx: NodeId, yl: F, frame: &BoundingBox) -> Vec<Point> {
        let edge = *self.edge(idx);
        let (dx, dy) = match edge.slope {
            Slope::Vertical if edge.grow_right => (F::from(0.0), F::from(1.0)),
            Slope::Vertical => (F::from(0.0), F::from(-1.0)),
            Slope::Finite(k) if edge.grow_right => (F::from(1.0), k),
            Slope::Finite(k) => (F::from(-1.0), -k),
        };
        let far_frame = frame.clip_ray(&edge.start, dx, dy);

        let neighbor_focus = if edge.grow_right {
            self.right_arc_of_edge(idx)
        } else {
            self.left_arc_of_edge(idx)
        }
        .map(|a| self.arc(a).site);

        let far = neighbor_focus
            .and_then(|focus| edge_parabola_intersection(&edge, &focus, yl))
            .map(|p| {
                if distance(&edge.start, &p) <= distance(&edge.start, &far_frame) {
                    p
                } else {
                    far_frame
                }
            })
            .unwrap_or(far_frame);

        vec![edge.start, far]
    }

    fn left_arc_of_edge(&self, edge_idx: NodeId) -> Option<NodeId> {
        self.nodes[edge_idx.0].left_child.map(|lc| self.rightmost(lc))
    }

    fn right_arc_of_edge(&self, edge_idx: NodeId) -> Option<NodeId> {
        self.nodes[edge_idx.0].right_child.map(|rc| self.leftmost(rc))
    }

    /// For every completed edge's far end, extend its ray to the frame
    /// boundary and append it to `edges`. Walks the whole tree since any
    /// still-growing edge is, by definition, unfinished.
    pub fn extend_edges_to_frame(&self, frame: &BoundingBox, edges: &mut Vec<Segment>) {
        self.extend_aux(frame, edges, self.root);
    }

    fn extend_aux(
        &self,
        frame: &BoundingBox,
        edges: &mut Vec<Segment>,
        node: Option<NodeId>,
    ) {
        if let Some(idx) = node {
            if let BeachlineData::Edge(edge) = &self.nodes[idx.0].data {
                let (dx, dy) = match edge.slope {
                    Slope::Vertical if edge.grow_right => (F::from(0.0), F::from(1.0)),
                    Slope::Vertical => (F::from(0.0), F::from(-1.0)),
                    Slope::Finite(k) if edge.grow_right => (F::from(1.0), k),
                    Slope::Finite(k) => (F::from(-1.0), -k),
                };
                let far = frame.clip_ray(&edge.start, dx, dy);
                edges.push([edge.start, far]);
            }
            self.extend_aux(frame, edges, self.nodes[idx.0].left_child);
            self.extend_aux(frame, edges, self.nodes[idx.0].right_child);
        }
    }
}

impl Default for Beachline {
    fn default() -> Self {
        Self::new()
    }
}
