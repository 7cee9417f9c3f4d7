//! Closed-form primitives: parabola evaluation, edge/parabola and
//! edge/edge intersection. Everything here is a pure function of its
//! inputs; nothing holds state.

use std::fmt;

use ordered_float::OrderedFloat;

pub type F = OrderedFloat<f64>;

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Point {
    pub x: F,
    pub y: F,
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x.into_inner(), self.y.into_inner())
    }
}

impl Point {
    pub fn new(x: impl Into<F>, y: impl Into<F>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

pub type Segment = [Point; 2];

/// Slope of a growing Voronoi edge. `Vertical` is a dedicated variant
/// rather than an IEEE infinity so every primitive that touches slope
/// branches on the variant instead of comparing floats to infinity.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Slope {
    Finite(F),
    Vertical,
}

/// A growing Voronoi edge: born at `start`, extending along `grow_right`
/// (toward increasing x if true, decreasing x if false) with the given
/// slope/intercept. When `slope` is `Vertical`, `intercept` holds the
/// edge's fixed x rather than a y-intercept.
#[derive(Debug, Copy, Clone)]
pub struct Edge {
    pub start: Point,
    pub slope: Slope,
    pub intercept: F,
    pub grow_right: bool,
}

impl Edge {
    pub fn new(start: Point, slope: Slope, intercept: F, grow_right: bool) -> Self {
        Self {
            start,
            slope,
            intercept,
            grow_right,
        }
    }

    /// y on this edge's line at the given x. Not meaningful for a vertical
    /// edge (the line has no single y per x).
    pub fn y_at(&self, x: F) -> F {
        match self.slope {
            Slope::Finite(k) => k * x + self.intercept,
            Slope::Vertical => panic!("y_at called on a vertical edge"),
        }
    }

    fn on_growth_side(&self, x: F) -> bool {
        if self.grow_right {
            x >= self.start.x
        } else {
            x <= self.start.x
        }
    }
}

/// Point on the parabola whose focus is `focus` and whose directrix is
/// `y = d`, evaluated at `x`. The arc is only meaningful while
/// `focus.y > d`; at `focus.y == d` it degenerates to a vertical ray
/// through the focus, handled by callers before reaching here.
pub fn parabola_y_at_x(focus: &Point, d: F, x: F) -> F {
    let dx = x - focus.x;
    let dy = focus.y - d;
    dx * dx / (dy * 2.0) + (focus.y + d) / 2.0
}

/// Normal form `y = a x^2 + b x + c` of the parabola with focus `focus`
/// and directrix `y = d`. Panics if `focus.y == d`; callers must special
/// case the degenerate arc first (see §4.1 of the design notes).
pub fn parabola_normal_form(focus: &Point, d: F) -> (F, F, F) {
    let a = F::from(1.0) / (F::from(2.0) * (focus.y - d));
    let b = a * F::from(-2.0) * focus.x;
    let c = (d + focus.y + F::from(2.0) * a * focus.x * focus.x) / F::from(2.0);
    (a, b, c)
}

/// x where `edge` crosses the parabola of `focus` at directrix `d`,
/// restricted to `edge`'s growth ray. `yl` names the directrix using the
/// same letter the teacher's beachline navigation already uses.
pub fn edge_parabola_intersection(edge: &Edge, focus: &Point, yl: F) -> Option<Point> {
    if focus.y == yl {
        // Degenerate arc: a vertical ray straight down from the site.
        let x = focus.x;
        return match edge.slope {
            Slope::Vertical if edge.intercept == x => Some(Point::new(x, yl)),
            Slope::Vertical => None,
            Slope::Finite(_) if edge.on_growth_side(x) => Some(Point::new(x, edge.y_at(x))),
            Slope::Finite(_) => None,
        };
    }

    match edge.slope {
        Slope::Vertical => {
            let x = edge.intercept;
            Some(Point::new(x, parabola_y_at_x(focus, yl, x)))
        }
        Slope::Finite(k) => {
            let (a, b, c) = parabola_normal_form(focus, yl);
            // a x^2 + b x + c = k x + intercept
            let qa = a;
            let qb = b - k;
            let qc = c - edge.intercept;
            let mut discrim = qb * qb - F::from(4.0) * qa * qc;
            if discrim < F::from(0.0) {
                if discrim > F::from(-1e-9) {
                    discrim = F::from(0.0);
                } else {
                    return None;
                }
            }
            let sqrt_d = discrim.sqrt();
            let x1 = (-qb + sqrt_d) / (qa * F::from(2.0));
            let x2 = (-qb - sqrt_d) / (qa * F::from(2.0));
            let x = if edge.grow_right { x1.max(x2) } else { x1.min(x2) };
            if edge.on_growth_side(x) {
                Some(Point::new(x, edge.y_at(x)))
            } else {
                None
            }
        }
    }
}

/// Intersection of two growing edges, restricted to both growth rays.
pub fn edge_edge_intersection(a: &Edge, b: &Edge) -> Option<Point> {
    let (x, y) = match (a.slope, b.slope) {
        (Slope::Vertical, Slope::Vertical) => return None,
        (Slope::Finite(ka), Slope::Finite(kb)) if ka == kb => return None,
        (Slope::Vertical, Slope::Finite(kb)) => {
            let x = a.intercept;
            (x, kb * x + b.intercept)
        }
        (Slope::Finite(ka), Slope::Vertical) => {
            let x = b.intercept;
            (x, ka * x + a.intercept)
        }
        (Slope::Finite(ka), Slope::Finite(kb)) => {
            let x = (b.intercept - a.intercept) / (ka - kb);
            (x, ka * x + a.intercept)
        }
    };

    if a.on_growth_side(x) && b.on_growth_side(x) {
        Some(Point::new(x, y))
    } else {
        None
    }
}

/// Circumcenter of three non-collinear points, or `None` when they are
/// collinear (no finite circle exists).
pub fn circumcenter(a: &Point, b: &Point, c: &Point) -> Option<Point> {
    let (x1, y1) = (a.x, a.y);
    let (x2, y2) = (b.x, b.y);
    let (x3, y3) = (c.x, c.y);

    let c1 = x3 * x3 + y3 * y3 - x1 * x1 - y1 * y1;
    let c2 = x3 * x3 + y3 * y3 - x2 * x2 - y2 * y2;
    let a1 = (x1 - x3) * -2.0;
    let a2 = (x2 - x3) * -2.0;
    let b1 = (y1 - y3) * -2.0;
    let b2 = (y2 - y3) * -2.0;

    let numer = c1 * a2 - c2 * a1;
    let denom = b1 * a2 - b2 * a1;
    if denom == F::from(0.0) {
        return None;
    }
    let y_cen = numer / denom;
    let x_cen = if a2 != F::from(0.0) {
        (c2 - b2 * y_cen) / a2
    } else if a1 != F::from(0.0) {
        (c1 - b1 * y_cen) / a1
    } else {
        return None;
    };

    Some(Point::new(x_cen, y_cen))
}

pub fn distance(a: &Point, b: &Point) -> F {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Round an internal double to the integer pixel coordinates the
/// external interface trades in.
pub fn round_to_i32(f: F) -> i32 {
    f.into_inner().round() as i32
}

/// Clip a ray from `origin` along `direction` to the frame, mirroring the
/// teacher's `bounded_segment`.
pub struct BoundingBox {
    pub x_min: F,
    pub x_max: F,
    pub y_min: F,
    pub y_max: F,
}

impl BoundingBox {
    pub fn new(x_min: impl Into<F>, x_max: impl Into<F>, y_min: impl Into<F>, y_max: impl Into<F>) -> Self {
        Self {
            x_min: x_min.into(),
            x_max: x_max.into(),
            y_min: y_min.into(),
            y_max: y_max.into(),
        }
    }

    pub fn clip_ray(&self, origin: &Point, dx: F, dy: F) -> Point {
        let cx = if dx == F::from(0.0) {
            F::from(f64::INFINITY)
        } else if dx < F::from(0.0) {
            (self.x_min - origin.x) / dx
        } else {
            (self.x_max - origin.x) / dx
        };

        let cy = if dy == F::from(0.0) {
            F::from(f64::INFINITY)
        } else if dy < F::from(0.0) {
            (self.y_min - origin.y) / dy
        } else {
            (self.y_max - origin.y) / dy
        };

        let c = cx.min(cy);
        Point::new(origin.x + c * dx, origin.y + c * dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::compare_points;

    #[test]
    fn parabola_point_matches_focal_definition() {
        let focus = Point::new(400.0, 100.0);
        let d = F::from(50.0);
        let x = F::from(400.0);
        let y = parabola_y_at_x(&focus, d, x);
        // Directly above the focus the arc sits midway between focus and directrix.
        assert!(compare_points(&Point::new(400.0, y), &Point::new(400.0, 75.0)));
    }

    #[test]
    fn vertical_edge_parabola_intersection() {
        let focus = Point::new(300.0, 200.0);
        let edge = Edge::new(
            Point::new(500.0, 0.0),
            Slope::Vertical,
            F::from(500.0),
            true,
        );
        let hit = edge_parabola_intersection(&edge, &focus, F::from(100.0)).unwrap();
        assert_eq!(hit.x, F::from(500.0));
    }

    #[test]
    fn circumcenter_of_right_isoceles() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(2.0, 0.0);
        let c = Point::new(1.0, 2.0);
        let center = circumcenter(&a, &b, &c).unwrap();
        assert!(compare_points(&center, &Point::new(1.0, 0.75)));
    }

    #[test]
    fn circumcenter_collinear_is_none() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 1.0);
        let c = Point::new(2.0, 2.0);
        assert!(circumcenter(&a, &b, &c).is_none());
    }

    #[test]
    fn round_to_i32_rounds_half_away_from_zero() {
        assert_eq!(round_to_i32(F::from(324.5)), 325);
        assert_eq!(round_to_i32(F::from(-10.4)), -10);
    }

    #[test]
    fn clip_ray_picks_nearer_boundary() {
        let bbox = BoundingBox::new(0.0, 1000.0, 0.0, 1000.0);
        let origin = Point::new(500.0, 500.0);
        let hit = bbox.clip_ray(&origin, F::from(0.0), F::from(1.0));
        assert!(compare_points(&hit, &Point::new(500.0, 1000.0)));
    }
}
