//! Narrowphase data and logic module.
//!
//! Everything here is a pure function of positions and shapes: no bodies, no registry.

use crate::{
    body::BoundsProvider,
    error::{non_negative, ColliderError},
    Fp, Vec2,
};

// ---------- Shapes ---------- //

/// An axis-aligned box, centered on its body's position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    width: Fp,
    height: Fp,
    /// Full diagonal. Anything farther than this plus a circle's radius can't touch.
    outer_rad: Fp,
    /// Half the longer side.
    inner_rad: Fp,
}
impl Rect {
    pub fn new(width: Fp, height: Fp) -> Result<Rect, ColliderError> {
        if !non_negative(width) || !non_negative(height) {
            return Err(ColliderError::InvalidExtent { width, height });
        }
        Ok(Rect {
            width,
            height,
            outer_rad: (width * width + height * height).sqrt(),
            inner_rad: Fp::max(width, height) * 0.5,
        })
    }

    #[inline]
    pub fn width(&self) -> Fp {
        self.width
    }
    #[inline]
    pub fn height(&self) -> Fp {
        self.height
    }
    #[inline]
    pub fn outer_radius(&self) -> Fp {
        self.outer_rad
    }
    /// Half the longer side. On an elongated box this reaches well past the short sides,
    /// see [`Proximity::Inside`].
    #[inline]
    pub fn inner_radius(&self) -> Fp {
        self.inner_rad
    }
    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn corners(&self, pos: Vec2) -> [Vec2; 4] {
        //! Returns the corners clockwise from the top-left.
        let h = self.half_extents();
        [
            Vec2::new(pos.x - h.x, pos.y + h.y),
            Vec2::new(pos.x + h.x, pos.y + h.y),
            Vec2::new(pos.x + h.x, pos.y - h.y),
            Vec2::new(pos.x - h.x, pos.y - h.y),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    rad: Fp,
}
impl Circle {
    pub fn new(rad: Fp) -> Result<Circle, ColliderError> {
        if !non_negative(rad) {
            return Err(ColliderError::InvalidRadius(rad));
        }
        Ok(Circle { rad })
    }

    #[inline]
    pub fn radius(&self) -> Fp {
        self.rad
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rect,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect(Rect),
    Circle(Circle),
}
impl Shape {
    pub fn from_bounds(
        kind: ShapeKind,
        provider: &dyn BoundsProvider,
    ) -> Result<Shape, ColliderError> {
        //! Measures `provider` once. Circles take half the longer side as their radius.
        let (width, height) = provider.extent();
        let rect = Rect::new(width, height)?;
        Ok(match kind {
            ShapeKind::Rect => Shape::Rect(rect),
            ShapeKind::Circle => Shape::Circle(Circle::new(rect.inner_rad)?),
        })
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rect(_) => ShapeKind::Rect,
            Shape::Circle(_) => ShapeKind::Circle,
        }
    }

    pub fn bounds(&self) -> (Fp, Fp) {
        //! Width and height of the shape's bounding box.
        match self {
            Shape::Rect(r) => (r.width, r.height),
            Shape::Circle(c) => (c.rad * 2.0, c.rad * 2.0),
        }
    }
}

impl From<Rect> for Shape {
    fn from(rect: Rect) -> Self {
        Shape::Rect(rect)
    }
}
impl From<Circle> for Shape {
    fn from(circle: Circle) -> Self {
        Shape::Circle(circle)
    }
}

// ---------- Contact ---------- //

/// An overlap between two shapes `a` and `b`. Each normal is the direction its owner
/// must move to separate; they're always opposite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub normal_a: Vec2,
    pub normal_b: Vec2,
    pub depth: Fp,
}
impl Contact {
    #[inline]
    fn from_normal_b(normal_b: Vec2, depth: Fp) -> Contact {
        Contact { normal_a: -normal_b, normal_b, depth }
    }

    #[inline]
    pub fn flip(self) -> Contact {
        Contact { normal_a: self.normal_b, normal_b: self.normal_a, depth: self.depth }
    }
}

#[inline]
fn axis_sign(d: Fp) -> Fp {
    // zero deliberately falls to the negative side
    if d > 0.0 { 1.0 } else { -1.0 }
}

// ---------- Rect-Rect ---------- //

pub fn rect_rect_contact(pos_a: Vec2, a: &Rect, pos_b: Vec2, b: &Rect) -> Option<Contact> {
    //! Axis-aligned overlap test. Touching edges do not overlap.
    let diff = pos_b - pos_a;
    let min_dist_x = (a.width + b.width) * 0.5;
    let min_dist_y = (a.height + b.height) * 0.5;
    let delta_x = diff.x.abs();
    let delta_y = diff.y.abs();

    if delta_x < min_dist_x && delta_y < min_dist_y {
        let hor = min_dist_x - delta_x;
        let ver = min_dist_y - delta_y;
        // push out along the shallower axis, ties go horizontal
        let normal_b = if hor > ver {
            Vec2::new(0.0, axis_sign(diff.y))
        } else {
            Vec2::new(axis_sign(diff.x), 0.0)
        };
        Some(Contact::from_normal_b(normal_b, Fp::min(hor, ver)))
    } else {
        None
    }
}

// ---------- Circle-Rect ---------- //

/// Where a circle sits relative to a box's bounding radii.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proximity {
    /// Beyond the outer radius: cannot touch.
    Outside,
    /// Within the inner radius: counted as touching.
    ///
    /// The inner radius is half the longer side, so on an elongated box this zone covers
    /// space beside the short sides and [`circle_rect_test`] reports overlaps there that
    /// don't exist. Use [`circle_rect_contact`] (what `RoundResponse::Solid` sweeps with)
    /// when that matters.
    Inside,
    /// In between: only a corner test can tell.
    Corners,
}

pub fn circle_rect_proximity(
    circle_pos: Vec2,
    circle: &Circle,
    rect_pos: Vec2,
    rect: &Rect,
) -> Proximity {
    let sqr_dist = (circle_pos - rect_pos).length_squared();
    let outer = circle.rad + rect.outer_rad;
    let inner = circle.rad + rect.inner_rad;

    if sqr_dist >= outer * outer {
        Proximity::Outside
    } else if sqr_dist <= inner * inner {
        Proximity::Inside
    } else {
        Proximity::Corners
    }
}

pub fn circle_rect_test(circle_pos: Vec2, circle: &Circle, rect_pos: Vec2, rect: &Rect) -> bool {
    match circle_rect_proximity(circle_pos, circle, rect_pos, rect) {
        Proximity::Outside => false,
        Proximity::Inside => true,
        Proximity::Corners => {
            let rad2 = circle.rad * circle.rad;
            rect.corners(rect_pos)
                .iter()
                .any(|&c| (circle_pos - c).length_squared() <= rad2)
        }
    }
}

pub fn circle_rect_contact(
    circle_pos: Vec2,
    circle: &Circle,
    rect_pos: Vec2,
    rect: &Rect,
) -> Option<Contact> {
    //! Exact closest-point contact, the circle being `a`.
    let h = rect.half_extents();
    let local = circle_pos - rect_pos;
    let closest = local.max(-h).min(h);
    let d = local - closest;
    let sqr_dist = d.length_squared();

    if sqr_dist > 0.0 {
        if sqr_dist >= circle.rad * circle.rad {
            return None;
        }
        let dist = sqr_dist.sqrt();
        return Some(Contact { normal_a: d / dist, normal_b: -d / dist, depth: circle.rad - dist });
    }

    // center on or inside the box: leave through the shallower side, like rect-rect
    let diff = -local;
    let hor = h.x - diff.x.abs();
    let ver = h.y - diff.y.abs();
    let normal_b = if hor > ver {
        Vec2::new(0.0, axis_sign(diff.y))
    } else {
        Vec2::new(axis_sign(diff.x), 0.0)
    };
    Some(Contact::from_normal_b(normal_b, circle.rad + Fp::min(hor, ver)))
}

// ---------- Circle-Circle ---------- //

#[inline]
pub fn circle_circle_test(pos_a: Vec2, a: &Circle, pos_b: Vec2, b: &Circle) -> bool {
    let rad = a.rad + b.rad;
    (pos_b - pos_a).length_squared() < rad * rad
}

pub fn circle_circle_contact(pos_a: Vec2, a: &Circle, pos_b: Vec2, b: &Circle) -> Option<Contact> {
    let diff = pos_b - pos_a;
    let rad = a.rad + b.rad;
    let sqr_dist = diff.length_squared();
    if sqr_dist >= rad * rad {
        return None;
    }

    let dist = sqr_dist.sqrt();
    let normal_b = if dist > 0.0 { diff / dist } else { Vec2::new(axis_sign(diff.x), 0.0) };
    Some(Contact::from_normal_b(normal_b, rad - dist))
}
