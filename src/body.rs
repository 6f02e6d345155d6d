//! The external collaborators a collider leans on: the body it moves, and the
//! provider that measured it once at creation.

use crate::{Fp, Vec2};
use std::{cell::RefCell, rc::Rc};

/// A position (and orientation) a collider is attached to. The collision core reads and
/// writes the position only; `right`/`up` are there for the circular motion integrators.
pub trait Body {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, pos: Vec2);

    #[inline]
    fn translate(&mut self, offset: Vec2) {
        let pos = self.position();
        self.set_position(pos + offset);
    }

    #[inline]
    fn right(&self) -> Vec2 {
        Vec2::new(1.0, 0.0)
    }
    #[inline]
    fn up(&self) -> Vec2 {
        Vec2::new(0.0, 1.0)
    }
}

/// Bodies are owned by the caller; colliders only keep a weak handle to them.
pub type SharedBody = Rc<RefCell<dyn Body>>;

#[inline]
pub fn shared<B: Body + 'static>(body: B) -> SharedBody {
    Rc::new(RefCell::new(body))
}

/// A plain position with an orientation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position
    pub pos: Vec2,
    pub right: Vec2,
    pub up: Vec2,
}

impl Transform {
    pub fn at(pos: Vec2) -> Transform {
        Transform { pos, right: Vec2::new(1.0, 0.0), up: Vec2::new(0.0, 1.0) }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::at(Vec2::ZERO)
    }
}

impl Body for Transform {
    #[inline]
    fn position(&self) -> Vec2 {
        self.pos
    }
    #[inline]
    fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }
    #[inline]
    fn right(&self) -> Vec2 {
        self.right
    }
    #[inline]
    fn up(&self) -> Vec2 {
        self.up
    }
}

/// Supplies the visual extent (width, height) a collider derives its shape from.
/// Queried once, when the collider is built.
pub trait BoundsProvider {
    fn extent(&self) -> (Fp, Fp);
}

/// A fixed extent, for when there's no sprite to measure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub width: Fp,
    pub height: Fp,
}

impl Extent {
    #[inline]
    pub fn new(width: Fp, height: Fp) -> Extent {
        Extent { width, height }
    }
}

impl BoundsProvider for Extent {
    #[inline]
    fn extent(&self) -> (Fp, Fp) {
        (self.width, self.height)
    }
}

impl BoundsProvider for (Fp, Fp) {
    #[inline]
    fn extent(&self) -> (Fp, Fp) {
        *self
    }
}
