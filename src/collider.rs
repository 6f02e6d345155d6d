//! Colliders: a shape attached to a body, with the attributes the sweep reads and the
//! channels it notifies through.

use crate::{
    body::{Body, BoundsProvider, SharedBody},
    error::{non_negative, ColliderError},
    narrow::{Shape, ShapeKind},
    signal::Signal,
    Fp, Vec2,
};
use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

/// Stable handle to a registered collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(pub(crate) u64);

/// An interaction layer. Equality defines membership; the value itself is opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Layer(pub u32);

/// Fired on a solid collider after it has been pushed out of `partner`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub partner: ColliderId,
    pub normal: Vec2,
    pub penetration: Fp,
}

/// Fired when a trigger collider overlaps `partner`, or for any overlap that isn't resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    pub partner: ColliderId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderOptions {
    pub mass: Fp,
    /// Disabled colliders are skipped by the sweep entirely.
    pub enabled: bool,
    /// Triggers report overlaps but never move.
    pub trigger: bool,
}
impl Default for ColliderOptions {
    fn default() -> Self {
        ColliderOptions { mass: 1.0, enabled: true, trigger: false }
    }
}

#[derive(Debug)]
pub struct Collider {
    shape: Shape,
    body: Weak<RefCell<dyn Body>>,
    mass: Fp,
    enabled: bool,
    trigger: bool,
    pub on_collision: Signal<CollisionEvent>,
    pub on_trigger: Signal<TriggerEvent>,
}

impl Collider {
    pub fn new(
        body: &SharedBody,
        shape: Shape,
        options: ColliderOptions,
    ) -> Result<Collider, ColliderError> {
        if !non_negative(options.mass) {
            return Err(ColliderError::InvalidMass(options.mass));
        }
        Ok(Collider {
            shape,
            body: Rc::downgrade(body),
            mass: options.mass,
            enabled: options.enabled,
            trigger: options.trigger,
            on_collision: Signal::new(),
            on_trigger: Signal::new(),
        })
    }

    pub fn rect(
        body: &SharedBody,
        bounds: &dyn BoundsProvider,
        options: ColliderOptions,
    ) -> Result<Collider, ColliderError> {
        Collider::new(body, Shape::from_bounds(ShapeKind::Rect, bounds)?, options)
    }
    pub fn circle(
        body: &SharedBody,
        bounds: &dyn BoundsProvider,
        options: ColliderOptions,
    ) -> Result<Collider, ColliderError> {
        Collider::new(body, Shape::from_bounds(ShapeKind::Circle, bounds)?, options)
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }
    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }
    #[inline]
    pub fn mass(&self) -> Fp {
        self.mass
    }
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
    #[inline]
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
    #[inline]
    pub fn is_trigger(&self) -> bool {
        self.trigger
    }

    #[inline]
    pub fn body(&self) -> Option<SharedBody> {
        self.body.upgrade()
    }
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.body.strong_count() > 0
    }

    pub fn position(&self) -> Option<Vec2> {
        //! `None` if the body is gone or mutably borrowed elsewhere.
        let body = self.body.upgrade()?;
        let pos = body.try_borrow().ok()?.position();
        Some(pos)
    }
}
