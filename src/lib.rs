//! A small 2D collision substrate: colliders bucketed by layer, an ordered
//! pairwise sweep once per fixed tick, box/box and circle/box narrow-phase tests,
//! and penetration-resolution that nudges body positions apart.
//!
//! ```
//! use impinge::{body, Body, Collider, ColliderOptions, Cosmos, Extent, Layer, Transform, Vec2};
//!
//! let mut cosmos = Cosmos::create(Default::default());
//!
//! let a = body::shared(Transform::at(Vec2::new(0.0, 0.0)));
//! let b = body::shared(Transform::at(Vec2::new(1.0, 0.0)));
//! let extent = Extent::new(2.0, 2.0);
//!
//! let ca = Collider::rect(&a, &extent, ColliderOptions::default()).unwrap();
//! let cb = Collider::rect(&b, &extent, ColliderOptions::default()).unwrap();
//! cosmos.register(Layer(1), ca).unwrap();
//! cosmos.register(Layer(1), cb).unwrap();
//!
//! let stats = cosmos.tick(1.0 / 60.0);
//! assert_eq!(stats.contacts, 1);
//! assert_eq!(a.borrow().position(), Vec2::new(-0.5, 0.0));
//! assert_eq!(b.borrow().position(), Vec2::new(1.5, 0.0));
//! ```

pub mod body;
pub mod broad;
pub mod collider;
pub mod error;
pub mod motion;
pub mod narrow;
pub mod signal;

pub use body::{Body, BoundsProvider, Extent, SharedBody, Transform};
pub use broad::{
    cosmos::Cosmos,
    registry::{Deferred, LayerKey, Registry},
    MassSplit, RoundResponse, SweepConfig, Sweeper, TickStats,
};
pub use collider::{Collider, ColliderId, ColliderOptions, CollisionEvent, Layer, TriggerEvent};
pub use error::ColliderError;
pub use narrow::{Circle, Contact, Rect, Shape, ShapeKind};
pub use signal::{Signal, SubscriptionId};

#[cfg(not(feature = "f64"))]
pub type Fp = f32;
#[cfg(feature = "f64")]
pub type Fp = f64;

#[cfg(not(feature = "f64"))]
pub type Vec2 = glam::Vec2;
#[cfg(feature = "f64")]
pub type Vec2 = glam::DVec2;
