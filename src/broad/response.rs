use super::MassSplit;
use crate::{
    body::Body,
    collider::{Collider, ColliderId, CollisionEvent, TriggerEvent},
    Fp, Vec2,
};
use log::warn;

/// What resolving one side of a contact did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Pushed out and `on_collision` fired.
    Moved,
    /// A trigger: `on_trigger` fired, nothing moved.
    Triggered,
    /// The body was dropped or already borrowed; nothing happened.
    Unreachable,
}

pub fn penetration_share(split: MassSplit, mass: Fp, partner_mass: Fp) -> Fp {
    //! The fraction of the penetration depth a collider of `mass` moves by.
    match split {
        MassSplit::Even => 0.5,
        MassSplit::Weighted => {
            let total = mass + partner_mass;
            if total > 0.0 {
                partner_mass / total
            } else {
                0.5
            }
        }
    }
}

pub fn resolve(
    collider: &mut Collider,
    partner: ColliderId,
    partner_mass: Fp,
    normal: Vec2,
    depth: Fp,
    split: MassSplit,
) -> Resolution {
    //! Resolves one side of a contact: triggers only notify, solids move along `normal` by
    //! their share of `depth` and then notify.
    if collider.is_trigger() {
        collider.on_trigger.emit(&TriggerEvent { partner });
        return Resolution::Triggered;
    }

    let offset = normal * (depth * penetration_share(split, collider.mass(), partner_mass));
    let moved = match collider.body() {
        Some(body) => match body.try_borrow_mut() {
            Ok(mut body) => {
                body.translate(offset);
                true
            }
            Err(_) => false,
        },
        None => false,
    };
    if !moved {
        warn!("could not move body in contact with {:?}; skipping resolution", partner);
        return Resolution::Unreachable;
    }

    collider.on_collision.emit(&CollisionEvent { partner, normal, penetration: depth });
    Resolution::Moved
}

#[inline]
pub fn notify_overlap(collider: &mut Collider, partner: ColliderId) {
    collider.on_trigger.emit(&TriggerEvent { partner });
}
