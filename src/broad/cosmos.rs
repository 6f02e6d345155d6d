use super::{registry::{Deferred, Registry}, SweepConfig, Sweeper, TickStats};
use crate::{
    collider::{Collider, ColliderId, Layer},
    error::ColliderError,
    Fp,
};
use log::info;

/// Owns a registry and the sweep that runs over it. An external loop calls
/// [`Cosmos::tick`] once per fixed step, after bodies have integrated their motion.
#[derive(Debug, Default)]
pub struct Cosmos {
    pub registry: Registry,
    pub sweeper: Sweeper,
}

impl Cosmos {
    pub fn create(config: SweepConfig) -> Cosmos {
        Cosmos { registry: Registry::new(), sweeper: Sweeper::new(config) }
    }

    #[inline]
    pub fn register(
        &mut self,
        layer: Layer,
        collider: Collider,
    ) -> Result<ColliderId, ColliderError> {
        self.registry.register(layer, collider)
    }
    #[inline]
    pub fn deregister(&mut self, id: ColliderId) -> Option<Collider> {
        self.registry.deregister(id)
    }
    #[inline]
    pub fn deferred(&self) -> Deferred {
        self.registry.deferred()
    }

    #[inline]
    pub fn get(&self, id: ColliderId) -> Option<&Collider> {
        self.registry.get(id)
    }
    #[inline]
    pub fn get_mut(&mut self, id: ColliderId) -> Option<&mut Collider> {
        self.registry.get_mut(id)
    }

    pub fn tick(&mut self, dt: Fp) -> TickStats {
        self.sweeper.tick(&mut self.registry, dt)
    }

    pub fn shutdown(mut self) -> usize {
        //! Releases every collider (and queued change), returning how many were registered.
        let count = self.registry.drain();
        info!(
            "collision world shut down after {} ticks ({}s simulated), released {} colliders",
            self.sweeper.ticks(),
            self.sweeper.elapsed(),
            count
        );
        count
    }
}
