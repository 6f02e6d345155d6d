//! Colliders bucketed by interaction layer.
//!
//! Layer buckets live in an `IndexMap`, so a layer's position in the map is its
//! insertion index. Buckets are never removed, so that index is stable for the
//! registry's lifetime even once a layer empties out.

use crate::{
    collider::{Collider, ColliderId, Layer},
    error::ColliderError,
};
use fnv::{FnvBuildHasher, FnvHashMap};
use indexmap::IndexMap;
use log::debug;
use std::{
    cell::{Cell, RefCell},
    fmt::{Debug, Formatter},
    rc::{Rc, Weak},
};

/// A layer together with the order it was first seen in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerKey {
    pub layer: Layer,
    pub index: usize,
}

#[derive(Debug)]
pub(crate) struct Entry {
    /// Index of the layer bucket holding this collider.
    pub layer: usize,
    pub collider: Collider,
}

enum Command {
    Spawn(ColliderId, Layer, Collider),
    Despawn(ColliderId),
}

/// A cloneable handle for registering and deregistering colliders while the registry
/// itself is borrowed, e.g. from inside a collision callback. Changes are queued and
/// applied by [`Registry::flush`], which the sweep calls on either side of every tick.
///
/// The handle only holds the queue weakly: a collider whose callback captures a
/// `Deferred` doesn't keep its own registry's queue, or anything queued in it, alive.
/// Once the registry is gone, requests are dropped.
#[derive(Clone)]
pub struct Deferred {
    next_id: Rc<Cell<u64>>,
    queue: Weak<RefCell<Vec<Command>>>,
}
impl Deferred {
    pub fn spawn(&self, layer: Layer, collider: Collider) -> ColliderId {
        //! The id is reserved now; the collider joins the sweep at the next flush.
        let id = next_id(&self.next_id);
        match self.queue.upgrade() {
            Some(queue) => queue.borrow_mut().push(Command::Spawn(id, layer, collider)),
            None => debug!("registry dropped, discarding spawn of {:?}", id),
        }
        id
    }
    pub fn despawn(&self, id: ColliderId) {
        if let Some(queue) = self.queue.upgrade() {
            queue.borrow_mut().push(Command::Despawn(id));
        }
    }

    pub fn len(&self) -> usize {
        self.queue.upgrade().map_or(0, |queue| queue.borrow().len())
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Whether the registry this handle feeds still exists.
    pub fn is_live(&self) -> bool {
        self.queue.strong_count() > 0
    }
}
impl Debug for Deferred {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("Deferred").field("queued", &self.len()).finish()
    }
}

#[inline]
fn next_id(counter: &Cell<u64>) -> ColliderId {
    let id = counter.get();
    counter.set(id + 1);
    ColliderId(id)
}

#[derive(Debug)]
pub struct Registry {
    pub(crate) layers: IndexMap<Layer, Vec<ColliderId>, FnvBuildHasher>,
    pub(crate) colliders: FnvHashMap<ColliderId, Entry>,
    next_id: Rc<Cell<u64>>,
    queue: Rc<RefCell<Vec<Command>>>,
}

impl Debug for Command {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Command::Spawn(id, layer, _) => write!(f, "Spawn({:?}, {:?})", id, layer),
            Command::Despawn(id) => write!(f, "Despawn({:?})", id),
        }
    }
}

impl Registry {
    pub fn new() -> Registry {
        Registry {
            layers: IndexMap::with_hasher(FnvBuildHasher::default()),
            colliders: FnvHashMap::default(),
            next_id: Rc::new(Cell::new(0)),
            queue: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn register(
        &mut self,
        layer: Layer,
        collider: Collider,
    ) -> Result<ColliderId, ColliderError> {
        //! Moves `collider` into `layer`'s bucket, creating the bucket if `layer` is new.
        //! A collider is moved in exactly once, so double registration can't happen.
        if !collider.is_alive() {
            return Err(ColliderError::DeadBody);
        }
        let id = next_id(&self.next_id);
        self.insert(id, layer, collider);
        Ok(id)
    }

    fn insert(&mut self, id: ColliderId, layer: Layer, collider: Collider) {
        let index = match self.layers.get_full_mut(&layer) {
            Some((index, _, bucket)) => {
                bucket.push(id);
                index
            }
            None => {
                let (index, _) = self.layers.insert_full(layer, vec![id]);
                debug!("new layer {:?} at index {}", layer, index);
                index
            }
        };
        debug!("registered {:?} ({:?}) on {:?}", id, collider.kind(), layer);
        self.colliders.insert(id, Entry { layer: index, collider });
    }

    pub fn deregister(&mut self, id: ColliderId) -> Option<Collider> {
        //! Removes and returns the collider. Unknown ids are ignored.
        let entry = self.colliders.remove(&id)?;
        if let Some((layer, bucket)) = self.layers.get_index_mut(entry.layer) {
            // keep insertion order for the sweep
            if let Some(i) = bucket.iter().position(|&c| c == id) {
                bucket.remove(i);
            }
            debug!("deregistered {:?} from {:?}", id, layer);
        }
        Some(entry.collider)
    }

    #[inline]
    pub fn get(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(&id).map(|e| &e.collider)
    }
    #[inline]
    pub fn get_mut(&mut self, id: ColliderId) -> Option<&mut Collider> {
        self.colliders.get_mut(&id).map(|e| &mut e.collider)
    }
    #[inline]
    pub fn contains(&self, id: ColliderId) -> bool {
        self.colliders.contains_key(&id)
    }

    pub fn set_enabled(&mut self, id: ColliderId, enabled: bool) -> bool {
        //! Returns whether `id` is registered.
        match self.get_mut(id) {
            Some(c) => {
                c.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    pub fn layer_key(&self, layer: Layer) -> Option<LayerKey> {
        self.layers.get_full(&layer).map(|(index, _, _)| LayerKey { layer, index })
    }
    pub fn layer_of(&self, id: ColliderId) -> Option<LayerKey> {
        let index = self.colliders.get(&id)?.layer;
        self.layers.get_index(index).map(|(&layer, _)| LayerKey { layer, index })
    }
    pub fn layer_keys(&self) -> impl Iterator<Item = LayerKey> + '_ {
        //! In insertion-index order.
        self.layers
            .keys()
            .enumerate()
            .map(|(index, &layer)| LayerKey { layer, index })
    }
    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn colliders_in(&self, layer: Layer) -> &[ColliderId] {
        //! In registration order.
        self.layers.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colliders.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn deferred(&self) -> Deferred {
        Deferred { next_id: self.next_id.clone(), queue: Rc::downgrade(&self.queue) }
    }

    pub fn flush(&mut self) -> usize {
        //! Applies queued spawns and despawns in the order they were queued.
        let commands = std::mem::take(&mut *self.queue.borrow_mut());
        let count = commands.len();
        for command in commands {
            match command {
                Command::Spawn(id, layer, collider) => {
                    if collider.is_alive() {
                        self.insert(id, layer, collider);
                    } else {
                        debug!("dropped deferred {:?}: body already gone", id);
                    }
                }
                Command::Despawn(id) => {
                    self.deregister(id);
                }
            }
        }
        if count > 0 {
            debug!("flushed {} deferred registry changes", count);
        }
        count
    }

    pub fn prune_dead(&mut self) -> usize {
        //! Deregisters every collider whose body has been dropped.
        let mut dead: Vec<ColliderId> = self
            .colliders
            .iter()
            .filter(|(_, e)| !e.collider.is_alive())
            .map(|(&id, _)| id)
            .collect();
        dead.sort_unstable();
        for &id in dead.iter() {
            self.deregister(id);
        }
        if !dead.is_empty() {
            debug!("pruned {} colliders with dropped bodies", dead.len());
        }
        dead.len()
    }

    pub(crate) fn drain(&mut self) -> usize {
        let count = self.colliders.len();
        self.colliders.clear();
        for (_, bucket) in self.layers.iter_mut() {
            bucket.clear();
        }
        self.queue.borrow_mut().clear();
        count
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}
