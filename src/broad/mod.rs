//! Broadphase: the layer registry and the per-tick sweep over it.

pub mod cosmos;
pub mod registry;
pub mod response;

use crate::{
    collider::ColliderId,
    narrow::{self, Contact, Shape},
    Fp, Vec2,
};
use fnv::FnvHashMap;
use log::{debug, trace, warn};
use registry::{Entry, Registry};
use response::Resolution;

/// How a solid contact's depth is split between the two colliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MassSplit {
    /// Each side moves `partner.mass / (mass + partner.mass)` of the depth.
    Weighted,
    /// Each side moves half the depth, whatever the masses.
    Even,
}

/// What happens when a circle overlaps something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundResponse {
    /// Both sides get `on_trigger`; nothing moves.
    Trigger,
    /// An exact contact is computed and resolved like box-box.
    Solid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    pub mass_split: MassSplit,
    pub round_response: RoundResponse,
    /// Whether circle-circle pairs are tested at all.
    pub circle_pairs: bool,
    /// Deregister colliders with dropped bodies at the start of every tick.
    pub prune_dead: bool,
}
impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            mass_split: MassSplit::Weighted,
            round_response: RoundResponse::Trigger,
            circle_pairs: true,
            prune_dead: true,
        }
    }
}

/// Counters for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Layer pairs visited, self-pairs included.
    pub layer_pairs: usize,
    /// Collider pairs with both sides enabled.
    pub pairs_tested: usize,
    /// Contacts where at least one side was pushed out.
    pub contacts: usize,
    /// Overlapping pairs where neither side moved: trigger-only circle overlaps and
    /// shape pairs whose colliders are both triggers.
    pub triggers: usize,
    /// Pairs or sides skipped because a body was unreachable.
    pub skipped: usize,
    /// Circle-circle pairs skipped because `circle_pairs` is off.
    pub unsupported: usize,
}

enum Hit {
    Solid(Contact),
    Overlap,
}
impl Hit {
    #[inline]
    fn flip(self) -> Hit {
        match self {
            Hit::Solid(c) => Hit::Solid(c.flip()),
            Hit::Overlap => Hit::Overlap,
        }
    }
}

/// Runs the pairwise sweep over a [`Registry`], once per fixed tick.
#[derive(Debug, Clone, Default)]
pub struct Sweeper {
    pub config: SweepConfig,
    ticks: u64,
    elapsed: Fp,
}

impl Sweeper {
    pub fn new(config: SweepConfig) -> Sweeper {
        Sweeper { config, ticks: 0, elapsed: 0.0 }
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
    #[inline]
    pub fn elapsed(&self) -> Fp {
        self.elapsed
    }

    pub fn tick(&mut self, registry: &mut Registry, dt: Fp) -> TickStats {
        //! Flushes deferred changes, sweeps every layer pair `(a, b)` with `a.index <= b.index`,
        //! then flushes whatever the callbacks queued.
        registry.flush();
        if self.config.prune_dead {
            registry.prune_dead();
        }

        let mut stats = TickStats::default();
        {
            let Registry { layers, colliders, .. } = &mut *registry;
            let layers = &*layers;
            let len = layers.len();

            for i in 0..len {
                let list_a = match layers.get_index(i) {
                    Some((_, list)) => list,
                    None => continue,
                };
                for j in i..len {
                    let list_b = match layers.get_index(j) {
                        Some((_, list)) => list,
                        None => continue,
                    };
                    stats.layer_pairs += 1;

                    for (ai, &a) in list_a.iter().enumerate() {
                        // within a layer each unordered pair once, never a collider with itself
                        let rest = if i == j { &list_b[ai + 1..] } else { &list_b[..] };
                        for &b in rest {
                            self.test_pair(colliders, a, b, &mut stats);
                        }
                    }
                }
            }
        }

        if stats.unsupported > 0 {
            debug!("skipped {} circle-circle pairs", stats.unsupported);
        }
        registry.flush();

        self.ticks += 1;
        self.elapsed += dt;
        stats
    }

    fn test_pair(
        &self,
        colliders: &mut FnvHashMap<ColliderId, Entry>,
        a: ColliderId,
        b: ColliderId,
        stats: &mut TickStats,
    ) {
        let (hit, mass_a, mass_b) = {
            let (ca, cb) = match (colliders.get(&a), colliders.get(&b)) {
                (Some(ea), Some(eb)) => (&ea.collider, &eb.collider),
                _ => return,
            };
            if !ca.is_enabled() || !cb.is_enabled() {
                return;
            }
            stats.pairs_tested += 1;

            let (pa, pb) = match (ca.position(), cb.position()) {
                (Some(pa), Some(pb)) => (pa, pb),
                _ => {
                    warn!("{:?} or {:?} has no reachable body; pair skipped", a, b);
                    stats.skipped += 1;
                    return;
                }
            };
            match self.narrow(pa, ca.shape(), pb, cb.shape(), stats) {
                Some(hit) => (hit, ca.mass(), cb.mass()),
                None => return,
            }
        };

        match hit {
            Hit::Solid(contact) => {
                trace!("contact {:?} <-> {:?}: {:?}", a, b, contact);
                let (depth, split) = (contact.depth, self.config.mass_split);
                let ra = colliders.get_mut(&a).map(|e| {
                    response::resolve(&mut e.collider, b, mass_b, contact.normal_a, depth, split)
                });
                let rb = colliders.get_mut(&b).map(|e| {
                    response::resolve(&mut e.collider, a, mass_a, contact.normal_b, depth, split)
                });

                let sides = [ra, rb];
                let unreachable = Some(Resolution::Unreachable);
                stats.skipped += sides.iter().filter(|r| **r == unreachable).count();
                if sides.contains(&Some(Resolution::Moved)) {
                    stats.contacts += 1;
                } else if sides.iter().all(|r| *r == Some(Resolution::Triggered)) {
                    stats.triggers += 1;
                }
            }
            Hit::Overlap => {
                trace!("overlap {:?} <-> {:?}", a, b);
                stats.triggers += 1;
                if let Some(e) = colliders.get_mut(&a) {
                    response::notify_overlap(&mut e.collider, b);
                }
                if let Some(e) = colliders.get_mut(&b) {
                    response::notify_overlap(&mut e.collider, a);
                }
            }
        }
    }

    fn narrow(
        &self,
        pa: Vec2,
        sa: &Shape,
        pb: Vec2,
        sb: &Shape,
        stats: &mut TickStats,
    ) -> Option<Hit> {
        match (sa, sb) {
            (Shape::Rect(ra), Shape::Rect(rb)) => {
                narrow::rect_rect_contact(pa, ra, pb, rb).map(Hit::Solid)
            }
            (Shape::Circle(c), Shape::Rect(r)) => self.circle_rect(pa, c, pb, r),
            // the circle always goes first
            (Shape::Rect(r), Shape::Circle(c)) => self.circle_rect(pb, c, pa, r).map(Hit::flip),
            (Shape::Circle(ca), Shape::Circle(cb)) => {
                if !self.config.circle_pairs {
                    stats.unsupported += 1;
                    return None;
                }
                match self.config.round_response {
                    RoundResponse::Trigger => {
                        overlap(narrow::circle_circle_test(pa, ca, pb, cb))
                    }
                    RoundResponse::Solid => {
                        narrow::circle_circle_contact(pa, ca, pb, cb).map(Hit::Solid)
                    }
                }
            }
        }
    }

    fn circle_rect(
        &self,
        circle_pos: Vec2,
        circle: &narrow::Circle,
        rect_pos: Vec2,
        rect: &narrow::Rect,
    ) -> Option<Hit> {
        match self.config.round_response {
            RoundResponse::Trigger => {
                overlap(narrow::circle_rect_test(circle_pos, circle, rect_pos, rect))
            }
            RoundResponse::Solid => {
                narrow::circle_rect_contact(circle_pos, circle, rect_pos, rect).map(Hit::Solid)
            }
        }
    }
}

#[inline]
fn overlap(hit: bool) -> Option<Hit> {
    if hit { Some(Hit::Overlap) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        body, Body, Collider, ColliderOptions, CollisionEvent, Extent, Layer, SharedBody, Transform,
        TriggerEvent,
    };
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use std::{cell::RefCell, rc::Rc};

    fn body_at(x: Fp, y: Fp) -> SharedBody {
        body::shared(Transform::at(Vec2::new(x, y)))
    }
    fn rect(body: &SharedBody, w: Fp, h: Fp, opts: ColliderOptions) -> Collider {
        Collider::rect(body, &Extent::new(w, h), opts).unwrap()
    }
    fn circle(body: &SharedBody, r: Fp, opts: ColliderOptions) -> Collider {
        Collider::circle(body, &Extent::new(r * 2.0, r * 2.0), opts).unwrap()
    }
    fn pos(body: &SharedBody) -> Vec2 {
        body.borrow().position()
    }

    type Log<E> = Rc<RefCell<Vec<E>>>;

    fn watch_collisions(c: &mut Collider) -> Log<CollisionEvent> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        c.on_collision.subscribe(move |e: &CollisionEvent| l.borrow_mut().push(*e));
        log
    }
    fn watch_triggers(c: &mut Collider) -> Log<TriggerEvent> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        c.on_trigger.subscribe(move |e: &TriggerEvent| l.borrow_mut().push(*e));
        log
    }

    #[test]
    fn overlapping_boxes_are_pushed_apart_symmetrically() {
        let (ba, bb) = (body_at(0.0, 0.0), body_at(1.0, 0.0));
        let mut ca = rect(&ba, 2.0, 2.0, ColliderOptions::default());
        let mut cb = rect(&bb, 2.0, 2.0, ColliderOptions::default());
        let (la, lb) = (watch_collisions(&mut ca), watch_collisions(&mut cb));

        let mut reg = Registry::new();
        let ida = reg.register(Layer(0), ca).unwrap();
        let idb = reg.register(Layer(0), cb).unwrap();

        let stats = Sweeper::default().tick(&mut reg, 0.016);
        assert_eq!(stats.contacts, 1);
        assert_eq!(stats.pairs_tested, 1);

        assert_abs_diff_eq!(pos(&ba), Vec2::new(-0.5, 0.0));
        assert_abs_diff_eq!(pos(&bb), Vec2::new(1.5, 0.0));

        let (la, lb) = (la.borrow(), lb.borrow());
        assert_eq!(la.len(), 1);
        assert_eq!(lb.len(), 1);
        assert_eq!(la[0].partner, idb);
        assert_eq!(lb[0].partner, ida);
        assert_eq!(la[0].normal, -lb[0].normal);
        assert_eq!(la[0].normal, Vec2::new(-1.0, 0.0));
        assert_eq!(la[0].penetration, lb[0].penetration);
        assert_abs_diff_eq!(la[0].penetration, 1.0);

        // separated now: a second tick finds nothing
        let stats = Sweeper::default().tick(&mut reg, 0.016);
        assert_eq!(stats.contacts, 0);
    }

    #[test]
    fn heavier_bodies_move_less() {
        let (light, heavy) = (body_at(0.0, 0.0), body_at(0.0, 1.5));
        let mut reg = Registry::new();
        reg.register(Layer(0), rect(&light, 2.0, 2.0, ColliderOptions { mass: 1.0, ..Default::default() })).unwrap();
        reg.register(Layer(1), rect(&heavy, 2.0, 2.0, ColliderOptions { mass: 3.0, ..Default::default() })).unwrap();

        Sweeper::default().tick(&mut reg, 0.016);
        // depth 0.5 along y, split 3:1
        assert_abs_diff_eq!(pos(&light), Vec2::new(0.0, -0.375));
        assert_abs_diff_eq!(pos(&heavy), Vec2::new(0.0, 1.625));
    }

    #[test]
    fn even_split_ignores_mass() {
        let (light, heavy) = (body_at(0.0, 0.0), body_at(0.0, 1.5));
        let mut reg = Registry::new();
        reg.register(Layer(0), rect(&light, 2.0, 2.0, ColliderOptions { mass: 1.0, ..Default::default() })).unwrap();
        reg.register(Layer(0), rect(&heavy, 2.0, 2.0, ColliderOptions { mass: 100.0, ..Default::default() })).unwrap();

        let config = SweepConfig { mass_split: MassSplit::Even, ..Default::default() };
        Sweeper::new(config).tick(&mut reg, 0.016);
        assert_abs_diff_eq!(pos(&light), Vec2::new(0.0, -0.25));
        assert_abs_diff_eq!(pos(&heavy), Vec2::new(0.0, 1.75));
    }

    #[test]
    fn disabled_colliders_are_inert() {
        let (ba, bb) = (body_at(0.0, 0.0), body_at(0.5, 0.5));
        let mut ca = rect(&ba, 2.0, 2.0, ColliderOptions { enabled: false, ..Default::default() });
        let mut cb = rect(&bb, 2.0, 2.0, ColliderOptions::default());
        let (ta, tb) = (watch_triggers(&mut ca), watch_triggers(&mut cb));
        let (la, lb) = (watch_collisions(&mut ca), watch_collisions(&mut cb));

        let mut reg = Registry::new();
        let ida = reg.register(Layer(0), ca).unwrap();
        reg.register(Layer(0), cb).unwrap();

        let mut sweeper = Sweeper::default();
        let stats = sweeper.tick(&mut reg, 0.016);
        assert_eq!(stats.pairs_tested, 0);
        assert_eq!(pos(&ba), Vec2::new(0.0, 0.0));
        assert_eq!(pos(&bb), Vec2::new(0.5, 0.5));
        assert!(ta.borrow().is_empty() && tb.borrow().is_empty());
        assert!(la.borrow().is_empty() && lb.borrow().is_empty());

        reg.set_enabled(ida, true);
        assert_eq!(sweeper.tick(&mut reg, 0.016).contacts, 1);
    }

    #[test]
    fn triggers_report_without_moving() {
        let (bt, bs) = (body_at(0.0, 0.0), body_at(1.0, 0.0));
        let mut trig = rect(&bt, 2.0, 2.0, ColliderOptions { trigger: true, ..Default::default() });
        let mut solid = rect(&bs, 2.0, 2.0, ColliderOptions::default());
        let tt = watch_triggers(&mut trig);
        let lt = watch_collisions(&mut trig);
        let ls = watch_collisions(&mut solid);

        let mut reg = Registry::new();
        reg.register(Layer(0), trig).unwrap();
        let ids = reg.register(Layer(1), solid).unwrap();

        let stats = Sweeper::default().tick(&mut reg, 0.016);
        assert_eq!(pos(&bt), Vec2::new(0.0, 0.0));
        assert_eq!(*tt.borrow(), vec![TriggerEvent { partner: ids }]);
        assert!(lt.borrow().is_empty());

        // the solid side still takes its share, so the pair is a contact
        assert_eq!(stats.contacts, 1);
        assert_eq!(stats.triggers, 0);
        assert_abs_diff_eq!(pos(&bs), Vec2::new(1.5, 0.0));
        assert_eq!(ls.borrow().len(), 1);
    }

    #[test]
    fn circle_box_overlaps_only_trigger_by_default() {
        let (bc, bb) = (body_at(1.2, 0.0), body_at(0.0, 0.0));
        let mut c = circle(&bc, 0.5, ColliderOptions::default());
        let mut b = rect(&bb, 2.0, 2.0, ColliderOptions::default());
        let (tc, tb) = (watch_triggers(&mut c), watch_triggers(&mut b));
        let (lc, lb) = (watch_collisions(&mut c), watch_collisions(&mut b));

        let mut reg = Registry::new();
        // box first, so the sweep sees box x circle and has to swap
        let idb = reg.register(Layer(0), b).unwrap();
        let idc = reg.register(Layer(0), c).unwrap();

        let stats = Sweeper::default().tick(&mut reg, 0.016);
        assert_eq!(stats.triggers, 1);
        assert_eq!(stats.contacts, 0);
        assert_eq!(pos(&bc), Vec2::new(1.2, 0.0));
        assert_eq!(pos(&bb), Vec2::new(0.0, 0.0));
        assert_eq!(*tc.borrow(), vec![TriggerEvent { partner: idb }]);
        assert_eq!(*tb.borrow(), vec![TriggerEvent { partner: idc }]);
        assert!(lc.borrow().is_empty() && lb.borrow().is_empty());
    }

    #[test]
    fn far_circle_fires_nothing() {
        let (bc, bb) = (body_at(100.0, 100.0), body_at(0.0, 0.0));
        let mut c = circle(&bc, 1.0, ColliderOptions::default());
        let tc = watch_triggers(&mut c);

        let mut reg = Registry::new();
        reg.register(Layer(0), c).unwrap();
        reg.register(Layer(1), rect(&bb, 2.0, 2.0, ColliderOptions::default())).unwrap();

        let stats = Sweeper::default().tick(&mut reg, 0.016);
        assert_eq!(stats.pairs_tested, 1);
        assert_eq!(stats.triggers + stats.contacts, 0);
        assert!(tc.borrow().is_empty());
    }

    #[test]
    fn solid_circles_are_resolved() {
        let (bc, bb) = (body_at(1.5, 0.0), body_at(0.0, 0.0));
        let mut reg = Registry::new();
        reg.register(Layer(0), rect(&bb, 2.0, 2.0, ColliderOptions::default())).unwrap();
        reg.register(Layer(0), circle(&bc, 1.0, ColliderOptions::default())).unwrap();

        let config = SweepConfig { round_response: RoundResponse::Solid, ..Default::default() };
        let stats = Sweeper::new(config).tick(&mut reg, 0.016);
        assert_eq!(stats.contacts, 1);
        assert_abs_diff_eq!(pos(&bc), Vec2::new(1.75, 0.0));
        assert_abs_diff_eq!(pos(&bb), Vec2::new(-0.25, 0.0));
    }

    #[test]
    fn circle_pairs_can_be_switched_off() {
        let (b1, b2) = (body_at(0.0, 0.0), body_at(0.5, 0.0));
        let mut reg = Registry::new();
        reg.register(Layer(0), circle(&b1, 1.0, ColliderOptions::default())).unwrap();
        reg.register(Layer(0), circle(&b2, 1.0, ColliderOptions::default())).unwrap();

        assert_eq!(Sweeper::default().tick(&mut reg, 0.016).triggers, 1);

        let config = SweepConfig { circle_pairs: false, ..Default::default() };
        let stats = Sweeper::new(config).tick(&mut reg, 0.016);
        assert_eq!(stats.triggers, 0);
        assert_eq!(stats.unsupported, 1);
    }

    #[test]
    fn pairs_within_a_layer_are_tested_once() {
        let b = body_at(0.0, 0.0);
        let mut reg = Registry::new();
        for _ in 0..3 {
            reg.register(Layer(0), rect(&b, 1.0, 1.0, ColliderOptions { trigger: true, ..Default::default() })).unwrap();
        }
        for _ in 0..2 {
            reg.register(Layer(1), rect(&b, 1.0, 1.0, ColliderOptions { trigger: true, ..Default::default() })).unwrap();
        }

        let stats = Sweeper::default().tick(&mut reg, 0.016);
        // 3 inside layer 0, 1 inside layer 1, 3 x 2 across
        assert_eq!(stats.layer_pairs, 3);
        assert_eq!(stats.pairs_tested, 10);
        // every side is a trigger, so nothing counts as a contact
        assert_eq!(stats.triggers, 10);
        assert_eq!(stats.contacts, 0);
    }

    #[test]
    fn dropped_bodies_are_skipped_or_pruned() {
        let keep = body_at(0.0, 0.0);
        let gone = body_at(0.5, 0.0);
        let mut reg = Registry::new();
        reg.register(Layer(0), rect(&keep, 2.0, 2.0, ColliderOptions::default())).unwrap();
        let idg = reg.register(Layer(0), rect(&gone, 2.0, 2.0, ColliderOptions::default())).unwrap();
        drop(gone);

        let config = SweepConfig { prune_dead: false, ..Default::default() };
        let stats = Sweeper::new(config).tick(&mut reg, 0.016);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.contacts, 0);
        assert!(reg.contains(idg));
        assert_eq!(pos(&keep), Vec2::new(0.0, 0.0));

        let stats = Sweeper::default().tick(&mut reg, 0.016);
        assert!(!reg.contains(idg));
        assert_eq!(stats.pairs_tested, 0);
    }

    #[test]
    fn callbacks_can_spawn_through_the_deferred_handle() {
        let (ba, bb) = (body_at(0.0, 0.0), body_at(0.5, 0.0));
        let mut reg = Registry::new();
        let deferred = reg.deferred();

        let mut ca = rect(&ba, 2.0, 2.0, ColliderOptions { trigger: true, ..Default::default() });
        let spawned = Rc::new(RefCell::new(Vec::new()));
        {
            let spawned = spawned.clone();
            let body = ba.clone();
            ca.on_trigger.subscribe(move |_: &TriggerEvent| {
                let c = Collider::rect(&body, &Extent::new(1.0, 1.0), ColliderOptions::default()).unwrap();
                spawned.borrow_mut().push(deferred.spawn(Layer(5), c));
            });
        }
        reg.register(Layer(0), ca).unwrap();
        reg.register(Layer(0), rect(&bb, 2.0, 2.0, ColliderOptions::default())).unwrap();

        let mut sweeper = Sweeper::default();
        sweeper.tick(&mut reg, 0.5);
        let id = spawned.borrow()[0];
        assert!(reg.contains(id));
        assert_eq!(reg.layer_key(Layer(5)).map(|k| k.index), Some(1));
        assert_eq!(sweeper.ticks(), 1);
        assert_abs_diff_eq!(sweeper.elapsed(), 0.5);
    }

    proptest! {
        #[test]
        fn every_layer_pair_is_visited_once(n in 0usize..12) {
            let b = body_at(0.0, 0.0);
            let mut reg = Registry::new();
            for layer in 0..n {
                reg.register(Layer(layer as u32), rect(&b, 1.0, 1.0, ColliderOptions { enabled: false, ..Default::default() })).unwrap();
            }
            let stats = Sweeper::default().tick(&mut reg, 0.016);
            prop_assert_eq!(stats.layer_pairs, n * (n + 1) / 2);
            prop_assert_eq!(stats.pairs_tested, 0);
        }
    }
}
