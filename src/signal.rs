//! Ordered subscriber lists with synchronous dispatch.

use std::fmt::{Debug, Formatter};

/// Handle returned by [`Signal::subscribe`], used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback<E> = Box<dyn FnMut(&E)>;

/// A notification channel. Subscribers run in the order they subscribed.
pub struct Signal<E> {
    next: u64,
    subscribers: Vec<(SubscriptionId, Callback<E>)>,
}

impl<E> Signal<E> {
    pub fn new() -> Signal<E> {
        Signal { next: 0, subscribers: Vec::new() }
    }

    pub fn subscribe<F: FnMut(&E) + 'static>(&mut self, f: F) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.subscribers.push((id, Box::new(f)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        //! Returns whether `id` was subscribed.
        match self.subscribers.iter().position(|(sid, _)| *sid == id) {
            Some(i) => {
                // `remove` rather than `swap_remove`: invocation order must hold
                self.subscribers.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn emit(&mut self, event: &E) {
        for (_, f) in self.subscribers.iter_mut() {
            f(event);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Signal::new()
    }
}

impl<E> Debug for Signal<E> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
