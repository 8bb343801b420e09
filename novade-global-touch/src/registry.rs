//! Registry of live subscriptions to the global touch capability.
//!
//! Subscriptions live in an arena addressed by [`SubscriptionKey`]s. A key carries
//! the capability instance it was issued by and the generation of its slot, so a
//! key that outlived its subscription (client gone, capability destroyed and
//! re-created, slot reused) resolves to nothing instead of to a stranger.
//!
//! Bind order is tracked separately from slot order so that iteration is
//! deterministic even when slots are reused.

use crate::error::{GlobalTouchError, Result};

/// Stable handle to one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionKey {
    instance: u32,
    index: u32,
    generation: u32,
}

impl SubscriptionKey {
    /// The capability incarnation this key was issued by.
    pub fn instance(&self) -> u32 {
        self.instance
    }
}

#[derive(Debug)]
struct Slot<S> {
    generation: u32,
    sink: Option<S>,
}

/// Ordered collection of subscriptions for one capability instance.
#[derive(Debug)]
pub struct SubscriptionRegistry<S> {
    instance: u32,
    slots: Vec<Slot<S>>,
    free: Vec<u32>,
    /// Bind order. Every key in here resolves to an occupied slot.
    order: Vec<SubscriptionKey>,
    max_subscriptions: Option<usize>,
}

impl<S> SubscriptionRegistry<S> {
    /// Creates an empty registry for capability instance `instance`.
    ///
    /// `max_subscriptions` caps the number of simultaneous subscriptions; binding
    /// beyond it fails the same way an allocation failure does.
    pub fn new(instance: u32, max_subscriptions: Option<usize>) -> Self {
        Self {
            instance,
            slots: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
            max_subscriptions,
        }
    }

    pub fn instance(&self) -> u32 {
        self.instance
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Makes sure the next [`Self::bind`] cannot fail for lack of room.
    ///
    /// # Errors
    ///
    /// [`GlobalTouchError::OutOfMemory`] under the same conditions as `bind`.
    pub fn reserve(&mut self) -> Result<()> {
        if let Some(max) = self.max_subscriptions {
            if self.order.len() >= max {
                return Err(GlobalTouchError::OutOfMemory("subscription"));
            }
        }
        self.order
            .try_reserve(1)
            .map_err(|_| GlobalTouchError::OutOfMemory("subscription"))?;
        if self.free.is_empty() {
            self.slots
                .try_reserve(1)
                .map_err(|_| GlobalTouchError::OutOfMemory("subscription"))?;
        }
        Ok(())
    }

    /// Adds a subscription at the end of the bind order.
    ///
    /// # Errors
    ///
    /// [`GlobalTouchError::OutOfMemory`] if the registry cannot grow, either
    /// because the allocator refused or because `max_subscriptions` is reached.
    /// The registry is unchanged on failure.
    pub fn bind(&mut self, sink: S) -> Result<SubscriptionKey> {
        self.reserve()?;

        let key = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.sink = Some(sink);
                SubscriptionKey { instance: self.instance, index, generation: slot.generation }
            }
            None => {
                let index = u32::try_from(self.slots.len())
                    .map_err(|_| GlobalTouchError::OutOfMemory("subscription"))?;
                self.slots.push(Slot { generation: 0, sink: Some(sink) });
                SubscriptionKey { instance: self.instance, index, generation: 0 }
            }
        };
        self.order.push(key);
        Ok(key)
    }

    /// Removes a subscription and hands its sink back.
    ///
    /// The key is dropped from the bind order before the slot is released.
    ///
    /// # Errors
    ///
    /// [`GlobalTouchError::NotFound`] if the key is stale, foreign, or was
    /// already unbound.
    pub fn unbind(&mut self, key: SubscriptionKey) -> Result<S> {
        if !self.contains(key) {
            return Err(GlobalTouchError::NotFound("subscription"));
        }
        if let Some(position) = self.order.iter().position(|k| *k == key) {
            self.order.remove(position);
        }
        let slot = &mut self.slots[key.index as usize];
        let sink = slot.sink.take().ok_or(GlobalTouchError::NotFound("subscription"))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index);
        Ok(sink)
    }

    pub fn contains(&self, key: SubscriptionKey) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: SubscriptionKey) -> Option<&S> {
        if key.instance != self.instance {
            return None;
        }
        self.slots
            .get(key.index as usize)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.sink.as_ref())
    }

    /// Live subscriptions in bind order. Lazy and restartable.
    pub fn iter(&self) -> impl Iterator<Item = (SubscriptionKey, &S)> + '_ {
        self.order
            .iter()
            .filter_map(move |key| self.get(*key).map(|sink| (*key, sink)))
    }

    /// Snapshot of the current keys in bind order.
    pub fn keys(&self) -> Vec<SubscriptionKey> {
        self.order.clone()
    }

    /// Removes every subscription, in bind order.
    pub fn drain(&mut self) -> Vec<(SubscriptionKey, S)> {
        let order = std::mem::take(&mut self.order);
        let mut drained = Vec::with_capacity(order.len());
        for key in order {
            let slot = &mut self.slots[key.index as usize];
            if let Some(sink) = slot.sink.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(key.index);
                drained.push((key, sink));
            }
        }
        drained
    }
}
