//! Lifecycle of the compositor-wide global touch capability.
//!
//! A compositor holds exactly one [`GlobalTouchState`]. The capability inside it is
//! either absent or present; only [`GlobalTouchState::create`] and
//! [`GlobalTouchState::destroy`] move between the two. While present, the
//! capability owns the advertisement that makes it visible to clients and the
//! registry of every client subscription.

use crate::error::{GlobalTouchError, Result};
use crate::registry::{SubscriptionKey, SubscriptionRegistry};
use tracing::{debug, info};

const CAPABILITY: &str = "weston_global_touch";

/// Publishes and revokes the client-visible advertisement of a capability.
///
/// For Wayland this is a global on the display; see
/// [`crate::protocols::DisplayAdvertiser`].
pub trait Advertiser {
    type Handle;

    fn publish(&mut self) -> Result<Self::Handle>;

    /// After this returns, new bind attempts must fail.
    fn revoke(&mut self, handle: Self::Handle);
}

/// The capability while it exists.
#[derive(Debug)]
pub struct GlobalTouchCapability<S, H> {
    advertisement: H,
    subscriptions: SubscriptionRegistry<S>,
}

impl<S, H> GlobalTouchCapability<S, H> {
    pub fn advertisement(&self) -> &H {
        &self.advertisement
    }

    pub fn subscriptions(&self) -> &SubscriptionRegistry<S> {
        &self.subscriptions
    }
}

/// Per-compositor holder of the (at most one) global touch capability.
#[derive(Debug)]
pub struct GlobalTouchState<S, H> {
    capability: Option<GlobalTouchCapability<S, H>>,
    next_instance: u32,
    max_subscriptions: Option<usize>,
}

impl<S, H> Default for GlobalTouchState<S, H> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<S, H> GlobalTouchState<S, H> {
    pub fn new(max_subscriptions: Option<usize>) -> Self {
        Self {
            capability: None,
            next_instance: 1,
            max_subscriptions,
        }
    }

    /// Creates the capability and publishes its advertisement.
    ///
    /// # Errors
    ///
    /// - [`GlobalTouchError::AlreadyExists`] if the capability is already created;
    ///   the existing one is left untouched.
    /// - Whatever the advertiser reports if publication fails (typically
    ///   [`GlobalTouchError::OutOfMemory`]); no partial capability is kept.
    pub fn create<A>(&mut self, advertiser: &mut A) -> Result<()>
    where
        A: Advertiser<Handle = H>,
    {
        if self.capability.is_some() {
            return Err(GlobalTouchError::AlreadyExists(CAPABILITY));
        }
        let instance = self.next_instance;
        let advertisement = advertiser.publish()?;
        self.next_instance = self.next_instance.wrapping_add(1).max(1);
        self.capability = Some(GlobalTouchCapability {
            advertisement,
            subscriptions: SubscriptionRegistry::new(instance, self.max_subscriptions),
        });
        info!(instance, "Global touch capability created");
        Ok(())
    }

    /// Revokes the advertisement, tears down every live subscription and
    /// releases the capability. Returns how many subscriptions were torn down.
    ///
    /// # Errors
    ///
    /// [`GlobalTouchError::NotFound`] if no capability exists.
    pub fn destroy<A>(&mut self, advertiser: &mut A) -> Result<usize>
    where
        A: Advertiser<Handle = H>,
    {
        let GlobalTouchCapability { advertisement, mut subscriptions } =
            self.capability.take().ok_or(GlobalTouchError::NotFound(CAPABILITY))?;
        advertiser.revoke(advertisement);

        let drained = subscriptions.drain();
        for (key, _sink) in &drained {
            debug!(?key, "Tearing down subscription with its capability");
        }
        info!(
            instance = subscriptions.instance(),
            subscriptions = drained.len(),
            "Global touch capability destroyed"
        );
        Ok(drained.len())
    }

    pub fn is_created(&self) -> bool {
        self.capability.is_some()
    }

    pub fn capability(&self) -> Option<&GlobalTouchCapability<S, H>> {
        self.capability.as_ref()
    }

    pub fn subscriptions(&self) -> Option<&SubscriptionRegistry<S>> {
        self.capability.as_ref().map(|c| &c.subscriptions)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions().map_or(0, SubscriptionRegistry::len)
    }

    /// Checks that a subscriber could be bound right now without failing.
    ///
    /// # Errors
    ///
    /// Same as [`Self::bind`].
    pub fn reserve(&mut self) -> Result<()> {
        self.capability
            .as_mut()
            .ok_or(GlobalTouchError::NotFound(CAPABILITY))?
            .subscriptions
            .reserve()
    }

    /// Registers a new subscriber with the live capability.
    ///
    /// # Errors
    ///
    /// [`GlobalTouchError::NotFound`] without a capability,
    /// [`GlobalTouchError::OutOfMemory`] if the registry cannot grow.
    pub fn bind(&mut self, sink: S) -> Result<SubscriptionKey> {
        let capability = self
            .capability
            .as_mut()
            .ok_or(GlobalTouchError::NotFound(CAPABILITY))?;
        let key = capability.subscriptions.bind(sink)?;
        debug!(?key, subscriptions = capability.subscriptions.len(), "Subscription bound");
        Ok(key)
    }

    /// Removes a subscriber. Safe to call with a key whose capability is gone.
    ///
    /// # Errors
    ///
    /// [`GlobalTouchError::NotFound`] if the key does not resolve.
    pub fn unbind(&mut self, key: SubscriptionKey) -> Result<S> {
        let capability = self
            .capability
            .as_mut()
            .ok_or(GlobalTouchError::NotFound("subscription"))?;
        let sink = capability.subscriptions.unbind(key)?;
        debug!(?key, subscriptions = capability.subscriptions.len(), "Subscription unbound");
        Ok(sink)
    }

    /// Whether `key` refers to a live subscription of the current capability.
    pub fn is_bound(&self, key: SubscriptionKey) -> bool {
        self.subscriptions().is_some_and(|r| r.contains(key))
    }
}
