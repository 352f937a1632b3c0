use crate::dependencies::constructor::{constructor_provider, factory_provider, Constructor};
use crate::dependencies::resolver::Resolution;
use crate::dependencies::types::{
    Lifetime, Provider, ServiceDescriptor, ServiceId, ServiceKey,
};
use crate::errors::{error_codes, CometError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
struct Buckets {
    singleton: HashMap<ServiceId, ServiceDescriptor>,
    transient: HashMap<ServiceId, ServiceDescriptor>,
    scoped: HashMap<ServiceId, ServiceDescriptor>,
}

impl Buckets {
    fn bucket(&self, lifetime: Lifetime) -> &HashMap<ServiceId, ServiceDescriptor> {
        match lifetime {
            Lifetime::Singleton => &self.singleton,
            Lifetime::Transient => &self.transient,
            Lifetime::Scoped => &self.scoped,
        }
    }

    fn bucket_mut(&mut self, lifetime: Lifetime) -> &mut HashMap<ServiceId, ServiceDescriptor> {
        match lifetime {
            Lifetime::Singleton => &mut self.singleton,
            Lifetime::Transient => &mut self.transient,
            Lifetime::Scoped => &mut self.scoped,
        }
    }
}

/// Service registry with a two-phase lifecycle.
///
/// While open it accepts registrations under an exclusive lock. Once
/// [`seal`](Self::seal)ed it rejects further registrations and only serves
/// concurrent resolutions under the shared read lock.
pub struct ServiceRegistry {
    buckets: RwLock<Buckets>,
    sealed: AtomicBool,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(Buckets::default()),
            sealed: AtomicBool::new(false),
        }
    }

    /// Stores `descriptor` in the bucket of its lifetime, replacing any
    /// descriptor already registered there for the same (type, key).
    pub fn register(&self, descriptor: ServiceDescriptor) -> Result<(), CometError> {
        if self.is_sealed() {
            return Err(CometError::registration(
                error_codes::REGISTRY_SEALED,
                format!("Cannot register {}: registry is sealed", descriptor.id),
            ));
        }

        if descriptor.lifetime == Lifetime::Singleton && descriptor.provider.is_constructor() {
            return Err(CometError::registration(
                error_codes::INVALID_PROVIDER,
                format!(
                    "Singleton {} must be registered as a ready value",
                    descriptor.id
                ),
            ));
        }

        log::debug!(
            "Registering {} as {:?} ({:?})",
            descriptor.id,
            descriptor.lifetime,
            descriptor.provider
        );

        let mut buckets = self.buckets.write();
        let lifetime = descriptor.lifetime;
        if let Some(previous) = buckets
            .bucket_mut(lifetime)
            .insert(descriptor.id.clone(), descriptor)
        {
            log::warn!("Replaced {:?} registration of {}", lifetime, previous.id);
        }
        Ok(())
    }

    pub fn register_singleton<T>(&self, instance: T) -> Result<(), CometError>
    where
        T: Send + Sync + 'static,
    {
        self.register_keyed_singleton(ServiceKey::Unkeyed, instance)
    }

    pub fn register_keyed_singleton<T>(
        &self,
        key: impl Into<ServiceKey>,
        instance: T,
    ) -> Result<(), CometError>
    where
        T: Send + Sync + 'static,
    {
        self.register(ServiceDescriptor::new(
            ServiceId::of::<T>(key.into()),
            Lifetime::Singleton,
            Provider::value(instance),
        ))
    }

    pub fn register_transient<T, Args>(
        &self,
        constructor: impl Constructor<Args, T>,
    ) -> Result<(), CometError>
    where
        T: Send + Sync + 'static,
    {
        self.register_keyed_transient(ServiceKey::Unkeyed, constructor)
    }

    pub fn register_keyed_transient<T, Args>(
        &self,
        key: impl Into<ServiceKey>,
        constructor: impl Constructor<Args, T>,
    ) -> Result<(), CometError>
    where
        T: Send + Sync + 'static,
    {
        self.register(ServiceDescriptor::new(
            ServiceId::of::<T>(key.into()),
            Lifetime::Transient,
            constructor_provider(constructor),
        ))
    }

    pub fn register_scoped<T, Args>(
        &self,
        constructor: impl Constructor<Args, T>,
    ) -> Result<(), CometError>
    where
        T: Send + Sync + 'static,
    {
        self.register_keyed_scoped(ServiceKey::Unkeyed, constructor)
    }

    pub fn register_keyed_scoped<T, Args>(
        &self,
        key: impl Into<ServiceKey>,
        constructor: impl Constructor<Args, T>,
    ) -> Result<(), CometError>
    where
        T: Send + Sync + 'static,
    {
        self.register(ServiceDescriptor::new(
            ServiceId::of::<T>(key.into()),
            Lifetime::Scoped,
            constructor_provider(constructor),
        ))
    }

    /// Registers a fallible factory that resolves its own dependencies.
    pub fn register_factory<T, F>(
        &self,
        key: impl Into<ServiceKey>,
        lifetime: Lifetime,
        factory: F,
    ) -> Result<(), CometError>
    where
        T: Send + Sync + 'static,
        F: Fn(&mut Resolution<'_>) -> Result<T, CometError> + Send + Sync + 'static,
    {
        self.register(ServiceDescriptor::new(
            ServiceId::of::<T>(key.into()),
            lifetime,
            factory_provider(factory),
        ))
    }

    pub fn seal(&self) {
        if !self.sealed.swap(true, Ordering::AcqRel) {
            log::debug!("Service registry sealed with {} descriptors", self.len());
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.lookup(&ServiceId::of::<T>(ServiceKey::Unkeyed)).is_some()
    }

    pub fn contains_keyed<T: 'static>(&self, key: impl Into<ServiceKey>) -> bool {
        self.lookup(&ServiceId::of::<T>(key.into())).is_some()
    }

    pub fn len(&self) -> usize {
        let buckets = self.buckets.read();
        buckets.singleton.len() + buckets.transient.len() + buckets.scoped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds the provider for `id`, consulting lifetimes in
    /// [`Lifetime::RESOLUTION_ORDER`]. The lock is released before returning
    /// so constructors can resolve recursively.
    pub(crate) fn lookup(&self, id: &ServiceId) -> Option<(Lifetime, Provider)> {
        let buckets = self.buckets.read();
        Lifetime::RESOLUTION_ORDER.iter().find_map(|lifetime| {
            buckets
                .bucket(*lifetime)
                .get(id)
                .map(|descriptor| (*lifetime, descriptor.provider.clone()))
        })
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
