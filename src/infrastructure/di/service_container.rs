//! Service container for dependency injection
//!
//! `ServiceCollection` collects registrations during startup; `ServiceContainer`
//! is the frozen, shareable result that resolves them. All services are singletons.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::infrastructure::di::{Constructor, Injectable, Shared, TypeRegistrar, TypeResolver};
use crate::infrastructure::InfraError;

/// Identifies a service by its Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    id: TypeId,
    name: &'static str,
}

impl ServiceKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

enum Registration {
    Instance(Shared),
    Singleton {
        constructor: Constructor,
        cache: OnceLock<Shared>,
    },
}

/// Mutable set of registrations, consumed by [`ServiceCollection::into_container`].
///
/// Registering the same key twice replaces the earlier registration.
#[derive(Default)]
pub struct ServiceCollection {
    registrations: HashMap<ServiceKey, Registration>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T`, built through [`Injectable::inject`] on first resolution.
    pub fn add_type<T: Injectable>(&mut self) -> &mut Self {
        let constructor: Constructor = Arc::new(|resolver: &dyn TypeResolver| {
            T::inject(resolver).map(|v| Arc::new(v) as Shared)
        });
        self.register(ServiceKey::of::<T>(), constructor);
        self
    }

    pub fn add_instance<T: Send + Sync + 'static>(&mut self, instance: T) -> &mut Self {
        self.register_instance(ServiceKey::of::<T>(), Arc::new(instance));
        self
    }

    /// Run `factory` now and register its result.
    pub fn add_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        self.register_lazy(
            ServiceKey::of::<T>(),
            Box::new(move || Arc::new(factory()) as Shared),
        );
        self
    }

    pub fn contains(&self, service: &ServiceKey) -> bool {
        self.registrations.contains_key(service)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn into_container(self) -> ServiceContainer {
        debug!("building service container with {} registrations", self.len());
        ServiceContainer {
            registrations: self.registrations,
        }
    }
}

impl TypeRegistrar for ServiceCollection {
    fn register(&mut self, service: ServiceKey, constructor: Constructor) {
        debug!("register type: {}", service);
        self.registrations.insert(
            service,
            Registration::Singleton {
                constructor,
                cache: OnceLock::new(),
            },
        );
    }

    fn register_instance(&mut self, service: ServiceKey, instance: Shared) {
        debug!("register instance: {}", service);
        self.registrations
            .insert(service, Registration::Instance(instance));
    }

    fn register_lazy(&mut self, service: ServiceKey, factory: Box<dyn FnOnce() -> Shared + '_>) {
        debug!("register factory result: {}", service);
        self.registrations
            .insert(service, Registration::Instance(factory()));
    }

    fn build(self: Box<Self>) -> Arc<dyn TypeResolver> {
        Arc::new((*self).into_container())
    }
}

/// Frozen container. Shareable across threads; singletons are built at most once
/// per successful construction.
pub struct ServiceContainer {
    registrations: HashMap<ServiceKey, Registration>,
}

impl ServiceContainer {
    pub fn contains(&self, service: &ServiceKey) -> bool {
        self.registrations.contains_key(service)
    }
}

impl TypeResolver for ServiceContainer {
    fn resolve(&self, service: Option<&ServiceKey>) -> Result<Option<Shared>, InfraError> {
        let Some(service) = service else {
            return Ok(None);
        };
        let Some(registration) = self.registrations.get(service) else {
            debug!("resolve: {} not registered", service);
            return Ok(None);
        };
        match registration {
            Registration::Instance(instance) => Ok(Some(Arc::clone(instance))),
            Registration::Singleton { constructor, cache } => {
                if let Some(instance) = cache.get() {
                    return Ok(Some(Arc::clone(instance)));
                }
                let built = constructor(self as &dyn TypeResolver)
                    .map_err(|e| InfraError::construction(service.name(), e))?;
                // a concurrent resolution may have won; hand out whichever was stored
                Ok(Some(Arc::clone(cache.get_or_init(|| built))))
            }
        }
    }
}
