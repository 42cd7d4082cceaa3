//! Registrar/resolver bridge between the command layer and the service container.
//!
//! The dispatcher only ever asks "construct me an instance of this type"; these
//! traits keep it ignorant of how the container stores or builds services.

use std::any::Any;
use std::sync::Arc;

use crate::infrastructure::di::ServiceKey;
use crate::infrastructure::InfraError;

/// Type-erased shared service instance.
pub type Shared = Arc<dyn Any + Send + Sync>;

/// Builds a service, resolving its own dependencies from the given resolver.
pub type Constructor = Arc<dyn Fn(&dyn TypeResolver) -> Result<Shared, InfraError> + Send + Sync>;

/// A type that can construct itself from resolved dependencies.
pub trait Injectable: Sized + Send + Sync + 'static {
    fn inject(resolver: &dyn TypeResolver) -> Result<Self, InfraError>;
}

/// Registration side of the bridge.
pub trait TypeRegistrar {
    /// Register a singleton built by `constructor` on first resolution.
    fn register(&mut self, service: ServiceKey, constructor: Constructor);

    /// Register an already constructed instance.
    fn register_instance(&mut self, service: ServiceKey, instance: Shared);

    /// Register the result of `factory`. The factory runs immediately and its result is cached.
    fn register_lazy(&mut self, service: ServiceKey, factory: Box<dyn FnOnce() -> Shared + '_>);

    /// Freeze the registrations into a resolver.
    fn build(self: Box<Self>) -> Arc<dyn TypeResolver>;
}

/// Resolution side of the bridge.
pub trait TypeResolver: Send + Sync {
    /// `Ok(None)` when `service` is `None` or nothing is registered for it.
    fn resolve(&self, service: Option<&ServiceKey>) -> Result<Option<Shared>, InfraError>;
}

/// Typed convenience on top of [`TypeResolver`].
pub trait ResolverExt {
    fn resolve_typed<T: Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>, InfraError>;

    /// Like [`resolve_typed`](Self::resolve_typed) but a missing registration is an error.
    fn require<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, InfraError>;
}

impl<R: TypeResolver + ?Sized> ResolverExt for R {
    fn resolve_typed<T: Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>, InfraError> {
        let key = ServiceKey::of::<T>();
        match self.resolve(Some(&key))? {
            None => Ok(None),
            Some(shared) => shared
                .downcast::<T>()
                .map(Some)
                .map_err(|_| InfraError::TypeMismatch {
                    service: key.name(),
                }),
        }
    }

    fn require<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, InfraError> {
        self.resolve_typed::<T>()?
            .ok_or(InfraError::Unresolved {
                service: std::any::type_name::<T>(),
            })
    }
}
