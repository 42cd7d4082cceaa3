//! Dependency injection: service container and the registrar/resolver bridge
//! the command dispatcher builds handlers through.

pub mod bridge;
pub mod service_container;

pub use bridge::{Constructor, Injectable, ResolverExt, Shared, TypeRegistrar, TypeResolver};
pub use service_container::{ServiceCollection, ServiceContainer, ServiceKey};
