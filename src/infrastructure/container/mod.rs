//! Type-keyed service container.
//!
//! `ServiceCollection` gathers bindings, `ServiceCollection::build` finalizes
//! them into a `ServiceProvider` that caches every created service as a
//! singleton and releases it again on dispose.

pub mod collection;
pub mod provider;

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub use collection::{Activator, Binding, Factory, Implements, Injectable, ServiceCollection};
pub use provider::{ContainerStats, Resolution, ServiceProvider};

/// Type-erased service handle. The payload is always an `Arc<S>` for the
/// service contract `S` it was registered under.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Runtime token identifying a service contract.
#[derive(Clone, Copy)]
pub struct ServiceType {
    id: TypeId,
    name: &'static str,
}

impl ServiceType {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ServiceType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceType {}

impl Hash for ServiceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceType({})", self.name)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Wrap a typed service into an erased `Instance`.
pub fn instance_of<S: ?Sized + Send + Sync + 'static>(service: Arc<S>) -> Instance {
    Arc::new(service)
}

/// Recover the typed service from an erased `Instance`.
pub fn downcast_instance<S: ?Sized + Send + Sync + 'static>(instance: &Instance) -> Option<Arc<S>> {
    instance.downcast_ref::<Arc<S>>().cloned()
}

/// Implement `Implements<dyn Trait>` for a concrete type so it can be bound
/// to that trait contract.
///
/// ```ignore
/// flux::implements!(ConsoleGreeter => dyn Greeter);
/// ```
#[macro_export]
macro_rules! implements {
    ($implementation:ty => $($service:ty),+ $(,)?) => {
        $(
            impl $crate::infrastructure::container::Implements<$service> for $implementation {
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$service> {
                    self
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named: Send + Sync {
        fn name(&self) -> &str;
    }

    struct Plain;

    impl Named for Plain {
        fn name(&self) -> &str {
            "plain"
        }
    }

    #[test]
    fn service_types_compare_by_type_identity() {
        assert_eq!(ServiceType::of::<String>(), ServiceType::of::<String>());
        assert_ne!(ServiceType::of::<String>(), ServiceType::of::<u32>());
        assert_ne!(ServiceType::of::<dyn Named>(), ServiceType::of::<Plain>());
        assert!(ServiceType::of::<dyn Named>().name().contains("Named"));
    }

    #[test]
    fn instances_round_trip_trait_objects() {
        let service: Arc<dyn Named> = Arc::new(Plain);
        let instance = instance_of::<dyn Named>(service.clone());

        let recovered = downcast_instance::<dyn Named>(&instance).unwrap();
        assert!(Arc::ptr_eq(&service, &recovered));
        assert_eq!(recovered.name(), "plain");
        assert!(downcast_instance::<Plain>(&instance).is_none());
    }
}
