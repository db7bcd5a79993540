//! Extension point through which the command application talks to a
//! service container without knowing which one it is.

use crate::errors::{ContainerError, RegistrationError};
use crate::infrastructure::container::{downcast_instance, Activator, Factory, Instance, ServiceType};
use std::sync::Arc;

/// Collects bindings while the application discovers its commands.
pub trait TypeRegistrar: Send {
    /// Bind `service` to an implementation type, created once on first use.
    fn register(&mut self, service: ServiceType, implementation: Activator) -> Result<(), RegistrationError>;

    /// Bind `service` to a fixed instance. Fails if `implementation` is absent.
    fn register_instance(
        &mut self,
        service: ServiceType,
        implementation: Option<Instance>,
    ) -> Result<(), RegistrationError>;

    /// Bind `service` to a factory invoked once on first use. Fails if
    /// `factory` is absent.
    fn register_lazy(&mut self, service: ServiceType, factory: Option<Factory>) -> Result<(), RegistrationError>;

    /// Finalize the bindings. Only the first call succeeds.
    fn build(&mut self) -> Result<Box<dyn TypeResolver>, ContainerError>;
}

/// Answers type-keyed lookups against a finalized container.
pub trait TypeResolver: Send + Sync {
    /// Absent when `service` is absent or nothing can be produced for it.
    fn resolve(&self, service: Option<&ServiceType>) -> Option<Instance>;

    /// Release the container and everything it created. Calling it again
    /// does nothing.
    fn dispose(&self);
}

impl<'a> dyn TypeResolver + 'a {
    /// Typed lookup; absent when unregistered or of another type.
    pub fn get<S: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<S>> {
        let instance = self.resolve(Some(&ServiceType::of::<S>()))?;
        downcast_instance::<S>(&instance)
    }
}

impl<'a> dyn TypeRegistrar + 'a {
    pub fn register_type<S, I>(&mut self) -> Result<(), RegistrationError>
    where
        S: ?Sized + Send + Sync + 'static,
        I: crate::infrastructure::container::Injectable + crate::infrastructure::container::Implements<S>,
    {
        self.register(ServiceType::of::<S>(), Activator::of::<S, I>())
    }
}
