use crate::cli::registrar::{TypeRegistrar, TypeResolver};
use crate::errors::{ContainerError, RegistrationError};
use crate::infrastructure::container::{Activator, Binding, Factory, Instance, ServiceCollection, ServiceType};
use crate::infrastructure::resolver::ServiceResolver;
use log::debug;

/// Adapts the command application's registrations onto a `ServiceCollection`.
///
/// The collection is owned until `build`, which hands it to a
/// `ServiceResolver`; afterwards every call is rejected.
pub struct ServiceRegistrar {
    services: Option<ServiceCollection>,
}

impl ServiceRegistrar {
    /// Wrap `services`; registrations are forwarded into it until `build`.
    pub fn new(services: ServiceCollection) -> Self {
        Self {
            services: Some(services),
        }
    }

    /// Whether `build` has already handed the collection off.
    pub fn is_built(&self) -> bool {
        self.services.is_none()
    }

    fn services_mut(&mut self) -> Result<&mut ServiceCollection, RegistrationError> {
        self.services.as_mut().ok_or(RegistrationError::Closed)
    }
}

impl TypeRegistrar for ServiceRegistrar {
    fn register(&mut self, service: ServiceType, implementation: Activator) -> Result<(), RegistrationError> {
        self.services_mut()?
            .add(service, Binding::Implementation(implementation));
        Ok(())
    }

    fn register_instance(
        &mut self,
        service: ServiceType,
        implementation: Option<Instance>,
    ) -> Result<(), RegistrationError> {
        let implementation = implementation.ok_or(RegistrationError::InvalidArgument {
            parameter: "implementation",
        })?;
        self.services_mut()?.add(service, Binding::Instance(implementation));
        Ok(())
    }

    fn register_lazy(&mut self, service: ServiceType, factory: Option<Factory>) -> Result<(), RegistrationError> {
        let factory = factory.ok_or(RegistrationError::InvalidArgument { parameter: "factory" })?;
        self.services_mut()?.add(service, Binding::Lazy(factory));
        Ok(())
    }

    fn build(&mut self) -> Result<Box<dyn TypeResolver>, ContainerError> {
        let services = self.services.take().ok_or(ContainerError::AlreadyBuilt)?;
        debug!("Building service resolver from {} bindings", services.len());
        Ok(Box::new(ServiceResolver::new(services.build())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::container::instance_of;
    use std::sync::Arc;

    #[test]
    fn absent_instance_is_rejected_without_registering() {
        let mut registrar = ServiceRegistrar::new(ServiceCollection::new());

        let result = registrar.register_instance(ServiceType::of::<String>(), None);
        assert_eq!(
            result,
            Err(RegistrationError::InvalidArgument { parameter: "implementation" })
        );

        let resolver = registrar.build().unwrap();
        assert!(resolver.resolve(Some(&ServiceType::of::<String>())).is_none());
    }

    #[test]
    fn absent_factory_is_rejected_without_registering() {
        let mut registrar = ServiceRegistrar::new(ServiceCollection::new());

        let result = registrar.register_lazy(ServiceType::of::<String>(), None);
        assert_eq!(result, Err(RegistrationError::InvalidArgument { parameter: "factory" }));

        let resolver = registrar.build().unwrap();
        assert!(resolver.resolve(Some(&ServiceType::of::<String>())).is_none());
    }

    #[test]
    fn build_succeeds_only_once() {
        let mut registrar = ServiceRegistrar::new(ServiceCollection::new());
        assert!(!registrar.is_built());

        let _resolver = registrar.build().unwrap();
        assert!(registrar.is_built());
        assert_eq!(registrar.build().err(), Some(ContainerError::AlreadyBuilt));
    }

    #[test]
    fn registrations_after_build_are_closed() {
        let mut registrar = ServiceRegistrar::new(ServiceCollection::new());
        let _resolver = registrar.build().unwrap();

        let instance = instance_of(Arc::new(5u16));
        assert_eq!(
            registrar.register_instance(ServiceType::of::<u16>(), Some(instance)),
            Err(RegistrationError::Closed)
        );
    }
}
