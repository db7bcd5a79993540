use super::provider::{Resolution, ServiceProvider};
use super::{instance_of, Instance, ServiceType};
use crate::errors::ContainerError;
use log::debug;
use std::fmt;
use std::sync::Arc;

/// A type the container can construct, pulling its own dependencies from
/// the provider that is resolving it.
pub trait Injectable: Sized + Send + Sync + 'static {
    fn inject(resolution: &Resolution<'_>) -> Result<Self, ContainerError>;
}

/// Conversion of a concrete implementation into the contract `S` it is
/// registered under. Every type implements itself; trait contracts are
/// added with [`implements!`](crate::implements).
pub trait Implements<S: ?Sized + Send + Sync + 'static>: Send + Sync + 'static {
    fn upcast(self: Arc<Self>) -> Arc<S>;
}

impl<T: Send + Sync + 'static> Implements<T> for T {
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

type Construct = dyn Fn(&Resolution<'_>) -> Result<Instance, ContainerError> + Send + Sync;

/// Lazily invoked factory; its result is cached by the provider.
pub type Factory = Arc<dyn Fn() -> Instance + Send + Sync>;

/// Runtime handle for an implementation type bound to a service contract.
#[derive(Clone)]
pub struct Activator {
    service: ServiceType,
    implementation: &'static str,
    construct: Arc<Construct>,
}

impl Activator {
    pub fn of<S, I>() -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<S>,
    {
        Self {
            service: ServiceType::of::<S>(),
            implementation: std::any::type_name::<I>(),
            construct: Arc::new(|resolution: &Resolution<'_>| -> Result<Instance, ContainerError> {
                let implementation = Arc::new(I::inject(resolution)?);
                Ok(instance_of::<S>(<I as Implements<S>>::upcast(implementation)))
            }),
        }
    }

    /// The contract this activator produces.
    pub fn service(&self) -> ServiceType {
        self.service
    }

    pub fn implementation_name(&self) -> &'static str {
        self.implementation
    }

    pub(crate) fn activate(&self, resolution: &Resolution<'_>) -> Result<Instance, ContainerError> {
        (self.construct)(resolution)
    }
}

impl fmt::Debug for Activator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activator")
            .field("service", &self.service)
            .field("implementation", &self.implementation)
            .finish()
    }
}

/// Resolution strategy recorded for a service. All strategies are singletons.
#[derive(Clone)]
pub enum Binding {
    /// Construct the implementation type on first resolution.
    Implementation(Activator),
    /// Always hand out this exact instance.
    Instance(Instance),
    /// Invoke the factory on first resolution and cache the result.
    Lazy(Factory),
}

impl Binding {
    pub fn strategy(&self) -> &'static str {
        match self {
            Binding::Implementation(_) => "implementation",
            Binding::Instance(_) => "instance",
            Binding::Lazy(_) => "lazy",
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Implementation(activator) => f.debug_tuple("Implementation").field(activator).finish(),
            Binding::Instance(_) => f.write_str("Instance(..)"),
            Binding::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// Mutable set of bindings. A later binding for the same service replaces
/// an earlier one once the collection is built.
#[derive(Default, Debug)]
pub struct ServiceCollection {
    bindings: Vec<(ServiceType, Binding)>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, service: ServiceType, binding: Binding) -> &mut Self {
        debug!("Registering {} binding for {}", binding.strategy(), service);
        self.bindings.push((service, binding));
        self
    }

    /// Bind `S` to the implementation type `I`.
    pub fn add_singleton<S, I>(&mut self) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<S>,
    {
        self.add(ServiceType::of::<S>(), Binding::Implementation(Activator::of::<S, I>()))
    }

    pub fn add_instance<S>(&mut self, instance: Arc<S>) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.add(ServiceType::of::<S>(), Binding::Instance(instance_of(instance)))
    }

    pub fn add_lazy<S, F>(&mut self, factory: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn() -> Arc<S> + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move || instance_of(factory()));
        self.add(ServiceType::of::<S>(), Binding::Lazy(factory))
    }

    pub fn contains<S: ?Sized + 'static>(&self) -> bool {
        self.contains_service(&ServiceType::of::<S>())
    }

    pub fn contains_service(&self, service: &ServiceType) -> bool {
        self.bindings.iter().any(|(registered, _)| registered == service)
    }

    /// Number of recorded bindings, including overridden ones.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Finalize the bindings into a provider.
    pub fn build(self) -> ServiceProvider {
        ServiceProvider::new(self.bindings)
    }
}
