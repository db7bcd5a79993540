use crate::cli::registrar::TypeResolver;
use crate::errors::ContainerError;
use crate::infrastructure::container::{Instance, ServiceProvider, ServiceType};

/// Owns a finalized `ServiceProvider` and answers the command application's
/// lookups against it.
///
/// Dropping the resolver disposes the provider; `dispose` does so early.
/// Once disposed, `resolve` returns `None` and `try_resolve` fails with
/// `ContainerError::Disposed`.
pub struct ServiceResolver {
    provider: ServiceProvider,
}

impl ServiceResolver {
    /// Take ownership of a built provider.
    pub fn new(provider: ServiceProvider) -> Self {
        Self { provider }
    }

    /// Like `resolve`, but reports why nothing could be produced.
    pub fn try_resolve(&self, service: &ServiceType) -> Result<Option<Instance>, ContainerError> {
        self.provider.try_resolve(service)
    }

    /// The wrapped provider, for typed lookups and statistics.
    pub fn provider(&self) -> &ServiceProvider {
        &self.provider
    }

    /// Whether `dispose` has run.
    pub fn is_disposed(&self) -> bool {
        self.provider.is_disposed()
    }
}

impl TypeResolver for ServiceResolver {
    fn resolve(&self, service: Option<&ServiceType>) -> Option<Instance> {
        self.provider.resolve(service?)
    }

    fn dispose(&self) {
        self.provider.dispose();
    }
}
