use super::collection::Binding;
use super::{downcast_instance, Instance, ServiceType};
use crate::errors::ContainerError;
use dashmap::DashMap;
use log::{debug, warn};
use parking_lot::{Mutex, ReentrantMutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Finalized, queryable container.
///
/// Every service it creates is cached for the provider's lifetime. Cache hits
/// never lock. Misses construct under a single provider-wide reentrant lock,
/// so a factory or activator runs at most once even when resolutions race,
/// and a dependency cycle is always seen by the one thread walking it.
pub struct ServiceProvider {
    bindings: DashMap<ServiceType, Binding>,
    cache: DashMap<ServiceType, Instance>,
    construction: ReentrantMutex<()>,
    /// Creation order of cached services, released in reverse on dispose.
    created: Mutex<Vec<ServiceType>>,
    disposed: AtomicBool,
    stats: InnerStats,
}

#[derive(Default)]
struct InnerStats {
    total_resolutions: AtomicUsize,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
}

impl ServiceProvider {
    pub(crate) fn new(bindings: Vec<(ServiceType, Binding)>) -> Self {
        let recorded = bindings.len();
        let table = DashMap::with_capacity(recorded);
        for (service, binding) in bindings {
            table.insert(service, binding);
        }
        debug!(
            "Built service provider with {} services ({} bindings recorded)",
            table.len(),
            recorded
        );

        Self {
            bindings: table,
            cache: DashMap::new(),
            construction: ReentrantMutex::new(()),
            created: Mutex::new(Vec::new()),
            disposed: AtomicBool::new(false),
            stats: InnerStats::default(),
        }
    }

    /// Resolve `service`, returning `None` when it is unregistered or cannot
    /// be constructed. Failures are logged, never raised.
    pub fn resolve(&self, service: &ServiceType) -> Option<Instance> {
        match self.try_resolve(service) {
            Ok(instance) => instance,
            Err(ContainerError::Disposed) => {
                warn!("Attempted to resolve {} from a disposed service provider", service);
                None
            }
            Err(e) => {
                warn!("Failed to resolve {}: {}", service, e);
                None
            }
        }
    }

    /// Resolve `service`. `Ok(None)` means nothing is registered for it.
    pub fn try_resolve(&self, service: &ServiceType) -> Result<Option<Instance>, ContainerError> {
        self.resolve_in_chain(service, &[])
    }

    pub fn get<S: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<S>> {
        let service = ServiceType::of::<S>();
        let instance = self.resolve(&service)?;
        let typed = downcast_instance::<S>(&instance);
        if typed.is_none() {
            warn!("Instance registered for {} does not provide that type", service);
        }
        typed
    }

    pub fn require<S: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<S>, ContainerError> {
        Resolution::root(self).require::<S>()
    }

    /// Whether a binding exists for `service`, constructed or not.
    pub fn contains(&self, service: &ServiceType) -> bool {
        self.bindings.contains_key(service)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Release every created service in reverse creation order, then every
    /// binding. Subsequent calls do nothing.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            debug!("Service provider already disposed");
            return;
        }

        let _construction = self.construction.lock();
        let created = std::mem::take(&mut *self.created.lock());
        for service in created.iter().rev() {
            if let Some((_, instance)) = self.cache.remove(service) {
                drop(instance);
            }
        }
        self.cache.clear();
        self.bindings.clear();

        debug!("Disposed service provider, released {} services", created.len());
    }

    pub fn stats(&self) -> ContainerStats {
        ContainerStats {
            total_resolutions: self.stats.total_resolutions.load(Ordering::Relaxed),
            cache_hits: self.stats.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.stats.cache_misses.load(Ordering::Relaxed),
        }
    }

    fn resolve_in_chain(
        &self,
        service: &ServiceType,
        chain: &[ServiceType],
    ) -> Result<Option<Instance>, ContainerError> {
        if self.is_disposed() {
            return Err(ContainerError::Disposed);
        }
        self.stats.total_resolutions.fetch_add(1, Ordering::Relaxed);

        // Clone out so no map guard is held while constructing.
        let Some(binding) = self.bindings.get(service).map(|entry| entry.value().clone()) else {
            debug!("No binding registered for {}", service);
            return Ok(None);
        };

        if let Binding::Instance(instance) = &binding {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Some(instance.clone()));
        }

        if chain.contains(service) {
            let mut names: Vec<String> = chain.iter().map(|s| s.name().to_string()).collect();
            names.push(service.name().to_string());
            return Err(ContainerError::CircularDependency { chain: names });
        }

        if let Some(instance) = self.cached(service) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Some(instance));
        }

        // Reentrant: dependencies are constructed by the same thread.
        let _construction = self.construction.lock();
        if let Some(instance) = self.cached(service) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Some(instance));
        }
        if self.is_disposed() {
            return Err(ContainerError::Disposed);
        }
        self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);

        let instance = self.construct(service, binding, chain)?;
        self.cache.insert(*service, instance.clone());
        self.created.lock().push(*service);
        debug!("Created singleton {}", service);

        Ok(Some(instance))
    }

    fn cached(&self, service: &ServiceType) -> Option<Instance> {
        self.cache.get(service).map(|entry| entry.value().clone())
    }

    fn construct(
        &self,
        service: &ServiceType,
        binding: Binding,
        chain: &[ServiceType],
    ) -> Result<Instance, ContainerError> {
        match binding {
            Binding::Instance(instance) => Ok(instance),
            Binding::Lazy(factory) => Ok(factory()),
            Binding::Implementation(activator) => {
                if activator.service() != *service {
                    return Err(ContainerError::IncompatibleImplementation {
                        service: service.name().to_string(),
                        implementation: activator.implementation_name().to_string(),
                    });
                }
                let mut next = chain.to_vec();
                next.push(*service);
                activator.activate(&Resolution {
                    provider: self,
                    chain: next,
                })
            }
        }
    }
}

impl Drop for ServiceProvider {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Dependency lookup handed to [`Injectable::inject`](super::Injectable::inject).
///
/// Carries the chain of services currently under construction so a cycle
/// fails with `ContainerError::CircularDependency`.
pub struct Resolution<'a> {
    provider: &'a ServiceProvider,
    chain: Vec<ServiceType>,
}

impl<'a> Resolution<'a> {
    pub(crate) fn root(provider: &'a ServiceProvider) -> Self {
        Self {
            provider,
            chain: Vec::new(),
        }
    }

    /// The service being constructed, if any.
    pub fn current(&self) -> Option<ServiceType> {
        self.chain.last().copied()
    }

    /// Resolve a dependency that must be registered.
    pub fn require<S: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<S>, ContainerError> {
        let dependency = ServiceType::of::<S>();
        match self.optional::<S>()? {
            Some(service) => Ok(service),
            None => match self.current() {
                Some(current) => Err(ContainerError::MissingDependency {
                    service: current.name().to_string(),
                    dependency: dependency.name().to_string(),
                }),
                None => Err(ContainerError::NotRegistered(dependency.name().to_string())),
            },
        }
    }

    /// Resolve a dependency that may be absent.
    pub fn optional<S: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Arc<S>>, ContainerError> {
        let dependency = ServiceType::of::<S>();
        let Some(instance) = self.provider.resolve_in_chain(&dependency, &self.chain)? else {
            return Ok(None);
        };
        downcast_instance::<S>(&instance)
            .map(Some)
            .ok_or_else(|| ContainerError::IncompatibleImplementation {
                service: dependency.name().to_string(),
                implementation: "<registered instance>".to_string(),
            })
    }
}

/// Resolution counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerStats {
    pub total_resolutions: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

impl ContainerStats {
    pub fn total(&self) -> usize {
        self.total_resolutions
    }

    pub fn hit_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total() as f64
        }
    }
}
