//! Service container and the adapters that expose it to the command
//! application.

pub mod container;
pub mod registrar;
pub mod resolver;

pub use container::{ServiceCollection, ServiceProvider, ServiceType};
pub use registrar::ServiceRegistrar;
pub use resolver::ServiceResolver;
