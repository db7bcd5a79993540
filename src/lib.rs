pub mod cli;
pub mod config;
pub mod errors;
pub mod infrastructure;
pub mod logging;

pub const APP_NAME: &str = "flux";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export commonly used items for convenience
pub use cli::{Command, CommandApp, CommandContext, TypeRegistrar, TypeResolver};
pub use config::FluxConfig;
pub use errors::AppError;
pub use infrastructure::container::{Injectable, Resolution};
pub use infrastructure::{ServiceCollection, ServiceRegistrar, ServiceResolver, ServiceType};
