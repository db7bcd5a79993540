pub mod app;
pub mod command;
pub mod registrar;

pub use app::{AppSettings, CommandApp, CommandConfigurator, Configurator};
pub use command::{Command, CommandContext};
pub use registrar::{TypeRegistrar, TypeResolver};
