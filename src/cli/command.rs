use crate::cli::registrar::TypeResolver;
use async_trait::async_trait;
use clap::ArgMatches;
use std::sync::Arc;

/// A command executed by [`CommandApp`](super::CommandApp). Commands are
/// constructed by the service container, so their dependencies arrive
/// through [`Injectable`](crate::infrastructure::container::Injectable).
#[async_trait]
pub trait Command: Send + Sync + 'static {
    /// Add the command's arguments to its clap definition.
    fn arguments(command: clap::Command) -> clap::Command
    where
        Self: Sized,
    {
        command
    }

    /// Run the command and return its exit code.
    async fn execute(&self, context: &CommandContext<'_>) -> anyhow::Result<i32>;
}

/// What a running command can see: its parsed arguments and the resolver.
pub struct CommandContext<'a> {
    name: &'a str,
    matches: &'a ArgMatches,
    resolver: &'a dyn TypeResolver,
}

impl<'a> CommandContext<'a> {
    pub fn new(name: &'a str, matches: &'a ArgMatches, resolver: &'a dyn TypeResolver) -> Self {
        Self {
            name,
            matches,
            resolver,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn matches(&self) -> &ArgMatches {
        self.matches
    }

    pub fn resolver(&self) -> &dyn TypeResolver {
        self.resolver
    }

    /// Shorthand for resolving a service from the running container.
    pub fn get<S: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<S>> {
        self.resolver.get::<S>()
    }
}
