use super::command::{Command, CommandContext};
use super::registrar::{TypeRegistrar, TypeResolver};
use crate::errors::AppError;
use crate::infrastructure::container::{downcast_instance, instance_of, Activator, Injectable, Instance, ServiceType};
use clap::ArgMatches;
use log::debug;
use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

/// Application-wide settings collected by the [`Configurator`]. Registered
/// as an instance so commands can resolve them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppSettings {
    pub application_name: Option<String>,
    pub application_version: Option<String>,
    /// Return command failures to the caller instead of printing them and
    /// exiting with `-1`.
    pub propagate_errors: bool,
}

struct CommandRegistration {
    name: &'static str,
    aliases: Vec<&'static str>,
    description: Option<&'static str>,
    service: ServiceType,
    activator: Activator,
    arguments: fn(clap::Command) -> clap::Command,
    as_command: fn(&Instance) -> Option<Arc<dyn Command>>,
}

impl CommandRegistration {
    fn of<C: Command + Injectable>(name: &'static str) -> Self {
        Self {
            name,
            aliases: Vec::new(),
            description: None,
            service: ServiceType::of::<C>(),
            activator: Activator::of::<C, C>(),
            arguments: C::arguments,
            as_command: as_command::<C>,
        }
    }

    fn definition(&self) -> clap::Command {
        let mut command = clap::Command::new(self.name).visible_aliases(self.aliases.iter().copied());
        if let Some(description) = self.description {
            command = command.about(description);
        }
        (self.arguments)(command)
    }
}

fn as_command<C: Command>(instance: &Instance) -> Option<Arc<dyn Command>> {
    downcast_instance::<C>(instance).map(|command| command as Arc<dyn Command>)
}

#[derive(Default)]
pub struct Configurator {
    settings: AppSettings,
    commands: Vec<CommandRegistration>,
}

impl Configurator {
    /// Program name shown in help and usage output.
    pub fn set_application_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.settings.application_name = Some(name.into());
        self
    }

    pub fn set_application_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.settings.application_version = Some(version.into());
        self
    }

    /// Return command failures from `run_async` instead of exit code `-1`.
    pub fn propagate_errors(&mut self, enabled: bool) -> &mut Self {
        self.settings.propagate_errors = enabled;
        self
    }

    /// Add a command. Adding another command under the same name replaces it.
    pub fn add_command<C: Command + Injectable>(&mut self, name: &'static str) -> CommandConfigurator<'_> {
        self.commands.retain(|registered| registered.name != name);
        self.commands.push(CommandRegistration::of::<C>(name));
        let index = self.commands.len() - 1;
        CommandConfigurator {
            registration: &mut self.commands[index],
        }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }
}

pub struct CommandConfigurator<'a> {
    registration: &'a mut CommandRegistration,
}

impl CommandConfigurator<'_> {
    /// Extra name the command also answers to.
    pub fn with_alias(self, alias: &'static str) -> Self {
        self.registration.aliases.push(alias);
        self
    }

    pub fn with_description(self, description: &'static str) -> Self {
        self.registration.description = Some(description);
        self
    }
}

/// Command-line application whose commands are constructed by a service
/// container reached through a [`TypeRegistrar`].
///
/// Each run registers the configured commands, builds the registrar once,
/// resolves and executes the selected command, then disposes the resolver.
pub struct CommandApp {
    registrar: Box<dyn TypeRegistrar>,
    configurator: Configurator,
}

impl CommandApp {
    /// Create an app that registers its commands through `registrar`.
    pub fn new(registrar: Box<dyn TypeRegistrar>) -> Self {
        Self {
            registrar,
            configurator: Configurator::default(),
        }
    }

    pub fn configure<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut Configurator),
    {
        configure(&mut self.configurator);
        self
    }

    pub fn settings(&self) -> &AppSettings {
        self.configurator.settings()
    }

    /// Parse `args` (without the program name) and run the selected command.
    ///
    /// Help and version requests exit with `0`, malformed arguments with
    /// clap's usage code.
    pub async fn run_async<I, T>(&mut self, args: I) -> Result<i32, AppError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let name = self.application_name();
        let mut cli = self.build_cli(&name);
        let argv = std::iter::once(OsString::from(&name)).chain(args.into_iter().map(Into::into));

        let matches = match cli.try_get_matches_from_mut(argv) {
            Ok(matches) => matches,
            Err(e) => {
                let code = e.exit_code();
                e.print()?;
                return Ok(code);
            }
        };

        let Some((command_name, command_matches)) = matches.subcommand() else {
            cli.print_help()?;
            return Ok(0);
        };
        let Some(registration) = self
            .configurator
            .commands
            .iter()
            .find(|registration| registration.name == command_name)
        else {
            return Err(AppError::CommandUnavailable(command_name.to_string()));
        };

        for command in &self.configurator.commands {
            self.registrar.register(command.service, command.activator.clone())?;
        }
        let settings = instance_of(Arc::new(self.configurator.settings.clone()));
        self.registrar
            .register_instance(ServiceType::of::<AppSettings>(), Some(settings))?;

        let resolver = self.registrar.build()?;
        debug!("Running command '{}'", command_name);
        let outcome = self.execute(registration, command_matches, resolver.as_ref()).await;
        resolver.dispose();

        outcome
    }

    async fn execute(
        &self,
        registration: &CommandRegistration,
        matches: &ArgMatches,
        resolver: &dyn TypeResolver,
    ) -> Result<i32, AppError> {
        let command = resolver
            .resolve(Some(&registration.service))
            .and_then(|instance| (registration.as_command)(&instance))
            .ok_or_else(|| AppError::CommandUnavailable(registration.name.to_string()))?;

        let context = CommandContext::new(registration.name, matches, resolver);
        match command.execute(&context).await {
            Ok(code) => {
                debug!("Command '{}' finished with exit code {}", registration.name, code);
                Ok(code)
            }
            Err(e) if self.configurator.settings.propagate_errors => Err(AppError::Command(e)),
            Err(e) => {
                debug!("Command '{}' failed: {:?}", registration.name, e);
                eprintln!("Error: {:#}", e);
                Ok(-1)
            }
        }
    }

    fn application_name(&self) -> String {
        if let Some(name) = &self.configurator.settings.application_name {
            return name.clone();
        }
        std::env::args_os()
            .next()
            .and_then(|program| {
                Path::new(&program)
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "app".to_string())
    }

    fn build_cli(&self, name: &str) -> clap::Command {
        let mut cli = clap::Command::new(name.to_string());
        if let Some(version) = &self.configurator.settings.application_version {
            cli = cli.version(version.clone());
        }
        for registration in &self.configurator.commands {
            cli = cli.subcommand(registration.definition());
        }
        cli
    }
}
