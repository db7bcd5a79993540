use thiserror::Error;

/// Top-level error returned by the command application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),
    #[error("Command '{0}' could not be resolved from the service container")]
    CommandUnavailable(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Failure raised by a command body, forwarded when errors are propagated.
    #[error(transparent)]
    Command(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from file '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Invalid value '{1}' for '{0}'")]
    InvalidValue(String, String),
}

/// Errors raised at the registration boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Invalid argument: '{parameter}' must not be absent")]
    InvalidArgument { parameter: &'static str },
    #[error("The registrar has already been built and accepts no further registrations")]
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    #[error("The service collection has already been built")]
    AlreadyBuilt,
    #[error("The service provider has been disposed")]
    Disposed,
    #[error("Service '{0}' is not registered")]
    NotRegistered(String),
    #[error("Cannot construct '{service}': dependency '{dependency}' is not registered")]
    MissingDependency { service: String, dependency: String },
    #[error("Circular dependency detected: {}", chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },
    #[error("Implementation '{implementation}' does not provide service '{service}'")]
    IncompatibleImplementation {
        service: String,
        implementation: String,
    },
    #[error("Failed to construct '{service}': {reason}")]
    CreationFailed { service: String, reason: String },
}

impl ContainerError {
    /// Construction failure raised from inside an `Injectable` implementation.
    pub fn creation_failed(service: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ContainerError::CreationFailed {
            service: service.into(),
            reason: reason.to_string(),
        }
    }
}
