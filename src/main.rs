use flux::config::ConfigLoader;
use flux::{logging, AppError, CommandApp, ServiceCollection, ServiceRegistrar, APP_NAME, APP_VERSION};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ConfigLoader::new().load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", APP_NAME, e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logging::init_logger(&config.logging) {
        eprintln!("{}: {}", APP_NAME, e);
        return ExitCode::FAILURE;
    }

    let propagate_errors = config.app.propagate_errors;
    let mut services = ServiceCollection::new();
    services.add_instance(Arc::new(config));

    let registrar = ServiceRegistrar::new(services);
    let mut app = CommandApp::new(Box::new(registrar));
    app.configure(|config| {
        config
            .set_application_name(APP_NAME)
            .set_application_version(APP_VERSION)
            .propagate_errors(propagate_errors);
    });

    let outcome = app.run_async(std::env::args_os().skip(1)).await;
    ExitCode::from(exit_status(outcome))
}

/// Map the run outcome to a process status, printing a failure once.
///
/// Statuses are truncated to a byte, so `-1` becomes `255`.
fn exit_status(outcome: Result<i32, AppError>) -> u8 {
    match outcome {
        Ok(code) => code as u8,
        Err(e) => {
            eprintln!("{}: {:#}", APP_NAME, e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flux::errors::ContainerError;

    #[test]
    fn command_codes_are_truncated_to_a_byte() {
        assert_eq!(exit_status(Ok(0)), 0);
        assert_eq!(exit_status(Ok(3)), 3);
        assert_eq!(exit_status(Ok(-1)), 255);
    }

    #[test]
    fn app_errors_exit_with_failure() {
        assert_eq!(exit_status(Err(AppError::Container(ContainerError::AlreadyBuilt))), 1);
        assert_eq!(exit_status(Err(AppError::CommandUnavailable("greet".into()))), 1);
    }
}
