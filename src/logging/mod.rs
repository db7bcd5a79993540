use crate::config::LoggingSection;
use crate::errors::ConfigError;
use std::io::Write;

fn level_style(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "\x1b[31m",
        log::Level::Warn => "\x1b[33m",
        log::Level::Info => "\x1b[32m",
        log::Level::Debug => "\x1b[36m",
        log::Level::Trace => "\x1b[90m",
    }
}

const RESET: &str = "\x1b[0m";

/// Install the global logger. `RUST_LOG` directives refine the configured
/// level. A logger that is already installed is left in place.
pub fn init_logger(config: &LoggingSection) -> Result<(), ConfigError> {
    let level = config.level_filter()?;
    let timestamps = config.timestamps;

    let result = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(move |buf, record| {
            let style = level_style(record.level());
            if timestamps {
                writeln!(
                    buf,
                    "{}{} [{}]{} {}",
                    style,
                    chrono::Local::now().format("%H:%M:%S"),
                    record.level(),
                    RESET,
                    record.args()
                )
            } else {
                writeln!(buf, "{}[{}]{} {}", style, record.level(), RESET, record.args())
            }
        })
        .try_init();

    if result.is_err() {
        log::debug!("Logger already initialized");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_level_has_a_style() {
        for level in [
            log::Level::Error,
            log::Level::Warn,
            log::Level::Info,
            log::Level::Debug,
            log::Level::Trace,
        ] {
            assert!(level_style(level).starts_with("\x1b["));
        }
    }

    #[test]
    fn init_rejects_unknown_levels() {
        let config = LoggingSection {
            level: "verbose".to_string(),
            timestamps: true,
        };
        assert!(init_logger(&config).is_err());
    }

    #[test]
    fn init_is_safe_to_repeat() {
        let config = LoggingSection::default();
        assert!(init_logger(&config).is_ok());
        assert!(init_logger(&config).is_ok());
    }
}
