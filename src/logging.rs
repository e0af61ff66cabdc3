use slog::{o, Drain, Logger};
use slog_async::Async;
use slog_term::{FullFormat, TermDecorator};

/// Configuration for setting up the component logger
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    async_buffer_size: usize,
    use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            async_buffer_size: 1024,
            use_color: true,
        }
    }
}

/// Sets up the slog root logger handed to the service container; every
/// service derives a child logger tagged with its component name.
pub fn setup_logger(config: LoggerConfig) -> Logger {
    let decorator = {
        let builder = TermDecorator::new();
        let builder = if config.use_color {
            builder.force_color()
        } else {
            builder
        };
        builder.build()
    };

    let drain = FullFormat::new(decorator).build().fuse();

    let drain = Async::new(drain)
        .chan_size(config.async_buffer_size)
        .build()
        .fuse();

    Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

/// A logger that discards everything, for tests and default containers.
pub fn discard_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}
