//! Diagnostic output on stderr.
//!
//! Every event is rendered as a single line whose prefix names its level,
//! e.g. `Warning: FFT size must be a power of 2. Using default: 4096`.

use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Diagnostic verbosity selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings and errors only
    #[default]
    Quiet,
    /// `--debug`
    Debug,
    /// `--verbose-debug`
    Trace,
}

impl Verbosity {
    /// Convert verbosity to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Debug => "debug",
            Verbosity::Trace => "trace",
        }
    }
}

/// Event formatter producing `Error:`, `Warning:` or `Debug:` lines.
///
/// Info and trace events share the `Debug:` prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixFormatter;

impl PrefixFormatter {
    fn prefix(level: &Level) -> &'static str {
        match *level {
            Level::ERROR => "Error:",
            Level::WARN => "Warning:",
            _ => "Debug:",
        }
    }
}

impl<S, N> FormatEvent<S, N> for PrefixFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "{} ", Self::prefix(event.metadata().level()))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the stderr subscriber.
///
/// `RUST_LOG` takes precedence over `verbosity` when set. Output is plain
/// text whether or not stderr is a terminal. Installing twice is a no-op.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.as_filter_str()));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(std::io::stderr)
                .event_format(PrefixFormatter),
        )
        .try_init();
}
