//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use super::utils::{format_timestamp, strip_ansi};

/// Target used for handler start lines.
pub(super) const STAGE_TARGET: &str = "hostprep::stage";

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// Render one record without colour: `[timestamp] [LEVEL] message`.
fn plain_line(level: tracing::Level, target: &str, msg: &str) -> String {
    let ts = format_timestamp();
    let marker = if target == STAGE_TARGET { "==> " } else { "" };
    format!("[{ts}] [{level}] {marker}{msg}")
}

/// A [`tracing_subscriber::Layer`] that appends every event to the
/// persistent log file with ANSI codes stripped.
///
/// Always captures `DEBUG` and above regardless of console verbosity.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open `path` for appending, creating it (and its parent directory) if
    /// needed.
    pub(super) fn open(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let line = plain_line(
            *metadata.level(),
            metadata.target(),
            &strip_ansi(&extractor.message),
        );

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] that emits colorized
/// `[timestamp] [LEVEL] message` console lines.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let level = *metadata.level();

        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = &extractor.message;
        let ts = format_timestamp();

        match level {
            tracing::Level::ERROR => writeln!(writer, "[{ts}] [\x1b[31mERROR\x1b[0m] {msg}"),
            tracing::Level::WARN => writeln!(writer, "[{ts}] [\x1b[33mWARN\x1b[0m] {msg}"),
            tracing::Level::INFO if metadata.target() == STAGE_TARGET => {
                writeln!(writer, "[{ts}] [\x1b[32mINFO\x1b[0m] \x1b[1m==> {msg}\x1b[0m")
            }
            tracing::Level::INFO => writeln!(writer, "[{ts}] [\x1b[32mINFO\x1b[0m] {msg}"),
            _ => writeln!(writer, "[{ts}] [\x1b[2mDEBUG\x1b[0m] \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// The console layer is always installed: ERROR goes to stderr, everything
/// else to stdout, DEBUG only when `verbose`. When `log_file` is given an
/// append-only file layer receives every record including DEBUG.
/// Must be called once at program startup, before any logging.
///
/// # Errors
///
/// Returns the I/O error if `log_file` cannot be opened; the console layer
/// is still installed and persistent logging is disabled for the run.
pub fn init_subscriber(verbose: bool, log_file: Option<&Path>) -> std::io::Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(std::io::stdout.with_min_level(tracing::Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let (file_layer, open_error) = match log_file.map(FileLayer::open).transpose() {
        Ok(layer) => (layer.map(|l| l.with_filter(LevelFilter::DEBUG)), None),
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    open_error.map_or(Ok(()), Err)
}
