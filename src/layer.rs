//! Forwarding `tracing` events into a [`Logger`].
//!
//! ```rust,no_run
//! use tracing_subscriber::layer::SubscriberExt;
//!
//! let logger = filelog::builder("/var/log/myapp", "events").build()?;
//! let subscriber = tracing_subscriber::registry().with(filelog::FileLayer::new(logger));
//! tracing::subscriber::set_global_default(subscriber).expect("subscriber already set");
//!
//! tracing::warn!(user = "alice", "login failed for {{user}}");
//! # Ok::<(), filelog::Error>(())
//! ```

use std::cell::Cell;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context as LayerContext;

use crate::{Context, Filesystem, Level, LocalFilesystem, Logger, Value};

/// Name of the field `tracing` stores the formatted message in.
const MESSAGE_FIELD: &str = "message";

thread_local! {
    /// Set while this thread is inside [`FileLayer::on_event`].
    static WRITING: Cell<bool> = const { Cell::new(false) };
}

/// A [`Layer`] that writes every event it sees through a [`Logger`].
///
/// The event's `message` becomes the template and its other fields the
/// context, so `{field}` placeholders are filled from the event. Events
/// emitted while a write is in progress (the logger's own diagnostics) are
/// skipped. Write failures cannot be returned to the emitting call site and
/// are reported on stderr instead.
#[derive(Debug)]
pub struct FileLayer<F: Filesystem = LocalFilesystem> {
    logger: Mutex<Logger<F>>,
}

impl<F: Filesystem> FileLayer<F> {
    /// Wrap a logger.
    pub fn new(logger: Logger<F>) -> Self {
        Self {
            logger: Mutex::new(logger),
        }
    }

    /// Recover the wrapped logger.
    pub fn into_inner(self) -> Logger<F> {
        self.logger
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F: Filesystem> From<Logger<F>> for FileLayer<F> {
    fn from(logger: Logger<F>) -> Self {
        Self::new(logger)
    }
}

impl<S, F> Layer<S> for FileLayer<F>
where
    S: Subscriber,
    F: Filesystem + Send + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
        if WRITING.replace(true) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let level = Level::from(*event.metadata().level());
        let result = self
            .logger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .log(level, &visitor.message, &visitor.context);
        WRITING.set(false);

        if let Err(err) = result {
            eprintln!("filelog: failed to write event: {err}");
        }
    }
}

/// Error recorded on an event, kept as its rendered text.
#[derive(Debug)]
struct RecordedError(String);

impl fmt::Display for RecordedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for RecordedError {}

#[derive(Default)]
struct EventVisitor {
    message: String,
    context: Context,
}

impl EventVisitor {
    fn record_value(&mut self, field: &Field, value: Value) {
        self.context.insert(field.name(), value);
    }
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == MESSAGE_FIELD {
            self.message = value.to_string();
        } else {
            self.record_value(field, value.into());
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, value.into());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.record_value(field, Value::error(RecordedError(value.to_string())));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == MESSAGE_FIELD {
            self.message = format!("{:?}", value);
        } else {
            self.record_value(field, Value::Str(format!("{:?}", value)));
        }
    }
}
