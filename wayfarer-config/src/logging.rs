//! Tracing subscriber setup shared by the binaries.

use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, fmt, fmt::MakeWriter, layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::models::LoggingSettings;

/// Filter used when neither `RUST_LOG` nor the settings file says otherwise.
pub const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber. `RUST_LOG` wins over `logging.filter`,
/// which wins over [`DEFAULT_FILTER`].
pub fn init_tracing(settings: &LoggingSettings) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(
            settings.filter.as_deref().unwrap_or(DEFAULT_FILTER),
        )?,
    };

    fmt_subscriber(filter, settings.ansi.unwrap_or(true), std::io::stderr)
        .try_init()?;
    Ok(())
}

/// Subscriber for the window before settings are loaded, when
/// `logging.filter` is not known yet. Honours `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`]. Meant for [`tracing::subscriber::with_default`].
pub fn bootstrap_subscriber() -> impl Subscriber + Send + Sync + 'static {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    fmt_subscriber(filter, true, std::io::stderr)
}

fn fmt_subscriber<W>(
    filter: EnvFilter,
    ansi: bool,
    writer: W,
) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(ansi).with_writer(writer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{EnvSettings, SettingsLoader};
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn loader_events_reach_a_scoped_subscriber() {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = fmt_subscriber(
            EnvFilter::new("wayfarer::config=debug"),
            false,
            move || sink.clone(),
        );
        let root = tempfile::tempdir().unwrap();

        let load = tracing::subscriber::with_default(subscriber, || {
            SettingsLoader::new()
                .with_search_root(root.path())
                .with_autoplay_override("off")
                .load_with_env(EnvSettings::default())
        })
        .unwrap();
        assert_eq!(load.settings.carousels.len(), 6);

        let output =
            String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("overriding autoplay for all carousels"));
        assert!(output.contains("carousel settings loaded"));
    }
}
