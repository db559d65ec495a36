use tracing::{subscriber, Level, Subscriber};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::FmtSubscriber;

fn level(verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Builds the log subscriber writing to `writer`.
///
/// Verbose mode lowers the level to debug and adds file and line numbers.
pub fn make_subscriber<W>(verbose: bool, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let level = level(verbose);

    let mut builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer.with_max_level(level))
        .without_time();

    if verbose {
        builder = builder.with_file(true).with_line_number(true);
    }

    builder.finish()
}

/// Installs the subscriber for the whole process, logging to stderr.
pub fn init(verbose: bool) -> Result<(), subscriber::SetGlobalDefaultError> {
    subscriber::set_global_default(make_subscriber(verbose, std::io::stderr))
}

#[cfg(test)]
pub mod capture {
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    /// In-memory log sink for asserting on log lines.
    #[derive(Clone, Debug, Default)]
    pub struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::capture::Capture;
    use super::*;
    use tracing::{debug, info};

    #[test]
    fn test_standard_format() {
        let sink = Capture::default();

        subscriber::with_default(make_subscriber(false, sink.clone()), || {
            info!("copied gradle-6.1-bin.zip");
            debug!("hidden");
        });

        let logs = sink.contents();

        assert!(logs.contains("INFO"));
        assert!(logs.contains("retrobuild::logging::tests"));
        assert!(logs.contains("copied gradle-6.1-bin.zip"));
        assert!(!logs.contains("hidden"));
        assert!(!logs.contains("logging.rs"));
    }

    #[test]
    fn test_verbose_format() {
        let sink = Capture::default();

        subscriber::with_default(make_subscriber(true, sink.clone()), || {
            debug!("shown");
        });

        let logs = sink.contents();

        assert!(logs.contains("DEBUG"));
        assert!(logs.contains("shown"));
        assert!(logs.contains("src/logging.rs:"));
    }
}
