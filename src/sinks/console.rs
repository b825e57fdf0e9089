//! Standard stream sinks

use crate::core::{LineFormat, Result, Sink};
use std::io::Write;

macro_rules! console_sink {
    ($(#[$doc:meta])* $sink:ident, $stream:expr, $name:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default)]
        pub struct $sink {
            format: LineFormat,
            app_name: Option<String>,
        }

        impl $sink {
            pub fn new() -> Self {
                Self::default()
            }

            #[must_use]
            pub fn with_format(mut self, format: LineFormat) -> Self {
                self.format = format;
                self
            }

            /// Application name shown as `[name]: ` in front of each line
            #[must_use]
            pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
                self.app_name = Some(name.into());
                self
            }
        }

        impl Sink for $sink {
            fn send(&mut self, text: &str) -> Result<()> {
                let line = self.format.format(self.app_name.as_deref(), text);
                let mut out = ($stream)().lock();
                writeln!(out, "{}", line)?;
                Ok(())
            }

            fn flush(&mut self) -> Result<()> {
                ($stream)().flush()?;
                Ok(())
            }

            fn name(&self) -> &str {
                $name
            }
        }
    };
}

console_sink!(
    /// Writes each line to standard output
    StdoutSink,
    std::io::stdout,
    "stdout"
);

console_sink!(
    /// Writes each line to standard error
    StderrSink,
    std::io::stderr,
    "stderr"
);
