//! Line-oriented input reader.
//!
//! Reads complete lines on a dedicated OS thread (reading a terminal is
//! blocking I/O) and forwards them to the session loop. When the source
//! fails or reaches end of input, a synthetic `/exit` is forwarded so the
//! session always gets a way out.

use redchat_cache::EVENT_CHANNEL_CAPACITY;
use std::io::{BufRead, ErrorKind};
use tokio::sync::mpsc;

/// Line that ends the session
pub const EXIT_LINE: &str = "/exit";

/// Input reader over any buffered source
pub struct InputReader<R> {
    source: R,
    interrupt_exits: bool,
}

impl InputReader<std::io::BufReader<std::io::Stdin>> {
    /// Reader over the process's standard input
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(std::io::BufReader::new(std::io::stdin()))
    }
}

impl<R> InputReader<R>
where
    R: BufRead + Send + 'static,
{
    #[must_use]
    pub fn new(source: R) -> Self {
        Self {
            source,
            interrupt_exits: false,
        }
    }

    /// Also forward `/exit` when the process receives Ctrl-C
    ///
    /// Must be spawned from inside a Tokio runtime.
    #[must_use]
    pub fn exit_on_interrupt(mut self) -> Self {
        self.interrupt_exits = true;
        self
    }

    /// Start the read loop, returning the stream of lines
    pub fn spawn(self) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        if self.interrupt_exits {
            let tx = tx.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        tracing::debug!("Interrupted");
                        let _ = tx.send(EXIT_LINE.to_string()).await;
                    }
                    Err(e) => tracing::warn!(error = %e, "Failed to install Ctrl-C handler"),
                }
            });
        }

        let source = self.source;
        let spawned = std::thread::Builder::new()
            .name("input-reader".to_string())
            .spawn(move || read_lines(source, &tx));

        // On failure the sender is dropped with the closure and the session
        // sees the input stream close.
        if let Err(e) = spawned {
            tracing::error!(error = %e, "Failed to start input reader");
        }

        rx
    }
}

/// Blocking read loop
fn read_lines<R: BufRead>(mut source: R, tx: &mpsc::Sender<String>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match source.read_until(b'\n', &mut buf) {
            Ok(0) => {
                tracing::debug!("End of input");
                break;
            }
            Ok(_) => {
                let line = decode_line(&buf);
                if tx.blocking_send(line).is_err() {
                    // Session is gone; nobody is left to tell
                    return;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read input");
                break;
            }
        }
    }

    let _ = tx.blocking_send(EXIT_LINE.to_string());
}

/// Strip the line terminator and decode lossily
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
