//! JSON lines transport between the worker and its host.
//!
//! Every line on stdin is one `WorkerMessage`; every line on stdout is one
//! `WorkerEvent`.

use std::io::{self, Write};

use log::error;

use sortie_core::commands::WorkerMessage;
use sortie_core::events::WorkerEvent;

/// Parse one input line. Blank lines yield `None`.
pub fn parse_message(line: &str) -> Result<Option<WorkerMessage>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| format!("invalid message: {e}"))
}

/// Write one event as a single JSON line and flush.
pub fn write_event<W: Write>(out: &mut W, event: &WorkerEvent) -> io::Result<()> {
    serde_json::to_writer(&mut *out, event)?;
    out.write_all(b"\n")?;
    out.flush()
}

/// Write an event, logging a failed write instead of returning it.
pub fn emit<W: Write>(out: &mut W, event: &WorkerEvent) -> bool {
    match write_event(out, event) {
        Ok(()) => true,
        Err(e) => {
            error!("failed to write event: {e}");
            false
        }
    }
}
