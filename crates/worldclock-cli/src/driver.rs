//! The single-task event loop.
//!
//! One `select!` multiplexes the tick trigger, UI events read as JSON lines
//! from an input stream, and Ctrl-C. Each branch runs to completion before
//! the next is polled, so the app is never touched concurrently.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};
use worldclock_core::app::{ClockApp, UiEvent};

use crate::console_sink::ConsoleSink;
use crate::error::CliError;

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The input stream reached end of file.
    InputClosed,
    /// Ctrl-C was received.
    Interrupted,
}

/// Run the app until input ends or Ctrl-C, then tear it down.
///
/// # Errors
///
/// Returns [`CliError`] if reading input or installing the interrupt
/// handler fails. The app is torn down in every case.
pub async fn run<R, W>(
    app: &mut ClockApp<ConsoleSink<W>>,
    input: R,
) -> Result<StopReason, CliError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    app.start();
    let result = drive(app, input).await;
    app.teardown();
    result
}

async fn drive<R, W>(app: &mut ClockApp<ConsoleSink<W>>, input: R) -> Result<StopReason, CliError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        tokio::select! {
            () = app.wait_for_tick() => {
                app.run_pass();
            }
            line = lines.next_line() => {
                match line.map_err(|source| CliError::Input { source })? {
                    Some(line) => handle_line(app, &line),
                    None => {
                        info!("input closed");
                        return Ok(StopReason::InputClosed);
                    }
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(|source| CliError::Signal { source })?;
                info!("interrupt received");
                return Ok(StopReason::Interrupted);
            }
        }
    }
}

/// Parse and apply one input line. Blank lines are ignored.
pub fn handle_line<W: Write>(app: &mut ClockApp<ConsoleSink<W>>, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    let event: UiEvent = match serde_json::from_str(line) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "ignoring malformed event");
            app.sink_mut().rejected(&format!("malformed event: {e}"));
            return;
        }
    };
    debug!(?event, "handling event");
    match app.handle(event) {
        Ok(outcome) => app.sink_mut().outcome(&outcome),
        Err(e) => {
            warn!(error = %e, "event rejected");
            app.sink_mut().rejected(&e.to_string());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{TimeZone, Utc};
    use worldclock_core::clock::FixedClock;
    use worldclock_core::config::AppConfig;
    use worldclock_store::{MemoryStore, PersistenceGateway};

    use super::*;

    fn app() -> ClockApp<ConsoleSink<Vec<u8>>> {
        let gateway = PersistenceGateway::new(Box::new(MemoryStore::new()), "test");
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        ClockApp::init(
            &AppConfig::default(),
            gateway,
            Box::new(clock),
            ConsoleSink::new(Vec::new()),
        )
        .unwrap()
    }

    #[test]
    fn malformed_and_rejected_events_do_not_change_state() {
        let mut app = app();
        handle_line(&mut app, "{not json");
        handle_line(&mut app, r#"{"type": "remove_timezone", "id": "custom-1"}"#);
        handle_line(&mut app, "   ");
        assert_eq!(app.registry().len(), 9);
    }

    #[test]
    fn add_event_is_applied() {
        let mut app = app();
        handle_line(
            &mut app,
            concat!(
                r#"{"type": "add_timezone", "city": "Oslo", "country": "Norway", "#,
                r#""zone_name": "Europe/Oslo"}"#
            ),
        );
        assert_eq!(app.registry().len(), 10);
        assert_eq!(app.visibility().len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_at_end_of_input_and_tears_down() {
        let mut app = app();
        let input: &[u8] = concat!(
            "{\"type\": \"deselect_all\"}\n",
            "{\"type\": \"shift_offset\", \"delta\": 1}\n",
        )
        .as_bytes();
        let reason = run(&mut app, input).await.unwrap();
        assert_eq!(reason, StopReason::InputClosed);
        assert!(!app.is_running());
        assert!(app.visibility().is_empty());
        assert_eq!(app.offset().hours(), 1);
    }
}
