//! A [`RenderSink`] that writes one JSON object per line.
//!
//! Every line carries a `kind` tag:
//!
//! | `kind` | Emitted when |
//! |--------|--------------|
//! | `face` | a clock face is recomputed |
//! | `layout` | the entry list or visible set changes |
//! | `theme` | a palette is applied (with its CSS variables) |
//! | `offset` | the preview offset changes |
//! | `outcome` | a UI event was handled |
//! | `rejected` | a UI event could not be parsed or was refused |

use std::io::Write;

use serde::Serialize;
use tracing::warn;
use worldclock_core::app::EventOutcome;
use worldclock_core::sink::RenderSink;
use worldclock_core::ticker::GlobalOffset;
use worldclock_types::{ClockFace, EntryId, ThemePalette, TimezoneEntry};

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Line<'a> {
    Face(&'a ClockFace),
    Layout {
        entries: &'a [TimezoneEntry],
        visible: &'a [EntryId],
    },
    Theme {
        name: &'a str,
        css: Vec<(&'static str, String)>,
    },
    Offset {
        hours: i32,
        description: String,
    },
    Outcome(&'a EventOutcome),
    Rejected {
        error: String,
    },
}

/// Writes render output as JSON lines to `W`.
#[derive(Debug)]
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl<W: Write> ConsoleSink<W> {
    /// Write to `out`.
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Report the result of a handled event.
    pub fn outcome(&mut self, outcome: &EventOutcome) {
        self.emit(&Line::Outcome(outcome));
    }

    /// Report an event that could not be applied.
    pub fn rejected(&mut self, error: &str) {
        self.emit(&Line::Rejected {
            error: error.to_owned(),
        });
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &Line<'_>) {
        let written = serde_json::to_writer(&mut self.out, line)
            .map_err(std::io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"))
            .and_then(|()| self.out.flush());
        if let Err(e) = written {
            warn!(error = %e, "failed to write render output");
        }
    }
}

impl<W: Write> RenderSink for ConsoleSink<W> {
    fn render_face(&mut self, face: &ClockFace) {
        self.emit(&Line::Face(face));
    }

    fn layout_changed(&mut self, entries: &[TimezoneEntry], visible: &[EntryId]) {
        self.emit(&Line::Layout { entries, visible });
    }

    fn theme_changed(&mut self, palette: &ThemePalette) {
        self.emit(&Line::Theme {
            name: &palette.name,
            css: palette.css_variables(),
        });
    }

    fn offset_changed(&mut self, offset: GlobalOffset) {
        self.emit(&Line::Offset {
            hours: offset.hours(),
            description: offset.describe(),
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use worldclock_types::{LocalDate, LocalTime};

    use super::*;

    fn lines(sink: ConsoleSink<Vec<u8>>) -> Vec<serde_json::Value> {
        let raw = String::from_utf8(sink.into_inner()).unwrap();
        raw.lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn face_lines_are_tagged() {
        let mut sink = ConsoleSink::new(Vec::new());
        let date = LocalDate::new(2024, 7, 16, 1).unwrap();
        let time = LocalTime::new(13, 5, 10).unwrap();
        let face = ClockFace::new(EntryId::from("tokyo"), date, time, "GMT+9".to_owned());
        sink.render_face(&face);

        let out = lines(sink);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["kind"], "face");
        assert_eq!(out[0]["entryId"], "tokyo");
        assert_eq!(out[0]["digitalString"], "01:05:10");
        assert_eq!(out[0]["formattedDate"], "Tuesday, July 16, 2024");
    }

    #[test]
    fn offset_and_rejection_lines() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.offset_changed(GlobalOffset::new(-2));
        sink.rejected("bad event");

        let out = lines(sink);
        assert_eq!(out[0]["kind"], "offset");
        assert_eq!(out[0]["description"], "-2 hours");
        assert_eq!(out[1]["kind"], "rejected");
        assert_eq!(out[1]["error"], "bad event");
    }

    #[test]
    fn outcome_lines_embed_the_outcome_tag() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.outcome(&EventOutcome::ThemeSaved { index: 2 });

        let out = lines(sink);
        assert_eq!(out[0]["kind"], "outcome");
        assert_eq!(out[0]["outcome"], "theme_saved");
        assert_eq!(out[0]["index"], 2);
    }
}
