//! The rendering seam.
//!
//! The core never draws anything. It reports layout, theme, offset and
//! per-tick face changes to a [`RenderSink`], which the host implements.

use worldclock_types::{ClockFace, EntryId, ThemePalette, TimezoneEntry};

use crate::ticker::GlobalOffset;

/// Receives every change the rendering layer must reflect.
pub trait RenderSink {
    /// A clock face was recomputed for one entry.
    fn render_face(&mut self, face: &ClockFace);

    /// The entry list or the visible subset changed. `visible` is in
    /// display order.
    fn layout_changed(&mut self, entries: &[TimezoneEntry], visible: &[EntryId]);

    /// A palette was applied.
    fn theme_changed(&mut self, _palette: &ThemePalette) {}

    /// The global preview offset changed.
    fn offset_changed(&mut self, _offset: GlobalOffset) {}
}

/// A sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl RenderSink for NoOpSink {
    fn render_face(&mut self, _face: &ClockFace) {}

    fn layout_changed(&mut self, _entries: &[TimezoneEntry], _visible: &[EntryId]) {}
}

/// A sink that keeps everything it receives, for tests and replay.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Faces in the order they were rendered.
    pub faces: Vec<ClockFace>,
    /// Visible ids reported by each layout change.
    pub layouts: Vec<Vec<EntryId>>,
    /// Names of applied palettes.
    pub themes: Vec<String>,
    /// Offsets reported by each offset change.
    pub offsets: Vec<GlobalOffset>,
}

impl RecordingSink {
    /// Create an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent face rendered for `id`.
    pub fn last_face(&self, id: &EntryId) -> Option<&ClockFace> {
        self.faces.iter().rev().find(|f| &f.entry_id == id)
    }

    /// The most recent visible layout.
    pub fn last_layout(&self) -> Option<&[EntryId]> {
        self.layouts.last().map(Vec::as_slice)
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.faces.clear();
        self.layouts.clear();
        self.themes.clear();
        self.offsets.clear();
    }
}

impl RenderSink for RecordingSink {
    fn render_face(&mut self, face: &ClockFace) {
        self.faces.push(face.clone());
    }

    fn layout_changed(&mut self, _entries: &[TimezoneEntry], visible: &[EntryId]) {
        self.layouts.push(visible.to_vec());
    }

    fn theme_changed(&mut self, palette: &ThemePalette) {
        self.themes.push(palette.name.clone());
    }

    fn offset_changed(&mut self, offset: GlobalOffset) {
        self.offsets.push(offset);
    }
}
