use crate::charset::CharSelection;
use crate::matcher::Metrics;
use crate::{GlyphError, Result};

/// Glyph cell size of the bundled font sheet.
pub const FONT_WIDTH: u32 = 8;
pub const FONT_HEIGHT: u32 = 16;

pub const DEFAULT_WIDTH: u32 = 56;

/// Configuration for one conversion run
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub width: u32,                 // characters per row, default 56
    pub invert_font: bool,          // black glyphs on white
    pub shape_distance: bool,       // per-pixel term, default true
    pub brightness_distance: bool,  // average brightness term, default true
    pub normalize: bool,            // rescale image into glyph brightness range
    pub selection: CharSelection,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            invert_font: false,
            shape_distance: true,
            brightness_distance: true,
            normalize: true,
            selection: CharSelection::default(),
        }
    }
}

impl ConvertConfig {
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_invert_font(mut self, invert: bool) -> Self {
        self.invert_font = invert;
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.shape_distance = metrics.shape;
        self.brightness_distance = metrics.brightness;
        self
    }

    pub fn with_normalize(mut self, enabled: bool) -> Self {
        self.normalize = enabled;
        self
    }

    pub fn with_selection(mut self, selection: CharSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn metrics(&self) -> Metrics {
        Metrics { shape: self.shape_distance, brightness: self.brightness_distance }
    }

    /// Validates the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 {
            return Err(GlyphError::InvalidArgument("width must be at least 1 character".into()));
        }
        if !(0..=255).any(|code| self.selection.selects(code)) {
            return Err(GlyphError::NoEligibleGlyphs);
        }
        Ok(())
    }
}
