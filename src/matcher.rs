//! Nearest-glyph search combining shape and brightness distances.

use crate::chunk::CellView;
use crate::font::{Glyph, GlyphSet};
use crate::{GlyphError, Result};

/// Which distance terms take part in the combined score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub shape: bool,
    pub brightness: bool,
}

impl Default for Metrics {
    fn default() -> Self {
        Self { shape: true, brightness: true }
    }
}

pub struct GlyphMatcher<'a> {
    glyphs: &'a GlyphSet,
    metrics: Metrics,
}

impl<'a> GlyphMatcher<'a> {
    /// Fails with [`GlyphError::NoEligibleGlyphs`] when there is nothing to match against.
    pub fn new(glyphs: &'a GlyphSet, metrics: Metrics) -> Result<Self> {
        if glyphs.eligible_count() == 0 {
            return Err(GlyphError::NoEligibleGlyphs);
        }
        Ok(Self { glyphs, metrics })
    }

    /// Code of the eligible glyph with the lowest combined score.
    ///
    /// Score is `shape * floor(sqrt(brightness + 0.1))`, a disabled term
    /// counting as 1. Glyphs are visited in ascending code order and only a
    /// strictly lower score replaces the current best.
    ///
    /// `cell` must have the glyph set's cell size.
    pub fn find_best_match(&self, cell: &CellView<'_>) -> u8 {
        let cell_avg = self.metrics.brightness.then(|| cell.average());
        let mut best = u64::MAX;
        let mut best_code = 0u8;

        for glyph in self.glyphs.eligible() {
            let shape = if self.metrics.shape { shape_distance(glyph, cell, best) } else { 1 };
            let brightness = match cell_avg {
                Some(avg) => {
                    let d = brightness_distance(glyph, avg, cell.width() * cell.height());
                    (d as f64 + 0.1).sqrt() as u64
                }
                None => 1,
            };

            let score = shape * brightness;
            if score < best {
                best = score;
                best_code = glyph.code();
            }
        }

        best_code
    }
}

/// Sum of squared pixel differences. Stops as soon as the running total
/// exceeds `bound`, returning that partial total.
fn shape_distance(glyph: &Glyph, cell: &CellView<'_>, bound: u64) -> u64 {
    let pattern = glyph.pixels();
    let mut distance = 0u64;
    for y in 0..cell.height() {
        let expected = &pattern[y * cell.width()..][..cell.width()];
        for (&a, &b) in cell.row(y).iter().zip(expected) {
            let diff = a.abs_diff(b) as u64;
            distance += diff * diff;
            if distance > bound {
                return distance;
            }
        }
    }
    distance
}

fn brightness_distance(glyph: &Glyph, cell_avg: u8, area: usize) -> u64 {
    area as u64 * glyph.average().abs_diff(cell_avg) as u64
}
