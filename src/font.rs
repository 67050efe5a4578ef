//! Glyph set built from a 16x16 code-page font sheet.

use crate::blur::blur_in_place;
use crate::charset::CharSelection;
use crate::kernel::Kernel;
use crate::{GlyphError, Result};
use image::GrayImage;

/// Glyphs per sheet row and column.
pub const SHEET_GRID: u32 = 16;
pub const GLYPH_COUNT: usize = 256;

const GLYPH_BLUR_RADIUS: f64 = 2.0;
const GLYPH_BLUR_SPREAD: f64 = 2.0;

/// One code-page character: its smoothed pixel pattern and the average
/// brightness of the binary pattern it was smoothed from.
#[derive(Debug, Clone)]
pub struct Glyph {
    code: u8,
    pixels: Box<[u8]>,
    average: u8,
    eligible: bool,
}

impl Glyph {
    pub fn code(&self) -> u8 {
        self.code
    }

    /// Row-major, `cell_width` pixels per row.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn average(&self) -> u8 {
        self.average
    }

    pub fn is_eligible(&self) -> bool {
        self.eligible
    }
}

/// All 256 glyphs of a font, sharing one cell size.
#[derive(Debug, Clone)]
pub struct GlyphSet {
    glyphs: Vec<Glyph>,
    cell_width: u32,
    cell_height: u32,
    brightness: Option<(u8, u8)>,
}

impl GlyphSet {
    /// Rasterize a sheet laid out as 16x16 cells of `cell_width x cell_height`.
    ///
    /// Zero samples become background and everything else foreground;
    /// `invert` swaps which of the two is white. Every glyph starts ineligible.
    pub fn from_sheet(sheet: &GrayImage, cell_width: u32, cell_height: u32, invert: bool) -> Result<Self> {
        let expected = match (cell_width.checked_mul(SHEET_GRID), cell_height.checked_mul(SHEET_GRID)) {
            (Some(w), Some(h)) => (w, h),
            _ => {
                return Err(GlyphError::InvalidArgument(format!(
                    "glyph cell {cell_width}x{cell_height} is too large"
                )))
            }
        };
        if cell_width == 0 || cell_height == 0 || sheet.dimensions() != expected {
            return Err(GlyphError::FontFormat { expected, actual: sheet.dimensions() });
        }

        let (foreground, background) = if invert { (0u8, 255u8) } else { (255u8, 0u8) };
        let kernel = Kernel::gaussian(GLYPH_BLUR_RADIUS, GLYPH_BLUR_SPREAD)?;
        let (cw, ch) = (cell_width as usize, cell_height as usize);

        let glyphs = (0..GLYPH_COUNT)
            .map(|c| {
                let x0 = (c as u32 % SHEET_GRID) * cell_width;
                let y0 = (c as u32 / SHEET_GRID) * cell_height;

                let mut pixels = vec![0u8; cw * ch];
                for y in 0..cell_height {
                    for x in 0..cell_width {
                        let sample = sheet.get_pixel(x0 + x, y0 + y).0[0];
                        pixels[(y * cell_width + x) as usize] =
                            if sample != 0 { foreground } else { background };
                    }
                }

                let average = average(&pixels, cw, cw, ch);
                blur_in_place(&kernel, &mut pixels, cw, cw, ch);

                Glyph { code: c as u8, pixels: pixels.into_boxed_slice(), average, eligible: false }
            })
            .collect();

        log::debug!("font sheet: {}x{}, cell {}x{}", expected.0, expected.1, cell_width, cell_height);

        Ok(Self { glyphs, cell_width, cell_height, brightness: None })
    }

    pub fn cell_width(&self) -> u32 {
        self.cell_width
    }

    pub fn cell_height(&self) -> u32 {
        self.cell_height
    }

    pub fn glyph(&self, code: u8) -> &Glyph {
        &self.glyphs[code as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Glyph> {
        self.glyphs.iter()
    }

    pub fn eligible(&self) -> impl Iterator<Item = &Glyph> {
        self.glyphs.iter().filter(|g| g.eligible)
    }

    pub fn set_eligible(&mut self, code: u8, eligible: bool) {
        self.glyphs[code as usize].eligible = eligible;
    }

    pub fn set_eligible_range(&mut self, start: u8, end: u8, eligible: bool) {
        for code in start..=end {
            self.set_eligible(code, eligible);
        }
    }

    /// Apply a selection in order and refresh the brightness bounds.
    pub fn apply_selection(&mut self, selection: &CharSelection) {
        for entry in selection.entries() {
            self.set_eligible_range(*entry.codes.start(), *entry.codes.end(), entry.include);
        }
        self.normalize();
    }

    /// Parse `expr` and apply it. Nothing changes if the expression is invalid.
    pub fn apply_selection_str(&mut self, expr: &str) -> Result<()> {
        let selection: CharSelection = expr.parse()?;
        self.apply_selection(&selection);
        Ok(())
    }

    /// Recompute the min/max average brightness over eligible glyphs.
    ///
    /// Must run after eligibility changes; `set_eligible` alone leaves the
    /// bounds stale.
    pub fn normalize(&mut self) {
        self.brightness = self.eligible().map(|g| g.average).fold(None, |acc, avg| match acc {
            None => Some((avg, avg)),
            Some((lo, hi)) => Some((lo.min(avg), hi.max(avg))),
        });

        match self.brightness {
            Some((lo, hi)) => log::debug!("eligible glyph brightness: min {lo}, max {hi}"),
            None => log::debug!("no eligible glyphs"),
        }
    }

    /// Eligible-glyph `(min, max)` average brightness as of the last
    /// [`normalize`](Self::normalize); `None` when nothing is eligible.
    pub fn brightness_range(&self) -> Option<(u8, u8)> {
        self.brightness
    }

    pub fn eligible_count(&self) -> usize {
        self.eligible().count()
    }
}

/// Integer mean of a `width x height` region addressed with `stride`.
pub(crate) fn average(pixels: &[u8], stride: usize, width: usize, height: usize) -> u8 {
    let sum: u64 = (0..height)
        .map(|y| pixels[y * stride..][..width].iter().map(|&p| p as u64).sum::<u64>())
        .sum();
    (sum / (width * height) as u64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    const CW: u32 = 8;
    const CH: u32 = 16;

    /// Blank sheet with glyph 1 fully lit and glyph 2 lit in its top half.
    fn sample_sheet() -> GrayImage {
        let mut sheet = GrayImage::new(CW * SHEET_GRID, CH * SHEET_GRID);
        for y in 0..CH {
            for x in 0..CW {
                sheet.put_pixel(CW + x, y, Luma([200]));
                if y < CH / 2 {
                    sheet.put_pixel(2 * CW + x, y, Luma([1]));
                }
            }
        }
        sheet
    }

    #[test]
    fn test_sheet_geometry_mismatch() {
        let sheet = GrayImage::new(CW * SHEET_GRID + 1, CH * SHEET_GRID);
        let err = GlyphSet::from_sheet(&sheet, CW, CH, false).unwrap_err();
        match err {
            GlyphError::FontFormat { expected, actual } => {
                assert_eq!(expected, (128, 256));
                assert_eq!(actual, (129, 256));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_oversized_cell_rejected() {
        let sheet = GrayImage::new(1, 1);
        let err = GlyphSet::from_sheet(&sheet, u32::MAX / 8, CH, false).unwrap_err();
        assert!(matches!(err, GlyphError::InvalidArgument(_)));
    }

    #[test]
    fn test_zero_cell_size_rejected() {
        let sheet = GrayImage::new(0, 0);
        assert!(GlyphSet::from_sheet(&sheet, 0, 0, false).is_err());
    }

    #[test]
    fn test_background_cell_keeps_background_value() {
        let set = GlyphSet::from_sheet(&sample_sheet(), CW, CH, false).unwrap();
        let blank = set.glyph(0);
        assert_eq!(blank.average(), 0);
        assert!(blank.pixels().iter().all(|&p| p == 0));

        let inverted = GlyphSet::from_sheet(&sample_sheet(), CW, CH, true).unwrap();
        let blank = inverted.glyph(0);
        assert_eq!(blank.average(), 255);
        assert!(blank.pixels().iter().all(|&p| p == 255));
    }

    #[test]
    fn test_binarize_and_average() {
        let set = GlyphSet::from_sheet(&sample_sheet(), CW, CH, false).unwrap();
        assert_eq!(set.glyph(1).average(), 255);
        assert!(set.glyph(1).pixels().iter().all(|&p| p == 255));
        // Half lit: any nonzero sample counts as foreground
        assert_eq!(set.glyph(2).average(), 127);

        let inverted = GlyphSet::from_sheet(&sample_sheet(), CW, CH, true).unwrap();
        assert_eq!(inverted.glyph(1).average(), 0);
        assert_eq!(inverted.glyph(2).average(), 127);
    }

    #[test]
    fn test_glyphs_are_smoothed() {
        let set = GlyphSet::from_sheet(&sample_sheet(), CW, CH, false).unwrap();
        let half = set.glyph(2).pixels();
        let w = CW as usize;
        // Far from the edge the pattern keeps its binary values
        assert_eq!(half[0], 255);
        assert_eq!(half[15 * w], 0);
        // Around the boundary row it picks up intermediate levels
        let boundary = half[8 * w];
        assert!(boundary > 0 && boundary < 255);
        assert!(half[7 * w] > boundary);
    }

    #[test]
    fn test_glyphs_start_ineligible() {
        let set = GlyphSet::from_sheet(&sample_sheet(), CW, CH, false).unwrap();
        assert_eq!(set.eligible_count(), 0);
        assert_eq!(set.brightness_range(), None);
        assert!(set.iter().enumerate().all(|(i, g)| g.code() as usize == i));
    }

    #[test]
    fn test_normalize_tracks_eligible_only() {
        let mut set = GlyphSet::from_sheet(&sample_sheet(), CW, CH, false).unwrap();
        set.set_eligible(2, true);
        set.normalize();
        assert_eq!(set.brightness_range(), Some((127, 127)));

        set.set_eligible_range(0, 2, true);
        set.normalize();
        assert_eq!(set.brightness_range(), Some((0, 255)));

        set.set_eligible(0, false);
        set.normalize();
        assert_eq!(set.brightness_range(), Some((127, 255)));
    }

    #[test]
    fn test_selection_order_later_wins() {
        let mut set = GlyphSet::from_sheet(&sample_sheet(), CW, CH, false).unwrap();
        set.apply_selection_str("0-255").unwrap();
        set.apply_selection_str("-100-150").unwrap();
        for g in set.iter() {
            let expected = !(100..=150).contains(&g.code());
            assert_eq!(g.is_eligible(), expected, "code {}", g.code());
        }
    }

    #[test]
    fn test_invalid_selection_mutates_nothing() {
        let mut set = GlyphSet::from_sheet(&sample_sheet(), CW, CH, false).unwrap();
        set.apply_selection_str("1-2").unwrap();

        let err = set.apply_selection_str("0-255,150-100").unwrap_err();
        assert!(matches!(err, GlyphError::InvalidArgument(_)));
        assert_eq!(set.eligible_count(), 2);
        assert!(set.glyph(1).is_eligible() && set.glyph(2).is_eligible());
        assert_eq!(set.brightness_range(), Some((127, 255)));
    }

    #[test]
    fn test_average_with_stride() {
        let pixels = [10u8, 20, 99, 30, 40, 99];
        assert_eq!(average(&pixels, 3, 2, 2), 25);
    }
}
