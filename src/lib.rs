//! Image to code-page text converter using font glyph matching.

pub mod blur;
pub mod charset;
pub mod chunk;
pub mod codepage;
pub mod config;
pub mod font;
pub mod kernel;
pub mod matcher;

pub use charset::CharSelection;
pub use chunk::{CellView, PreparedImage};
pub use config::{ConvertConfig, FONT_HEIGHT, FONT_WIDTH};
pub use font::GlyphSet;
pub use matcher::{GlyphMatcher, Metrics};

use chunk::PrepareOptions;
use rayon::prelude::*;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlyphError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Font sheet is {actual:?}, expected {expected:?} (16x16 cells)")]
    FontFormat { expected: (u32, u32), actual: (u32, u32) },
    #[error("No characters are eligible for matching")]
    NoEligibleGlyphs,
    #[error("Font error: {0}")]
    Font(String),
}

pub type Result<T> = std::result::Result<T, GlyphError>;

/// Character codes chosen for each cell, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharGrid {
    cols: u32,
    rows: u32,
    codes: Vec<u8>,
}

impl CharGrid {
    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn codes(&self) -> &[u8] {
        &self.codes
    }

    pub fn row(&self, y: u32) -> &[u8] {
        &self.codes[(y * self.cols) as usize..][..self.cols as usize]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[u8]> {
        self.codes.chunks_exact(self.cols.max(1) as usize)
    }

    /// Write raw code-page bytes, one `\n`-terminated line per row.
    pub fn write_to(&self, mut out: impl Write) -> Result<()> {
        for row in self.iter_rows() {
            out.write_all(row)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Main converter: a glyph set plus the options for one run
pub struct Converter {
    glyphs: GlyphSet,
    config: ConvertConfig,
}

impl Converter {
    /// Build the glyph set from a decoded font sheet and apply the selection.
    pub fn new(sheet: &image::GrayImage, config: ConvertConfig) -> Result<Self> {
        config.validate()?;
        log::debug!("character selection: {}", config.selection);
        let mut glyphs = GlyphSet::from_sheet(sheet, FONT_WIDTH, FONT_HEIGHT, config.invert_font)?;
        glyphs.apply_selection(&config.selection);
        Self::with_glyphs(glyphs, config)
    }

    pub fn from_font_file(path: impl AsRef<Path>, config: ConvertConfig) -> Result<Self> {
        let sheet = image::open(path.as_ref())?.to_luma8();
        Self::new(&sheet, config)
    }

    /// Use an already prepared glyph set; its eligibility is taken as is.
    pub fn with_glyphs(mut glyphs: GlyphSet, config: ConvertConfig) -> Result<Self> {
        glyphs.normalize();
        if glyphs.eligible_count() == 0 {
            return Err(GlyphError::NoEligibleGlyphs);
        }
        log::debug!("{} eligible glyphs", glyphs.eligible_count());
        Ok(Self { glyphs, config })
    }

    pub fn glyphs(&self) -> &GlyphSet {
        &self.glyphs
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    pub fn convert(&self, image: &image::DynamicImage) -> Result<CharGrid> {
        let gray = image.to_luma8();
        self.convert_gray(&gray)
    }

    pub fn convert_gray(&self, gray: &image::GrayImage) -> Result<CharGrid> {
        let options = PrepareOptions {
            chars_wide: self.config.width,
            cell_width: self.glyphs.cell_width(),
            cell_height: self.glyphs.cell_height(),
            normalize_into: if self.config.normalize { self.glyphs.brightness_range() } else { None },
        };
        let prepared = chunk::prepare(gray, &options)?;
        self.match_cells(&prepared)
    }

    /// Pick a glyph for every whole cell of an already prepared image.
    pub fn match_cells(&self, prepared: &PreparedImage) -> Result<CharGrid> {
        let glyph_cell = (self.glyphs.cell_width(), self.glyphs.cell_height());
        if prepared.cell_size() != glyph_cell {
            return Err(GlyphError::InvalidArgument(format!(
                "image cells are {:?}, glyphs are {:?}",
                prepared.cell_size(),
                glyph_cell
            )));
        }
        let matcher = GlyphMatcher::new(&self.glyphs, self.config.metrics())?;
        let (cols, rows) = (prepared.cols(), prepared.rows());

        let codes: Vec<u8> = (0..rows)
            .into_par_iter()
            .flat_map_iter(|y| {
                let matcher = &matcher;
                (0..cols).map(move |x| matcher.find_best_match(&prepared.cell(x, y)))
            })
            .collect();

        Ok(CharGrid { cols, rows, codes })
    }
}
