//! Image preparation - resizes to whole glyph cells and exposes per-cell views.

use crate::blur::blur_in_place;
use crate::font::average;
use crate::kernel::Kernel;
use crate::{GlyphError, Result};
use image::imageops::{self, FilterType};
use image::GrayImage;

const IMAGE_BLUR_RADIUS: f64 = 3.0;
const IMAGE_BLUR_SPREAD: f64 = 2.0;

/// Read-only window onto one character cell of a larger buffer.
#[derive(Debug, Clone, Copy)]
pub struct CellView<'a> {
    pixels: &'a [u8],
    stride: usize,
    width: usize,
    height: usize,
}

impl<'a> CellView<'a> {
    /// `pixels` starts at the cell's top-left pixel; rows are `stride` apart.
    pub fn new(pixels: &'a [u8], stride: usize, width: usize, height: usize) -> Self {
        debug_assert!(height == 0 || pixels.len() >= stride * (height - 1) + width);
        Self { pixels, stride, width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row(&self, y: usize) -> &'a [u8] {
        &self.pixels[y * self.stride..][..self.width]
    }

    pub fn average(&self) -> u8 {
        average(self.pixels, self.stride, self.width, self.height)
    }
}

/// Options for [`prepare`].
#[derive(Debug, Clone, Copy)]
pub struct PrepareOptions {
    pub chars_wide: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    /// Eligible glyph `(min, max)` brightness to rescale into, or `None` to
    /// leave the smoothed pixels untouched.
    pub normalize_into: Option<(u8, u8)>,
}

/// A grayscale image sized to a whole number of cells across.
pub struct PreparedImage {
    image: GrayImage,
    cell_width: u32,
    cell_height: u32,
    cols: u32,
    rows: u32,
}

impl PreparedImage {
    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// `(width, height)` of one cell in pixels.
    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    /// View of the cell at (col, row), borrowed straight from the buffer.
    pub fn cell(&self, col: u32, row: u32) -> CellView<'_> {
        let stride = self.image.width() as usize;
        let x0 = (col * self.cell_width) as usize;
        let y0 = (row * self.cell_height) as usize;
        CellView::new(
            &self.image.as_raw()[y0 * stride + x0..],
            stride,
            self.cell_width as usize,
            self.cell_height as usize,
        )
    }
}

/// Resize `source` to `chars_wide` cells across, smooth it, and optionally
/// rescale its brightness into the glyph range.
///
/// The height follows the source aspect ratio; a trailing partial row of
/// cells is kept in the buffer but not counted in [`PreparedImage::rows`].
pub fn prepare(source: &GrayImage, options: &PrepareOptions) -> Result<PreparedImage> {
    let PrepareOptions { chars_wide, cell_width, cell_height, normalize_into } = *options;
    if chars_wide == 0 {
        return Err(GlyphError::InvalidArgument("output width must be at least 1 character".into()));
    }
    if cell_width == 0 || cell_height == 0 {
        return Err(GlyphError::InvalidArgument("cell size must be non-zero".into()));
    }
    let (src_w, src_h) = source.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(GlyphError::InvalidArgument(format!("empty source image ({src_w}x{src_h})")));
    }

    let width = chars_wide.checked_mul(cell_width).ok_or_else(|| {
        GlyphError::InvalidArgument(format!("{chars_wide} characters of {cell_width} pixels is too wide"))
    })?;
    let height = u32::try_from(((src_h as u64 * width as u64) / src_w as u64).max(1))
        .map_err(|_| GlyphError::InvalidArgument(format!("resized height overflows for {src_w}x{src_h} at width {width}")))?;
    log::debug!("orig: {src_w}x{src_h}");

    let mut image = imageops::resize(source, width, height, FilterType::Triangle);
    log::debug!("resized: {width}x{height}");

    let rows = height / cell_height;
    if rows == 0 {
        log::warn!("image is shorter than one character row ({height} < {cell_height} pixels)");
    }

    let kernel = Kernel::gaussian(IMAGE_BLUR_RADIUS, IMAGE_BLUR_SPREAD)?;
    let (w, h) = (width as usize, height as usize);
    blur_in_place(&kernel, &mut image, w, w, h);

    if let Some((min, max)) = normalize_into {
        rescale_brightness(&mut image, min, max);
    }

    Ok(PreparedImage { image, cell_width, cell_height, cols: chars_wide, rows })
}

/// Map every pixel with `out = in * (max - min) / 255 + min`.
///
/// The observed image range is only reported, not used as the source range.
fn rescale_brightness(image: &mut GrayImage, min: u8, max: u8) {
    let range = max.saturating_sub(min) as f64;
    let (mut img_min, mut img_max) = (u8::MAX, u8::MIN);

    for p in image.iter_mut() {
        img_min = img_min.min(*p);
        img_max = img_max.max(*p);
        *p = ((*p as f64 * range) / 255.0 + min as f64) as u8;
    }

    log::debug!("image brightness: min {img_min}, max {img_max}");
}
