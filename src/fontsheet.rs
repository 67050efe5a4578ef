//! fontsheet - Render a TrueType font into a 16x16 code-page 437 glyph sheet

use clap::Parser;
use fontdue::{Font, FontSettings};
use glyphcast::codepage::cp437_char;
use glyphcast::font::{GLYPH_COUNT, SHEET_GRID};
use glyphcast::{GlyphError, GlyphSet, FONT_HEIGHT, FONT_WIDTH};
use image::{GrayImage, Luma};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fontsheet", about = "Render a font as a code-page glyph sheet")]
struct Args {
    /// TrueType/OpenType font to rasterize
    font: PathBuf,
    /// Output image (format from extension)
    output: PathBuf,
    /// Glyph cell width in pixels
    #[arg(long, default_value_t = FONT_WIDTH, value_parser = clap::value_parser!(u32).range(1..))]
    cell_width: u32,
    /// Glyph cell height in pixels
    #[arg(long, default_value_t = FONT_HEIGHT, value_parser = clap::value_parser!(u32).range(1..))]
    cell_height: u32,
    /// Font size in pixels (default: ~87.5% of the cell height)
    #[arg(long)]
    size: Option<f32>,
    /// Coverage at or above this becomes foreground
    #[arg(long, default_value = "128")]
    threshold: u8,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fontsheet: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), GlyphError> {
    let font_data = std::fs::read(&args.font)?;
    let font = Font::from_bytes(font_data, FontSettings::default()).map_err(|e| GlyphError::Font(e.to_string()))?;

    let font_size = args.size.unwrap_or(args.cell_height as f32 * 0.875);
    let mut sheet = GrayImage::new(args.cell_width * SHEET_GRID, args.cell_height * SHEET_GRID);

    for code in 0..GLYPH_COUNT {
        let code = code as u8;
        let ch = cp437_char(code);
        if ch == '\0' || ch.is_whitespace() {
            continue;
        }
        let x0 = (code as u32 % SHEET_GRID) * args.cell_width;
        let y0 = (code as u32 / SHEET_GRID) * args.cell_height;
        render_char(&font, ch, font_size, args.threshold, &mut sheet, (x0, y0), (args.cell_width, args.cell_height));
    }

    // Reject anything the converter would not load
    GlyphSet::from_sheet(&sheet, args.cell_width, args.cell_height, false)?;

    sheet.save(&args.output)?;
    log::info!("wrote {}x{} sheet to {}", sheet.width(), sheet.height(), args.output.display());
    Ok(())
}

/// Draw `ch` thresholded into the cell at `origin`, clipped to the cell.
fn render_char(
    font: &Font,
    ch: char,
    font_size: f32,
    threshold: u8,
    sheet: &mut GrayImage,
    origin: (u32, u32),
    cell: (u32, u32),
) {
    let (metrics, bitmap) = font.rasterize(ch, font_size);
    if metrics.width == 0 || metrics.height == 0 {
        return;
    }

    let (width, height) = (cell.0 as i32, cell.1 as i32);
    // Baseline at ~75% down
    let baseline_y = (height as f32 * 0.75) as i32;
    let y_offset = baseline_y - metrics.height as i32 - metrics.ymin;
    // Box-drawing glyphs keep their own bearing so lines meet across cells
    let x_offset = if metrics.width as i32 >= width { 0 } else { metrics.xmin.clamp(0, width - metrics.width as i32) };

    for sy in 0..metrics.height {
        for sx in 0..metrics.width {
            let tx = x_offset + sx as i32;
            let ty = y_offset + sy as i32;
            if tx >= 0 && tx < width && ty >= 0 && ty < height && bitmap[sy * metrics.width + sx] >= threshold {
                sheet.put_pixel(origin.0 + tx as u32, origin.1 + ty as u32, Luma([255]));
            }
        }
    }
}
