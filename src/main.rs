//! glyphcast CLI - Convert images to code-page text by matching font glyphs

use clap::Parser;
use glyphcast::{CharSelection, ConvertConfig, Converter, GlyphError, Metrics};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "glyphcast", version, about = "Convert an image to ASCII")]
struct Args {
    /// Input image file
    input: PathBuf,
    /// Show info about the process
    #[arg(short, long)]
    verbose: bool,
    /// Output width in characters
    #[arg(short, long, default_value = "56", value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,
    /// Invert the font (black on white)
    #[arg(short, long)]
    inverse: bool,
    /// Disable the 'average' component in the distance calculation
    #[arg(short = 'a', long)]
    noaverage: bool,
    /// Disable the 'shape' component in the distance calculation
    #[arg(short = 's', long)]
    noshape: bool,
    /// Disable normalization of the image based on the selected characters
    #[arg(short = 'n', long)]
    nonormalize: bool,
    /// Select the characters, e.g. 32-127 (plain ascii) or 32,176-178,219-223 (shape blocks)
    #[arg(short, long, default_value = glyphcast::charset::DEFAULT_SELECTION)]
    chars: String,
    /// Font sheet: 16x16 grid of 8x16 glyphs. Not shipped; generate the
    /// default with `fontsheet <font.ttf> assets/ASCII8.ASC.png`
    #[arg(short, long, default_value = "assets/ASCII8.ASC.png")]
    font: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Warn })
        .parse_default_env()
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("glyphcast: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), GlyphError> {
    // Validate everything before touching any image
    let selection: CharSelection = args.chars.parse()?;
    let config = ConvertConfig::default()
        .with_width(args.width)
        .with_invert_font(args.inverse)
        .with_metrics(Metrics { shape: !args.noshape, brightness: !args.noaverage })
        .with_normalize(!args.nonormalize)
        .with_selection(selection);
    config.validate()?;

    let converter = Converter::from_font_file(&args.font, config)?;

    let image = image::open(&args.input)?;
    let grid = converter.convert(&image)?;
    grid.write_to(io::stdout().lock())
}
