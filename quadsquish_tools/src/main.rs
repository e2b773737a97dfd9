mod report;
mod utils;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use image::{ColorType, DynamicImage, ImageReader};
use quadsquish::{
    CompressionParameters, ErrorMetric, Picture, QuadtreeBuilder, Region,
    statistics::{average_color, region_error},
};
use report::Report;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utils::{Assume, default_extension, error_metric, exists_decision, min_block, threshold};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Subcommands,

    /// Overwrite output files
    #[arg(short = 'n', long = "overwrite", conflicts_with = "assumeno")]
    assumeyes: bool,

    /// Do not overwrite output files
    #[arg(short = 'y', long = "preserve", conflicts_with = "assumeyes")]
    assumeno: bool,
}

#[derive(Debug, Subcommand)]
enum Subcommands {
    /// Compress an image into flat-color quadtree blocks
    Compress(CompressArgs),

    /// Print the statistics of an image for every error metric
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
struct CompressArgs {
    /// Input image file of any type supported by `image`
    input: PathBuf,

    /// Output image file. `.png` is used when no extension is given
    output: PathBuf,

    /// The error metric used to decide whether a block is uniform.
    /// Prompted for if not given.
    ///
    /// Valid values:
    ///  - 1, Variance
    ///  - 2, MAD
    ///  - 3, MaxDiff
    ///  - 4, Entropy
    ///  - 5, SSIM (not implemented)
    #[arg(short, long, value_parser = error_metric, verbatim_doc_comment)]
    metric: Option<ErrorMetric>,

    /// Blocks scoring below this are merged. Prompted for if not given
    #[arg(short, long, value_parser = threshold)]
    threshold: Option<f64>,

    /// Blocks with at most this many pixels are never split. Prompted for
    /// if not given
    #[arg(short = 'b', long, value_parser = min_block)]
    min_block: Option<u64>,

    /// Build the tree on a single thread
    #[arg(long)]
    serial: bool,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Input image file of any type supported by `image`
    input: PathBuf,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let assume = if args.assumeyes {
        Some(Assume::Yes)
    } else if args.assumeno {
        Some(Assume::No)
    } else {
        None
    };

    match args.command {
        Subcommands::Compress(a) => compress(a, assume),
        Subcommands::Inspect(a) => inspect(a),
    }
}

fn compress(args: CompressArgs, assume: Option<Assume>) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }
    let input_size = fs::metadata(&args.input)?.len();

    let mut output = args.output;
    if default_extension(&mut output) {
        warn!("No output extension given, saving as {:?}", output);
    }

    if output.try_exists()?
        && !exists_decision("Output", "Overwrite", &output, assume)?
    {
        return Ok(())
    }

    let metric = match args.metric {
        Some(m) => m,
        None => utils::prompt_metric()?,
    };
    let threshold = match args.threshold {
        Some(t) => t,
        None => utils::prompt_threshold(metric)?,
    };
    let min_block_area = match args.min_block {
        Some(b) => b,
        None => utils::prompt_min_block()?,
    };
    let params = CompressionParameters {
        metric,
        threshold,
        min_block_area,
        parallel: !args.serial,
    };
    let builder = QuadtreeBuilder::new(params)?;

    info!("Reading {:?}", args.input);
    let (picture, _) = load_picture(&args.input)?;

    info!("Compressing");
    let start = Instant::now();
    let tree = builder.decompose(&picture)?;
    let mut compressed = Picture::blank(picture.width(), picture.height(), picture.channels());
    tree.render_into(&mut compressed)?;
    let elapsed = start.elapsed();

    info!("Saving {:?}", output);
    image::save_buffer(
        &output,
        compressed.as_raw(),
        compressed.width(),
        compressed.height(),
        ColorType::Rgb8,
    )
    .with_context(|| format!("Could not save {output:?}"))?;

    let output_size = match fs::metadata(&output) {
        Ok(m) => Some(m.len()),
        Err(e) => {
            warn!("Could not read the output file size: {e}");
            None
        }
    };

    Report {
        output,
        elapsed,
        width: picture.width(),
        height: picture.height(),
        params,
        input_size,
        output_size,
        stats: tree.stats,
    }
    .print();

    Ok(())
}

fn inspect(args: InspectArgs) -> Result<()> {
    if !args.input.try_exists()? {
        bail!("Input file {:?} does not exist", args.input);
    }

    let (picture, source_channels) = load_picture(&args.input)?;
    let region = Region::full(picture.width(), picture.height());

    let average = average_color(&picture, region)?;
    let [r, g, b] = average.channels();

    println!("{:<23}: {}x{}", "Resolution", picture.width(), picture.height());
    println!("{:<23}: {source_channels}", "Channels");
    println!("{:<23}: ({r:.2}, {g:.2}, {b:.2})", "Average color");
    for metric in ErrorMetric::ALL.into_iter().filter(ErrorMetric::is_supported) {
        let error = region_error(&picture, region, average, metric)?;
        let range = metric.suggested_threshold();
        println!(
            "{:<23}: {error:.4} (range {} to {})",
            format!("{metric} error"),
            range.start(),
            range.end(),
        );
    }

    Ok(())
}

/// Decode an image file into a three channel [`Picture`], along with the
/// channel count of the file as decoded.
fn load_picture(path: &Path) -> Result<(Picture, u8)> {
    let image = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .with_context(|| format!("Could not decode {path:?}"))?;

    let channels = image.color().channel_count();
    if channels != 3 {
        warn!(
            "Input image has {channels} color channels, not 3 (RGB). Converting, the result may look different"
        );
    }

    Ok((into_picture(image)?, channels))
}

fn into_picture(image: DynamicImage) -> Result<Picture, quadsquish::Error> {
    let rgb = image.into_rgb8();
    let (width, height) = rgb.dimensions();

    Picture::from_raw(width, height, 3, rgb.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use quadsquish::PixelSource;

    #[test]
    fn alpha_is_dropped_on_load() {
        let rgba = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 128]));
        let picture = into_picture(DynamicImage::ImageRgba8(rgba)).unwrap();

        assert_eq!(picture.channels(), 3);
        assert_eq!((picture.width(), picture.height()), (3, 2));
        assert_eq!(picture.sample(2, 1, 2), Ok(30));
    }

    #[test]
    fn load_reports_source_channels() {
        let path = std::env::temp_dir().join(format!("quadsquish-la8-{}.png", std::process::id()));
        let gray = image::GrayAlphaImage::from_pixel(2, 2, image::LumaA([90, 255]));
        gray.save(&path).unwrap();

        let loaded = load_picture(&path);
        fs::remove_file(&path).unwrap();

        let (picture, channels) = loaded.unwrap();
        assert_eq!(channels, 2);
        assert_eq!(picture.channels(), 3);
        assert_eq!(picture.sample(1, 1, 0), Ok(90));
    }
}
