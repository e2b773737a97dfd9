//! Per-region color statistics and uniformity scores.
//!
//! Every function reads only the pixels inside the region it is given, and
//! only the first three channels of each pixel. A region with no pixels
//! yields zeros instead of an error.

use crate::{
    metric::ErrorMetric,
    node::Color,
    picture::{Error, PixelSource},
    region::Region,
};

/// Average color and error score of one region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStatistics {
    pub average: Color,
    pub error: f64,
}

/// Compute the average color of `region` and score it with `metric`.
pub fn region_statistics<S: PixelSource + ?Sized>(
    source: &S,
    region: Region,
    metric: ErrorMetric,
) -> Result<RegionStatistics, Error> {
    let average = average_color(source, region)?;
    let error = region_error(source, region, average, metric)?;

    Ok(RegionStatistics { average, error })
}

/// Arithmetic mean of each channel over the region.
pub fn average_color<S: PixelSource + ?Sized>(source: &S, region: Region) -> Result<Color, Error> {
    if region.is_empty() {
        return Ok(Color::default());
    }

    let mut sum = [0.0f64; 3];
    for_each_pixel(source, region, |rgb| {
        for c in 0..3 {
            sum[c] += rgb[c] as f64;
        }
    })?;

    let count = region.area() as f64;
    Ok(Color::new(sum[0] / count, sum[1] / count, sum[2] / count))
}

/// Score how far `region` is from being a single flat color.
///
/// `average` must be the result of [`average_color`] on the same region. It
/// is only used by the variance and mean absolute deviation metrics.
pub fn region_error<S: PixelSource + ?Sized>(
    source: &S,
    region: Region,
    average: Color,
    metric: ErrorMetric,
) -> Result<f64, Error> {
    match metric {
        ErrorMetric::Variance => variance(source, region, average),
        ErrorMetric::MeanAbsoluteDeviation => mean_absolute_deviation(source, region, average),
        ErrorMetric::MaxPixelDifference => max_pixel_difference(source, region),
        ErrorMetric::Entropy => entropy(source, region),
        ErrorMetric::Ssim => Ok(0.0),
    }
}

/// Mean over channels of the population variance.
pub fn variance<S: PixelSource + ?Sized>(
    source: &S,
    region: Region,
    average: Color,
) -> Result<f64, Error> {
    if region.area() <= 1 {
        return Ok(0.0);
    }

    let mean = average.channels();
    let mut sum = [0.0f64; 3];
    for_each_pixel(source, region, |rgb| {
        for c in 0..3 {
            let diff = rgb[c] as f64 - mean[c];
            sum[c] += diff * diff;
        }
    })?;

    let count = region.area() as f64;
    Ok(channel_mean(sum.map(|s| s / count)))
}

/// Mean over channels of the mean absolute deviation from the average.
///
/// The region is clipped to the image before iterating, and the divisor is
/// the clipped pixel count.
pub fn mean_absolute_deviation<S: PixelSource + ?Sized>(
    source: &S,
    region: Region,
    average: Color,
) -> Result<f64, Error> {
    if region.is_empty() {
        return Ok(0.0);
    }

    let x_end = region.right().min(source.width() as u64) as u32;
    let y_end = region.bottom().min(source.height() as u64) as u32;
    let clipped = Region::new(
        region.x,
        region.y,
        x_end.saturating_sub(region.x),
        y_end.saturating_sub(region.y),
    );
    if clipped.is_empty() {
        return Ok(0.0);
    }

    let mean = average.channels();
    let mut sum = [0.0f64; 3];
    for_each_pixel(source, clipped, |rgb| {
        for c in 0..3 {
            sum[c] += (rgb[c] as f64 - mean[c]).abs();
        }
    })?;

    let count = clipped.area() as f64;
    Ok(channel_mean(sum.map(|s| s / count)))
}

/// Mean over channels of the spread between the largest and smallest sample.
pub fn max_pixel_difference<S: PixelSource + ?Sized>(source: &S, region: Region) -> Result<f64, Error> {
    if region.is_empty() {
        return Ok(0.0);
    }

    let mut min = [u8::MAX; 3];
    let mut max = [u8::MIN; 3];
    for_each_pixel(source, region, |rgb| {
        for c in 0..3 {
            min[c] = min[c].min(rgb[c]);
            max[c] = max[c].max(rgb[c]);
        }
    })?;

    let mut range = [0.0f64; 3];
    for c in 0..3 {
        range[c] = (max[c] - min[c]) as f64;
    }

    Ok(channel_mean(range))
}

/// Mean over channels of the base 2 Shannon entropy of the sample histogram.
///
/// A constant region scores 0 and a region where all 256 values occur
/// equally often scores 8.
pub fn entropy<S: PixelSource + ?Sized>(source: &S, region: Region) -> Result<f64, Error> {
    if region.is_empty() {
        return Ok(0.0);
    }

    let mut histograms = [[0u64; 256]; 3];
    for_each_pixel(source, region, |rgb| {
        for c in 0..3 {
            histograms[c][rgb[c] as usize] += 1;
        }
    })?;

    let total = region.area() as f64;
    let per_channel = histograms.map(|histogram| {
        histogram
            .iter()
            .filter(|&&count| count > 0)
            .map(|&count| {
                let p = count as f64 / total;
                -p * p.log2()
            })
            .sum::<f64>()
    });

    Ok(channel_mean(per_channel))
}

fn channel_mean(values: [f64; 3]) -> f64 {
    (values[0] + values[1] + values[2]) / 3.0
}

/// Visit the first three channels of every pixel in `region`, row by row.
/// The region must lie inside the image.
fn for_each_pixel<S, F>(source: &S, region: Region, mut f: F) -> Result<(), Error>
where
    S: PixelSource + ?Sized,
    F: FnMut([u8; 3]),
{
    if !region.fits_within(source.width(), source.height()) {
        return Err(Error::RegionOutOfBounds {
            region,
            width: source.width(),
            height: source.height(),
        });
    }

    for y in region.y..region.y + region.height {
        for x in region.x..region.x + region.width {
            f([
                source.sample(x, y, 0)?,
                source.sample(x, y, 1)?,
                source.sample(x, y, 2)?,
            ]);
        }
    }

    Ok(())
}
