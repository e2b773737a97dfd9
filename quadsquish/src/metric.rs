use std::{fmt, ops::RangeInclusive, str::FromStr};

use crate::picture::Error;

/// How the uniformity of a region is scored. Lower scores mean a more
/// uniform region.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMetric {
    /// Mean over channels of the population variance
    #[default]
    Variance = 1,

    /// Mean over channels of the mean absolute deviation from the average
    MeanAbsoluteDeviation = 2,

    /// Mean over channels of `max - min`
    MaxPixelDifference = 3,

    /// Mean over channels of the Shannon entropy of the 256-bin histogram
    Entropy = 4,

    /// Structural similarity. Not implemented, every region scores 0.
    Ssim = 5,
}

impl ErrorMetric {
    /// All metrics in selector order.
    pub const ALL: [ErrorMetric; 5] = [
        ErrorMetric::Variance,
        ErrorMetric::MeanAbsoluteDeviation,
        ErrorMetric::MaxPixelDifference,
        ErrorMetric::Entropy,
        ErrorMetric::Ssim,
    ];

    /// Short name of the metric.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorMetric::Variance => "Variance",
            ErrorMetric::MeanAbsoluteDeviation => "MAD",
            ErrorMetric::MaxPixelDifference => "MaxDiff",
            ErrorMetric::Entropy => "Entropy",
            ErrorMetric::Ssim => "SSIM",
        }
    }

    /// Whether the metric actually measures anything.
    pub fn is_supported(&self) -> bool {
        !matches!(self, ErrorMetric::Ssim)
    }

    /// The range of scores this metric can produce on 8-bit samples, which
    /// is also the range of thresholds that make sense for it.
    pub fn suggested_threshold(&self) -> RangeInclusive<f64> {
        match self {
            ErrorMetric::Variance => 0.0..=65025.0,
            ErrorMetric::MeanAbsoluteDeviation => 0.0..=255.0,
            ErrorMetric::MaxPixelDifference => 0.0..=255.0,
            ErrorMetric::Entropy => 0.0..=8.0,
            ErrorMetric::Ssim => 0.0..=1.0,
        }
    }
}

impl fmt::Display for ErrorMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for ErrorMetric {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::Variance,
            2 => Self::MeanAbsoluteDeviation,
            3 => Self::MaxPixelDifference,
            4 => Self::Entropy,
            5 => Self::Ssim,
            v => return Err(Error::InvalidMetric(v)),
        })
    }
}

impl From<ErrorMetric> for u8 {
    fn from(metric: ErrorMetric) -> u8 {
        metric as u8
    }
}

impl FromStr for ErrorMetric {
    type Err = Error;

    /// Accepts either the numeric selector or a case-insensitive name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(selector) = s.parse::<u8>() {
            return Self::try_from(selector);
        }

        Ok(match s.to_lowercase().as_str() {
            "variance" | "var" => Self::Variance,
            "mad" | "mean-absolute-deviation" => Self::MeanAbsoluteDeviation,
            "maxdiff" | "max-pixel-difference" | "range" => Self::MaxPixelDifference,
            "entropy" => Self::Entropy,
            "ssim" => Self::Ssim,
            _ => return Err(Error::UnknownMetricName(s.to_string())),
        })
    }
}
