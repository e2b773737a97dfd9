//! Pixel buffers consumed and produced by the compressor.

use thiserror::Error;

use crate::region::Region;

/// Read access to a decoded image.
///
/// Samples are 8-bit. The compressor reads the first three channels of each
/// pixel and never writes through this trait.
pub trait PixelSource {
    /// Width of the image in pixels.
    fn width(&self) -> u32;

    /// Height of the image in pixels.
    fn height(&self) -> u32;

    /// Number of channels per pixel.
    fn channels(&self) -> u8;

    /// Read one channel of one pixel.
    ///
    /// Reading outside the image or past the last channel must return
    /// [`Error::SampleOutOfRange`].
    fn sample(&self, x: u32, y: u32, channel: u8) -> Result<u8, Error>;
}

/// Write access to an output raster.
pub trait PixelSink {
    /// Width of the raster in pixels.
    fn width(&self) -> u32;

    /// Height of the raster in pixels.
    fn height(&self) -> u32;

    /// Number of channels per pixel.
    fn channels(&self) -> u8;

    /// Set the first three channels of one pixel.
    fn put_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) -> Result<(), Error>;

    /// Paint every pixel of `region` with `color`. The region must lie
    /// inside the raster.
    fn fill_region(&mut self, region: Region, color: [u8; 3]) -> Result<(), Error> {
        if !region.fits_within(self.width(), self.height()) {
            return Err(Error::RegionOutOfBounds {
                region,
                width: self.width(),
                height: self.height(),
            });
        }

        for y in region.y..region.y + region.height {
            for x in region.x..region.x + region.width {
                self.put_pixel(x, y, color)?;
            }
        }

        Ok(())
    }
}

/// An interleaved 8-bit image held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    width: u32,
    height: u32,
    channels: u8,
    bitmap: Vec<u8>,
}

impl Picture {
    /// Wrap an existing bitmap. Its length must be exactly
    /// `width * height * channels`.
    pub fn from_raw(width: u32, height: u32, channels: u8, bitmap: Vec<u8>) -> Result<Self, Error> {
        let expected = width as usize * height as usize * channels as usize;
        if bitmap.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: bitmap.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            bitmap,
        })
    }

    /// A zeroed image of the given dimensions.
    pub fn blank(width: u32, height: u32, channels: u8) -> Self {
        Self {
            width,
            height,
            channels,
            bitmap: vec![0; width as usize * height as usize * channels as usize],
        }
    }

    /// Width of the image in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the image in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of channels per pixel.
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// The raw interleaved bitmap.
    pub fn as_raw(&self) -> &[u8] {
        &self.bitmap
    }

    /// Consume the picture and return the raw interleaved bitmap.
    pub fn into_raw(self) -> Vec<u8> {
        self.bitmap
    }

    fn offset(&self, x: u32, y: u32, channel: u8) -> Result<usize, Error> {
        if x >= self.width || y >= self.height || channel >= self.channels {
            return Err(Error::SampleOutOfRange {
                x,
                y,
                channel,
                width: self.width,
                height: self.height,
                channels: self.channels,
            });
        }

        let pixel = y as usize * self.width as usize + x as usize;
        Ok(pixel * self.channels as usize + channel as usize)
    }
}

impl PixelSource for Picture {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn channels(&self) -> u8 {
        self.channels
    }

    fn sample(&self, x: u32, y: u32, channel: u8) -> Result<u8, Error> {
        Ok(self.bitmap[self.offset(x, y, channel)?])
    }
}

impl PixelSink for Picture {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn channels(&self) -> u8 {
        self.channels
    }

    fn put_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) -> Result<(), Error> {
        // Validate the last channel first so a short pixel is never half written
        self.offset(x, y, 2)?;

        let start = self.offset(x, y, 0)?;
        self.bitmap[start..start + 3].copy_from_slice(&color);

        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid error metric selector {0}, expected 1 through 5")]
    InvalidMetric(u8),

    #[error("unknown error metric {0:?}")]
    UnknownMetricName(String),

    #[error("threshold must be a finite number >= 0, got {0}")]
    InvalidThreshold(f64),

    #[error("minimum block area must be at least 1, got {0}")]
    InvalidMinBlockArea(u64),

    #[error("cannot decompose an empty region")]
    EmptyRegion,

    #[error("region {region:?} does not fit in a {width}x{height} image")]
    RegionOutOfBounds {
        region: Region,
        width: u32,
        height: u32,
    },

    #[error("sample ({x}, {y}) channel {channel} is outside a {width}x{height} image with {channels} channels")]
    SampleOutOfRange {
        x: u32,
        y: u32,
        channel: u8,
        width: u32,
        height: u32,
        channels: u8,
    },

    #[error("bitmap holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_checks_length() {
        let result = Picture::from_raw(2, 2, 3, vec![0; 11]);

        assert_eq!(
            result,
            Err(Error::BufferSize {
                expected: 12,
                actual: 11
            })
        );
    }

    #[test]
    #[rustfmt::skip]
    fn sample_reads_interleaved_channels() {
        let bitmap = vec![
            1, 2, 3,    4, 5, 6,
            7, 8, 9,    10, 11, 12,
        ];
        let picture = Picture::from_raw(2, 2, 3, bitmap).unwrap();

        assert_eq!(picture.sample(1, 0, 2), Ok(6));
        assert_eq!(picture.sample(0, 1, 0), Ok(7));
        assert_eq!(picture.sample(1, 1, 1), Ok(11));
    }

    #[test]
    fn missing_channel_is_an_error() {
        let picture = Picture::blank(2, 2, 2);

        assert!(matches!(
            picture.sample(0, 0, 2),
            Err(Error::SampleOutOfRange { channel: 2, channels: 2, .. })
        ));
    }

    #[test]
    fn put_pixel_leaves_extra_channels_alone() {
        let mut picture = Picture::from_raw(1, 1, 4, vec![0, 0, 0, 200]).unwrap();
        picture.put_pixel(0, 0, [10, 20, 30]).unwrap();

        assert_eq!(picture.as_raw(), &[10, 20, 30, 200]);
    }

    #[test]
    fn put_pixel_out_of_bounds() {
        let mut picture = Picture::blank(2, 2, 3);

        assert!(picture.put_pixel(2, 0, [1, 1, 1]).is_err());
        assert!(picture.as_raw().iter().all(|&b| b == 0));
    }

    #[test]
    fn fill_region_paints_only_inside() {
        let mut picture = Picture::blank(3, 3, 3);
        picture.fill_region(Region::new(1, 1, 2, 2), [9, 9, 9]).unwrap();

        for y in 0..3 {
            for x in 0..3 {
                let expected = if x >= 1 && y >= 1 { 9 } else { 0 };
                assert_eq!(picture.sample(x, y, 0).unwrap(), expected);
            }
        }
    }

    #[test]
    fn fill_region_past_u32_max_is_rejected() {
        let mut picture = Picture::blank(4, 1, 3);
        let region = Region::new(2, 0, u32::MAX - 1, 1);

        assert_eq!(
            picture.fill_region(region, [1, 2, 3]),
            Err(Error::RegionOutOfBounds {
                region,
                width: 4,
                height: 1,
            })
        );
        assert!(picture.as_raw().iter().all(|&b| b == 0));
    }
}
