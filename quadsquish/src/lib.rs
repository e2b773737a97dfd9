//! Quadsquish is a lossy image compressor. It recursively splits an image
//! into quadrants until each region is uniform enough, then repaints every
//! such region as one flat block of its average color.
//!
//! The crate works on decoded pixels only. Reading and writing image files
//! is left to the caller, for example with the
//! [image crate](https://docs.rs/image/latest/image/).
//!
//! # Example
//! ## Compressing a bitmap in memory
//! ```
//! use quadsquish::{CompressionParameters, ErrorMetric, Picture};
//!
//! // A 2×2 RGB image with one bright pixel
//! let bitmap = vec![
//!     0x10, 0x10, 0x10,   0x10, 0x10, 0x10,
//!     0x10, 0x10, 0x10,   0xF0, 0xF0, 0xF0,
//! ];
//! let picture = Picture::from_raw(2, 2, 3, bitmap).unwrap();
//!
//! let params = CompressionParameters {
//!     metric: ErrorMetric::Variance,
//!     threshold: 10.0,
//!     min_block_area: 1,
//!     ..Default::default()
//! };
//!
//! let (output, stats) = quadsquish::compress(&picture, &params).unwrap();
//! assert_eq!(output, picture);
//! assert_eq!(stats.node_count, 5);
//! ```
//!
//! ## Inspecting the tree
//! ```
//! use quadsquish::{CompressionParameters, Picture, QuadtreeBuilder};
//!
//! let picture = Picture::blank(16, 16, 3);
//! let tree = QuadtreeBuilder::new(CompressionParameters::default())
//!     .unwrap()
//!     .decompose(&picture)
//!     .unwrap();
//!
//! // A flat image needs only one block
//! assert!(tree.root.is_leaf());
//! assert_eq!(tree.root.leaf_count(), 1);
//! ```

mod builder;
mod metric;
mod node;
mod render;

pub mod picture;
pub mod region;
pub mod statistics;

// ----------------------- //
// INLINED USEFUL FEATURES //
// ----------------------- //
#[doc(inline)]
pub use builder::{CompressionParameters, Quadtree, QuadtreeBuilder, TreeStats, PARALLEL_MIN_AREA};

#[doc(inline)]
pub use metric::ErrorMetric;

#[doc(inline)]
pub use node::{Color, Leaves, QuadtreeNode};

#[doc(inline)]
pub use picture::{Error, Picture, PixelSink, PixelSource};

#[doc(inline)]
pub use region::{Quadrant, Region};

#[doc(inline)]
pub use render::render;

/// Decompose `source` and paint the result into a new picture with the same
/// dimensions and channel count.
pub fn compress<S: PixelSource + Sync + ?Sized>(
    source: &S,
    params: &CompressionParameters,
) -> Result<(Picture, TreeStats), Error> {
    let tree = QuadtreeBuilder::new(*params)?.decompose(source)?;

    let mut output = Picture::blank(source.width(), source.height(), source.channels());
    tree.render_into(&mut output)?;

    Ok((output, tree.stats))
}
