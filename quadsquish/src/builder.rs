use tracing::{debug, trace, warn};

use crate::{
    metric::ErrorMetric,
    node::QuadtreeNode,
    picture::{Error, PixelSource},
    region::Region,
    statistics::region_statistics,
};

/// Regions with at least this many pixels build their children on the rayon
/// thread pool. Smaller regions recurse on the current thread.
pub const PARALLEL_MIN_AREA: u64 = 64 * 64;

/// Parameters to pass to a [`QuadtreeBuilder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionParameters {
    /// How region uniformity is scored.
    pub metric: ErrorMetric,

    /// Regions scoring below this become flat blocks. Must be `>= 0`.
    pub threshold: f64,

    /// Regions with at most this many pixels are never split. Must be `>= 1`.
    pub min_block_area: u64,

    /// Build independent quadrants in parallel.
    pub parallel: bool,
}

impl Default for CompressionParameters {
    fn default() -> Self {
        Self {
            metric: ErrorMetric::Variance,
            threshold: 50.0,
            min_block_area: 4,
            parallel: true,
        }
    }
}

/// Counters describing one finished decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    /// Every node visited, leaves included.
    pub node_count: u64,

    /// Nodes that were not split.
    pub leaf_count: u64,

    /// Depth of the deepest node. The root has depth 0.
    pub max_depth: u32,
}

impl TreeStats {
    fn single(depth: u32, is_leaf: bool) -> Self {
        Self {
            node_count: 1,
            leaf_count: is_leaf as u64,
            max_depth: depth,
        }
    }

    fn merge(&mut self, other: TreeStats) {
        self.node_count += other.node_count;
        self.leaf_count += other.leaf_count;
        self.max_depth = self.max_depth.max(other.max_depth);
    }
}

/// A finished decomposition: the root node plus its counters.
#[derive(Debug, Clone, PartialEq)]
pub struct Quadtree {
    pub root: QuadtreeNode,
    pub stats: TreeStats,
}

type Built = Result<Option<(QuadtreeNode, TreeStats)>, Error>;

/// Recursively splits an image into regions of near-uniform color.
#[derive(Debug, Clone)]
pub struct QuadtreeBuilder {
    params: CompressionParameters,
}

impl QuadtreeBuilder {
    /// Validate `params` and create a builder.
    pub fn new(params: CompressionParameters) -> Result<Self, Error> {
        if !params.threshold.is_finite() || params.threshold < 0.0 {
            return Err(Error::InvalidThreshold(params.threshold));
        }

        if params.min_block_area < 1 {
            return Err(Error::InvalidMinBlockArea(params.min_block_area));
        }

        Ok(Self { params })
    }

    pub fn parameters(&self) -> &CompressionParameters {
        &self.params
    }

    /// Decompose the whole of `source`.
    pub fn decompose<S: PixelSource + Sync + ?Sized>(&self, source: &S) -> Result<Quadtree, Error> {
        self.decompose_region(source, Region::full(source.width(), source.height()))
    }

    /// Decompose one region of `source`. The region must be non-empty and
    /// lie inside the image.
    pub fn decompose_region<S: PixelSource + Sync + ?Sized>(
        &self,
        source: &S,
        region: Region,
    ) -> Result<Quadtree, Error> {
        if region.is_empty() {
            return Err(Error::EmptyRegion);
        }

        if !region.fits_within(source.width(), source.height()) {
            return Err(Error::RegionOutOfBounds {
                region,
                width: source.width(),
                height: source.height(),
            });
        }

        if !self.params.metric.is_supported() {
            warn!(
                "{} metric is not implemented, every region scores 0",
                self.params.metric
            );
        }

        let (root, stats) = self.build(source, region, 0)?;

        debug!(
            nodes = stats.node_count,
            leaves = stats.leaf_count,
            max_depth = stats.max_depth,
            "decomposed {}x{} region with {}",
            region.width,
            region.height,
            self.params.metric,
        );

        Ok(Quadtree { root, stats })
    }

    fn build<S: PixelSource + Sync + ?Sized>(
        &self,
        source: &S,
        region: Region,
        depth: u32,
    ) -> Result<(QuadtreeNode, TreeStats), Error> {
        let stats = region_statistics(source, region, self.params.metric)?;

        let stop = stats.error < self.params.threshold
            || region.area() <= self.params.min_block_area
            || region.is_indivisible();

        if stop {
            let node = QuadtreeNode::leaf(region, stats.average, stats.error, depth);
            return Ok((node, TreeStats::single(depth, true)));
        }

        let [nw, ne, sw, se] = region.quadrants();
        let children = if self.params.parallel && region.area() >= PARALLEL_MIN_AREA {
            trace!(?region, depth, "building quadrants in parallel");

            let ((nw, ne), (sw, se)) = rayon::join(
                || {
                    rayon::join(
                        || self.build_child(source, nw, depth + 1),
                        || self.build_child(source, ne, depth + 1),
                    )
                },
                || {
                    rayon::join(
                        || self.build_child(source, sw, depth + 1),
                        || self.build_child(source, se, depth + 1),
                    )
                },
            );
            [nw?, ne?, sw?, se?]
        } else {
            [
                self.build_child(source, nw, depth + 1)?,
                self.build_child(source, ne, depth + 1)?,
                self.build_child(source, sw, depth + 1)?,
                self.build_child(source, se, depth + 1)?,
            ]
        };

        let mut tree_stats = TreeStats::single(depth, false);
        let children = children.map(|child| {
            child.map(|(node, child_stats)| {
                tree_stats.merge(child_stats);
                node
            })
        });

        let node = QuadtreeNode::internal(region, stats.average, stats.error, depth, children);
        Ok((node, tree_stats))
    }

    fn build_child<S: PixelSource + Sync + ?Sized>(
        &self,
        source: &S,
        region: Option<Region>,
        depth: u32,
    ) -> Built {
        region
            .map(|region| self.build(source, region, depth))
            .transpose()
    }
}
