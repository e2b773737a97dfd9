use proptest::prelude::*;
use quadsquish::{
    CompressionParameters, ErrorMetric, Error, Picture, PixelSink, QuadtreeBuilder, QuadtreeNode,
};

/// Counts how many times each pixel is painted.
struct CoverageSink {
    width: u32,
    height: u32,
    hits: Vec<u32>,
}

impl PixelSink for CoverageSink {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn channels(&self) -> u8 {
        3
    }

    fn put_pixel(&mut self, x: u32, y: u32, _color: [u8; 3]) -> Result<(), Error> {
        self.hits[(y * self.width + x) as usize] += 1;
        Ok(())
    }
}

fn ceil_log2(n: u32) -> u32 {
    32 - (n - 1).leading_zeros()
}

/// Walk every node, checking the parent/child invariants. Returns the
/// number of nodes visited.
fn check_node(node: &QuadtreeNode) -> Result<u64, TestCaseError> {
    let Some(children) = node.children() else {
        return Ok(1);
    };

    let parent = node.region();
    let mut count = 1;
    let mut area = 0;
    let mut present = 0;

    for child in children.iter().flatten() {
        let region = child.region();
        prop_assert_eq!(child.depth(), node.depth() + 1);
        prop_assert!(region.area() < parent.area());
        prop_assert!(region.x >= parent.x && region.y >= parent.y);
        prop_assert!(region.right() <= parent.right() && region.bottom() <= parent.bottom());

        area += region.area();
        present += 1;
        count += check_node(child)?;
    }

    prop_assert!(present >= 1);
    prop_assert_eq!(area, parent.area());

    Ok(count)
}

fn image_strategy() -> impl Strategy<Value = Picture> {
    (1u32..40, 1u32..40).prop_flat_map(|(width, height)| {
        prop::collection::vec(any::<u8>(), (width * height * 3) as usize)
            .prop_map(move |bitmap| Picture::from_raw(width, height, 3, bitmap).unwrap())
    })
}

fn params_strategy() -> impl Strategy<Value = CompressionParameters> {
    (0usize..5, 0.0f64..2000.0, 1u64..16, any::<bool>()).prop_map(
        |(metric, threshold, min_block_area, parallel)| CompressionParameters {
            metric: ErrorMetric::ALL[metric],
            threshold,
            min_block_area,
            parallel,
        },
    )
}

proptest! {
    #[test]
    fn children_tile_their_parent(picture in image_strategy(), params in params_strategy()) {
        let tree = QuadtreeBuilder::new(params).unwrap().decompose(&picture).unwrap();

        let nodes = check_node(&tree.root)?;
        prop_assert_eq!(nodes, tree.stats.node_count);
        prop_assert_eq!(tree.root.leaf_count() as u64, tree.stats.leaf_count);
    }

    #[test]
    fn depth_is_logarithmic(picture in image_strategy(), params in params_strategy()) {
        let tree = QuadtreeBuilder::new(params).unwrap().decompose(&picture).unwrap();
        let longest = picture.width().max(picture.height());

        prop_assert!(tree.stats.max_depth <= ceil_log2(longest) + 1);
    }

    #[test]
    fn leaves_cover_every_pixel_once(picture in image_strategy(), params in params_strategy()) {
        let tree = QuadtreeBuilder::new(params).unwrap().decompose(&picture).unwrap();

        let mut sink = CoverageSink {
            width: picture.width(),
            height: picture.height(),
            hits: vec![0; (picture.width() * picture.height()) as usize],
        };
        tree.render_into(&mut sink).unwrap();

        prop_assert!(sink.hits.iter().all(|&h| h == 1));
    }

    #[test]
    fn compressed_image_keeps_its_shape(picture in image_strategy(), params in params_strategy()) {
        let (output, _) = quadsquish::compress(&picture, &params).unwrap();

        prop_assert_eq!(output.width(), picture.width());
        prop_assert_eq!(output.height(), picture.height());
        prop_assert_eq!(output.channels(), picture.channels());
    }

    #[test]
    fn constant_image_is_one_leaf(
        width in 1u32..30,
        height in 1u32..30,
        value in any::<u8>(),
        threshold in 0.001f64..100.0,
    ) {
        let picture = Picture::from_raw(width, height, 3, vec![value; (width * height * 3) as usize]).unwrap();

        for metric in [ErrorMetric::Variance, ErrorMetric::MeanAbsoluteDeviation, ErrorMetric::MaxPixelDifference, ErrorMetric::Entropy] {
            let params = CompressionParameters { metric, threshold, min_block_area: 1, parallel: false };
            let (output, stats) = quadsquish::compress(&picture, &params).unwrap();

            prop_assert_eq!(stats.node_count, 1);
            prop_assert_eq!(&output, &picture);
        }
    }
}

#[test]
fn outlier_scenario_is_reproducible() {
    let mut bitmap = [10u8; 3].repeat(16);
    bitmap[45..48].copy_from_slice(&[250, 250, 250]);
    let picture = Picture::from_raw(4, 4, 3, bitmap).unwrap();
    let params = CompressionParameters {
        metric: ErrorMetric::Variance,
        threshold: 1000.0,
        min_block_area: 1,
        parallel: true,
    };

    let (first, first_stats) = quadsquish::compress(&picture, &params).unwrap();
    let (second, second_stats) = quadsquish::compress(&picture, &params).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_stats, second_stats);
    assert_eq!(first, picture);
    assert_eq!((first_stats.node_count, first_stats.max_depth), (9, 2));
}
