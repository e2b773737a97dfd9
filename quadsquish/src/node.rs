use crate::region::{Quadrant, Region};

/// A color with real-valued channels, as produced by averaging samples.
///
/// Channels are not clamped to the 8-bit range until [`Color::to_rgb8`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub const fn channels(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    /// Convert to 8-bit samples by clamping each channel to `[0, 255]` and
    /// then truncating toward zero. NaN becomes 0.
    pub fn to_rgb8(&self) -> [u8; 3] {
        self.channels().map(|c| c.clamp(0.0, 255.0) as u8)
    }
}

/// One region of a quadtree decomposition.
///
/// A node is either a leaf, painted as one flat block of its average color,
/// or an internal node owning between one and four children in
/// [`Quadrant`] order. Children exactly tile the parent's region.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadtreeNode {
    region: Region,
    average: Color,
    error: f64,
    depth: u32,
    children: Option<Box<[Option<QuadtreeNode>; 4]>>,
}

impl QuadtreeNode {
    /// Create a leaf node.
    pub fn leaf(region: Region, average: Color, error: f64, depth: u32) -> Self {
        Self {
            region,
            average,
            error,
            depth,
            children: None,
        }
    }

    /// Create an internal node. If every slot is empty the node is a leaf.
    pub fn internal(
        region: Region,
        average: Color,
        error: f64,
        depth: u32,
        children: [Option<QuadtreeNode>; 4],
    ) -> Self {
        let children = children
            .iter()
            .any(Option::is_some)
            .then(|| Box::new(children));

        Self {
            region,
            average,
            error,
            depth,
            children,
        }
    }

    /// The region this node covers.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Average color over the node's region.
    pub fn average_color(&self) -> Color {
        self.average
    }

    /// The error score that decided whether this node was split.
    pub fn error(&self) -> f64 {
        self.error
    }

    /// Distance from the root, which has depth 0.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// The four child slots, or `None` for a leaf.
    pub fn children(&self) -> Option<&[Option<QuadtreeNode>; 4]> {
        self.children.as_deref()
    }

    /// The child in one quadrant, if present.
    pub fn child(&self, quadrant: Quadrant) -> Option<&QuadtreeNode> {
        self.children.as_ref()?[quadrant.index()].as_ref()
    }

    /// Iterate over the leaves below this node, depth first in quadrant
    /// order.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }
}

/// Depth-first iterator over the leaves of a tree.
pub struct Leaves<'a> {
    stack: Vec<&'a QuadtreeNode>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a QuadtreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node.children() {
                None => return Some(node),
                Some(children) => {
                    // Reversed so the north west child is popped first
                    self.stack.extend(children.iter().rev().flatten());
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_at(x: u32, y: u32) -> QuadtreeNode {
        QuadtreeNode::leaf(Region::new(x, y, 1, 1), Color::default(), 0.0, 1)
    }

    #[test]
    fn rgb8_clamps_then_truncates() {
        assert_eq!(Color::new(12.9, 0.5, 254.99).to_rgb8(), [12, 0, 254]);
        assert_eq!(Color::new(-3.0, 300.0, 255.0).to_rgb8(), [0, 255, 255]);
        assert_eq!(Color::new(f64::NAN, 1.0, 1.0).to_rgb8(), [0, 1, 1]);
    }

    #[test]
    fn internal_without_children_is_a_leaf() {
        let node = QuadtreeNode::internal(
            Region::new(0, 0, 2, 2),
            Color::default(),
            0.0,
            0,
            [None, None, None, None],
        );

        assert!(node.is_leaf());
        assert!(node.children().is_none());
    }

    #[test]
    fn leaves_come_out_in_quadrant_order() {
        let root = QuadtreeNode::internal(
            Region::new(0, 0, 2, 2),
            Color::default(),
            1.0,
            0,
            [
                Some(leaf_at(0, 0)),
                Some(leaf_at(1, 0)),
                Some(leaf_at(0, 1)),
                Some(leaf_at(1, 1)),
            ],
        );

        let origins: Vec<_> = root.leaves().map(|n| (n.region().x, n.region().y)).collect();
        assert_eq!(origins, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
        assert_eq!(root.leaf_count(), 4);
        assert_eq!(root.child(Quadrant::SouthWest).map(|n| n.region().y), Some(1));
    }

    #[test]
    fn missing_children_are_skipped() {
        let root = QuadtreeNode::internal(
            Region::new(0, 0, 1, 2),
            Color::default(),
            1.0,
            0,
            [None, Some(leaf_at(0, 0)), None, Some(leaf_at(0, 1))],
        );

        assert!(!root.is_leaf());
        assert_eq!(root.child(Quadrant::NorthWest), None);
        assert_eq!(root.leaf_count(), 2);
    }
}
