use crate::{
    builder::Quadtree,
    node::QuadtreeNode,
    picture::{Error, Picture, PixelSink},
};

/// Paint every leaf below `node` into `sink` as a flat block of its average
/// color. Children are visited depth first in quadrant order.
pub fn render<K: PixelSink + ?Sized>(node: &QuadtreeNode, sink: &mut K) -> Result<(), Error> {
    match node.children() {
        None => sink.fill_region(node.region(), node.average_color().to_rgb8()),
        Some(children) => {
            for child in children.iter().flatten() {
                render(child, sink)?;
            }

            Ok(())
        }
    }
}

impl Quadtree {
    /// Paint the tree into an existing sink.
    pub fn render_into<K: PixelSink + ?Sized>(&self, sink: &mut K) -> Result<(), Error> {
        render(&self.root, sink)
    }

    /// Paint the tree into a new zeroed picture just large enough to hold
    /// the root region.
    pub fn to_picture(&self, channels: u8) -> Result<Picture, Error> {
        let region = self.root.region();
        let width = region.right().min(u32::MAX as u64) as u32;
        let height = region.bottom().min(u32::MAX as u64) as u32;

        let mut picture = Picture::blank(width, height, channels);
        self.render_into(&mut picture)?;

        Ok(picture)
    }
}
