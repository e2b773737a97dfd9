/// An axis-aligned rectangle of pixels within an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// Left edge, in pixels.
    pub x: u32,

    /// Top edge, in pixels.
    pub y: u32,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The region covering an entire `width`×`height` image.
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Number of pixels covered.
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// One past the rightmost column.
    pub const fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// One past the bottom row.
    pub const fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Whether the pixel at (`x`, `y`) lies inside this region.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && (x as u64) < self.right() && (y as u64) < self.bottom()
    }

    /// Whether this region lies entirely inside a `width`×`height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width as u64 && self.bottom() <= height as u64
    }

    /// Whether halving this region would produce a zero-sized half.
    pub const fn is_indivisible(&self) -> bool {
        self.width / 2 == 0 || self.height / 2 == 0
    }

    /// Split the region into its four quadrants, in [`Quadrant`] order.
    ///
    /// The split point is `(width / 2, height / 2)`, rounded down, so the
    /// eastern and southern quadrants take the extra column or row when a
    /// dimension is odd. A quadrant that would have zero width or height, or
    /// whose origin would pass `u32::MAX`, is `None`.
    pub fn quadrants(&self) -> [Option<Region>; 4] {
        let w1 = self.width / 2;
        let h1 = self.height / 2;
        let w2 = self.width - w1;
        let h2 = self.height - h1;

        let east = self.x.checked_add(w1);
        let south = self.y.checked_add(h1);

        let make = |x: Option<u32>, y: Option<u32>, width, height| {
            let region = Region::new(x?, y?, width, height);
            (!region.is_empty()).then_some(region)
        };

        [
            make(Some(self.x), Some(self.y), w1, h1),
            make(east, Some(self.y), w2, h1),
            make(Some(self.x), south, w1, h2),
            make(east, south, w2, h2),
        ]
    }
}

/// One of the four child slots of a split region.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    /// All quadrants in traversal order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}
