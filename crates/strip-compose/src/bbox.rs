//! Pixel bounding boxes.

/// An axis-aligned pixel rectangle.
///
/// `left`/`top` are inclusive and `right`/`bottom` exclusive, so the box
/// covers `right - left` columns and `bottom - top` rows. A box always
/// covers at least one pixel; "no box" is expressed as
/// `Option::<BoundingBox>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

impl BoundingBox {
    /// Create a box, or `None` if it would cover zero pixels.
    ///
    /// # Example
    /// ```
    /// use strip_compose::BoundingBox;
    /// assert!(BoundingBox::new(10, 0, 90, 200).is_some());
    /// assert!(BoundingBox::new(5, 0, 5, 200).is_none());
    /// ```
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Option<Self> {
        if left < right && top < bottom {
            Some(Self {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }

    /// Box covering a whole `width` x `height` image.
    pub fn full(width: u32, height: u32) -> Option<Self> {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub fn left(&self) -> u32 {
        self.left
    }

    #[inline]
    pub fn top(&self) -> u32 {
        self.top
    }

    #[inline]
    pub fn right(&self) -> u32 {
        self.right
    }

    #[inline]
    pub fn bottom(&self) -> u32 {
        self.bottom
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Grow the box by `padding` on every side, clamped to a
    /// `width` x `height` image.
    pub fn expand(&self, padding: u32, width: u32, height: u32) -> Self {
        Self {
            left: self.left.saturating_sub(padding),
            top: self.top.saturating_sub(padding),
            right: self.right.saturating_add(padding).min(width).max(self.right),
            bottom: self
                .bottom
                .saturating_add(padding)
                .min(height)
                .max(self.bottom),
        }
    }

    /// Whether the box spans the whole `width` x `height` image.
    pub fn covers(&self, width: u32, height: u32) -> bool {
        self.left == 0 && self.top == 0 && self.right >= width && self.bottom >= height
    }

    /// `(left, top, right, bottom)`
    pub fn as_tuple(&self) -> (u32, u32, u32, u32) {
        (self.left, self.top, self.right, self.bottom)
    }
}
