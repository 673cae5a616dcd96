//! Rectangle and viewport-metric value types.
//!
//! All coordinates are viewport-relative (client coordinates), matching what
//! a browser's `getBoundingClientRect` would report: an element scrolled above
//! the viewport has a negative `top`.

/// An axis-aligned rectangle in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// All four coordinates exactly zero. A range whose bounding rectangle is
    /// all-zero is defective: scrolling to it would silently jump to the
    /// document origin.
    pub fn is_zero(&self) -> bool {
        self.left == 0.0 && self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }
}

/// Scroll and viewport state of the rendered document.
///
/// Mirrors the browser's `window.inner*` and `document.scrollingElement`
/// measurements that the original in-page logic consumed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metrics {
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub scroll_left: f64,
    pub scroll_top: f64,
    pub scroll_width: f64,
    pub scroll_height: f64,
    /// `documentElement.clientHeight`; usually equals `viewport_height`.
    pub client_height: f64,
}

/// Union of a set of client rects. `None` when the set is empty.
pub fn bounding_rect(rects: &[Rect]) -> Option<Rect> {
    let mut iter = rects.iter();
    let first = *iter.next()?;
    Some(iter.fold(first, |acc, r| acc.union(r)))
}

pub(crate) fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union() {
        let a = Rect::new(0.0, 10.0, 50.0, 30.0);
        let b = Rect::new(20.0, 0.0, 80.0, 20.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 80.0, 30.0));
    }

    #[test]
    fn test_zero_detection() {
        assert!(Rect::ZERO.is_zero());
        assert!(!Rect::new(0.0, 0.0, 0.0, 1.0).is_zero());
    }

    #[test]
    fn test_bounding_rect_empty() {
        assert_eq!(bounding_rect(&[]), None);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(1.5, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-0.5, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.25, 0.0, 1.0), 0.25);
    }
}
