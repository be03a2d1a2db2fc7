/// Placement of measured text inside a bounding box

use serde::{Deserialize, Serialize};

use crate::font::TextSize;
use crate::style::Shadow;

/// Top-left anchor of rendered text, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Pixel box given by its edges; `right` and `bottom` are exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingBox {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn contains_size(&self, size: TextSize) -> bool {
        size.width as i64 <= self.width() as i64 && size.height as i64 <= self.height() as i64
    }
}

/// Where a piece of text is anchored inside its box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Left edge of the box, vertically centered
    #[default]
    CenterLeft,
    /// Flush with the bottom-right corner
    BottomRight,
}

impl Placement {
    pub fn position(self, size: TextSize, bbox: &BoundingBox) -> Point {
        match self {
            Placement::CenterLeft => centered_vertically(size, bbox),
            Placement::BottomRight => bottom_right(size, bbox),
        }
    }
}

/// Left-aligned, vertically centered; odd remainders round towards the top.
pub fn centered_vertically(size: TextSize, bbox: &BoundingBox) -> Point {
    let free = bbox.height() as i64 - size.height as i64;
    let top = bbox.top as i64 + free.div_euclid(2);
    Point::new(bbox.left, top as i32)
}

pub fn bottom_right(size: TextSize, bbox: &BoundingBox) -> Point {
    Point::new(
        (bbox.right as i64 - size.width as i64) as i32,
        (bbox.bottom as i64 - size.height as i64) as i32,
    )
}

pub fn shadow_position(position: Point, shadow: &Shadow) -> Point {
    Point::new(
        position.x.saturating_add(shadow.offset_x),
        position.y.saturating_add(shadow.offset_y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn size(width: u32, height: u32) -> TextSize {
        TextSize { width, height }
    }

    #[test]
    fn vertical_centering_stays_inside_the_box() {
        let bbox = BoundingBox::new(115, 134, 966, 1159);
        for h in [0u32, 1, 2, 99, 100, 101, 1024, 1025] {
            let p = centered_vertically(size(300, h), &bbox);
            assert_eq!(p.x, 115);
            let below = bbox.bottom - (p.y + h as i32);
            let above = p.y - bbox.top;
            assert!(below >= 0);
            assert!((above - below).abs() <= 1, "h={h} above={above} below={below}");
        }
    }

    #[test]
    fn centering_floors_odd_remainders() {
        let bbox = BoundingBox::new(0, 10, 100, 21);
        // 11 - 4 = 7 free pixels -> 3 above
        assert_eq!(centered_vertically(size(5, 4), &bbox), Point::new(0, 13));
        // taller than the box: floor towards the top
        assert_eq!(centered_vertically(size(5, 14), &bbox), Point::new(0, 8));
    }

    #[test]
    fn bottom_right_alignment_is_exact() {
        let bbox = BoundingBox::new(115, 134, 966, 1159);
        let s = size(321, 87);
        let p = bottom_right(s, &bbox);
        assert_eq!(p.x + s.width as i32, bbox.right);
        assert_eq!(p.y + s.height as i32, bbox.bottom);
    }

    #[test]
    fn shadow_offsets_are_added() {
        let shadow = Shadow::new(Rgba([0, 0, 0, 76]), -4, 4);
        assert_eq!(shadow_position(Point::new(100, 100), &shadow), Point::new(96, 104));
    }

    #[test]
    fn placement_dispatches() {
        let bbox = BoundingBox::new(0, 0, 100, 100);
        assert_eq!(Placement::CenterLeft.position(size(10, 20), &bbox), Point::new(0, 40));
        assert_eq!(Placement::BottomRight.position(size(10, 20), &bbox), Point::new(90, 80));
    }

    #[test]
    fn box_dimensions() {
        let bbox = BoundingBox::new(115, 134, 966, 1159);
        assert_eq!(bbox.width(), 851);
        assert_eq!(bbox.height(), 1025);
        assert!(bbox.contains_size(size(851, 1025)));
        assert!(!bbox.contains_size(size(852, 10)));
    }
}
