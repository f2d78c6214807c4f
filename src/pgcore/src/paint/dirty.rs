// This file is part of Pigment.
// Copyright (C) 2024 the Pigment developers
//
// Pigment is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// As additional permission under section 7, you are allowed to distribute
// the software through an app store, even if that store has restrictive
// terms and conditions that are incompatible with the GPL, provided that
// the source is also available under the GPL with or without this permission
// through a channel without those restrictive terms and conditions.
//
// Pigment is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with Pigment.  If not, see <https://www.gnu.org/licenses/>.

use super::Rectangle;

/// The region of a pixel buffer changed since the last flush to its
/// display surface.
///
/// The bounding rectangle is a best-effort hint: a flush always pushes the
/// whole buffer, but the rectangle must contain every pixel written since
/// the last flush so that observers can trust it. A whole-buffer overwrite
/// (`clear`) is recorded as `Everything` rather than a rectangle.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum DirtyRegion {
    /// No pending changes
    Nothing,

    /// A rectangular region has changed
    Bounds(Rectangle),

    /// The entire buffer content has changed
    Everything,
}

impl DirtyRegion {
    pub fn merge(self, other: DirtyRegion) -> Self {
        use DirtyRegion::*;
        match (self, other) {
            (Nothing, o) => o,
            (s, Nothing) => s,
            (Everything, _) => Everything,
            (_, Everything) => Everything,
            (Bounds(r1), Bounds(r2)) => Bounds(r1.union(&r2)),
        }
    }

    pub fn include_point(&mut self, x: i32, y: i32) {
        *self = self.merge(DirtyRegion::Bounds(Rectangle::new(x, y, 1, 1)));
    }

    pub fn include_rect(&mut self, r: Rectangle) {
        *self = self.merge(DirtyRegion::Bounds(r));
    }

    pub fn is_dirty(&self) -> bool {
        !matches!(self, DirtyRegion::Nothing)
    }

    /// The changed area as a concrete rectangle, clipped to a buffer of the
    /// given size. `None` when nothing has changed.
    pub fn bounds(&self, width: u32, height: u32) -> Option<Rectangle> {
        match self {
            DirtyRegion::Nothing => None,
            DirtyRegion::Bounds(r) => r.cropped(width, height),
            DirtyRegion::Everything => {
                Some(Rectangle::new(0, 0, width as i32, height as i32))
            }
        }
    }

    pub fn take(&mut self) -> DirtyRegion {
        std::mem::replace(self, DirtyRegion::Nothing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge() {
        use DirtyRegion::*;

        assert_eq!(Nothing.merge(Nothing), Nothing);
        assert_eq!(
            Nothing.merge(Bounds(Rectangle::new(1, 1, 2, 2))),
            Bounds(Rectangle::new(1, 1, 2, 2))
        );
        assert_eq!(Everything.merge(Bounds(Rectangle::new(0, 0, 1, 1))), Everything);
        assert_eq!(
            Bounds(Rectangle::new(0, 0, 2, 2)).merge(Bounds(Rectangle::new(4, 4, 2, 2))),
            Bounds(Rectangle::new(0, 0, 6, 6))
        );
    }

    #[test]
    fn test_point_extension() {
        let mut d = DirtyRegion::Nothing;
        assert!(!d.is_dirty());

        d.include_point(5, 7);
        d.include_point(2, 3);
        assert!(d.is_dirty());
        assert_eq!(d.bounds(100, 100), Some(Rectangle::new(2, 3, 4, 5)));

        assert_eq!(d.take(), DirtyRegion::Bounds(Rectangle::new(2, 3, 4, 5)));
        assert!(!d.is_dirty());
    }

    #[test]
    fn test_bounds_clipping() {
        let mut d = DirtyRegion::Nothing;
        d.include_rect(Rectangle::new(-10, -10, 20, 20));
        assert_eq!(d.bounds(8, 8), Some(Rectangle::new(0, 0, 8, 8)));

        assert_eq!(
            DirtyRegion::Everything.bounds(4, 4),
            Some(Rectangle::new(0, 0, 4, 4))
        );
        assert_eq!(DirtyRegion::Nothing.bounds(4, 4), None);
    }
}
