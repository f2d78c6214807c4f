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

use tracing::warn;

use super::color::{Pixel, ZERO_PIXEL};
use super::rasterop;
use super::{Color, DirtyRegion, DisplaySurface, Rectangle};
use crate::brush::{alpha_at, BrushShape};

/// A packed straight-RGBA raster with blending primitives and dirty-region
/// bookkeeping.
///
/// Every drawing operation is bounds-checked and silently skips pixels
/// outside the buffer; painting must never fail mid-stroke. Writes expand
/// the dirty region until the buffer is flushed to a display surface.
#[derive(Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
    dirty: DirtyRegion,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> PixelBuffer {
        Self::filled(width, height, &Color::TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, color: &Color) -> PixelBuffer {
        assert!(width > 0 && height > 0);
        PixelBuffer {
            width,
            height,
            pixels: vec![color.as_pixel(); (width * height) as usize],
            dirty: DirtyRegion::Nothing,
        }
    }

    pub fn from_pixels(
        width: u32,
        height: u32,
        pixels: Vec<Pixel>,
    ) -> Result<PixelBuffer, &'static str> {
        assert!(width > 0 && height > 0);
        if pixels.len() != (width * height) as usize {
            return Err("pixel vector length does not match the buffer size");
        }
        Ok(PixelBuffer {
            width,
            height,
            pixels,
            dirty: DirtyRegion::Nothing,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// The pixel at the given coordinates, transparent black outside.
    pub fn pixel_at(&self, x: i32, y: i32) -> Pixel {
        if self.in_bounds(x, y) {
            self.pixels[self.index(x, y)]
        } else {
            ZERO_PIXEL
        }
    }

    /// Overwrite a pixel without blending.
    pub fn set_pixel(&mut self, x: i32, y: i32, pixel: Pixel) {
        if self.in_bounds(x, y) {
            let i = self.index(x, y);
            self.pixels[i] = pixel;
            self.dirty.include_point(x, y);
        }
    }

    /// Blend a source color over a pixel with the given coverage and opacity.
    pub fn blend_pixel(&mut self, x: i32, y: i32, rgb: [u8; 3], alpha: u8, opacity: f32) {
        if self.in_bounds(x, y) {
            let i = self.index(x, y);
            rasterop::blend_over(&mut self.pixels[i], &rgb, alpha, opacity);
            self.dirty.include_point(x, y);
        }
    }

    /// Reduce a pixel's alpha, leaving its color channels untouched.
    pub fn erase_pixel(&mut self, x: i32, y: i32, strength: f32) {
        if self.in_bounds(x, y) {
            let i = self.index(x, y);
            rasterop::erase_alpha(&mut self.pixels[i], strength);
            self.dirty.include_point(x, y);
        }
    }

    /// Stamp one brush dab.
    ///
    /// Coverage comes from the brush falloff curve over the normalized
    /// distance from the center; `Square` dabs measure that distance with
    /// the Chebyshev metric. When the edge is effectively hard the falloff
    /// dispatch is bypassed and the color's own alpha is used directly.
    #[allow(clippy::too_many_arguments)]
    pub fn stamp_circle(
        &mut self,
        cx: i32,
        cy: i32,
        radius: f32,
        color: &Color,
        opacity: f32,
        shape: BrushShape,
        hardness: f32,
        anti_alias: bool,
    ) {
        let p = color.as_pixel();
        let rgb = [p[0], p[1], p[2]];
        let color_alpha = p[3];
        self.scan_dab(cx, cy, radius, shape, hardness, anti_alias, |buf, x, y, cover| {
            let a = (color_alpha as f32 * cover + 0.5) as u8;
            buf.blend_pixel(x, y, rgb, a, opacity);
        });
    }

    /// Erase one brush dab: the same geometry as `stamp_circle`, with the
    /// falloff modulating the erase strength instead of the coverage.
    pub fn erase_circle(
        &mut self,
        cx: i32,
        cy: i32,
        radius: f32,
        strength: f32,
        shape: BrushShape,
        hardness: f32,
    ) {
        self.scan_dab(cx, cy, radius, shape, hardness, false, |buf, x, y, cover| {
            buf.erase_pixel(x, y, strength * cover);
        });
    }

    fn scan_dab<F>(
        &mut self,
        cx: i32,
        cy: i32,
        radius: f32,
        shape: BrushShape,
        hardness: f32,
        anti_alias: bool,
        mut put: F,
    ) where
        F: FnMut(&mut PixelBuffer, i32, i32, f32),
    {
        let r = radius.max(0.5);
        let ri = r.ceil() as i32;

        let x0 = (cx - ri).max(0);
        let x1 = (cx + ri).min(self.width as i32 - 1);
        let y0 = (cy - ri).max(0);
        let y1 = (cy + ri).min(self.height as i32 - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }

        let rr = r * r;
        // With a hard edge the full falloff dispatch is a constant; skip it.
        let hard = hardness >= 0.99;

        for y in y0..=y1 {
            let dy = (y - cy) as f32;
            for x in x0..=x1 {
                let dx = (x - cx) as f32;

                let (d, dist) = if shape == BrushShape::Square {
                    let dist = dx.abs().max(dy.abs());
                    (dist / r, dist)
                } else {
                    let dd = dx * dx + dy * dy;
                    if dd > rr {
                        continue;
                    }
                    let dist = dd.sqrt();
                    (dist / r, dist)
                };
                if d > 1.0 {
                    continue;
                }

                let mut cover = if hard { 1.0 } else { alpha_at(d, shape, hardness) };
                if anti_alias && shape != BrushShape::Square {
                    cover *= (r - dist + 0.5).clamp(0.0, 1.0);
                }
                if cover > 0.0 {
                    put(self, x, y, cover);
                }
            }
        }
    }

    /// Stamp a line of dabs along a Bresenham walk between two points.
    ///
    /// A dab is stamped only every `max(1, thickness / 4)` steps to bound
    /// overdraw. `spacing_offset` is the number of steps already walked
    /// since the previous dab (the stroke engine threads it through
    /// consecutive segments so spacing stays continuous); the leftover step
    /// count is returned.
    #[allow(clippy::too_many_arguments)]
    pub fn stamp_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: &Color,
        thickness: f32,
        opacity: f32,
        shape: BrushShape,
        hardness: f32,
        anti_alias: bool,
        spacing_offset: i32,
    ) -> i32 {
        let radius = thickness / 2.0;
        self.walk_line(x0, y0, x1, y1, thickness, spacing_offset, |buf, x, y| {
            buf.stamp_circle(x, y, radius, color, opacity, shape, hardness, anti_alias);
        })
    }

    /// Erase along a line: `stamp_line` geometry with erase dabs.
    #[allow(clippy::too_many_arguments)]
    pub fn erase_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        thickness: f32,
        strength: f32,
        shape: BrushShape,
        hardness: f32,
        spacing_offset: i32,
    ) -> i32 {
        let radius = thickness / 2.0;
        self.walk_line(x0, y0, x1, y1, thickness, spacing_offset, |buf, x, y| {
            buf.erase_circle(x, y, radius, strength, shape, hardness);
        })
    }

    fn walk_line<F>(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        thickness: f32,
        spacing_offset: i32,
        mut dab: F,
    ) -> i32
    where
        F: FnMut(&mut PixelBuffer, i32, i32),
    {
        let spacing = (thickness as i32 / 4).max(1);
        let mut distance = spacing_offset.max(0);

        let mut x0 = x0;
        let mut y0 = y0;
        let dy = y1 - y0;
        let dx = x1 - x0;

        let (stepy, dy) = if dy < 0 { (-1, dy * -2) } else { (1, dy * 2) };
        let (stepx, dx) = if dx < 0 { (-1, dx * -2) } else { (1, dx * 2) };

        if dx > dy {
            let mut fraction = dy - (dx / 2);
            while x0 != x1 {
                if fraction >= 0 {
                    y0 += stepy;
                    fraction -= dx;
                }
                x0 += stepx;
                fraction += dy;
                distance += 1;
                if distance >= spacing {
                    dab(self, x0, y0);
                    distance = 0;
                }
            }
        } else {
            let mut fraction = dx - (dy / 2);
            while y0 != y1 {
                if fraction >= 0 {
                    x0 += stepx;
                    fraction -= dy;
                }
                y0 += stepy;
                fraction += dx;
                distance += 1;
                if distance >= spacing {
                    dab(self, x0, y0);
                    distance = 0;
                }
            }
        }

        distance
    }

    /// Overwrite every pixel. The whole buffer becomes dirty.
    pub fn clear(&mut self, color: &Color) {
        self.pixels.fill(color.as_pixel());
        self.dirty = DirtyRegion::Everything;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    pub fn dirty_bounds(&self) -> Option<Rectangle> {
        self.dirty.bounds(self.width, self.height)
    }

    /// Push the buffer to a display surface and reset the dirty region.
    /// Does nothing when there are no pending changes.
    pub fn flush(&mut self, surface: &mut dyn DisplaySurface) -> bool {
        if self.dirty.is_dirty() {
            surface.present(self.width, self.height, &self.pixels);
            self.dirty.take();
            true
        } else {
            false
        }
    }

    /// Drop the pending dirty region without presenting anywhere.
    pub fn mark_clean(&mut self) {
        self.dirty.take();
    }

    /// A full copy of the backing pixels, for external undo checkpoints.
    pub fn snapshot(&self) -> Vec<Pixel> {
        self.pixels.clone()
    }

    /// Replace the buffer contents from a snapshot of the same size.
    pub fn restore(&mut self, snapshot: &[Pixel]) -> Result<(), &'static str> {
        if snapshot.len() != self.pixels.len() {
            warn!(
                "snapshot length {} does not match buffer length {}",
                snapshot.len(),
                self.pixels.len()
            );
            return Err("snapshot length does not match the buffer size");
        }
        self.pixels.copy_from_slice(snapshot);
        self.dirty = DirtyRegion::Everything;
        Ok(())
    }

    /// A nearest-neighbor resampled copy, used by destructive layer resizes.
    pub fn resampled(&self, width: u32, height: u32) -> PixelBuffer {
        assert!(width > 0 && height > 0);
        let mut pixels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            let sy = (y as u64 * self.height as u64 / height as u64) as i32;
            for x in 0..width {
                let sx = (x as u64 * self.width as u64 / width as u64) as i32;
                pixels.push(self.pixel_at(sx, sy));
            }
        }
        PixelBuffer {
            width,
            height,
            pixels,
            dirty: DirtyRegion::Everything,
        }
    }
}
