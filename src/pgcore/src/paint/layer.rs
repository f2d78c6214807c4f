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

use tracing::{debug, warn};

use super::floodfill;
use super::{Blendmode, Color, DisplaySurface, LayerID, Pixel, PixelBuffer, Rectangle};
use crate::brush::BrushShape;

/// Common layer properties
#[derive(Clone, PartialEq, Debug)]
pub struct LayerMetadata {
    pub id: LayerID,
    pub title: String,
    pub opacity: f32,
    pub hidden: bool,
    pub locked: bool,
    pub blendmode: Blendmode,
}

impl LayerMetadata {
    /// A layer is visible when it's not explicitly hidden and its opacity is
    /// greater than zero.
    pub fn is_visible(&self) -> bool {
        !self.hidden && self.opacity > 0.0
    }
}

/// Where the layer sits on the canvas.
///
/// Pure presentation metadata: consumed by the host when it draws the
/// layer's surface, never by the pixel operations themselves.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub rotation: f32,
    pub pivot_x: f32,
    pub pivot_y: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            pivot_x: 0.0,
            pivot_y: 0.0,
        }
    }
}

/// One paintable surface in the stack: a pixel buffer plus its metadata.
///
/// All mutation goes through the layer so the lock flag can gate it. A
/// locked layer turns every write into a no-op instead of an error;
/// painting tools must never fail mid-stroke.
pub struct Layer {
    pub metadata: LayerMetadata,
    pub transform: Transform,
    crop: Option<Rectangle>,
    buffer: PixelBuffer,
    surface: Option<Box<dyn DisplaySurface>>,
}

impl Layer {
    pub fn new(id: LayerID, width: u32, height: u32, fill: &Color) -> Layer {
        Layer {
            metadata: LayerMetadata {
                id,
                title: String::new(),
                opacity: 1.0,
                hidden: false,
                locked: false,
                blendmode: Blendmode::Normal,
            },
            transform: Transform::default(),
            crop: None,
            buffer: PixelBuffer::filled(width, height, fill),
            surface: None,
        }
    }

    /// Build a layer from externally supplied pixel data (an imported
    /// image). The layer keeps the image's own dimensions.
    pub fn from_image(
        id: LayerID,
        width: u32,
        height: u32,
        pixels: Vec<Pixel>,
    ) -> Result<Layer, &'static str> {
        let buffer = PixelBuffer::from_pixels(width, height, pixels)?;
        let mut layer = Layer::new(id, 1, 1, &Color::TRANSPARENT);
        layer.buffer = buffer;
        Ok(layer)
    }

    pub fn id(&self) -> LayerID {
        self.metadata.id
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn is_visible(&self) -> bool {
        self.metadata.is_visible()
    }

    /// Attach the display surface this layer's buffer is presented on.
    pub fn attach_surface(&mut self, surface: Box<dyn DisplaySurface>) {
        self.surface = Some(surface);
    }

    fn writable(&self) -> bool {
        if self.metadata.locked {
            debug!("layer {} is locked, ignoring write", self.metadata.id);
            false
        } else {
            true
        }
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, pixel: Pixel) {
        if self.writable() {
            self.buffer.set_pixel(x, y, pixel);
        }
    }

    pub fn pixel_at(&self, x: i32, y: i32) -> Pixel {
        self.buffer.pixel_at(x, y)
    }

    /// Blend a color over one pixel.
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: &Color, opacity: f32) {
        if self.writable() {
            let p = color.as_pixel();
            self.buffer.blend_pixel(x, y, [p[0], p[1], p[2]], p[3], opacity);
        }
    }

    pub fn erase_pixel(&mut self, x: i32, y: i32, strength: f32) {
        if self.writable() {
            self.buffer.erase_pixel(x, y, strength);
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_brush_circle(
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
        if self.writable() {
            self.buffer
                .stamp_circle(cx, cy, radius, color, opacity, shape, hardness, anti_alias);
        }
    }

    pub fn erase_brush_circle(
        &mut self,
        cx: i32,
        cy: i32,
        radius: f32,
        strength: f32,
        shape: BrushShape,
        hardness: f32,
    ) {
        if self.writable() {
            self.buffer
                .erase_circle(cx, cy, radius, strength, shape, hardness);
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_brush_line(
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
        if self.writable() {
            self.buffer.stamp_line(
                x0,
                y0,
                x1,
                y1,
                color,
                thickness,
                opacity,
                shape,
                hardness,
                anti_alias,
                spacing_offset,
            )
        } else {
            spacing_offset
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn erase_brush_line(
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
        if self.writable() {
            self.buffer.erase_line(
                x0,
                y0,
                x1,
                y1,
                thickness,
                strength,
                shape,
                hardness,
                spacing_offset,
            )
        } else {
            spacing_offset
        }
    }

    /// Flood fill starting from the given pixel.
    pub fn flood_fill(&mut self, x: i32, y: i32, color: &Color) -> bool {
        if self.writable() {
            floodfill::flood_fill(&mut self.buffer, x, y, color)
        } else {
            false
        }
    }

    pub fn clear(&mut self, color: &Color) {
        if self.writable() {
            self.buffer.clear(color);
        }
    }

    /// Push pending buffer changes to the attached display surface.
    /// With no surface attached the dirty state still resets.
    pub fn apply_changes(&mut self) {
        match &mut self.surface {
            Some(s) => {
                self.buffer.flush(s.as_mut());
            }
            None => self.buffer.mark_clean(),
        }
    }

    /// Resample the layer content to a new size. Destructive: the previous
    /// pixel data is discarded.
    pub fn resize(&mut self, width: i32, height: i32) {
        if width <= 0 || height <= 0 {
            warn!("rejecting layer resize to {width}x{height}");
            return;
        }
        if !self.writable() {
            return;
        }
        self.buffer = self.buffer.resampled(width as u32, height as u32);
        self.crop = None;
    }

    /// Limit the visible source rectangle of this layer. Affects only what
    /// the presentation reads, not the buffer itself.
    pub fn set_crop(&mut self, rect: Rectangle) {
        self.crop = rect.cropped(self.buffer.width(), self.buffer.height());
    }

    pub fn reset_crop(&mut self) {
        self.crop = None;
    }

    pub fn crop(&self) -> Option<Rectangle> {
        self.crop
    }

    /// A deep copy with a new identity. The copy is not attached to any
    /// display surface.
    pub fn duplicate(&self, id: LayerID) -> Layer {
        Layer {
            metadata: LayerMetadata {
                id,
                ..self.metadata.clone()
            },
            transform: self.transform,
            crop: self.crop,
            buffer: self.buffer.clone(),
            surface: None,
        }
    }

    /// A full copy of the buffer, for an external undo manager.
    pub fn snapshot(&self) -> Vec<Pixel> {
        self.buffer.snapshot()
    }

    /// Roll the buffer back to a previously taken snapshot.
    pub fn restore(&mut self, snapshot: &[Pixel]) -> Result<(), &'static str> {
        if !self.writable() {
            return Err("layer is locked");
        }
        self.buffer.restore(snapshot)
    }

    /// The raster content, flushed and ready for an external image codec.
    pub fn export_raster(&mut self) -> Vec<Pixel> {
        self.apply_changes();
        self.buffer.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::color::ZERO_PIXEL;

    #[test]
    fn test_locked_layer_rejects_writes() {
        let mut layer = Layer::new(1, 8, 8, &Color::TRANSPARENT);
        layer.metadata.locked = true;

        layer.set_pixel(1, 1, [9, 9, 9, 9]);
        layer.draw_pixel(2, 2, &Color::BLACK, 1.0);
        layer.draw_brush_circle(4, 4, 2.0, &Color::BLACK, 1.0, BrushShape::Round, 1.0, false);
        layer.clear(&Color::WHITE);
        assert!(!layer.flood_fill(0, 0, &Color::BLACK));

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(layer.pixel_at(x, y), ZERO_PIXEL);
            }
        }

        layer.metadata.locked = false;
        layer.set_pixel(1, 1, [9, 9, 9, 9]);
        assert_eq!(layer.pixel_at(1, 1), [9, 9, 9, 9]);
    }

    #[test]
    fn test_duplicate_is_deep() {
        let mut layer = Layer::new(1, 4, 4, &Color::TRANSPARENT);
        layer.metadata.title = "sketch".into();
        layer.set_pixel(0, 0, [1, 2, 3, 4]);

        let mut copy = layer.duplicate(2);
        assert_eq!(copy.id(), 2);
        assert_eq!(copy.metadata.title, "sketch");
        assert_eq!(copy.pixel_at(0, 0), [1, 2, 3, 4]);

        copy.set_pixel(0, 0, [5, 6, 7, 8]);
        assert_eq!(layer.pixel_at(0, 0), [1, 2, 3, 4]);
    }

    #[test]
    fn test_resize_rejects_bad_dimensions() {
        let mut layer = Layer::new(1, 4, 4, &Color::WHITE);
        layer.resize(0, 10);
        layer.resize(10, -1);
        assert_eq!(layer.width(), 4);
        assert_eq!(layer.height(), 4);

        layer.resize(8, 2);
        assert_eq!(layer.width(), 8);
        assert_eq!(layer.height(), 2);
        assert_eq!(layer.pixel_at(7, 1), Color::WHITE.as_pixel());
    }

    #[test]
    fn test_crop_is_clamped() {
        let mut layer = Layer::new(1, 10, 10, &Color::TRANSPARENT);
        layer.set_crop(Rectangle::new(5, 5, 100, 100));
        assert_eq!(layer.crop(), Some(Rectangle::new(5, 5, 5, 5)));

        layer.set_crop(Rectangle::new(20, 20, 5, 5));
        assert_eq!(layer.crop(), None);

        layer.set_crop(Rectangle::new(1, 1, 2, 2));
        layer.reset_crop();
        assert_eq!(layer.crop(), None);
    }

    #[test]
    fn test_from_image() {
        let pixels = vec![[7, 7, 7, 255]; 6];
        let layer = Layer::from_image(3, 3, 2, pixels).unwrap();
        assert_eq!(layer.width(), 3);
        assert_eq!(layer.height(), 2);
        assert_eq!(layer.pixel_at(2, 1), [7, 7, 7, 255]);

        assert!(Layer::from_image(3, 4, 4, vec![ZERO_PIXEL; 3]).is_err());
    }
}
