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

use super::color::{channel_to_f32, float_to_pixel, pixel_to_float, ALPHA_CHANNEL};
use super::rasterop;
use super::{Color, DisplaySurface, FloatPixel, Layer, LayerID, Pixel};

/// Effective per-pixel alpha at or below this contributes nothing to the
/// composite.
const ALPHA_EPSILON: f32 = 1.0 / 65536.0;

/// The ordered layer stack and its composited output.
///
/// Index 0 is the bottom-most layer (paint order is bottom to top). The
/// composite accumulates in normalized floats, separate from the per-layer
/// byte buffers, so stacking many semi-transparent layers doesn't band.
pub struct LayerStack {
    layers: Vec<Layer>,
    active: usize,
    width: u32,
    height: u32,
    pub background: Color,
    composite: Vec<FloatPixel>,
    next_id: LayerID,
}

impl LayerStack {
    /// A new stack starts with one blank canvas-sized layer; the stack is
    /// never empty after this.
    pub fn new(width: u32, height: u32, background: Color) -> LayerStack {
        assert!(width > 0 && height > 0);
        let mut stack = LayerStack {
            layers: Vec::new(),
            active: 0,
            width,
            height,
            background,
            composite: vec![background.as_float_pixel(); (width * height) as usize],
            next_id: 1,
        };
        stack.create_layer(None, None);
        stack
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn set_active(&mut self, index: usize) -> bool {
        if index < self.layers.len() {
            self.active = index;
            true
        } else {
            false
        }
    }

    pub fn active_layer(&self) -> &Layer {
        &self.layers[self.active]
    }

    pub fn active_layer_mut(&mut self) -> &mut Layer {
        &mut self.layers[self.active]
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    pub fn iter_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    fn next_id(&mut self) -> LayerID {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Append a blank canvas-sized layer on top of the stack and make it
    /// the active layer.
    pub fn create_layer(&mut self, title: Option<&str>, fill: Option<&Color>) -> LayerID {
        let id = self.next_id();
        let mut layer = Layer::new(
            id,
            self.width,
            self.height,
            fill.unwrap_or(&Color::TRANSPARENT),
        );
        layer.metadata.title = match title {
            Some(t) => t.to_string(),
            None => format!("Layer {id}"),
        };
        self.layers.push(layer);
        self.active = self.layers.len() - 1;
        id
    }

    /// Append a layer initialized from imported pixel data. The layer keeps
    /// the image's dimensions, which need not match the canvas.
    pub fn create_layer_from_image(
        &mut self,
        width: u32,
        height: u32,
        pixels: Vec<Pixel>,
        title: Option<&str>,
    ) -> Result<LayerID, &'static str> {
        let id = self.next_id();
        let mut layer = Layer::from_image(id, width, height, pixels)?;
        layer.metadata.title = match title {
            Some(t) => t.to_string(),
            None => format!("Layer {id}"),
        };
        self.layers.push(layer);
        self.active = self.layers.len() - 1;
        Ok(id)
    }

    /// Remove a layer. The last remaining layer can not be deleted.
    pub fn delete_layer(&mut self, index: usize) -> bool {
        if self.layers.len() <= 1 {
            warn!("refusing to delete the only layer");
            return false;
        }
        if index >= self.layers.len() {
            warn!("delete_layer: no layer at index {index}");
            return false;
        }

        self.layers.remove(index);
        if self.active > index {
            self.active -= 1;
        } else if self.active >= self.layers.len() {
            self.active = self.layers.len() - 1;
        }
        true
    }

    /// Swap a layer with the one above it. The active index follows the
    /// moved layer.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index + 1 >= self.layers.len() {
            return false;
        }
        self.layers.swap(index, index + 1);
        if self.active == index {
            self.active = index + 1;
        } else if self.active == index + 1 {
            self.active = index;
        }
        true
    }

    /// Swap a layer with the one below it.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.layers.len() {
            return false;
        }
        self.layers.swap(index, index - 1);
        if self.active == index {
            self.active = index - 1;
        } else if self.active == index - 1 {
            self.active = index;
        }
        true
    }

    /// Insert a deep copy immediately above the source layer and make it
    /// active.
    pub fn duplicate_layer(&mut self, index: usize) -> Option<LayerID> {
        if index >= self.layers.len() {
            return None;
        }
        let id = self.next_id();
        let mut copy = self.layers[index].duplicate(id);
        copy.metadata.title.push_str(" copy");
        self.layers.insert(index + 1, copy);
        self.active = index + 1;
        Some(id)
    }

    /// Blend a layer onto the one below it and remove it.
    ///
    /// Only pixels with nonzero alpha are blended, with the top layer's
    /// opacity as the blend factor, clipped to the intersection of both
    /// layers' dimensions. Rejected when the target layer is locked or
    /// there is nothing below the given index.
    pub fn merge_down(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.layers.len() {
            warn!("merge_down: no layer below index {index}");
            return false;
        }
        if self.layers[index - 1].metadata.locked {
            warn!("merge_down: target layer is locked");
            return false;
        }

        let (below, above) = self.layers.split_at_mut(index);
        let target = &mut below[index - 1];
        let source = &above[0];

        let w = target.width().min(source.width()) as i32;
        let h = target.height().min(source.height()) as i32;
        let opacity = source.metadata.opacity;

        for y in 0..h {
            for x in 0..w {
                let p = source.pixel_at(x, y);
                if p[ALPHA_CHANNEL] > 0 {
                    target.draw_pixel(x, y, &Color::from_pixel(p), opacity);
                }
            }
        }

        self.layers.remove(index);
        if self.active > index {
            self.active -= 1;
        } else if self.active >= self.layers.len() {
            self.active = self.layers.len() - 1;
        }
        true
    }

    /// Composite the currently visible layers into one new layer on top of
    /// the stack and remove the originals. Hidden layers are untouched.
    ///
    /// The merged layer is built over transparency, not the background, so
    /// restacking it stays lossless.
    pub fn merge_visible(&mut self) -> bool {
        if !self.layers.iter().any(|l| l.is_visible()) {
            warn!("merge_visible: no visible layers");
            return false;
        }

        let mut merged = vec![Color::TRANSPARENT.as_float_pixel(); (self.width * self.height) as usize];
        composite_layers(
            &mut merged,
            self.width,
            self.height,
            &mut self.layers,
            |l| l.is_visible(),
        );
        let pixels: Vec<Pixel> = merged.iter().map(|p| float_to_pixel(*p)).collect();

        self.layers.retain(|l| !l.is_visible());

        let layer = self.layer_from_canvas_pixels(pixels, "Merged");
        self.layers.push(layer);
        self.active = self.layers.len() - 1;
        true
    }

    /// Composite the whole stack into a single layer, discarding every
    /// other layer. The background color is baked in, matching what an
    /// exported image looks like.
    pub fn flatten(&mut self) {
        let mut flat = vec![self.background.as_float_pixel(); (self.width * self.height) as usize];
        composite_layers(&mut flat, self.width, self.height, &mut self.layers, |l| {
            l.is_visible()
        });
        let pixels: Vec<Pixel> = flat.iter().map(|p| float_to_pixel(*p)).collect();

        let layer = self.layer_from_canvas_pixels(pixels, "Flattened");
        self.layers.clear();
        self.layers.push(layer);
        self.active = 0;
    }

    fn layer_from_canvas_pixels(&mut self, pixels: Vec<Pixel>, title: &str) -> Layer {
        let id = self.next_id();
        // The pixel vector is always canvas-sized here
        let mut layer = Layer::from_image(id, self.width, self.height, pixels).unwrap();
        layer.metadata.title = title.to_string();
        layer
    }

    /// Rebuild the composite output raster.
    ///
    /// Every output pixel starts at the background color; visible layers
    /// are then blended in bottom-to-top order. This is a full-canvas pass
    /// and is never run in the middle of a stroke.
    pub fn composite(&mut self) -> &[FloatPixel] {
        let background = self.background.as_float_pixel();
        self.composite.fill(background);
        composite_layers(
            &mut self.composite,
            self.width,
            self.height,
            &mut self.layers,
            |l| l.is_visible(),
        );
        &self.composite
    }

    /// The composite color at a canvas coordinate, as of the latest
    /// `composite()` call.
    pub fn composite_color_at(&self, x: i32, y: i32) -> Option<Color> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let p = self.composite[(y as u32 * self.width + x as u32) as usize];
        Some(Color::from_float_pixel(p))
    }

    /// The latest composite converted to packed bytes, for an external
    /// image codec.
    pub fn composite_to_pixels(&self) -> Vec<Pixel> {
        self.composite.iter().map(|p| float_to_pixel(*p)).collect()
    }

    /// Push the latest composite to the composite display surface.
    pub fn present_composite(&self, surface: &mut dyn DisplaySurface) {
        let pixels = self.composite_to_pixels();
        surface.present(self.width, self.height, &pixels);
    }
}

/// Blend the layers accepted by `filter` into `dest`, bottom to top.
/// Pending buffer changes are flushed before a layer is read.
fn composite_layers<F>(dest: &mut [FloatPixel], width: u32, height: u32, layers: &mut [Layer], filter: F)
where
    F: Fn(&Layer) -> bool,
{
    for layer in layers.iter_mut() {
        if !filter(layer) {
            continue;
        }
        layer.apply_changes();

        let opacity = layer.metadata.opacity;
        let mode = layer.metadata.blendmode;
        let lw = layer.width().min(width);
        let lh = layer.height().min(height);
        let stride = layer.width() as usize;
        let pixels = layer.buffer().pixels();

        for y in 0..lh {
            let row = &pixels[y as usize * stride..y as usize * stride + lw as usize];
            let out = &mut dest[(y * width) as usize..(y * width + lw) as usize];
            for (d, p) in out.iter_mut().zip(row.iter()) {
                let a = channel_to_f32(p[ALPHA_CHANNEL]) * opacity;
                if a > ALPHA_EPSILON {
                    let fp = pixel_to_float(*p);
                    rasterop::composite_over(d, &[fp[0], fp[1], fp[2]], a, mode);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Blendmode;

    fn stack() -> LayerStack {
        LayerStack::new(16, 16, Color::TRANSPARENT)
    }

    #[test]
    fn test_initial_stack() {
        let s = stack();
        assert_eq!(s.layer_count(), 1);
        assert_eq!(s.active_index(), 0);
    }

    #[test]
    fn test_create_and_delete() {
        let mut s = stack();
        s.create_layer(Some("ink"), None);
        assert_eq!(s.layer_count(), 2);
        assert_eq!(s.active_index(), 1);
        assert_eq!(s.active_layer().metadata.title, "ink");

        assert!(s.delete_layer(1));
        assert_eq!(s.layer_count(), 1);
        assert_eq!(s.active_index(), 0);

        // The last layer can not be deleted
        assert!(!s.delete_layer(0));
        assert_eq!(s.layer_count(), 1);
    }

    #[test]
    fn test_delete_adjusts_active_index() {
        let mut s = stack();
        s.create_layer(None, None);
        s.create_layer(None, None);
        s.set_active(2);

        assert!(s.delete_layer(0));
        assert_eq!(s.active_index(), 1);
        assert_eq!(s.layer_count(), 2);
    }

    #[test]
    fn test_move_follows_active() {
        let mut s = stack();
        let a = s.create_layer(Some("a"), None);
        s.create_layer(Some("b"), None);
        s.set_active(1);

        assert!(s.move_up(1));
        assert_eq!(s.active_index(), 2);
        assert_eq!(s.active_layer().id(), a);

        assert!(!s.move_up(2));
        assert!(s.move_down(2));
        assert_eq!(s.active_index(), 1);
        assert!(!s.move_down(0));
    }

    #[test]
    fn test_duplicate() {
        let mut s = stack();
        s.active_layer_mut().set_pixel(3, 3, [1, 2, 3, 255]);
        s.active_layer_mut().metadata.title = "base".to_string();

        let id = s.duplicate_layer(0).unwrap();
        assert_eq!(s.layer_count(), 2);
        assert_eq!(s.active_index(), 1);
        assert_eq!(s.active_layer().id(), id);
        assert_eq!(s.active_layer().metadata.title, "base copy");
        assert_eq!(s.active_layer().pixel_at(3, 3), [1, 2, 3, 255]);
    }

    #[test]
    fn test_merge_down_transparent_top_is_identity() {
        let mut s = stack();
        s.active_layer_mut().clear(&Color::rgb8(10, 20, 30));
        s.create_layer(None, None);

        let before = s.layer(0).unwrap().buffer().snapshot();
        assert!(s.merge_down(1));
        assert_eq!(s.layer_count(), 1);
        assert_eq!(s.layer(0).unwrap().buffer().snapshot(), before);
    }

    #[test]
    fn test_merge_down_blends_with_opacity() {
        let mut s = stack();
        s.active_layer_mut().clear(&Color::WHITE);
        s.create_layer(None, None);
        s.active_layer_mut().clear(&Color::rgb8(255, 0, 0));
        s.active_layer_mut().metadata.opacity = 0.5;

        assert!(s.merge_down(1));
        let p = s.layer(0).unwrap().pixel_at(8, 8);
        assert_eq!(p[0], 255);
        assert!((p[1] as i32 - 128).abs() <= 1);
        assert!((p[2] as i32 - 128).abs() <= 1);
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_merge_down_rejections() {
        let mut s = stack();
        s.create_layer(None, None);

        assert!(!s.merge_down(0));
        assert!(!s.merge_down(5));

        s.layer_mut(0).unwrap().metadata.locked = true;
        assert!(!s.merge_down(1));
        assert_eq!(s.layer_count(), 2);
    }

    #[test]
    fn test_composite_background_fallback() {
        let mut s = LayerStack::new(8, 8, Color::rgb8(40, 50, 60));
        s.active_layer_mut().metadata.hidden = true;

        let out = s.composite();
        let expected = Color::rgb8(40, 50, 60).as_float_pixel();
        for p in out {
            assert_eq!(*p, expected);
        }
    }

    #[test]
    fn test_composite_half_opacity_blend() {
        let mut s = LayerStack::new(4, 4, Color::BLACK);
        s.active_layer_mut().clear(&Color::WHITE);
        s.create_layer(None, None);
        s.active_layer_mut().clear(&Color::rgb8(0, 0, 255));
        s.active_layer_mut().metadata.opacity = 0.5;

        let out = s.composite().to_vec();
        for p in out {
            assert!((p[0] - 0.5).abs() < 0.01);
            assert!((p[1] - 0.5).abs() < 0.01);
            assert!((p[2] - 1.0).abs() < 0.01);
            assert_eq!(p[3], 1.0);
        }

        let c = s.composite_color_at(0, 0).unwrap();
        assert!((c.r - 0.5).abs() < 0.01);
        assert!(s.composite_color_at(-1, 0).is_none());
    }

    #[test]
    fn test_composite_multiply_mode() {
        let mut s = LayerStack::new(2, 2, Color::TRANSPARENT);
        s.active_layer_mut().clear(&Color::rgb8(128, 128, 128));
        s.create_layer(None, None);
        s.active_layer_mut().clear(&Color::rgb8(128, 128, 128));
        s.active_layer_mut().metadata.blendmode = Blendmode::Multiply;

        let out = s.composite().to_vec();
        // 0.5 * 0.5 = 0.25
        assert!((out[0][0] - 0.25).abs() < 0.01);
    }

    #[test]
    fn test_merge_visible_keeps_hidden_layers() {
        let mut s = stack();
        s.active_layer_mut().clear(&Color::rgb8(255, 0, 0));
        s.create_layer(Some("hidden"), None);
        s.active_layer_mut().metadata.hidden = true;
        s.create_layer(None, Some(&Color::rgb8(0, 255, 0)));

        assert!(s.merge_visible());
        assert_eq!(s.layer_count(), 2);
        assert_eq!(s.layer(0).unwrap().metadata.title, "hidden");
        assert_eq!(s.active_layer().metadata.title, "Merged");
        // The green top layer was opaque
        assert_eq!(s.active_layer().pixel_at(0, 0), [0, 255, 0, 255]);
    }

    #[test]
    fn test_flatten() {
        let mut s = LayerStack::new(4, 4, Color::WHITE);
        s.create_layer(None, Some(&Color::rgb8(255, 0, 0)));
        s.create_layer(None, None);
        assert_eq!(s.layer_count(), 3);

        s.flatten();
        assert_eq!(s.layer_count(), 1);
        assert_eq!(s.active_index(), 0);
        assert_eq!(s.layer(0).unwrap().pixel_at(2, 2), [255, 0, 0, 255]);
    }

    #[test]
    fn test_layer_from_image_sizing() {
        let mut s = stack();
        let id = s
            .create_layer_from_image(2, 2, vec![[9, 9, 9, 255]; 4], Some("import"))
            .unwrap();
        assert_eq!(s.active_layer().id(), id);
        assert_eq!(s.active_layer().width(), 2);

        assert!(s
            .create_layer_from_image(3, 3, vec![[0, 0, 0, 0]; 2], None)
            .is_err());
    }
}
