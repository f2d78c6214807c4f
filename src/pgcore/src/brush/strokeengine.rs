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

use std::time::{Duration, Instant};

use tracing::debug;

use super::BrushConfig;
use crate::paint::{Color, LayerStack};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Tool {
    Brush,
    Eraser,
    Eyedropper,
    Fill,
}

#[derive(Eq, PartialEq)]
enum StrokeState {
    Idle,
    Stroking,
}

/// Turns pointer samples into drawing operations on the active layer.
///
/// One engine drives one pointer. The host feeds it begin/continue/end
/// events with canvas-space coordinates and pen pressure; the engine maps
/// them through the brush configuration and rate-limits how often the
/// active layer is pushed to its display surface. The full stack composite
/// is never run from inside a stroke; only the fill tool refreshes it,
/// since a fill can change shape boundaries anywhere on the canvas.
pub struct StrokeEngine {
    tool: Tool,
    brush: BrushConfig,
    state: StrokeState,
    last_x: f32,
    last_y: f32,
    dab_distance: i32,
    needs_flush: bool,
    last_flush: Instant,
    flush_interval: Duration,
    jitter_state: u32,
}

impl StrokeEngine {
    pub fn new() -> StrokeEngine {
        StrokeEngine {
            tool: Tool::Brush,
            brush: BrushConfig::default(),
            state: StrokeState::Idle,
            last_x: 0.0,
            last_y: 0.0,
            dab_distance: 0,
            needs_flush: false,
            last_flush: Instant::now(),
            flush_interval: Duration::from_millis(16),
            jitter_state: 1,
        }
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Swap in a brush configuration from the host. Takes effect on the
    /// next dab.
    pub fn set_brush(&mut self, brush: BrushConfig) {
        self.brush = brush;
    }

    pub fn brush(&self) -> &BrushConfig {
        &self.brush
    }

    /// The current brush color; updated by the eyedropper tool.
    pub fn picked_color(&self) -> Color {
        self.brush.color
    }

    /// How often, at most, the active layer is pushed to its display
    /// surface during a stroke.
    pub fn set_flush_interval(&mut self, interval: Duration) {
        self.flush_interval = interval;
    }

    pub fn begin_stroke(&mut self, stack: &mut LayerStack, x: f32, y: f32, pressure: f32) {
        debug!("begin stroke at {x},{y} with {:?}", self.tool);
        self.state = StrokeState::Stroking;
        self.dab_distance = 0;
        // Reseed the scatter generator so identical strokes come out
        // pixel-identical on every platform
        self.jitter_state = (x.to_bits() ^ y.to_bits().rotate_left(16)) | 1;

        match self.tool {
            Tool::Brush => {
                let size = self.brush.effective_size(pressure);
                let opacity = self.brush.effective_opacity(pressure);
                let (jx, jy) = self.jitter_offset(size);
                let color = self.brush.color;
                let shape = self.brush.shape;
                let hardness = self.brush.hardness;
                let anti_alias = self.brush.anti_alias;
                stack.active_layer_mut().draw_brush_circle(
                    (x + jx) as i32,
                    (y + jy) as i32,
                    size / 2.0,
                    &color,
                    opacity,
                    shape,
                    hardness,
                    anti_alias,
                );
                self.needs_flush = true;
            }
            Tool::Eraser => {
                let size = self.brush.effective_size(pressure);
                let strength = self.brush.effective_opacity(pressure);
                let shape = self.brush.shape;
                let hardness = self.brush.hardness;
                stack.active_layer_mut().erase_brush_circle(
                    x as i32,
                    y as i32,
                    size / 2.0,
                    strength,
                    shape,
                    hardness,
                );
                self.needs_flush = true;
            }
            Tool::Eyedropper => {
                stack.composite();
                if let Some(c) = stack.composite_color_at(x as i32, y as i32) {
                    self.brush.color = c;
                }
            }
            Tool::Fill => {
                let color = self.brush.color;
                let layer = stack.active_layer_mut();
                if layer.flood_fill(x as i32, y as i32, &color) {
                    // A fill can change visible shape boundaries across
                    // disconnected regions, so refresh the whole composite
                    layer.apply_changes();
                    stack.composite();
                }
            }
        }

        self.last_x = x;
        self.last_y = y;
    }

    pub fn continue_stroke(&mut self, stack: &mut LayerStack, x: f32, y: f32, pressure: f32) {
        if self.state != StrokeState::Stroking {
            return;
        }
        if x == self.last_x && y == self.last_y {
            return;
        }

        match self.tool {
            Tool::Brush => {
                let size = self.brush.effective_size(pressure);
                let opacity = self.brush.effective_opacity(pressure);
                let (jx, jy) = self.jitter_offset(size);
                let color = self.brush.color;
                let shape = self.brush.shape;
                let hardness = self.brush.hardness;
                let anti_alias = self.brush.anti_alias;
                self.dab_distance = stack.active_layer_mut().draw_brush_line(
                    self.last_x as i32,
                    self.last_y as i32,
                    (x + jx) as i32,
                    (y + jy) as i32,
                    &color,
                    size,
                    opacity,
                    shape,
                    hardness,
                    anti_alias,
                    self.dab_distance,
                );
                self.needs_flush = true;
            }
            Tool::Eraser => {
                let size = self.brush.effective_size(pressure);
                let strength = self.brush.effective_opacity(pressure);
                let shape = self.brush.shape;
                let hardness = self.brush.hardness;
                self.dab_distance = stack.active_layer_mut().erase_brush_line(
                    self.last_x as i32,
                    self.last_y as i32,
                    x as i32,
                    y as i32,
                    size,
                    strength,
                    shape,
                    hardness,
                    self.dab_distance,
                );
                self.needs_flush = true;
            }
            Tool::Eyedropper | Tool::Fill => {}
        }

        self.last_x = x;
        self.last_y = y;
        self.maybe_flush(stack);
    }

    pub fn end_stroke(&mut self, stack: &mut LayerStack) {
        if self.needs_flush {
            stack.active_layer_mut().apply_changes();
            self.needs_flush = false;
            self.last_flush = Instant::now();
        }
        self.state = StrokeState::Idle;
        self.dab_distance = 0;
    }

    /// The time-gated flush: pushes pending changes to the layer's display
    /// surface at a bounded rate so a fast pointer doesn't trigger a
    /// present per sample.
    fn maybe_flush(&mut self, stack: &mut LayerStack) {
        if self.needs_flush && self.last_flush.elapsed() >= self.flush_interval {
            stack.active_layer_mut().apply_changes();
            self.needs_flush = false;
            self.last_flush = Instant::now();
        }
    }

    fn jitter_offset(&mut self, size: f32) -> (f32, f32) {
        if self.brush.jitter <= 0.0 {
            return (0.0, 0.0);
        }
        let amplitude = self.brush.jitter * size * 0.5;
        (
            self.next_rand() * amplitude,
            self.next_rand() * amplitude,
        )
    }

    // xorshift32; fast and identical everywhere, which is all dab scatter
    // needs
    fn next_rand(&mut self) -> f32 {
        let mut x = self.jitter_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.jitter_state = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

impl Default for StrokeEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::color::ZERO_PIXEL;

    fn setup() -> (StrokeEngine, LayerStack) {
        let mut engine = StrokeEngine::new();
        engine.set_flush_interval(Duration::ZERO);
        let stack = LayerStack::new(32, 32, Color::WHITE);
        (engine, stack)
    }

    fn hard_brush(size: f32) -> BrushConfig {
        BrushConfig {
            size,
            hardness: 1.0,
            anti_alias: false,
            color: Color::rgb8(255, 0, 0),
            ..BrushConfig::default()
        }
    }

    #[test]
    fn test_continue_before_begin_is_noop() {
        let (mut engine, mut stack) = setup();
        engine.continue_stroke(&mut stack, 10.0, 10.0, 1.0);
        assert!(!stack.active_layer().buffer().is_dirty());
        assert_eq!(stack.active_layer().pixel_at(10, 10), ZERO_PIXEL);
    }

    #[test]
    fn test_brush_stroke_paints_line() {
        let (mut engine, mut stack) = setup();
        engine.set_brush(hard_brush(2.0));

        engine.begin_stroke(&mut stack, 4.0, 4.0, 1.0);
        engine.continue_stroke(&mut stack, 12.0, 4.0, 1.0);
        engine.end_stroke(&mut stack);

        for x in 4..=12 {
            assert_eq!(stack.active_layer().pixel_at(x, 4), [255, 0, 0, 255]);
        }
        assert_eq!(stack.active_layer().pixel_at(4, 10), ZERO_PIXEL);
    }

    #[test]
    fn test_eraser_stroke() {
        let (mut engine, mut stack) = setup();
        stack.active_layer_mut().clear(&Color::rgb8(0, 0, 0));
        engine.set_brush(hard_brush(4.0));
        engine.set_tool(Tool::Eraser);

        engine.begin_stroke(&mut stack, 10.0, 10.0, 1.0);
        engine.end_stroke(&mut stack);

        assert_eq!(stack.active_layer().pixel_at(10, 10)[3], 0);
        assert_eq!(stack.active_layer().pixel_at(0, 0)[3], 255);
    }

    #[test]
    fn test_eyedropper_picks_composite_color() {
        let (mut engine, mut stack) = setup();
        stack.active_layer_mut().clear(&Color::rgb8(0, 128, 255));
        engine.set_tool(Tool::Eyedropper);

        engine.begin_stroke(&mut stack, 5.0, 5.0, 1.0);
        engine.end_stroke(&mut stack);

        assert_eq!(engine.picked_color(), Color::rgb8(0, 128, 255));
        // Nothing was painted
        assert_eq!(stack.active_layer().pixel_at(5, 5), Color::rgb8(0, 128, 255).as_pixel());
    }

    #[test]
    fn test_fill_tool_refreshes_composite() {
        let (mut engine, mut stack) = setup();
        engine.set_brush(BrushConfig {
            color: Color::rgb8(0, 255, 0),
            ..BrushConfig::default()
        });
        engine.set_tool(Tool::Fill);

        engine.begin_stroke(&mut stack, 8.0, 8.0, 1.0);
        engine.end_stroke(&mut stack);

        assert_eq!(stack.active_layer().pixel_at(0, 0), [0, 255, 0, 255]);
        let c = stack.composite_color_at(0, 0).unwrap();
        assert_eq!(c, Color::rgb8(0, 255, 0));
        assert!(!stack.active_layer().buffer().is_dirty());
    }

    #[test]
    fn test_flush_throttle() {
        let (mut engine, mut stack) = setup();
        engine.set_brush(hard_brush(2.0));
        // An effectively infinite interval: nothing flushes mid-stroke
        engine.set_flush_interval(Duration::from_secs(3600));

        engine.begin_stroke(&mut stack, 2.0, 2.0, 1.0);
        engine.continue_stroke(&mut stack, 10.0, 2.0, 1.0);
        assert!(stack.active_layer().buffer().is_dirty());

        // The final flush is not throttled
        engine.end_stroke(&mut stack);
        assert!(!stack.active_layer().buffer().is_dirty());
    }

    #[test]
    fn test_repeated_position_is_ignored() {
        let (mut engine, mut stack) = setup();
        engine.set_brush(BrushConfig {
            opacity: 0.5,
            ..hard_brush(2.0)
        });

        engine.begin_stroke(&mut stack, 5.0, 5.0, 1.0);
        let after_begin = stack.active_layer().pixel_at(5, 5);
        engine.continue_stroke(&mut stack, 5.0, 5.0, 1.0);
        engine.continue_stroke(&mut stack, 5.0, 5.0, 1.0);
        engine.end_stroke(&mut stack);

        // Repeated samples at the same position must not accumulate opacity
        assert_eq!(stack.active_layer().pixel_at(5, 5), after_begin);
    }

    #[test]
    fn test_jitter_is_deterministic() {
        let run = || {
            let mut engine = StrokeEngine::new();
            engine.set_flush_interval(Duration::ZERO);
            engine.set_brush(BrushConfig {
                jitter: 0.5,
                ..hard_brush(4.0)
            });
            let mut stack = LayerStack::new(32, 32, Color::WHITE);
            engine.begin_stroke(&mut stack, 16.0, 16.0, 1.0);
            engine.continue_stroke(&mut stack, 24.0, 16.0, 1.0);
            engine.end_stroke(&mut stack);
            stack.active_layer_mut().export_raster()
        };

        assert_eq!(run(), run());
    }
}
