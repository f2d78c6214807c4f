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

use std::f32::consts::PI;

use pgcore::brush::{BrushConfig, BrushShape, StrokeEngine};
use pgcore::paint::{Color, LayerStack};

mod utils;

fn draw_wavy_line(
    engine: &mut StrokeEngine,
    stack: &mut LayerStack,
    x: f32,
    y: f32,
    width: f32,
    amplitude: f32,
) {
    engine.begin_stroke(stack, x, y, 0.0);
    let steps = (width / 4.0) as i32;
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        let wave = (t * PI * 4.0).sin();
        engine.continue_stroke(stack, x + t * width, y + wave * amplitude, t.min(1.0));
    }
    engine.end_stroke(stack);
}

fn main() {
    let mut stack = LayerStack::new(512, 360, Color::WHITE);
    let mut engine = StrokeEngine::new();

    // Pressure-sized round brush
    engine.set_brush(BrushConfig {
        size: 12.0,
        size_pressure: true,
        ..BrushConfig::default()
    });
    draw_wavy_line(&mut engine, &mut stack, 20.0, 50.0, 472.0, 20.0);

    // Soft red brush with pressure-driven opacity
    engine.set_brush(BrushConfig {
        size: 16.0,
        shape: BrushShape::Soft,
        hardness: 0.9,
        opacity_pressure: true,
        color: Color::rgb8(220, 40, 40),
        ..BrushConfig::default()
    });
    draw_wavy_line(&mut engine, &mut stack, 20.0, 130.0, 472.0, 20.0);

    // Airbrush
    engine.set_brush(BrushConfig {
        size: 24.0,
        shape: BrushShape::Airbrush,
        hardness: 0.8,
        color: Color::rgb8(40, 90, 220),
        ..BrushConfig::default()
    });
    draw_wavy_line(&mut engine, &mut stack, 20.0, 210.0, 472.0, 20.0);

    // Marker with scatter
    engine.set_brush(BrushConfig {
        size: 14.0,
        shape: BrushShape::Marker,
        jitter: 0.4,
        color: Color::rgb8(40, 160, 60),
        ..BrushConfig::default()
    });
    draw_wavy_line(&mut engine, &mut stack, 20.0, 290.0, 472.0, 20.0);

    stack.composite();
    let pixels = stack.composite_to_pixels();
    utils::save_png(
        "example_brush_strokes.png",
        stack.width(),
        stack.height(),
        &pixels,
    );
}
