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

use pgcore::brush::BrushShape;
use pgcore::paint::{Blendmode, Color, LayerStack};

mod utils;

fn main() {
    let mut stack = LayerStack::new(256, 256, Color::WHITE);

    // Base: a flat sky blue wash
    stack
        .active_layer_mut()
        .clear(&Color::rgb8(180, 210, 240));

    // A half-transparent red disc on its own layer
    stack.create_layer(Some("disc"), None);
    stack.active_layer_mut().metadata.opacity = 0.5;
    stack.active_layer_mut().draw_brush_circle(
        100,
        110,
        60.0,
        &Color::rgb8(230, 50, 50),
        1.0,
        BrushShape::Round,
        1.0,
        true,
    );

    // A multiply layer darkening the lower right
    stack.create_layer(Some("shade"), None);
    stack.active_layer_mut().metadata.blendmode = Blendmode::Multiply;
    stack.active_layer_mut().draw_brush_circle(
        170,
        170,
        70.0,
        &Color::rgb8(120, 120, 120),
        1.0,
        BrushShape::Soft,
        0.9,
        true,
    );

    // An additive highlight
    stack.create_layer(Some("glow"), None);
    stack.active_layer_mut().metadata.blendmode = Blendmode::Add;
    stack.active_layer_mut().draw_brush_circle(
        80,
        60,
        40.0,
        &Color::rgb8(90, 80, 30),
        1.0,
        BrushShape::Airbrush,
        1.0,
        true,
    );

    stack.composite();
    let pixels = stack.composite_to_pixels();
    utils::save_png(
        "example_layerstack.png",
        stack.width(),
        stack.height(),
        &pixels,
    );
}
