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

//! Renders a scripted demo scene through the whole painting pipeline and
//! writes the composite out as a PNG. Mostly useful for eyeballing engine
//! changes without booting the full application.

use std::f32::consts::PI;

use anyhow::{Context, Result};
use image::RgbaImage;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pgcore::brush::{BrushConfig, BrushShape, StrokeEngine, Tool};
use pgcore::paint::{Blendmode, Color, LayerStack};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let flags = xflags::parse_or_exit! {
        /// Canvas width in pixels (default 512).
        optional --width width: u32
        /// Canvas height in pixels (default 512).
        optional --height height: u32
        /// Background color as #rrggbb or #rrggbbaa (default white).
        optional -b,--background background: String
        /// Output PNG path.
        required output: String
    };

    let width = flags.width.unwrap_or(512);
    let height = flags.height.unwrap_or(512);
    let background = match flags.background {
        Some(s) => s
            .parse::<Color>()
            .map_err(|e| anyhow::anyhow!(e))
            .context("invalid background color")?,
        None => Color::WHITE,
    };

    let mut stack = LayerStack::new(width, height, background);
    paint_scene(&mut stack, width, height);

    stack.composite();
    let pixels = stack.composite_to_pixels();

    let mut img = RgbaImage::new(width, height);
    for (i, p) in pixels.iter().enumerate() {
        img.put_pixel(i as u32 % width, i as u32 / width, image::Rgba(*p));
    }
    img.save(&flags.output)
        .with_context(|| format!("couldn't write {}", flags.output))?;

    info!("wrote {}x{} composite to {}", width, height, flags.output);
    Ok(())
}

/// A little of everything: strokes on several layers, blend modes, an
/// eraser pass and a flood fill.
fn paint_scene(stack: &mut LayerStack, width: u32, height: u32) {
    let w = width as f32;
    let h = height as f32;
    let mut engine = StrokeEngine::new();

    // Soft shading on the base layer
    engine.set_brush(BrushConfig {
        size: w / 4.0,
        shape: BrushShape::Soft,
        hardness: 0.6,
        opacity: 0.6,
        color: Color::rgb8(140, 170, 220),
        ..BrushConfig::default()
    });
    engine.begin_stroke(stack, w * 0.3, h * 0.35, 1.0);
    engine.continue_stroke(stack, w * 0.7, h * 0.4, 0.8);
    engine.continue_stroke(stack, w * 0.5, h * 0.7, 0.6);
    engine.end_stroke(stack);

    // Ink lines on their own layer
    stack.create_layer(Some("ink"), None);
    engine.set_brush(BrushConfig {
        size: 6.0,
        size_pressure: true,
        color: Color::rgb8(30, 30, 40),
        ..BrushConfig::default()
    });
    for arc in 0..3 {
        let y = h * (0.25 + arc as f32 * 0.2);
        engine.begin_stroke(stack, w * 0.1, y, 0.1);
        let steps = 48;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let wave = (t * PI * 2.0 + arc as f32).sin();
            engine.continue_stroke(stack, w * (0.1 + t * 0.8), y + wave * h * 0.05, t);
        }
        engine.end_stroke(stack);
    }

    // Erase a window through the ink
    engine.set_tool(Tool::Eraser);
    engine.set_brush(BrushConfig {
        size: w / 6.0,
        hardness: 0.5,
        ..BrushConfig::default()
    });
    engine.begin_stroke(stack, w * 0.5, h * 0.45, 1.0);
    engine.end_stroke(stack);
    engine.set_tool(Tool::Brush);

    // A multiply shade layer
    stack.create_layer(Some("shade"), None);
    stack.active_layer_mut().metadata.blendmode = Blendmode::Multiply;
    stack.active_layer_mut().metadata.opacity = 0.8;
    engine.set_brush(BrushConfig {
        size: w / 3.0,
        shape: BrushShape::Airbrush,
        hardness: 0.9,
        color: Color::rgb8(150, 130, 160),
        ..BrushConfig::default()
    });
    engine.begin_stroke(stack, w * 0.75, h * 0.75, 1.0);
    engine.end_stroke(stack);

    // Fill a corner region on a fresh top layer
    stack.create_layer(Some("fill"), None);
    engine.set_brush(BrushConfig {
        size: 3.0,
        color: Color::rgb8(240, 200, 80),
        ..BrushConfig::default()
    });
    engine.begin_stroke(stack, w * 0.05, h * 0.05, 1.0);
    engine.continue_stroke(stack, w * 0.25, h * 0.05, 1.0);
    engine.continue_stroke(stack, w * 0.05, h * 0.25, 1.0);
    engine.continue_stroke(stack, w * 0.05, h * 0.05, 1.0);
    engine.end_stroke(stack);

    engine.set_tool(Tool::Fill);
    engine.begin_stroke(stack, w * 0.08, h * 0.08, 1.0);
    engine.end_stroke(stack);
}
