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

use super::color::{FloatPixel, Pixel, ALPHA_CHANNEL};
use super::Blendmode;

/// Fixed point multiply of two byte channels.
///
/// Exact at the endpoints: u8_mult(x, 255) == x and u8_mult(x, 0) == 0.
pub fn u8_mult(a: u32, b: u32) -> u32 {
    let c = a * b + 0x80;
    ((c >> 8) + c) >> 8
}

/// Blend a straight-alpha source color over a destination pixel.
///
/// The source coverage is `src_alpha` scaled by `opacity`; a zero effective
/// alpha leaves the destination untouched. Alpha accumulates towards opaque
/// and never decreases.
pub fn blend_over(dst: &mut Pixel, src: &[u8; 3], src_alpha: u8, opacity: f32) {
    let eff = ((src_alpha as f32 * opacity) + 0.5) as i32;
    let eff = eff.clamp(0, 255) as u32;
    if eff == 0 {
        return;
    }

    let inv = 255 - eff;
    dst[0] = (u8_mult(src[0] as u32, eff) + u8_mult(dst[0] as u32, inv)) as u8;
    dst[1] = (u8_mult(src[1] as u32, eff) + u8_mult(dst[1] as u32, inv)) as u8;
    dst[2] = (u8_mult(src[2] as u32, eff) + u8_mult(dst[2] as u32, inv)) as u8;

    let da = dst[ALPHA_CHANNEL] as u32;
    dst[ALPHA_CHANNEL] = 255.min(da + u8_mult(eff, 255 - da)) as u8;
}

/// Reduce a pixel's alpha by the given strength. RGB is left as is.
pub fn erase_alpha(dst: &mut Pixel, strength: f32) {
    let s = (strength * 255.0 + 0.5) as i32;
    dst[ALPHA_CHANNEL] = (dst[ALPHA_CHANNEL] as i32 - s).max(0) as u8;
}

fn comp_op_multiply(a: f32, b: f32) -> f32 {
    a * b
}

fn comp_op_screen(a: f32, b: f32) -> f32 {
    1.0 - (1.0 - a) * (1.0 - b)
}

fn comp_op_hard_light(a: f32, b: f32) -> f32 {
    if b <= 0.5 {
        2.0 * a * b
    } else {
        1.0 - 2.0 * (1.0 - a) * (1.0 - b)
    }
}

fn comp_op_overlay(a: f32, b: f32) -> f32 {
    comp_op_hard_light(b, a)
}

fn comp_op_add(a: f32, b: f32) -> f32 {
    (a + b).min(1.0)
}

fn comp_op_subtract(a: f32, b: f32) -> f32 {
    (a - b).max(0.0)
}

/// Composite a source color over a float accumulator pixel.
///
/// `alpha` is the effective coverage (layer pixel alpha times layer
/// opacity). Non-Normal modes combine the source with the accumulated
/// background channel by channel first, then the result is alpha-blended
/// in with the same coverage.
pub fn composite_over(dst: &mut FloatPixel, src: &[f32; 3], alpha: f32, mode: Blendmode) {
    let fg = match mode {
        Blendmode::Normal => *src,
        Blendmode::Multiply => comp(comp_op_multiply, dst, src),
        Blendmode::Screen => comp(comp_op_screen, dst, src),
        Blendmode::Overlay => comp(comp_op_overlay, dst, src),
        Blendmode::Add => comp(comp_op_add, dst, src),
        Blendmode::Subtract => comp(comp_op_subtract, dst, src),
    };

    dst[0] += (fg[0] - dst[0]) * alpha;
    dst[1] += (fg[1] - dst[1]) * alpha;
    dst[2] += (fg[2] - dst[2]) * alpha;
    dst[ALPHA_CHANNEL] = (dst[ALPHA_CHANNEL] + alpha * (1.0 - dst[ALPHA_CHANNEL])).min(1.0);
}

fn comp(op: fn(f32, f32) -> f32, bg: &FloatPixel, fg: &[f32; 3]) -> [f32; 3] {
    [op(bg[0], fg[0]), op(bg[1], fg[1]), op(bg[2], fg[2])]
}
