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

use bitvec::prelude::*;
use std::collections::VecDeque;

use super::color::{pixel_to_float, FloatPixel};
use super::{Color, PixelBuffer};

/// The seed is left alone when it already matches the fill color this
/// closely, per channel.
const SEED_MATCH_TOLERANCE: f32 = 0.01;

/// Pixels within this per-channel distance of the seed color belong to the
/// filled region.
const REGION_MATCH_TOLERANCE: f32 = 0.1;

/// Flood fill the 4-connected region around a seed pixel.
///
/// A breadth-first search grows outwards from the seed; every visited
/// pixel is compared against the original seed color, not against its
/// neighbors, so the region cannot drift across a soft gradient. Returns
/// whether any pixel changed.
pub fn flood_fill(buffer: &mut PixelBuffer, x: i32, y: i32, fill_color: &Color) -> bool {
    if !buffer.in_bounds(x, y) {
        return false;
    }

    let width = buffer.width() as i32;
    let height = buffer.height() as i32;

    let seed = pixel_to_float(buffer.pixel_at(x, y));
    let fill = fill_color.as_float_pixel();
    if channels_match(&seed, &fill, SEED_MATCH_TOLERANCE) {
        // Filling with the color that's already there
        return false;
    }

    let fill_pixel = fill_color.as_pixel();
    let mut visited = bitvec![0; (width * height) as usize];
    let mut queue = VecDeque::new();

    visited.set((y * width + x) as usize, true);
    queue.push_back((x, y));

    let mut changed = false;
    while let Some((px, py)) = queue.pop_front() {
        let current = pixel_to_float(buffer.pixel_at(px, py));
        if !channels_match(&current, &seed, REGION_MATCH_TOLERANCE) {
            continue;
        }

        buffer.set_pixel(px, py, fill_pixel);
        changed = true;

        for (nx, ny) in [(px - 1, py), (px + 1, py), (px, py - 1), (px, py + 1)] {
            if nx < 0 || ny < 0 || nx >= width || ny >= height {
                continue;
            }
            let i = (ny * width + nx) as usize;
            if !visited[i] {
                visited.set(i, true);
                queue.push_back((nx, ny));
            }
        }
    }

    changed
}

fn channels_match(a: &FloatPixel, b: &FloatPixel, tolerance: f32) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= tolerance)
}
