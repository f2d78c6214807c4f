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

use crate::paint::Color;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BrushShape {
    Round,
    Square,
    Soft,
    Airbrush,
    Pencil,
    Marker,
    Custom,
}

/// The parameters of a brush.
///
/// Immutable for the duration of a stroke; the host swaps in a new config
/// between strokes.
#[derive(Clone, Debug)]
pub struct BrushConfig {
    pub name: String,

    /// Dab shape
    pub shape: BrushShape,

    /// Base diameter in pixels (>= 1)
    pub size: f32,

    /// Edge hardness
    pub hardness: f32,

    /// Brush opacity
    pub opacity: f32,

    /// Distance between dabs as a fraction of the diameter
    pub spacing: f32,

    /// Brush color
    pub color: Color,

    /// Apply pressure to size
    pub size_pressure: bool,

    /// Size multiplier at zero pressure
    pub min_pressure_size: f32,

    /// Apply pressure to opacity
    pub opacity_pressure: bool,

    /// Opacity multiplier at zero pressure
    pub min_pressure_opacity: f32,

    /// Random dab scatter, as a fraction of the diameter
    pub jitter: f32,

    /// Soften the rim of hard-edged dabs by one pixel
    pub anti_alias: bool,
}

impl Default for BrushConfig {
    fn default() -> Self {
        BrushConfig {
            name: String::new(),
            shape: BrushShape::Round,
            size: 10.0,
            hardness: 0.8,
            opacity: 1.0,
            spacing: 0.25,
            color: Color::BLACK,
            size_pressure: false,
            min_pressure_size: 0.1,
            opacity_pressure: false,
            min_pressure_opacity: 0.0,
            jitter: 0.0,
            anti_alias: true,
        }
    }
}

impl BrushConfig {
    /// The dab diameter at the given pen pressure. Never below one pixel.
    pub fn effective_size(&self, p: f32) -> f32 {
        debug_assert!((0.0..=1.0).contains(&p));
        if self.size_pressure {
            (self.size * lerp(self.min_pressure_size, 1.0, p))
                .round()
                .max(1.0)
        } else {
            self.size.max(1.0)
        }
    }

    /// The dab opacity at the given pen pressure.
    pub fn effective_opacity(&self, p: f32) -> f32 {
        debug_assert!((0.0..=1.0).contains(&p));
        if self.opacity_pressure {
            lerp(self.min_pressure_opacity * self.opacity, self.opacity, p)
        } else {
            self.opacity
        }
    }

    /// Distance between dabs in pixels at the given pressure.
    pub fn spacing_at(&self, p: f32) -> f32 {
        self.spacing * self.effective_size(p)
    }
}

/// Brush coverage at a normalized distance from the dab center.
///
/// `d` is 0 at the center and 1 at the rim. This is the single source of
/// truth for dab coverage; every stamping path evaluates it. For `Square`
/// the caller normalizes with the Chebyshev distance instead of the
/// Euclidean one.
pub fn alpha_at(d: f32, shape: BrushShape, hardness: f32) -> f32 {
    match shape {
        BrushShape::Round | BrushShape::Pencil => {
            if hardness >= 1.0 {
                if d <= 1.0 {
                    1.0
                } else {
                    0.0
                }
            } else {
                let edge = 1.0 - hardness;
                if d <= 1.0 - edge {
                    1.0
                } else if d < 1.0 {
                    (1.0 - d) / edge
                } else {
                    0.0
                }
            }
        }
        BrushShape::Soft => (1.0 - d).clamp(0.0, 1.0) * hardness,
        BrushShape::Airbrush => ((1.0 - d * d) * hardness * 0.5).clamp(0.0, 1.0),
        BrushShape::Square => {
            if d <= 1.0 {
                1.0
            } else {
                0.0
            }
        }
        BrushShape::Marker => {
            if d <= 0.8 {
                0.7
            } else if d <= 1.0 {
                0.3
            } else {
                0.0
            }
        }
        // Shapes without a falloff of their own get the hard-edged disc
        BrushShape::Custom => {
            if d <= 1.0 {
                1.0
            } else {
                0.0
            }
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
