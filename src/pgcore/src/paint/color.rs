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

use lazy_static::lazy_static;
use std::fmt;
use std::str::FromStr;

/// A straight (non-premultiplied) RGBA pixel as stored in layer buffers.
pub type Pixel = [u8; 4];

/// A normalized RGBA pixel as accumulated in the composite buffer.
pub type FloatPixel = [f32; 4];

pub const RED_CHANNEL: usize = 0;
pub const GREEN_CHANNEL: usize = 1;
pub const BLUE_CHANNEL: usize = 2;
pub const ALPHA_CHANNEL: usize = 3;

pub const ZERO_PIXEL: Pixel = [0; 4];
pub const WHITE_PIXEL: Pixel = [255; 4];
pub const ZERO_FLOAT_PIXEL: FloatPixel = [0.0; 4];

lazy_static! {
    // Byte channel to normalized float conversion table. Built once on
    // first use and read-only afterwards; shared by every buffer.
    static ref CHANNEL_LUT: [f32; 256] = {
        let mut lut = [0.0f32; 256];
        for (i, v) in lut.iter_mut().enumerate() {
            *v = i as f32 / 255.0;
        }
        lut
    };
}

pub fn channel_to_f32(c: u8) -> f32 {
    CHANNEL_LUT[c as usize]
}

pub fn f32_to_channel(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

pub fn pixel_to_float(p: Pixel) -> FloatPixel {
    [
        channel_to_f32(p[0]),
        channel_to_f32(p[1]),
        channel_to_f32(p[2]),
        channel_to_f32(p[3]),
    ]
}

pub fn float_to_pixel(p: FloatPixel) -> Pixel {
    [
        f32_to_channel(p[0]),
        f32_to_channel(p[1]),
        f32_to_channel(p[2]),
        f32_to_channel(p[3]),
    ]
}

#[derive(Copy, Clone, Debug)]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn rgb8(r: u8, g: u8, b: u8) -> Color {
        Color {
            r: channel_to_f32(r),
            g: channel_to_f32(g),
            b: channel_to_f32(b),
            a: 1.0,
        }
    }

    pub fn from_pixel(p: Pixel) -> Color {
        Color {
            r: channel_to_f32(p[RED_CHANNEL]),
            g: channel_to_f32(p[GREEN_CHANNEL]),
            b: channel_to_f32(p[BLUE_CHANNEL]),
            a: channel_to_f32(p[ALPHA_CHANNEL]),
        }
    }

    pub fn from_float_pixel(p: FloatPixel) -> Color {
        Color {
            r: p[RED_CHANNEL],
            g: p[GREEN_CHANNEL],
            b: p[BLUE_CHANNEL],
            a: p[ALPHA_CHANNEL],
        }
    }

    pub fn as_pixel(&self) -> Pixel {
        [
            f32_to_channel(self.r),
            f32_to_channel(self.g),
            f32_to_channel(self.b),
            f32_to_channel(self.a),
        ]
    }

    pub fn as_float_pixel(&self) -> FloatPixel {
        [self.r, self.g, self.b, self.a]
    }

    pub fn is_transparent(&self) -> bool {
        self.a < (1.0 / 255.0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.as_pixel();
        if self.a < 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", p[0], p[1], p[2], p[3])
        } else {
            write!(f, "#{:02x}{:02x}{:02x}", p[0], p[1], p[2])
        }
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.as_pixel() == other.as_pixel()
    }
}

impl FromStr for Color {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("empty color string");
        }
        if !s.starts_with('#') || (s.len() != 7 && s.len() != 9) {
            return Err("doesn't look like a color string");
        }

        if let Ok(v) = u32::from_str_radix(&s[1..], 16) {
            Ok(if s.len() == 7 {
                Color {
                    r: channel_to_f32((v >> 16) as u8),
                    g: channel_to_f32((v >> 8) as u8),
                    b: channel_to_f32(v as u8),
                    a: 1.0,
                }
            } else {
                Color {
                    r: channel_to_f32((v >> 24) as u8),
                    g: channel_to_f32((v >> 16) as u8),
                    b: channel_to_f32((v >> 8) as u8),
                    a: channel_to_f32(v as u8),
                }
            })
        } else {
            Err("not a valid color")
        }
    }
}
