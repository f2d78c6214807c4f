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

pub mod color;
pub mod floodfill;
pub mod layerstack;
pub mod pixelbuffer;
pub mod rasterop;

/// Layer IDs are allocated by the layer stack and stay unique for the
/// lifetime of the document.
pub type LayerID = u16;

// Re-export types most commonly used from the outside
mod blendmode;
mod dirty;
mod layer;
mod rect;
mod surface;

pub use blendmode::Blendmode;
pub use color::{Color, FloatPixel, Pixel};
pub use dirty::DirtyRegion;
pub use layer::{Layer, LayerMetadata, Transform};
pub use layerstack::LayerStack;
pub use pixelbuffer::PixelBuffer;
pub use rect::Rectangle;
pub use surface::DisplaySurface;
