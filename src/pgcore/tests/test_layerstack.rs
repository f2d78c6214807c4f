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

use pgcore::paint::{Blendmode, Color, LayerStack};

#[test]
fn test_document_lifecycle() {
    // Build a small three-layer document, paint a little on each level,
    // then reduce it back down to a single flattened layer.
    let mut stack = LayerStack::new(64, 64, Color::WHITE);

    stack.active_layer_mut().clear(&Color::rgb8(200, 200, 200));

    stack.create_layer(Some("lines"), None);
    for x in 10..20 {
        stack.active_layer_mut().set_pixel(x, 10, [0, 0, 0, 255]);
    }

    stack.create_layer(Some("tint"), Some(&Color::rgb8(128, 128, 128)));
    stack.active_layer_mut().metadata.blendmode = Blendmode::Multiply;
    stack.active_layer_mut().metadata.opacity = 1.0;

    assert_eq!(stack.layer_count(), 3);
    stack.composite();

    // The ink pixel under the multiply tint stays black
    let ink = stack.composite_color_at(10, 10).unwrap();
    assert_eq!(ink, Color::rgb8(0, 0, 0));

    // The plain background is darkened by the tint
    let shade = stack.composite_color_at(40, 40).unwrap();
    let expected = 200.0 / 255.0 * 128.0 / 255.0;
    assert!((shade.r - expected).abs() < 0.01);

    stack.flatten();
    assert_eq!(stack.layer_count(), 1);
    let flat = stack.layer(0).unwrap().pixel_at(10, 10);
    assert_eq!(flat, [0, 0, 0, 255]);
}

#[test]
fn test_merge_down_clips_to_smaller_layer() {
    let mut stack = LayerStack::new(32, 32, Color::TRANSPARENT);
    stack.active_layer_mut().clear(&Color::WHITE);

    // An imported image smaller than the canvas
    stack
        .create_layer_from_image(8, 8, vec![[255, 0, 0, 255]; 64], Some("import"))
        .unwrap();

    assert!(stack.merge_down(1));
    let base = stack.layer(0).unwrap();
    assert_eq!(base.pixel_at(0, 0), [255, 0, 0, 255]);
    assert_eq!(base.pixel_at(7, 7), [255, 0, 0, 255]);
    // Outside the imported image's bounds the base layer is untouched
    assert_eq!(base.pixel_at(8, 8), [255, 255, 255, 255]);
}

#[test]
fn test_reorder_changes_composite() {
    let mut stack = LayerStack::new(8, 8, Color::TRANSPARENT);
    stack.active_layer_mut().clear(&Color::rgb8(255, 0, 0));
    stack.create_layer(None, Some(&Color::rgb8(0, 0, 255)));

    stack.composite();
    assert_eq!(
        stack.composite_color_at(4, 4).unwrap(),
        Color::rgb8(0, 0, 255)
    );

    assert!(stack.move_down(1));
    stack.composite();
    assert_eq!(
        stack.composite_color_at(4, 4).unwrap(),
        Color::rgb8(255, 0, 0)
    );
}

#[test]
fn test_hidden_layer_does_not_composite() {
    let mut stack = LayerStack::new(8, 8, Color::WHITE);
    stack.create_layer(None, Some(&Color::rgb8(255, 0, 0)));
    stack.active_layer_mut().metadata.hidden = true;

    stack.composite();
    assert_eq!(stack.composite_color_at(0, 0).unwrap(), Color::WHITE);
}

#[test]
fn test_snapshot_restore_roundtrip() {
    // An external undo manager captures a snapshot, paints over it, then
    // rolls back.
    let mut stack = LayerStack::new(16, 16, Color::TRANSPARENT);
    stack.active_layer_mut().set_pixel(5, 5, [1, 2, 3, 255]);

    let checkpoint = stack.active_layer().snapshot();

    stack.active_layer_mut().clear(&Color::BLACK);
    assert_eq!(stack.active_layer().pixel_at(5, 5), [0, 0, 0, 255]);

    stack.active_layer_mut().restore(&checkpoint).unwrap();
    assert_eq!(stack.active_layer().pixel_at(5, 5), [1, 2, 3, 255]);
    assert_eq!(stack.active_layer().pixel_at(0, 0), [0, 0, 0, 0]);

    // A snapshot of the wrong size is rejected and changes nothing
    stack.active_layer_mut().resize(8, 8);
    assert!(stack.active_layer_mut().restore(&checkpoint).is_err());
    assert_eq!(stack.active_layer().width(), 8);
}
