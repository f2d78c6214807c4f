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

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pgcore::paint::rasterop::{blend_over, composite_over};
use pgcore::paint::{Blendmode, FloatPixel, Pixel};

fn blend_over_benchmark(c: &mut Criterion) {
    c.bench_function("blend_over span", |b| {
        let mut span: Vec<Pixel> = vec![[128, 128, 128, 255]; 4096];
        b.iter(|| {
            for p in span.iter_mut() {
                blend_over(p, &[200, 50, 50], 180, 0.8);
            }
            black_box(&span);
        })
    });
}

fn composite_benchmark(c: &mut Criterion) {
    c.bench_function("composite normal span", |b| {
        let mut span: Vec<FloatPixel> = vec![[0.5, 0.5, 0.5, 1.0]; 4096];
        b.iter(|| {
            for p in span.iter_mut() {
                composite_over(p, &[0.8, 0.2, 0.2], 0.7, Blendmode::Normal);
            }
            black_box(&span);
        })
    });

    c.bench_function("composite multiply span", |b| {
        let mut span: Vec<FloatPixel> = vec![[0.5, 0.5, 0.5, 1.0]; 4096];
        b.iter(|| {
            for p in span.iter_mut() {
                composite_over(p, &[0.8, 0.2, 0.2], 0.7, Blendmode::Multiply);
            }
            black_box(&span);
        })
    });
}

criterion_group!(benches, blend_over_benchmark, composite_benchmark);
criterion_main!(benches);
