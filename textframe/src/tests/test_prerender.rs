// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use peniko::kurbo::{Affine, Size};

use super::utils::{RecordingSink, TestEnv};
use crate::{DrawOptions, Prerender, PrerenderInput, SimpleShaper, TextFrameOptions};

fn input(text: &str, width: f64) -> PrerenderInput {
    PrerenderInput::new(
        TestEnv::new().string(text),
        Size::new(width, f64::INFINITY),
        TextFrameOptions::default(),
    )
}

#[test]
fn renders_on_background_thread() {
    let prerender = Prerender::spawn(
        input("Test Test", 20.),
        Arc::new(SimpleShaper::new()),
        |frame, flag| {
            let mut sink = RecordingSink::default();
            let finished = frame.draw(
                &mut sink,
                None,
                Affine::IDENTITY,
                &DrawOptions::default(),
                Some(flag),
            );
            (finished, sink.filled_glyph_ids().len())
        },
    )
    .expect("spawning a thread");

    let result = prerender.wait().expect("not cancelled");
    assert_eq!(result.frame.line_count(), 2);
    assert_eq!(result.output, (true, 9));
}

#[test]
fn finishes_without_waiting() {
    let prerender = Prerender::spawn(
        input("Test", f64::INFINITY),
        Arc::new(SimpleShaper::new()),
        |frame, _| frame.line_count(),
    )
    .expect("spawning a thread");
    while !prerender.is_finished() {
        std::thread::yield_now();
    }

    let result = prerender.wait().expect("not cancelled");
    assert_eq!(result.output, 1);
}

#[test]
fn cancel_discards_result() {
    let prerender = Prerender::spawn(
        input("Test Test", 20.),
        Arc::new(SimpleShaper::new()),
        |_, flag| {
            while !flag.is_cancelled() {
                std::thread::yield_now();
            }
        },
    )
    .expect("spawning a thread");
    prerender.cancel();

    assert!(prerender.wait().is_none());
}

#[test]
#[should_panic(expected = "render failed")]
fn panic_is_resumed_on_wait() {
    let prerender = Prerender::spawn(
        input("Test", f64::INFINITY),
        Arc::new(SimpleShaper::new()),
        |_, _| -> u32 { panic!("render failed") },
    )
    .expect("spawning a thread");
    prerender.wait();
}
