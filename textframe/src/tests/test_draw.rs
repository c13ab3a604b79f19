// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::Color;
use peniko::kurbo::{Affine, Point, Rect, Vec2};

use super::utils::{DrawEvent, PixmapSink, RecordingSink, TestEnv, assert_close};
use crate::style::{Background, Decoration, Shadow, Stroke};
use crate::{CancellationFlag, DisplayScale, DrawOptions, GlyphPaint, HighlightStyle};

const RED: Color = Color::from_rgb8(255, 0, 0);
const GRAY: Color = Color::from_rgb8(128, 128, 128);

fn draw(frame: &crate::TextFrame, options: &DrawOptions) -> RecordingSink {
    let mut sink = RecordingSink::default();
    assert!(
        frame.draw(&mut sink, None, Affine::IDENTITY, options, None),
        "drawing without a cancellation flag completes"
    );
    sink
}

#[test]
fn glyphs_on_baseline() {
    let env = TestEnv::new();
    let frame = env.frame("ab");
    let sink = draw(&frame, &DrawOptions::default());

    let runs: Vec<_> = sink.glyph_runs().collect();
    assert_eq!(runs.len(), 1);
    let (glyphs, color, paint) = runs[0];
    assert_eq!(paint, GlyphPaint::Fill);
    assert_eq!(color, Color::BLACK);
    assert_eq!(
        glyphs.iter().map(|glyph| glyph.id).collect::<Vec<_>>(),
        vec![u32::from('a'), u32::from('b')]
    );
    assert_close(glyphs[0].x, 0.);
    assert_close(glyphs[1].x, 5.);
    assert_close(glyphs[0].y, 9.5);
    assert_close(glyphs[1].advance, 5.);
}

#[test]
fn transform_is_applied_by_sink() {
    let env = TestEnv::new();
    let frame = env.frame("ab");
    let mut sink = RecordingSink::default();
    frame.draw(
        &mut sink,
        None,
        Affine::translate((10., 20.)),
        &DrawOptions::default(),
        None,
    );

    let (glyphs, _, _) = sink.glyph_runs().next().expect("one glyph run");
    assert_close(glyphs[0].x, 10.);
    assert_close(glyphs[0].y, 29.5);
}

#[test]
fn partial_range_draws_only_overlapping_clusters() {
    let env = TestEnv::new();
    let frame = env.frame("abcd");
    let mut sink = RecordingSink::default();
    frame.draw(
        &mut sink,
        Some(frame.range_for_original_range(1..3)),
        Affine::IDENTITY,
        &DrawOptions::default(),
        None,
    );

    assert_eq!(sink.filled_glyph_ids(), vec![u32::from('b'), u32::from('c')]);
}

#[test]
fn background_is_drawn_before_glyphs() {
    let env = TestEnv::new();
    let mut attributes = env.attributes();
    attributes.background = Some(Background {
        color: RED,
        outset: 0.,
    });
    let frame = env.frame_for(env.styled(&[("ab", Some(attributes)), ("cd", None)]));
    let sink = draw(&frame, &DrawOptions::default());

    let DrawEvent::Rect { rect, color } = &sink.events[0] else {
        panic!("expected the background first, got {:?}", sink.events[0]);
    };
    assert_eq!(*color, RED);
    assert_eq!(*rect, Rect::new(0., 0., 10., 12.));
    assert_eq!(sink.rects().count(), 1);
    assert_eq!(
        sink.filled_glyph_ids(),
        "abcd".chars().map(u32::from).collect::<Vec<_>>()
    );
}

#[test]
fn underline_follows_glyphs() {
    let env = TestEnv::new();
    let mut attributes = env.attributes();
    attributes.underline = Some(Decoration::default());
    let frame = env.frame_for(env.styled(&[("ab", Some(attributes))]));
    let sink = draw(&frame, &DrawOptions::default());

    assert!(matches!(sink.events[0], DrawEvent::Glyphs { .. }));
    let DrawEvent::Rect { rect, color } = &sink.events[1] else {
        panic!("expected an underline, got {:?}", sink.events[1]);
    };
    assert_eq!(*color, Color::BLACK);
    assert_close(rect.x0, 0.);
    assert_close(rect.x1, 10.);
    assert_close(rect.center().y, 10.5);
    assert_close(rect.height(), 10. / 14.);
}

#[test]
fn underline_skips_trailing_whitespace() {
    let env = TestEnv::new().with_width(20.);
    let mut attributes = env.attributes();
    attributes.underline = Some(Decoration {
        color: Some(RED),
        thickness: 1.,
    });
    let frame = env.frame_for(env.styled(&[("Test Test", Some(attributes))]));
    let sink = draw(&frame, &DrawOptions::default());

    let underlines: Vec<_> = sink.rects().collect();
    assert_eq!(underlines.len(), 2);
    for (rect, color) in &underlines {
        assert_eq!(*color, RED);
        assert_close(rect.width(), 20.);
        assert_close(rect.height(), 1.);
    }
}

#[test]
fn highlight_replaces_text_color() {
    let env = TestEnv::new();
    let frame = env.frame("abcd");
    let options = DrawOptions {
        highlight: Some((
            frame.range_for_original_range(1..3),
            HighlightStyle {
                background: Some(GRAY),
                text_color: Some(RED),
            },
        )),
        ..Default::default()
    };
    let sink = draw(&frame, &options);

    let (rect, color) = sink.rects().next().expect("highlight background");
    assert_eq!(color, GRAY);
    assert_close(rect.x0, 5.);
    assert_close(rect.x1, 15.);
    assert!(
        matches!(sink.events[0], DrawEvent::Rect { .. }),
        "the highlight is drawn below the glyphs"
    );

    let runs: Vec<_> = sink
        .glyph_runs()
        .map(|(glyphs, color, _)| (glyphs.iter().map(|g| g.id).collect::<Vec<_>>(), color))
        .collect();
    assert_eq!(
        runs,
        vec![
            (vec![u32::from('a')], Color::BLACK),
            (vec![u32::from('b'), u32::from('c')], RED),
            (vec![u32::from('d')], Color::BLACK),
        ]
    );
}

#[test]
fn stroke_and_shadow() {
    let env = TestEnv::new();
    let mut attributes = env.attributes();
    attributes.stroke = Some(Stroke {
        width: 1.,
        color: Some(RED),
        fill: true,
    });
    attributes.shadow = Some(Shadow {
        offset: Vec2::new(1., 2.),
        blur_radius: 3.,
        color: GRAY,
    });
    let frame = env.frame_for(env.styled(&[("ab", Some(attributes))]));
    let sink = draw(&frame, &DrawOptions::default());

    let runs: Vec<_> = sink.glyph_runs().collect();
    assert_eq!(runs.len(), 3);

    let (shadow, color, paint) = runs[0];
    assert_eq!(paint, GlyphPaint::Shadow { blur_radius: 3. });
    assert_eq!(color, GRAY);
    assert_close(shadow[0].x, 1.);
    assert_close(shadow[0].y, 11.5);

    assert_eq!((runs[1].1, runs[1].2), (Color::BLACK, GlyphPaint::Fill));
    assert_eq!((runs[2].1, runs[2].2), (RED, GlyphPaint::Stroke { width: 1. }));
    assert_close(runs[2].0[0].y, 9.5);
}

#[test]
fn cancelled_drawing() {
    let env = TestEnv::new();
    let frame = env.frame("ab");
    let flag = CancellationFlag::new();
    flag.cancel();
    let mut sink = RecordingSink::default();

    let finished = frame.draw(
        &mut sink,
        None,
        Affine::IDENTITY,
        &DrawOptions::default(),
        Some(&flag),
    );
    assert!(!finished);
    assert!(sink.events.is_empty());
}

#[test]
fn pixel_aligned_baselines() {
    let env = TestEnv::new();
    let frame = env.frame("ab");
    let view = frame.with_origin(Point::new(0., 0.3), DisplayScale::new(1.));
    let baseline_y = |options: &DrawOptions| {
        let mut sink = RecordingSink::default();
        view.draw(&mut sink, None, Affine::IDENTITY, options, None);
        let (glyphs, _, _) = sink.glyph_runs().next().expect("one glyph run");
        glyphs[0].y
    };

    assert_close(baseline_y(&DrawOptions::default()), 9.8);
    let aligned = DrawOptions {
        pixel_align_baselines: true,
        ..Default::default()
    };
    assert_close(baseline_y(&aligned), 10.);
}

#[test]
fn paints_pixels() {
    let env = TestEnv::new();
    let frame = env.frame("ab");
    let mut sink = PixmapSink::new(20, 20);
    frame.draw(
        &mut sink,
        None,
        Affine::IDENTITY,
        &DrawOptions::default(),
        None,
    );

    assert!(sink.is_painted(2, 5));
    assert!(sink.is_painted(7, 11));
    assert!(!sink.is_painted(15, 5));
    assert!(!sink.is_painted(2, 15));
}
