// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use peniko::kurbo::{Affine, Point, Rect};

use super::utils::{DrawEvent, RecordingSink, TestEnv, assert_close};
use crate::{DrawOptions, StyledString, TextAttachment, TextAttributes, TextFrameFlags};

fn with_attachment(env: &TestEnv, attachment: TextAttachment) -> Arc<StyledString> {
    let attributes = TextAttributes {
        attachment: Some(Arc::new(attachment)),
        ..env.attributes()
    };
    env.styled(&[("a", None), ("\u{FFFC}", Some(attributes)), ("b", None)])
}

#[test]
fn attachment_takes_part_in_line_metrics() {
    let env = TestEnv::new();
    let frame = env.frame_for(with_attachment(&env, TextAttachment::new(30., 20., 5.)));

    assert!(frame.flags().contains(TextFrameFlags::HAS_ATTACHMENT));
    assert_eq!(frame.line_count(), 1);
    let line = frame.line(0);
    assert_close(line.width(), 40.);
    assert_close(line.ascent(), 20.);
    assert_close(line.descent(), 5.);
    assert_close(line.baseline_origin().y, 20.);
}

#[test]
fn attachment_is_drawn_at_baseline() {
    let env = TestEnv::new();
    let frame = env.frame_for(with_attachment(&env, TextAttachment::new(30., 20., 5.)));
    let mut sink = RecordingSink::default();

    assert!(frame.draw(&mut sink, None, Affine::IDENTITY, &DrawOptions::default(), None));
    let attachments: Vec<_> = sink
        .events
        .iter()
        .filter_map(|event| match event {
            DrawEvent::Attachment { origin, scale } => Some((*origin, *scale)),
            _ => None,
        })
        .collect();
    assert_eq!(attachments, [(Point::new(5., 20.), 1.)]);
    assert_eq!(sink.filled_glyph_ids(), [u32::from('a'), u32::from('b')]);
}

#[test]
fn image_bounds_include_attachment() {
    let env = TestEnv::new();
    let frame = env.frame_for(with_attachment(&env, TextAttachment::new(30., 20., 5.)));

    assert_eq!(
        frame.image_bounds(None, Point::ZERO, None),
        Rect::new(0., 0., 40., 25.)
    );
}

#[test]
fn wide_attachment_breaks_like_a_character() {
    let env = TestEnv::new().with_width(30.);
    let frame = env.frame_for(with_attachment(&env, TextAttachment::new(30., 10., 0.)));

    assert_eq!(frame.line_count(), 3);
    assert_eq!(frame.line(1).range_in_original_string(), 1..2);
}

#[test]
fn fallback_round_trip() {
    let env = TestEnv::new();
    let string = with_attachment(
        &env,
        TextAttachment::new(30., 20., 5.).with_string_fallback("[img]"),
    );
    let replaced = string.replace_attachments_with_fallbacks();

    assert_eq!(replaced.to_string_lossy(), "a[img]b");
    assert!(
        replaced
            .runs()
            .iter()
            .all(|run| run.attributes.attachment.is_none()),
        "no attachments remain"
    );
    assert_eq!(replaced.restore_attachments(), *string);
}

#[test]
fn attachment_without_fallback_is_dropped() {
    let env = TestEnv::new();
    let string = with_attachment(&env, TextAttachment::new(30., 20., 5.));
    let replaced = string.replace_attachments_with_fallbacks();

    assert_eq!(replaced.to_string_lossy(), "ab");
    assert_eq!(replaced.restore_attachments().to_string_lossy(), "ab");
}

#[test]
fn object_replacement_character() {
    assert_eq!(
        char::from_u32(u32::from(crate::OBJECT_REPLACEMENT_CHARACTER)),
        Some('\u{FFFC}')
    );
}
