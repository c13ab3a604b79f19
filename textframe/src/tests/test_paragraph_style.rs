// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::utils::{TestEnv, assert_close};
use crate::{
    DefaultTextAlignment, Direction, FirstLineOffset, InitialLines, ParagraphStyle,
    ResolvedAlignment, TextAlignment, TextFrame, TextFrameOptions,
};

fn style(f: impl FnOnce(&mut ParagraphStyle)) -> ParagraphStyle {
    let mut style = ParagraphStyle::default();
    f(&mut style);
    style
}

fn baselines(frame: &TextFrame) -> Vec<f64> {
    frame.lines().map(|line| line.baseline_origin().y).collect()
}

#[test]
fn minimum_baseline_distance() {
    let frame = TestEnv::new()
        .with_width(20.)
        .with_paragraph_style(style(|s| s.minimum_baseline_distance = 20.))
        .frame("Test Test");

    let baselines = baselines(&frame);
    // Half of the missing 8pt goes above the first line.
    assert_close(baselines[0], 13.5);
    assert_close(baselines[1] - baselines[0], 20.);
}

#[test]
fn minimum_baseline_distance_between_paragraphs() {
    let frame = TestEnv::new()
        .with_paragraph_style(style(|s| s.minimum_baseline_distance = 30.))
        .frame("A\nB");

    let baselines = baselines(&frame);
    assert_close(baselines[1] - baselines[0], 30.);
}

#[test]
fn paragraph_spacing() {
    let frame = TestEnv::new()
        .with_paragraph_style(style(|s| {
            s.paragraph_spacing_before = 3.;
            s.paragraph_spacing_after = 4.;
        }))
        .frame("A\nB");

    let baselines = baselines(&frame);
    assert_close(baselines[0], 9.5);
    assert_close(baselines[1], 28.5);
}

#[test]
fn line_height_limits() {
    let frame = TestEnv::new()
        .with_width(20.)
        .with_paragraph_style(style(|s| s.maximum_line_height = 10.))
        .frame("Test Test");
    let baselines = baselines(&frame);
    assert_close(baselines[0], 8.5);
    assert_close(baselines[1], 18.5);

    let frame = TestEnv::new()
        .with_width(20.)
        .with_paragraph_style(style(|s| s.minimum_line_height = 20.))
        .frame("Test Test");
    assert_close(frame.line(0).height_above_baseline(), 13.5);
    assert_close(frame.line(0).height_below_baseline(), 6.5);
}

#[test]
fn line_height_multiple() {
    let frame = TestEnv::new()
        .with_width(20.)
        .with_paragraph_style(style(|s| s.line_height_multiple = 2.))
        .frame("Test Test");

    let baselines = baselines(&frame);
    assert_close(baselines[1] - baselines[0], 24.);
}

#[test]
fn first_line_offset() {
    let frame = TestEnv::new()
        .with_paragraph_style(style(|s| {
            s.first_line_offset = FirstLineOffset::BaselineFromTop(20.);
        }))
        .frame("Test");
    assert_close(frame.first_baseline(0., None), 20.);

    let frame = TestEnv::new()
        .with_paragraph_style(style(|s| s.first_line_offset = FirstLineOffset::FromDefault(2.)))
        .frame("Test");
    assert_close(frame.first_baseline(0., None), 11.5);
}

#[test]
fn indents() {
    let frame = TestEnv::new()
        .with_width(40.)
        .with_paragraph_style(style(|s| {
            s.first_line_head_indent = 5.;
            s.head_indent = 10.;
        }))
        .frame("Test Test Test");

    assert_eq!(frame.line_count(), 3);
    assert_close(frame.line(0).baseline_origin().x, 5.);
    assert_close(frame.line(1).baseline_origin().x, 10.);
    assert_close(frame.line(2).baseline_origin().x, 10.);
    assert_eq!(frame.paragraph(0).indents(), (10., 0.));
}

#[test]
fn initial_lines_override_indents() {
    let frame = TestEnv::new()
        .with_width(40.)
        .with_paragraph_style(style(|s| {
            s.head_indent = 10.;
            s.initial_lines = InitialLines {
                count: 2,
                head_indent: 15.,
                tail_indent: 0.,
            };
        }))
        .frame("Test Test Test");

    let paragraph = frame.paragraph(0);
    assert_eq!(paragraph.initial_line_range(), 0..2);
    assert_eq!(paragraph.non_initial_line_range(), 2..3);
    assert_eq!(paragraph.initial_lines_indents(), (15., 0.));
    assert_close(frame.line(0).baseline_origin().x, 15.);
    assert_close(frame.line(2).baseline_origin().x, 10.);
}

#[test]
fn alignment() {
    let aligned = |alignment| {
        TestEnv::new()
            .with_width(40.)
            .with_paragraph_style(style(|s| s.alignment = alignment))
            .frame("Test")
            .line(0)
            .baseline_origin()
            .x
    };
    assert_close(aligned(TextAlignment::Left), 0.);
    assert_close(aligned(TextAlignment::Center), 10.);
    assert_close(aligned(TextAlignment::Right), 20.);
    assert_close(aligned(TextAlignment::Justified), 0.);
}

#[test]
fn right_to_left_paragraphs_align_to_start() {
    let frame = TestEnv::new()
        .with_width(40.)
        .with_paragraph_style(style(|s| {
            s.base_writing_direction = Some(Direction::RightToLeft);
        }))
        .frame("Test");

    let paragraph = frame.paragraph(0);
    assert_eq!(paragraph.base_direction(), Direction::RightToLeft);
    assert_eq!(paragraph.alignment(), ResolvedAlignment::Right);
    assert_close(frame.line(0).baseline_origin().x, 20.);
}

#[test]
fn default_alignment_option() {
    let options = TextFrameOptions::builder()
        .default_alignment(DefaultTextAlignment::Right)
        .build();
    let frame = TestEnv::new()
        .with_width(40.)
        .with_options(options)
        .frame("Test");

    assert_eq!(frame.paragraph(0).alignment(), ResolvedAlignment::Right);
    assert_close(frame.line(0).baseline_origin().x, 20.);
}

#[test]
fn resolved_style_clamps_values() {
    let resolved = style(|s| {
        s.line_spacing = -3.;
        s.hyphenation_factor = 2.;
        s.maximum_line_height = 5.;
        s.minimum_line_height = 8.;
    })
    .resolved();

    assert_eq!(resolved.line_spacing, 0.);
    assert_eq!(resolved.hyphenation_factor, 1.);
    assert_eq!(resolved.line_height_multiple, 1.);
    assert_eq!(resolved.maximum_line_height, 8.);
}
