// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::Size;

use super::utils::{TestEnv, assert_close};
use crate::{CancellationFlag, TextFrame, TextFrameOptions};

#[test]
fn breaks_at_word_boundary() {
    let width = TestEnv::new().width("Test");
    let env = TestEnv::new().with_width(width);
    let frame = env.frame("Test Test");

    assert_eq!(frame.line_count(), 2);
    let first = frame.line(0);
    let second = frame.line(1);
    assert_eq!(first.range_in_original_string(), 0..4);
    assert_eq!(first.trailing_whitespace_len(), 1);
    assert!(!first.is_emergency_break(), "the line ends at a space");
    assert_eq!(second.range_in_original_string(), 5..9);
    assert_eq!(second.trailing_whitespace_len(), 0);
    assert_close(first.width(), 20.);
    assert_close(second.width(), 20.);
    assert!(frame.flags().is_empty(), "nothing was truncated or scaled");
}

#[test]
fn emergency_break_inside_word() {
    let width = TestEnv::new().width("Tes");
    let env = TestEnv::new().with_width(width);
    let frame = env.frame("Test\r\n");

    assert_eq!(frame.line_count(), 2);
    assert_eq!(frame.line(0).range_in_original_string(), 0..3);
    assert!(frame.line(0).is_emergency_break(), "no break opportunity fits");
    assert_eq!(frame.line(0).trailing_whitespace_len(), 0);
    assert_eq!(frame.line(1).range_in_original_string(), 3..4);
    assert_eq!(frame.line(1).trailing_whitespace_len(), 2);
    assert!(
        frame.line(1).is_followed_by_terminator(),
        "CRLF ends the paragraph"
    );
    assert_eq!(frame.paragraph_count(), 1);
    assert_eq!(frame.paragraph(0).terminator_len(), 2);
}

#[test]
fn trailing_whitespace_does_not_count_toward_width() {
    let width = TestEnv::new().width("Test");
    let env = TestEnv::new().with_width(width);
    let frame = env.frame("Test      ");

    assert_eq!(frame.line_count(), 1);
    assert_eq!(frame.line(0).trailing_whitespace_len(), 6);
    assert_close(frame.line(0).width(), 20.);
}

#[test]
fn mandatory_breaks_split_paragraphs() {
    let frame = TestEnv::new().frame("One\nTwo\u{2029}Three");

    assert_eq!(frame.paragraph_count(), 3);
    assert_eq!(frame.line_count(), 3);
    let ranges: Vec<_> = frame
        .paragraphs()
        .map(|paragraph| paragraph.range_in_original_string())
        .collect();
    assert_eq!(ranges, [0..4, 4..8, 8..13]);
    assert!(frame.lines().all(|line| line.is_first_in_paragraph()));
    assert!(frame.line(2).is_last_line(), "the last line ends the frame");
}

#[test]
fn line_separator_breaks_within_paragraph() {
    let frame = TestEnv::new().frame("One\u{2028}Two");

    assert_eq!(frame.paragraph_count(), 1);
    assert_eq!(frame.line_count(), 2);
    assert_eq!(frame.line(0).range_in_original_string(), 0..3);
    assert_eq!(frame.line(0).trailing_whitespace_len(), 1);
    assert!(!frame.line(1).is_first_in_paragraph(), "same paragraph");
}

#[test]
fn empty_string_has_no_lines() {
    let frame = TestEnv::new().frame("");

    assert_eq!(frame.paragraph_count(), 0);
    assert_eq!(frame.line_count(), 0);
    assert_eq!(frame.truncated_string_len(), 0);
    assert_eq!(frame.start_index(), frame.end_index());
}

#[test]
fn empty_paragraph_gets_a_line() {
    let frame = TestEnv::new().frame("a\n\nb");

    assert_eq!(frame.paragraph_count(), 3);
    assert_eq!(frame.line_count(), 3);
    assert_eq!(frame.line(1).range_in_original_string(), 2..2);
    assert_eq!(frame.line(1).trailing_whitespace_len(), 1);
}

#[test]
fn zero_width_places_one_cluster_per_line() {
    let env = TestEnv::new().with_width(0.);
    let frame = env.frame("abc");

    assert_eq!(frame.line_count(), 3);
    assert!(frame.line(0).is_emergency_break(), "nothing fits a zero width");
    for (index, line) in frame.lines().enumerate() {
        assert_eq!(line.range_in_original_string(), index..index + 1);
    }
}

#[test]
fn subrange_layout() {
    let env = TestEnv::new();
    let string = env.string("Hello world");
    let frame = TextFrame::new(
        string,
        6..11,
        Size::new(f64::INFINITY, f64::INFINITY),
        None,
        &TextFrameOptions::default(),
        env.shaper(),
        None,
    )
    .expect("not cancelled");

    assert_eq!(frame.range_in_original_string(), 6..11);
    assert!(!frame.range_in_original_string_is_full_string());
    assert_eq!(frame.truncated_string().to_string_lossy(), "world");
    assert_eq!(frame.line(0).range_in_original_string(), 6..11);
}

#[test]
fn lines_stack_by_line_height() {
    let frame = TestEnv::new().with_width(20.).frame("Test Test Test");

    assert_eq!(frame.line_count(), 3);
    let baselines: Vec<f64> = frame.lines().map(|line| line.baseline_origin().y).collect();
    assert_close(baselines[0], 9.5);
    assert_close(baselines[1], 21.5);
    assert_close(baselines[2], 33.5);
    assert_close(frame.line(0).height_above_baseline(), 9.5);
    assert_close(frame.line(0).height_below_baseline(), 2.5);
}

#[test]
fn cancelled_construction_returns_none() {
    let env = TestEnv::new();
    let string = env.string("Test Test");
    let range = 0..string.len();
    let flag = CancellationFlag::new();
    flag.cancel();

    let frame = TextFrame::new(
        string,
        range,
        Size::new(20., f64::INFINITY),
        None,
        &TextFrameOptions::default(),
        env.shaper(),
        Some(&flag),
    );
    assert!(frame.is_none(), "a set flag stops the layout");
}
