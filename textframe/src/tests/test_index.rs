// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::utils::TestEnv;
use crate::{TextFrame, TextFrameOptions};

fn truncated_testing() -> TextFrame {
    let options = TextFrameOptions::builder().max_line_count(1).build();
    TestEnv::new()
        .with_width(25.)
        .with_options(options)
        .frame("Testing")
}

#[test]
fn line_ranges_round_trip() {
    let frame = TestEnv::new()
        .with_width(20.)
        .frame("Test Test\nTest\u{2028}Te");

    for line in frame.lines() {
        let original = line.range_in_original_string();
        let indices = frame.range_for_original_range(original.clone());
        assert_eq!(indices, line.range(), "line {}", line.index());
        assert_eq!(frame.range_in_original_string_for(indices), original);
    }
}

#[test]
fn truncated_ranges_round_trip() {
    let frame = truncated_testing();

    for start in 0..=frame.truncated_string_len() {
        for end in start..=frame.truncated_string_len() {
            let range = frame.range_for_truncated_range(start..end);
            assert_eq!(frame.range_in_truncated_string(range), start..end);
        }
    }
}

#[test]
fn indices_in_token() {
    let frame = truncated_testing();

    let index = frame.index_for_original(5, 0);
    assert_eq!(index.index_in_truncated_string(), 4);
    let clamped = frame.index_for_original(5, 3);
    assert_eq!(clamped.index_in_truncated_string(), 5);
    assert_eq!(frame.range_in_original_string_at(index), 4..7);
    let plain = frame.index_for_truncated(2);
    assert_eq!(frame.range_in_original_string_at(plain), 2..2);

    let range = frame.range_for_original_range(5..6);
    assert_eq!(
        frame.range_in_truncated_string(range),
        4..5,
        "covers the whole token"
    );
}

#[test]
fn clamping() {
    let frame = TestEnv::new().frame("Test");

    assert_eq!(frame.index_for_truncated(100), frame.end_index());
    assert_eq!(frame.index_for_original(100, 0), frame.end_index());
    assert_eq!(frame.indices(), frame.start_index()..frame.end_index());
    assert_eq!(frame.end_index().index_in_truncated_string(), 4);
}

#[test]
fn indices_know_their_line() {
    let frame = TestEnv::new().with_width(20.).frame("Test Test");

    assert_eq!(frame.index_for_truncated(3).line_index(), 0);
    assert_eq!(frame.index_for_truncated(4).line_index(), 0);
    assert_eq!(frame.index_for_truncated(6).line_index(), 1);
    assert_eq!(frame.end_index().line_index(), 1);
}

#[test]
fn hyphen_index_ordering() {
    let frame = TestEnv::new().with_width(25.).frame("Test\u{AD}Test");
    let line = frame.line(0);
    let hyphen = line.hyphen_index().expect("line is hyphenated");
    let before = frame.index_for_truncated(4);
    let after = frame.index_for_truncated(5);

    assert!(before < hyphen, "hyphen follows its character");
    assert!(hyphen < after, "hyphen precedes the next character");
    assert_ne!(before, hyphen);
    assert_eq!(frame.range_in_truncated_string(hyphen..line.end_index()), 5..5);
    assert_eq!(frame.range_in_original_string_at(hyphen), 5..5);
}

#[test]
fn equality_ignores_line() {
    let frame = TestEnv::new().with_width(20.).frame("Test Test");
    let end_of_first = frame.line(0).end_index();
    let from_offset = frame.index_for_truncated(4);

    assert_eq!(end_of_first, from_offset);
    assert_eq!(end_of_first.line_index(), 0);
}

#[test]
#[should_panic]
fn foreign_index_panics() {
    let long = TestEnv::new().frame("A much longer text");
    let short = TestEnv::new().frame("Short");
    let index = long.index_for_truncated(10);
    let _ = short.range_in_original_string_for(index..index);
}
