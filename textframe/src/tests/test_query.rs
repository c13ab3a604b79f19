// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use peniko::kurbo::{Point, Rect};

use super::utils::{TestEnv, assert_close};
use crate::{Direction, SimpleShaper};

#[test]
fn rects_of_line_content() {
    let frame = TestEnv::new().with_width(20.).frame("Test Test");
    let rects = frame.rects(frame.line(0).range(), Point::ZERO, None);

    assert_eq!(rects.len(), 1);
    let rect = rects.get(0).expect("one rect");
    assert_eq!(rect.rect, Rect::new(0., 0., 20., 12.));
    assert_eq!(rect.line_index, 0);
    assert_close(rect.baseline, 9.5);
}

#[test]
fn rect_of_inserted_hyphen() {
    let frame = TestEnv::new().with_width(25.).frame("Test\u{AD}Test");
    let line = frame.line(0);
    let hyphen = line.hyphen_index().expect("line has a hyphen");
    let rects = frame.rects(hyphen..line.end_index(), Point::ZERO, None);

    assert_eq!(rects.len(), 1, "the hyphen has a rect on its own line");
    let rect = rects.get(0).expect("one rect");
    assert_eq!(rect.line_index, 0);
    assert_close(rect.rect.x0, 20.);
    assert_close(rect.rect.x1, 25.);
}

#[test]
fn rects_span_lines() {
    let frame = TestEnv::new().with_width(20.).frame("Test Test");
    let range = frame.range_for_truncated_range(2..7);
    let rects = frame.rects(range, Point::new(100., 50.), None);

    assert_eq!(rects.len(), 2);
    let first = rects.rects()[0];
    let second = rects.rects()[1];
    // The first line includes its trailing space.
    assert_eq!(first.rect, Rect::new(110., 50., 122.5, 62.));
    assert_eq!(second.rect, Rect::new(100., 62., 110., 74.));
    assert_eq!(second.line_index, 1);
    assert_eq!(rects.bounds(), Rect::new(100., 50., 122.5, 74.));
}

#[test]
fn empty_range_has_no_rects() {
    let frame = TestEnv::new().frame("Test");
    let index = frame.index_for_truncated(2);
    let rects = frame.rects(index..index, Point::ZERO, None);

    assert!(rects.is_empty());
    assert_eq!(rects.bounds(), Rect::ZERO);
}

#[test]
fn closest_rect() {
    let frame = TestEnv::new().with_width(20.).frame("Test Test");
    let rects = frame.rects(frame.indices(), Point::ZERO, None);

    assert_eq!(rects.find_rect_closest_to(Point::new(5., 20.), 0.), Some((1, 0.)));
    let (index, distance) = rects
        .find_rect_closest_to(Point::new(30., 6.), 100.)
        .expect("within range");
    assert_eq!(index, 0);
    assert_close(distance, 7.5);
    assert_eq!(rects.find_rect_closest_to(Point::new(0., 100.), 10.), None);
}

#[test]
fn hit_testing() {
    let frame = TestEnv::new().with_width(20.).frame("Test Test");

    let hit = frame
        .range_of_grapheme_cluster_closest_to(Point::new(12., 5.), false, Point::ZERO, None)
        .expect("frame has lines");
    assert_eq!(frame.range_in_truncated_string(hit.range.clone()), 2..3);
    assert_eq!(hit.bounds, Rect::new(10., 0., 15., 12.));
    assert_eq!(hit.direction, Direction::LeftToRight);
    assert!(!hit.is_ligature_fraction);

    let below = frame
        .range_of_grapheme_cluster_closest_to(Point::new(1., 500.), false, Point::ZERO, None)
        .expect("frame has lines");
    assert_eq!(frame.range_in_truncated_string(below.range), 5..6);
}

#[test]
fn hit_testing_trailing_whitespace() {
    let frame = TestEnv::new().with_width(20.).frame("Test Test");
    let far_right = Point::new(100., 5.);

    let with_space = frame
        .range_of_grapheme_cluster_closest_to(far_right, false, Point::ZERO, None)
        .expect("frame has lines");
    assert_eq!(frame.range_in_truncated_string(with_space.range), 4..5);
    let without_space = frame
        .range_of_grapheme_cluster_closest_to(far_right, true, Point::ZERO, None)
        .expect("frame has lines");
    assert_eq!(frame.range_in_truncated_string(without_space.range), 3..4);
}

#[test]
fn hit_testing_empty_frame() {
    let frame = TestEnv::new().frame("");
    assert!(
        frame
            .range_of_grapheme_cluster_closest_to(Point::ZERO, false, Point::ZERO, None)
            .is_none()
    );
}

#[test]
fn hit_testing_right_to_left() {
    let frame = TestEnv::new().frame("\u{5D0}\u{5D1}\u{5D2}");
    let hit = frame
        .range_of_grapheme_cluster_closest_to(Point::new(1., 5.), false, Point::ZERO, None)
        .expect("frame has lines");

    assert_eq!(frame.line(0).paragraph_direction(), Direction::RightToLeft);
    assert_eq!(hit.direction, Direction::RightToLeft);
    assert_eq!(
        frame.range_in_truncated_string(hit.range),
        2..3,
        "the leftmost glyph is the last character"
    );
}

#[test]
fn ligature_fractions() {
    let env = TestEnv::new().with_shaper(SimpleShaper::new().with_ligature("fi"));
    let frame = env.frame("fig");

    let rects = frame.rects(frame.range_for_truncated_range(0..1), Point::ZERO, None);
    assert_eq!(rects.len(), 1);
    assert_eq!(rects.rects()[0].rect, Rect::new(0., 0., 5., 12.));

    let hit = frame
        .range_of_grapheme_cluster_closest_to(Point::new(7., 5.), false, Point::ZERO, None)
        .expect("frame has lines");
    assert!(hit.is_ligature_fraction, "second half of the ligature");
    assert_eq!(frame.range_in_truncated_string(hit.range), 1..2);
    assert_eq!(hit.bounds, Rect::new(5., 0., 10., 12.));
}

#[test]
fn links_are_merged_across_lines() {
    let env = TestEnv::new().with_width(20.);
    let mut linked = env.attributes();
    linked.link = Some(Arc::from("https://example.com"));
    let string = env.styled(&[("Go ", None), ("Test Test", Some(linked))]);
    let frame = env.frame_for(string);

    let links = frame.links(Point::ZERO, None);
    assert_eq!(links.len(), 1);
    let link = &links[0];
    assert_eq!(&*link.link, "https://example.com");
    assert_eq!(frame.range_in_truncated_string(link.range.clone()), 3..12);
    assert_eq!(link.rects.len(), 2);
}

#[test]
fn no_links_without_link_attributes() {
    let frame = TestEnv::new().frame("plain");
    assert!(frame.links(Point::ZERO, None).is_empty());
}

#[test]
fn view_with_origin_matches_frame() {
    let frame = TestEnv::new().with_width(20.).frame("Test Test");
    let origin = Point::new(5., 7.);
    let view = frame.with_origin(origin, None);

    assert_eq!(view.layout_info(), frame.layout_info(origin, None));
    assert_eq!(view.layout_bounds(), frame.layout_bounds(origin, None));
    assert_eq!(view.first_baseline(), frame.first_baseline(origin.y, None));
    assert_eq!(view.line_baseline_origin(1), Point::new(5., 28.5));
    assert_eq!(
        view.rects(frame.indices()),
        frame.rects(frame.indices(), origin, None)
    );
    assert_eq!(
        view.range_of_grapheme_cluster_closest_to(Point::new(8., 10.), true),
        frame.range_of_grapheme_cluster_closest_to(Point::new(8., 10.), true, origin, None)
    );
    assert_eq!(view.image_bounds(None), frame.image_bounds(None, origin, None));
}
