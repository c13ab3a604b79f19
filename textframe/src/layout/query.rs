// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangles, hit testing and links.

use core::ops::Range;
use std::sync::Arc;

use peniko::kurbo::{Point, Rect};
use smallvec::{SmallVec, smallvec};

use super::data::{ClusterData, ClusterSource, LineData, LineItemData, Pool, TextStorage};
use super::{TextFrame, TextFrameFlags, TextFrameIndex};
use crate::DisplayScale;
use crate::analysis::{self, Direction};
use crate::util::to_u32;

/// A rectangle covering part of a line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextRect {
    /// The rectangle, spanning the typographic height of the line.
    pub rect: Rect,
    /// The index of the line.
    pub line_index: usize,
    /// The y of the line's baseline.
    pub baseline: f64,
}

/// The rectangles covering a range of a frame, at most a few per line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextRectArray {
    rects: Vec<TextRect>,
    bounds: Rect,
}

impl TextRectArray {
    fn new(rects: Vec<TextRect>) -> Self {
        let bounds = rects
            .iter()
            .map(|rect| rect.rect)
            .reduce(|bounds, rect| bounds.union(rect))
            .unwrap_or(Rect::ZERO);
        Self { rects, bounds }
    }

    /// The rectangles in line order, left to right within a line.
    pub fn rects(&self) -> &[TextRect] {
        &self.rects
    }

    /// The number of rectangles.
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Returns `true` if there are no rectangles.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Returns the rectangle at `index`.
    pub fn get(&self, index: usize) -> Option<&TextRect> {
        self.rects.get(index)
    }

    /// The union of all rectangles, or a zero rectangle if there are none.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Returns the index of and distance to the rectangle closest to `point`, if that distance is
    /// at most `max_distance`.
    ///
    /// Points inside a rectangle have a distance of zero. Ties go to the earlier rectangle.
    pub fn find_rect_closest_to(&self, point: Point, max_distance: f64) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (index, rect) in self.rects.iter().enumerate() {
            let distance = distance_to_rect(point, rect.rect);
            if distance <= max_distance && best.is_none_or(|(_, best)| distance < best) {
                best = Some((index, distance));
            }
        }
        best
    }
}

/// The result of hit testing a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphemeClusterRange {
    /// The index range of the grapheme cluster.
    pub range: Range<TextFrameIndex>,
    /// The typographic bounds of the grapheme cluster.
    pub bounds: Rect,
    /// The direction of the text containing the grapheme cluster.
    pub direction: Direction,
    /// The bounds are a fraction of the bounds of a ligature.
    pub is_ligature_fraction: bool,
}

/// A run of text carrying a link.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLink {
    /// The link target.
    pub link: Arc<str>,
    /// The index range of the linked text.
    pub range: Range<TextFrameIndex>,
    /// The rectangles covering the linked text.
    pub rects: TextRectArray,
}

/// A cluster of a line in visual order.
pub(crate) struct VisualCluster<'a> {
    pub(crate) item: &'a LineItemData,
    pub(crate) storage: &'a TextStorage,
    pub(crate) cluster: &'a ClusterData,
    /// Left edge relative to the line origin, in layout units.
    pub(crate) x: f32,
    pub(crate) span: Range<TextFrameIndex>,
}

/// A grapheme cluster of a [`VisualCluster`], or the whole cluster.
struct ClusterPart {
    span: Range<TextFrameIndex>,
    left: f32,
    right: f32,
    is_ligature_fraction: bool,
}

impl TextFrame {
    /// The rectangles covering `range` for a frame placed at `frame_origin`.
    ///
    /// Adjacent parts of a line are merged. A range ending inside a ligature covers the matching
    /// fraction of the ligature.
    pub fn rects(
        &self,
        range: Range<TextFrameIndex>,
        frame_origin: Point,
        display_scale: Option<DisplayScale>,
    ) -> TextRectArray {
        let lines = &self.layout.lines;
        if range.start >= range.end || lines.is_empty() {
            return TextRectArray::default();
        }
        // A hyphen position belongs to the line before its range offset.
        let first = self.line_for_truncated(to_u32(range.start.index_in_truncated_string()));
        let last = self.line_for_truncated(range.end.range_offset());
        let mut rects = Vec::new();
        for (line_index, line) in lines.iter().enumerate().take(last + 1).skip(first) {
            let (top, bottom, baseline) = self.line_extent(line, frame_origin, display_scale);
            let x0 = self.line_x(line, frame_origin.x);
            let mut intervals: SmallVec<[(f64, f64); 4]> = SmallVec::new();
            for visual in self.visual_clusters(line_index) {
                for part in self.cluster_parts(&visual) {
                    if !(part.span.start < range.end && range.start < part.span.end) {
                        continue;
                    }
                    let left = x0 + self.scale * f64::from(part.left);
                    let right = x0 + self.scale * f64::from(part.right);
                    match intervals.last_mut() {
                        Some(last) if (last.1 - left).abs() < 1e-9 => last.1 = right,
                        _ => intervals.push((left, right)),
                    }
                }
            }
            rects.extend(intervals.into_iter().map(|(left, right)| TextRect {
                rect: Rect::new(left, top, right, bottom),
                line_index,
                baseline,
            }));
        }
        TextRectArray::new(rects)
    }

    /// Finds the grapheme cluster closest to `point` for a frame placed at `frame_origin`.
    ///
    /// The closest line is chosen first by vertical distance, then the closest grapheme cluster
    /// in that line. With `ignoring_trailing_whitespace`, the trailing whitespace of a line is
    /// only considered if the line has no other text. Returns `None` for a frame without lines.
    pub fn range_of_grapheme_cluster_closest_to(
        &self,
        point: Point,
        ignoring_trailing_whitespace: bool,
        frame_origin: Point,
        display_scale: Option<DisplayScale>,
    ) -> Option<GraphemeClusterRange> {
        let lines = &self.layout.lines;
        let mut closest_line: Option<(usize, f64)> = None;
        for (index, line) in lines.iter().enumerate() {
            let (top, bottom, _) = self.line_extent(line, frame_origin, display_scale);
            let distance = if point.y < top {
                top - point.y
            } else if point.y > bottom {
                point.y - bottom
            } else {
                0.
            };
            if closest_line.is_none_or(|(_, best)| distance < best) {
                closest_line = Some((index, distance));
            }
        }
        let (line_index, _) = closest_line?;
        let line = &lines[line_index];
        let (top, bottom, _) = self.line_extent(line, frame_origin, display_scale);
        let x0 = self.line_x(line, frame_origin.x);

        let clusters = self.visual_clusters(line_index);
        let has_content = clusters
            .iter()
            .any(|visual| !visual.item.is_trailing_whitespace);
        let mut best: Option<(f64, ClusterPart, Direction)> = None;
        for visual in &clusters {
            if ignoring_trailing_whitespace && has_content && visual.item.is_trailing_whitespace {
                continue;
            }
            let direction = Direction::from_level(visual.cluster.level);
            for part in self.cluster_parts(visual) {
                let left = x0 + self.scale * f64::from(part.left);
                let right = x0 + self.scale * f64::from(part.right);
                let distance = if point.x < left {
                    left - point.x
                } else if point.x > right {
                    point.x - right
                } else {
                    0.
                };
                if best
                    .as_ref()
                    .is_none_or(|(best, _, _)| distance < *best)
                {
                    best = Some((distance, part, direction));
                }
            }
        }
        let (_, part, direction) = best?;
        Some(GraphemeClusterRange {
            range: part.span,
            bounds: Rect::new(
                x0 + self.scale * f64::from(part.left),
                top,
                x0 + self.scale * f64::from(part.right),
                bottom,
            ),
            direction,
            is_ligature_fraction: part.is_ligature_fraction,
        })
    }

    /// The runs of text carrying a link, with their rectangles for a frame placed at
    /// `frame_origin`.
    pub fn links(
        &self,
        frame_origin: Point,
        display_scale: Option<DisplayScale>,
    ) -> Vec<TextLink> {
        if !self
            .flags
            .contains(TextFrameFlags::HAS_LINK)
        {
            return Vec::new();
        }
        let mut spans: Vec<(Range<TextFrameIndex>, &Arc<str>)> = Vec::new();
        for line_index in 0..self.layout.lines.len() {
            for visual in self.visual_clusters(line_index) {
                if let Some(link) = &visual.storage.cluster_style(visual.cluster).link {
                    spans.push((visual.span, link));
                }
            }
        }
        spans.sort_by(|a, b| a.0.start.cmp(&b.0.start));
        let mut merged: Vec<(Range<TextFrameIndex>, &Arc<str>)> = Vec::new();
        for (span, link) in spans {
            match merged.last_mut() {
                Some((range, last)) if range.end >= span.start && ***last == **link => {
                    range.end = range.end.max(span.end);
                }
                _ => merged.push((span, link)),
            }
        }
        merged
            .into_iter()
            .map(|(range, link)| TextLink {
                link: link.clone(),
                rects: self.rects(range.clone(), frame_origin, display_scale),
                range,
            })
            .collect()
    }

    /// Top, bottom and baseline of the typographic bounds of a line.
    pub(crate) fn line_extent(
        &self,
        line: &LineData,
        frame_origin: Point,
        display_scale: Option<DisplayScale>,
    ) -> (f64, f64, f64) {
        let baseline = self.line_baseline(line, frame_origin.y, display_scale);
        let heights = &line.heights;
        let half_leading = f64::from(heights.leading) / 2.;
        let top = baseline - self.scale * (f64::from(heights.ascent) + half_leading);
        let bottom = baseline + self.scale * (f64::from(heights.descent) + half_leading);
        (top, bottom, baseline)
    }

    pub(crate) fn storage_for(&self, pool: Pool) -> &TextStorage {
        match pool {
            Pool::Original => &self.storage,
            Pool::Inserted => &self.layout.inserted,
        }
    }

    /// The clusters of a line in visual order.
    pub(crate) fn visual_clusters(&self, line_index: usize) -> Vec<VisualCluster<'_>> {
        let line = &self.layout.lines[line_index];
        let mut clusters = Vec::new();
        for item in &self.layout.items[line.items.start as usize..line.items.end as usize] {
            let storage = self.storage_for(item.pool);
            let range = &storage.clusters[item.clusters.start as usize..item.clusters.end as usize];
            let mut x = item.x;
            let mut push = |cluster: &'_ ClusterData| {
                let span = self.cluster_span(line_index, line, item, cluster);
                let visual_x = x;
                x += cluster.advance;
                (visual_x, span)
            };
            if item.is_rtl() {
                for cluster in range.iter().rev() {
                    let (x, span) = push(cluster);
                    clusters.push(VisualCluster {
                        item,
                        storage,
                        cluster,
                        x,
                        span,
                    });
                }
            } else {
                for cluster in range {
                    let (x, span) = push(cluster);
                    clusters.push(VisualCluster {
                        item,
                        storage,
                        cluster,
                        x,
                        span,
                    });
                }
            }
        }
        clusters
    }

    fn cluster_span(
        &self,
        line_index: usize,
        line: &LineData,
        item: &LineItemData,
        cluster: &ClusterData,
    ) -> Range<TextFrameIndex> {
        let paragraphs = &self.layout.paragraphs;
        let (start, end) = match cluster.source {
            ClusterSource::Original => {
                let paragraph = &paragraphs[item.paragraph as usize];
                (
                    paragraph.truncated_offset(cluster.text.start),
                    paragraph.truncated_offset(cluster.text.end),
                )
            }
            ClusterSource::Token(slot) => {
                let token = &self.layout.tokens[slot as usize];
                let start = paragraphs[token.paragraph as usize].token_range().start;
                (start + cluster.text.start, start + cluster.text.end)
            }
            ClusterSource::Hyphen => {
                let end = line.truncated.end;
                return TextFrameIndex::new(end.saturating_sub(1), true, line_index)
                    ..TextFrameIndex::new(end, false, line_index);
            }
        };
        TextFrameIndex::new(start, false, line_index)..TextFrameIndex::new(end, false, line_index)
    }

    /// The code units a cluster was shaped from.
    fn cluster_text(&self, cluster: &ClusterData) -> &[u16] {
        let range = cluster.text.start as usize..cluster.text.end as usize;
        match cluster.source {
            ClusterSource::Original => &self.string.code_units()[range],
            ClusterSource::Token(slot) => {
                &self.layout.tokens[slot as usize].string.code_units()[range]
            }
            ClusterSource::Hyphen => &[],
        }
    }

    /// Splits a ligature cluster into equally wide grapheme clusters.
    fn cluster_parts(&self, visual: &VisualCluster<'_>) -> SmallVec<[ClusterPart; 1]> {
        let cluster = visual.cluster;
        let whole = ClusterPart {
            span: visual.span.clone(),
            left: visual.x,
            right: visual.x + cluster.advance,
            is_ligature_fraction: false,
        };
        if cluster.graphemes < 2 {
            return smallvec![whole];
        }
        let boundaries = analysis::grapheme_boundaries(self.cluster_text(cluster));
        let count = boundaries.len().saturating_sub(1);
        if count < 2 {
            return smallvec![whole];
        }
        let width = cluster.advance / count as f32;
        let start = visual.span.start;
        let line = start.line_index();
        boundaries
            .windows(2)
            .enumerate()
            .map(|(k, bounds)| {
                let slot = if cluster.level & 1 != 0 {
                    count - 1 - k
                } else {
                    k
                };
                let left = visual.x + width * slot as f32;
                let offset = start.index_in_truncated_string();
                ClusterPart {
                    span: TextFrameIndex::new(to_u32(offset + bounds[0]), false, line)
                        ..TextFrameIndex::new(to_u32(offset + bounds[1]), false, line),
                    left,
                    right: left + width,
                    is_ligature_fraction: true,
                }
            })
            .collect()
    }
}

fn distance_to_rect(point: Point, rect: Rect) -> f64 {
    let dx = (rect.x0 - point.x).max(point.x - rect.x1).max(0.);
    let dy = (rect.y0 - point.y).max(point.y - rect.y1).max(0.);
    dx.hypot(dy)
}
