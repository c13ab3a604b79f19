// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Breaking prepared text into lines at one text scale.

use core::ops::Range;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::analysis::BidiLevel;
use crate::cancel::{self, CancellationFlag};
use crate::layout::data::{
    ClusterData, ClusterSource, ItemKind, LineData, LineFlags, LineHeights, LineItemData,
    ParagraphData, Pool, ResolvedAlignment, TextStorage, TokenData,
};
use crate::layout::hyphenation::Hyphenator;
use crate::layout::line_break::{BrokenLine, LineBreaker};
use crate::layout::metrics::{self, MetricsAccumulator, PreviousLine};
use crate::layout::prepare::{self, PreparedParagraph, PreparedText};
use crate::layout::truncation::{self, TruncatedLine, Truncation, TruncationRequest};
use crate::shape::{RunMetrics, Shaper};
use crate::util::{to_u32, u32_range};
use crate::{LastLineTruncationMode, StyledString, TextFrameOptions};

/// Tolerance of the height check.
const HEIGHT_EPSILON: f64 = 1. / 1024.;

/// The ellipsis used when no truncation token is given.
const DEFAULT_TRUNCATION_TOKEN: u16 = 0x2026;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub(crate) struct LayoutFlags: u8 {
        const TRUNCATED = 1 << 0;
        const CLIPPED = 1 << 1;
        const HAS_HYPHEN = 1 << 2;
        const EMERGENCY_BREAK = 1 << 3;
    }
}

pub(crate) struct LayoutInput<'a> {
    pub(crate) string: &'a StyledString,
    pub(crate) prepared: &'a PreparedText,
    pub(crate) options: &'a TextFrameOptions,
    pub(crate) shaper: &'a dyn Shaper,
    pub(crate) cancel: Option<&'a CancellationFlag>,
}

/// Lines and paragraphs in layout units, before scaling.
#[derive(Clone, Debug, Default)]
pub(crate) struct LayoutOutput {
    pub(crate) paragraphs: Vec<ParagraphData>,
    pub(crate) lines: Vec<LineData>,
    pub(crate) items: Vec<LineItemData>,
    pub(crate) inserted: TextStorage,
    pub(crate) tokens: Vec<TokenData>,
    /// The laid out range of the original string.
    pub(crate) range: Range<u32>,
    pub(crate) truncated_len: u32,
    pub(crate) flags: LayoutFlags,
}

impl LayoutOutput {
    /// Layout succeeded without reducing the text.
    pub(crate) fn fits(&self) -> bool {
        !self.flags.intersects(
            LayoutFlags::TRUNCATED | LayoutFlags::CLIPPED | LayoutFlags::EMERGENCY_BREAK,
        )
    }
}

/// Lays out the prepared text for the given size in layout units.
///
/// Returns `None` if cancelled.
pub(crate) fn layout(
    input: &LayoutInput<'_>,
    hyphenator: &mut Hyphenator<'_>,
    width: f32,
    height: f64,
) -> Option<LayoutOutput> {
    let mut layouter = Layouter {
        input,
        breaker: LineBreaker {
            string: input.string,
            storage: &input.prepared.storage,
            shaper: input.shaper,
            hyphenator,
        },
        width,
        height,
        out: LayoutOutput {
            range: input.prepared.range.clone(),
            ..Default::default()
        },
        states: Vec::new(),
        excisions: Vec::new(),
        paragraph_count: input.prepared.paragraphs.len(),
    };
    layouter.break_paragraphs()?;
    layouter.finish();
    Some(layouter.out)
}

/// Bookkeeping for retruncating a line.
#[derive(Clone, Debug)]
struct LineState {
    start: usize,
    content_end: usize,
    available_width: f32,
    previous: Option<PreviousLine>,
    mark: Mark,
    has_excision: bool,
}

/// Lengths of the output vectors before a line was added.
#[derive(Clone, Copy, Debug)]
struct Mark {
    lines: usize,
    items: usize,
    clusters: usize,
    glyphs: usize,
    runs: usize,
    tokens: usize,
}

#[derive(Clone, Debug)]
struct Excision {
    paragraph: usize,
    last_paragraph: usize,
    range: Range<u32>,
    token: Option<u32>,
    token_len: u32,
}

#[derive(Clone, Debug)]
struct Segment {
    pool: Pool,
    kind: ItemKind,
    clusters: Range<usize>,
    paragraph: usize,
}

/// A line to add, in original string offsets.
#[derive(Clone, Debug)]
struct LinePlan {
    paragraph: usize,
    original: Range<u32>,
    whitespace_end: u32,
    excised: Option<Range<u32>>,
    hyphen: Option<char>,
    flags: LineFlags,
}

/// Why the line before the current one has to be truncated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Trigger {
    /// The frame's line count or height is exhausted.
    Frame,
    /// The truncation scope with the given index is exhausted.
    Scope(usize),
}

struct Layouter<'a, 'h> {
    input: &'a LayoutInput<'a>,
    breaker: LineBreaker<'a, 'h>,
    width: f32,
    height: f64,
    out: LayoutOutput,
    states: Vec<LineState>,
    excisions: Vec<Excision>,
    /// Number of paragraphs in the output.
    paragraph_count: usize,
}

struct BuiltItems {
    items: Range<u32>,
    width: f32,
    metrics: MetricsAccumulator,
    split_x: Option<f32>,
    token_width: f32,
    hyphen_width: f32,
}

impl Layouter<'_, '_> {
    fn break_paragraphs(&mut self) -> Option<()> {
        let input = self.input;
        let prepared = input.prepared;
        let max_lines = match input.options.max_line_count {
            0 => usize::MAX,
            count => count as usize,
        };
        let mut current_scope = None;
        let mut scope_lines = 0;
        let mut p = 0;
        'paragraphs: while p < prepared.paragraphs.len() {
            let paragraph = &prepared.paragraphs[p];
            let scope = paragraph.scope.map(|scope| scope as usize);
            if scope != current_scope {
                current_scope = scope;
                scope_lines = 0;
            }
            let mut start = paragraph.clusters.start as usize;
            let mut index_in_paragraph = 0;
            loop {
                if cancel::is_cancelled(input.cancel) {
                    return None;
                }
                let (head_indent, tail_indent) = paragraph.style.indents(index_in_paragraph);
                let available_width = (self.width - head_indent - tail_indent).max(0.);
                let broken = self.breaker.break_line(paragraph, start, available_width);
                if self.out.lines.len() == max_lines {
                    self.truncate_last_line(Trigger::Frame);
                    break 'paragraphs;
                }
                if let Some(scope) = scope {
                    let span = &prepared.scopes[scope];
                    if scope_lines == span.scope.max_line_count() {
                        self.truncate_last_line(Trigger::Scope(scope));
                        p = span.paragraphs.end as usize;
                        continue 'paragraphs;
                    }
                }
                let is_last = broken.whitespace_end == paragraph.clusters.end as usize;
                let previous = self.previous_line();
                let mark = self.mark();
                self.push_broken_line(p, index_in_paragraph, &broken, is_last, previous);
                if self.out.lines.len() > 1 && self.overflows_height() {
                    self.restore(mark);
                    self.truncate_last_line(Trigger::Frame);
                    break 'paragraphs;
                }
                self.states.push(LineState {
                    start,
                    content_end: broken.content.end,
                    available_width,
                    previous,
                    mark,
                    has_excision: false,
                });
                scope_lines += 1;
                if is_last {
                    break;
                }
                start = broken.whitespace_end;
                index_in_paragraph += 1;
            }
            p += 1;
        }
        Some(())
    }

    fn previous_line(&self) -> Option<PreviousLine> {
        let line = self.out.lines.last()?;
        let style = &self.input.prepared.paragraphs[line.paragraph as usize].style;
        Some(PreviousLine {
            baseline: line.baseline,
            below: line.heights.below + line.heights.extra_below,
            min_baseline_distance: style.minimum_baseline_distance,
            paragraph_spacing_after: style.paragraph_spacing_after,
        })
    }

    fn overflows_height(&self) -> bool {
        self.out.lines.last().is_some_and(|line| {
            line.baseline + f64::from(line.heights.descent) > self.height + HEIGHT_EPSILON
        })
    }

    fn mark(&self) -> Mark {
        Mark {
            lines: self.out.lines.len(),
            items: self.out.items.len(),
            clusters: self.out.inserted.clusters.len(),
            glyphs: self.out.inserted.glyphs.len(),
            runs: self.out.inserted.runs.len(),
            tokens: self.out.tokens.len(),
        }
    }

    /// Removes everything added after `mark`.
    fn restore(&mut self, mark: Mark) {
        self.out.lines.truncate(mark.lines);
        self.out.items.truncate(mark.items);
        self.out.inserted.clusters.truncate(mark.clusters);
        self.out.inserted.glyphs.truncate(mark.glyphs);
        self.out.inserted.runs.truncate(mark.runs);
        self.out.tokens.truncate(mark.tokens);
    }

    fn push_broken_line(
        &mut self,
        p: usize,
        index_in_paragraph: u32,
        broken: &BrokenLine,
        is_last: bool,
        previous: Option<PreviousLine>,
    ) {
        let input = self.input;
        let prepared = input.prepared;
        let paragraph = &prepared.paragraphs[p];
        let clusters = &prepared.storage.clusters;
        let mut segments: SmallVec<[Segment; 4]> = SmallVec::new();
        segments.push(Segment {
            pool: Pool::Original,
            kind: ItemKind::Text,
            clusters: broken.content.clone(),
            paragraph: p,
        });
        if let Some(hyphen) = broken.hyphen {
            let cluster = &clusters[broken.content.end - 1];
            let attributes = prepared.storage.cluster_style(cluster).clone();
            let mut buffer = [0_u16; 2];
            let string = StyledString::from_utf16(
                hyphen.encode_utf16(&mut buffer).to_vec(),
                attributes,
            );
            let range = prepare::shape_inserted(
                &mut self.out.inserted,
                input.shaper,
                &string,
                ClusterSource::Hyphen,
                cluster.level,
            );
            segments.push(Segment {
                pool: Pool::Inserted,
                kind: ItemKind::Hyphen,
                clusters: range,
                paragraph: p,
            });
        }
        segments.push(Segment {
            pool: Pool::Original,
            kind: ItemKind::Text,
            clusters: broken.content.end..broken.whitespace_end,
            paragraph: p,
        });

        let start = line_start(clusters, paragraph, broken.content.start);
        let end = if broken.content.is_empty() {
            start
        } else {
            clusters[broken.content.end - 1].text.end
        };
        let whitespace_end = if is_last {
            paragraph.range.end
        } else {
            clusters[broken.whitespace_end].text.start
        };
        let mut flags = LineFlags::empty();
        flags.set(LineFlags::FIRST_IN_PARAGRAPH, index_in_paragraph == 0);
        flags.set(LineFlags::LAST_IN_PARAGRAPH, is_last);
        flags.set(
            LineFlags::FOLLOWED_BY_TERMINATOR,
            is_last && paragraph.terminator_len > 0,
        );
        flags.set(LineFlags::HAS_HYPHEN, broken.hyphen.is_some());
        flags.set(LineFlags::IS_RTL, paragraph.is_rtl());
        flags.set(LineFlags::EMERGENCY_BREAK, broken.is_emergency_break);
        let plan = LinePlan {
            paragraph: p,
            original: start..end,
            whitespace_end,
            excised: None,
            hyphen: broken.hyphen,
            flags,
        };
        self.add_line(&plan, &segments, previous);
    }

    fn add_line(&mut self, plan: &LinePlan, segments: &[Segment], previous: Option<PreviousLine>) {
        let input = self.input;
        let paragraph = &input.prepared.paragraphs[plan.paragraph];
        let style = &paragraph.style;
        let built = self.build_items(plan.paragraph, segments);
        let mut heights: LineHeights = built.metrics.heights(style, input.options.layout_mode);
        let extra =
            metrics::minimum_baseline_distance_spacing(&heights, style.minimum_baseline_distance);
        let is_first = plan.flags.contains(LineFlags::FIRST_IN_PARAGRAPH);
        if is_first {
            heights.extra_above = extra;
        }
        if plan.flags.contains(LineFlags::LAST_IN_PARAGRAPH) {
            heights.extra_below = extra;
        }
        let baseline = metrics::baseline(previous.as_ref(), is_first, &heights, style);
        self.out.lines.push(LineData {
            paragraph: to_u32(plan.paragraph),
            original: plan.original.clone(),
            original_end_with_whitespace: plan.whitespace_end,
            excised: plan
                .excised
                .clone()
                .unwrap_or(plan.original.end..plan.original.end),
            truncated: 0..0,
            trailing_whitespace_len: 0,
            items: built.items,
            origin_x: 0.,
            baseline,
            width: built.width,
            heights,
            left_part_width: built.split_x.unwrap_or(built.width),
            token_width: built.token_width,
            hyphen: plan.hyphen,
            hyphen_width: built.hyphen_width,
            flags: plan.flags,
        });
    }

    fn cluster(&self, pool: Pool, index: usize) -> &ClusterData {
        &self.storage(pool).clusters[index]
    }

    fn storage(&self, pool: Pool) -> &TextStorage {
        match pool {
            Pool::Original => &self.input.prepared.storage,
            Pool::Inserted => &self.out.inserted,
        }
    }

    /// Appends the visual runs of a line, given its logical segments.
    fn build_items(&mut self, p: usize, segments: &[Segment]) -> BuiltItems {
        struct Entry {
            pool: Pool,
            kind: ItemKind,
            paragraph: usize,
            cluster: usize,
            level: BidiLevel,
            trailing: bool,
        }

        let paragraph = &self.input.prepared.paragraphs[p];
        let base_level = paragraph.base_level;
        let mut entries: Vec<Entry> = segments
            .iter()
            .flat_map(|segment| {
                segment.clusters.clone().map(move |cluster| Entry {
                    pool: segment.pool,
                    kind: segment.kind,
                    paragraph: segment.paragraph,
                    cluster,
                    level: 0,
                    trailing: false,
                })
            })
            .collect();
        let mut metrics = MetricsAccumulator::new();
        for entry in &mut entries {
            let storage = self.storage(entry.pool);
            let cluster = &storage.clusters[entry.cluster];
            entry.level = cluster.level;
            metrics.add(
                storage.cluster_metrics(cluster),
                storage.cluster_style(cluster).baseline_offset,
            );
        }
        if metrics.is_empty() {
            metrics.add(
                &RunMetrics::from_attributes(&paragraph.attributes),
                paragraph.attributes.baseline_offset,
            );
        }
        // Trailing whitespace hangs at the end of the line in paragraph direction.
        for entry in entries.iter_mut().rev() {
            if entry.pool != Pool::Original
                || !self.input.prepared.storage.clusters[entry.cluster].is_whitespace()
            {
                break;
            }
            entry.trailing = true;
            entry.level = base_level;
        }

        let mut items: Vec<LineItemData> = Vec::new();
        for entry in &entries {
            let advance = self.cluster(entry.pool, entry.cluster).advance;
            let cluster = to_u32(entry.cluster);
            let paragraph = to_u32(entry.paragraph);
            match items.last_mut() {
                Some(item)
                    if item.pool == entry.pool
                        && item.kind == entry.kind
                        && item.paragraph == paragraph
                        && item.level == entry.level
                        && item.is_trailing_whitespace == entry.trailing
                        && item.clusters.end == cluster =>
                {
                    item.clusters.end += 1;
                    item.advance += advance;
                }
                _ => items.push(LineItemData {
                    kind: entry.kind,
                    pool: entry.pool,
                    clusters: cluster..cluster + 1,
                    level: entry.level,
                    x: 0.,
                    advance,
                    paragraph,
                    is_trailing_whitespace: entry.trailing,
                }),
            }
        }
        reorder_items(&mut items);
        let mut x = 0.;
        for item in &mut items {
            item.x = x;
            x += item.advance;
        }
        let trailing_width: f32 = items
            .iter()
            .filter(|item| item.is_trailing_whitespace)
            .map(|item| item.advance)
            .sum();
        if base_level & 1 != 0 {
            for item in &mut items {
                item.x -= trailing_width;
            }
        }
        let inserted_width = |kind: ItemKind| -> f32 {
            items
                .iter()
                .filter(|item| item.kind == kind)
                .map(|item| item.advance)
                .sum()
        };
        let token_width = inserted_width(ItemKind::Token);
        let hyphen_width = inserted_width(ItemKind::Hyphen);
        let split_x = items
            .iter()
            .find(|item| item.kind != ItemKind::Text)
            .map(|item| item.x);
        let start = to_u32(self.out.items.len());
        self.out.items.extend(items);
        BuiltItems {
            items: start..to_u32(self.out.items.len()),
            width: x - trailing_width,
            metrics,
            split_x,
            token_width,
            hyphen_width,
        }
    }

    /// Replaces the last line by a truncated version that ends the scope or the frame.
    fn truncate_last_line(&mut self, trigger: Trigger) {
        let input = self.input;
        let prepared = input.prepared;
        let options = input.options;
        let (mode, token, truncatable, removal_end) = match trigger {
            Trigger::Frame => (
                options.last_line_truncation_mode,
                options.truncation_token.clone(),
                prepared.range.clone(),
                prepared.range.end,
            ),
            Trigger::Scope(scope) => {
                let span = &prepared.scopes[scope];
                let first = &prepared.paragraphs[span.paragraphs.start as usize];
                let last = &prepared.paragraphs[span.paragraphs.end as usize - 1];
                let scope_range = first.range.start..last.range.end;
                let truncatable = span.scope.truncatable_range().map_or(
                    scope_range.clone(),
                    |range| {
                        let range = u32_range(range);
                        let start = scope_range.start.saturating_add(range.start);
                        let end = scope_range.start.saturating_add(range.end);
                        start.min(scope_range.end)..end.min(scope_range.end)
                    },
                );
                (
                    span.scope.mode(),
                    span.scope.token().cloned(),
                    truncatable,
                    last.content_end(),
                )
            }
        };
        if trigger == Trigger::Frame && mode == LastLineTruncationMode::Clip {
            self.clip();
            return;
        }
        let Some(state) = self.states.pop() else {
            return;
        };
        if state.has_excision {
            self.excisions.pop();
        }
        let Some(old) = self.out.lines.get(state.mark.lines).cloned() else {
            return;
        };
        self.restore(state.mark);
        let p = old.paragraph as usize;
        let paragraph = &prepared.paragraphs[p];
        let storage = &prepared.storage;

        let (token_clusters, token_slot, token_len) = if mode == LastLineTruncationMode::Clip {
            (0..0, None, 0)
        } else {
            let string = token.unwrap_or_else(|| {
                let attributes = if state.content_end > state.start {
                    storage
                        .cluster_style(&storage.clusters[state.content_end - 1])
                        .clone()
                } else {
                    paragraph.attributes.clone()
                };
                Arc::new(StyledString::from_utf16(
                    vec![DEFAULT_TRUNCATION_TOKEN],
                    attributes,
                ))
            });
            let slot = to_u32(self.out.tokens.len());
            self.out.tokens.push(TokenData {
                string: string.clone(),
                paragraph: to_u32(p),
            });
            let clusters = prepare::shape_inserted(
                &mut self.out.inserted,
                input.shaper,
                &string,
                ClusterSource::Token(slot),
                paragraph.base_level,
            );
            (clusters, Some(slot), to_u32(string.len()))
        };
        let token_width = self.out.inserted.clusters[token_clusters.clone()]
            .iter()
            .map(|cluster| cluster.advance)
            .sum();
        let truncation = truncation::truncate_line(
            input.string,
            &storage.clusters,
            &prepared.paragraphs,
            &TruncatedLine {
                paragraph: p,
                start: state.start,
                content_end: state.content_end,
                available_width: state.available_width,
            },
            &TruncationRequest {
                mode,
                truncatable,
                removal_end,
                adjuster: options.truncation_range_adjuster.as_ref(),
                token_width,
            },
        );
        let segments = [
            Segment {
                pool: Pool::Original,
                kind: ItemKind::Text,
                clusters: truncation.head.clone(),
                paragraph: p,
            },
            Segment {
                pool: Pool::Inserted,
                kind: ItemKind::Token,
                clusters: token_clusters,
                paragraph: p,
            },
            Segment {
                pool: Pool::Original,
                kind: ItemKind::Text,
                clusters: truncation.tail.clone(),
                paragraph: truncation.tail_paragraph,
            },
        ];
        let last = &prepared.paragraphs[truncation.last_paragraph];
        let end = truncated_line_end(&storage.clusters, &truncation, last.content_end())
            .max(old.original.start);
        let mut flags = old.flags & (LineFlags::FIRST_IN_PARAGRAPH | LineFlags::IS_RTL);
        flags |= LineFlags::LAST_IN_PARAGRAPH;
        flags.set(LineFlags::HAS_TOKEN, token_len > 0);
        flags.set(
            LineFlags::FOLLOWED_BY_TERMINATOR,
            last.terminator_len > 0 && truncation.excised.end <= last.content_end(),
        );
        let plan = LinePlan {
            paragraph: p,
            original: old.original.start..end,
            whitespace_end: last.range.end,
            excised: Some(truncation.excised.clone()),
            hyphen: None,
            flags,
        };
        self.excisions.push(Excision {
            paragraph: p,
            last_paragraph: truncation.last_paragraph,
            range: truncation.excised,
            token: token_slot,
            token_len,
        });
        self.out.flags |= LayoutFlags::TRUNCATED;
        self.add_line(&plan, &segments, state.previous);
        self.states.push(LineState {
            has_excision: true,
            ..state
        });
    }

    /// Drops everything after the last line.
    fn clip(&mut self) {
        let Some(line) = self.out.lines.last() else {
            return;
        };
        let end = line.original_end_with_whitespace;
        self.out.range.end = end;
        self.paragraph_count = self
            .input
            .prepared
            .paragraphs
            .iter()
            .take_while(|paragraph| paragraph.range.start < end)
            .count()
            .max(1);
        self.out.flags |= LayoutFlags::CLIPPED;
        log::trace!("Clipped text at {end}");
    }

    /// Builds the paragraphs and resolves string offsets and horizontal positions of the lines.
    fn finish(&mut self) {
        let prepared = self.input.prepared;
        let end = self.out.range.end;
        let mut truncated_start = 0;
        let mut line_index = 0;
        let mut paragraphs = Vec::with_capacity(self.paragraph_count);
        for (i, prepared_paragraph) in prepared.paragraphs[..self.paragraph_count]
            .iter()
            .enumerate()
        {
            let range = prepared_paragraph.range.start..prepared_paragraph.range.end.min(end);
            let content_end = prepared_paragraph.content_end().min(range.end);
            let excision = self
                .excisions
                .iter()
                .find(|excision| excision.paragraph <= i && i <= excision.last_paragraph);
            let (excised, token, token_len, excision_continues) = match excision {
                Some(excision) => {
                    let is_first = excision.paragraph == i;
                    let start = if is_first {
                        excision.range.start
                    } else {
                        range.start
                    };
                    let excised = start..excision.range.end.clamp(start, range.end);
                    (
                        excised,
                        excision.token.filter(|_| is_first),
                        if is_first { excision.token_len } else { 0 },
                        excision.range.end > range.end,
                    )
                }
                None => (content_end..content_end, None, 0, false),
            };
            let truncated_len = (range.end - range.start) - (excised.end - excised.start) + token_len;
            let lines_start = line_index;
            while line_index < self.out.lines.len()
                && self.out.lines[line_index].paragraph as usize == i
            {
                line_index += 1;
            }
            let style = &prepared_paragraph.style;
            let initial_count = (style.initial_lines.count as usize).min(line_index - lines_start);
            paragraphs.push(ParagraphData {
                terminator_len: range.end - content_end,
                range,
                truncated: truncated_start..truncated_start + truncated_len,
                excised,
                excision_continues,
                token,
                token_len,
                base_level: prepared_paragraph.base_level,
                alignment: prepared_paragraph.alignment,
                lines: to_u32(lines_start)..to_u32(line_index),
                initial_lines_end: to_u32(lines_start + initial_count),
                initial_indents: (
                    style.initial_lines.head_indent,
                    style.initial_lines.tail_indent,
                ),
                indents: (style.head_indent, style.tail_indent),
            });
            truncated_start += truncated_len;
        }
        self.out.truncated_len = truncated_start;

        for line in &mut self.out.lines {
            let paragraph = line.paragraph as usize;
            let start = paragraphs[paragraph].truncated_offset(line.original.start);
            let end = truncated_offset_from(&paragraphs, paragraph, line.original.end);
            let whitespace_end =
                truncated_offset_from(&paragraphs, paragraph, line.original_end_with_whitespace);
            line.truncated = start..end.max(start);
            line.trailing_whitespace_len = whitespace_end.saturating_sub(end);
            if line.flags.contains(LineFlags::HAS_HYPHEN) {
                self.out.flags |= LayoutFlags::HAS_HYPHEN;
            }
            if line.flags.contains(LineFlags::EMERGENCY_BREAK) {
                self.out.flags |= LayoutFlags::EMERGENCY_BREAK;
            }
        }
        self.out.paragraphs = paragraphs;
        self.align();
    }

    /// Positions the lines horizontally.
    fn align(&mut self) {
        let prepared = self.input.prepared;
        let indents = |line: &LineData, index: usize, paragraphs: &[ParagraphData]| {
            let paragraph = line.paragraph as usize;
            let index_in_paragraph = to_u32(index) - paragraphs[paragraph].lines.start;
            let (head, tail) = prepared.paragraphs[paragraph]
                .style
                .indents(index_in_paragraph);
            if line.flags.contains(LineFlags::IS_RTL) {
                (f64::from(tail), f64::from(head))
            } else {
                (f64::from(head), f64::from(tail))
            }
        };
        let paragraphs = &self.out.paragraphs;
        let width = if self.width.is_finite() {
            f64::from(self.width)
        } else {
            self.out
                .lines
                .iter()
                .enumerate()
                .map(|(index, line)| {
                    let (left, right) = indents(line, index, paragraphs);
                    f64::from(line.width) + left + right
                })
                .fold(0., f64::max)
        };
        for index in 0..self.out.lines.len() {
            let line = &self.out.lines[index];
            let (left, right) = indents(line, index, paragraphs);
            let line_width = f64::from(line.width);
            let origin_x = match paragraphs[line.paragraph as usize].alignment {
                ResolvedAlignment::Left => left,
                ResolvedAlignment::Right => width - right - line_width,
                ResolvedAlignment::Center => left + (width - left - right - line_width) / 2.,
            };
            self.out.lines[index].origin_x = origin_x;
        }
    }
}

fn line_start(clusters: &[ClusterData], paragraph: &PreparedParagraph, start: usize) -> u32 {
    if start < paragraph.clusters.end as usize {
        clusters[start].text.start
    } else {
        paragraph.range.start
    }
}

/// End of the content of a truncated line in the original string.
fn truncated_line_end(clusters: &[ClusterData], truncation: &Truncation, content_end: u32) -> u32 {
    let tail_end = clusters[truncation.tail.clone()]
        .iter()
        .rposition(|cluster| !cluster.is_whitespace())
        .map(|index| clusters[truncation.tail.start + index].text.end);
    match tail_end {
        Some(end) => end.max(truncation.excised.end),
        None => truncation.excised.end.min(content_end),
    }
}

/// Truncated string offset of an original string offset in or after paragraph `from`.
fn truncated_offset_from(paragraphs: &[ParagraphData], from: usize, index: u32) -> u32 {
    let mut paragraph = from;
    while paragraph + 1 < paragraphs.len() && index > paragraphs[paragraph].range.end {
        paragraph += 1;
    }
    paragraphs[paragraph].truncated_offset(index)
}

/// Reorders the items of a line into visual order according to their bidi levels.
fn reorder_items(items: &mut [LineItemData]) {
    let mut max_level = 0;
    let mut lowest_odd_level = BidiLevel::MAX;
    for item in items.iter() {
        max_level = max_level.max(item.level);
        if item.level & 1 != 0 {
            lowest_odd_level = lowest_odd_level.min(item.level);
        }
    }
    for level in (lowest_odd_level..=max_level).rev() {
        let mut i = 0;
        while i < items.len() {
            if items[i].level >= level {
                let mut end = i + 1;
                while end < items.len() && items[end].level >= level {
                    end += 1;
                }
                items[i..end].reverse();
                i = end;
            }
            i += 1;
        }
    }
}
