// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scale independent analysis and shaping of the text of a frame.

use core::ops::Range;
use std::sync::Arc;

use crate::analysis::{self, BidiLevel, BreakKind, Direction, LINE_SEPARATOR};
use crate::layout::data::{
    ClusterData, ClusterFlags, ClusterSource, GlyphData, ResolvedAlignment, RunData, TextStorage,
};
use crate::shape::{Glyph, RunMetrics, Shaper};
use crate::style::TextFlags;
use crate::util::{to_u32, u32_range};
use crate::{
    DefaultTextAlignment, ParagraphStyle, StyledString, TextAlignment, TextAttributes,
    TruncationScope,
};

#[derive(Clone, Debug)]
pub(crate) struct PreparedParagraph {
    pub(crate) range: Range<u32>,
    pub(crate) terminator_len: u32,
    pub(crate) style: ParagraphStyle,
    pub(crate) base_level: BidiLevel,
    pub(crate) alignment: ResolvedAlignment,
    pub(crate) clusters: Range<u32>,
    pub(crate) scope: Option<u32>,
    /// Attributes at the start of the paragraph, used for the metrics of empty lines.
    pub(crate) attributes: Arc<TextAttributes>,
}

impl PreparedParagraph {
    pub(crate) fn content_end(&self) -> u32 {
        self.range.end - self.terminator_len
    }

    pub(crate) fn is_rtl(&self) -> bool {
        self.base_level & 1 != 0
    }
}

/// Consecutive paragraphs sharing a truncation scope.
#[derive(Clone, Debug)]
pub(crate) struct ScopeSpan {
    pub(crate) scope: Arc<TruncationScope>,
    pub(crate) paragraphs: Range<u32>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct PreparedText {
    pub(crate) range: Range<u32>,
    pub(crate) paragraphs: Vec<PreparedParagraph>,
    pub(crate) storage: TextStorage,
    pub(crate) scopes: Vec<ScopeSpan>,
    pub(crate) flags: TextFlags,
}

pub(crate) fn resolve_alignment(
    style: &ParagraphStyle,
    default_alignment: DefaultTextAlignment,
    is_rtl: bool,
) -> ResolvedAlignment {
    match style.alignment {
        TextAlignment::Left => ResolvedAlignment::Left,
        TextAlignment::Right => ResolvedAlignment::Right,
        TextAlignment::Center => ResolvedAlignment::Center,
        TextAlignment::Natural | TextAlignment::Justified => {
            let alignment = if style.base_writing_direction.is_some() {
                DefaultTextAlignment::Start
            } else {
                default_alignment
            };
            match (alignment, is_rtl) {
                (DefaultTextAlignment::Left, _)
                | (DefaultTextAlignment::Start, false)
                | (DefaultTextAlignment::End, true) => ResolvedAlignment::Left,
                (DefaultTextAlignment::Right, _)
                | (DefaultTextAlignment::Start, true)
                | (DefaultTextAlignment::End, false) => ResolvedAlignment::Right,
            }
        }
    }
}

/// Splits the text into paragraphs and shapes it.
pub(crate) fn prepare(
    string: &StyledString,
    range: Range<usize>,
    shaper: &dyn Shaper,
    default_alignment: DefaultTextAlignment,
) -> PreparedText {
    let text = string.code_units();
    let mut prepared = PreparedText {
        range: u32_range(range.clone()),
        ..Default::default()
    };
    let default_attributes = Arc::new(TextAttributes::default());
    for bounds in analysis::split_paragraphs(text, range.clone()) {
        let attributes = string
            .attributes_at(bounds.range.start)
            .cloned()
            .unwrap_or_else(|| default_attributes.clone());
        let style = attributes
            .paragraph_style
            .as_deref()
            .map(ParagraphStyle::resolved)
            .unwrap_or_else(|| ParagraphStyle::default().resolved());
        let content = bounds.range.start..bounds.content_end();
        let bidi = analysis::bidi_levels(&text[content.clone()], style.base_writing_direction);
        let is_rtl = bidi.base_level & 1 != 0;
        let alignment = resolve_alignment(&style, default_alignment, is_rtl);

        let cluster_start = to_u32(prepared.storage.clusters.len());
        shape_paragraph(
            string,
            content.clone(),
            &bidi.levels,
            shaper,
            &mut prepared.storage,
        );
        let cluster_end = to_u32(prepared.storage.clusters.len());

        for run in string.runs_in(bounds.range.clone()) {
            prepared.flags |= run.attributes.flags();
        }

        let scope = attributes.truncation_scope.as_ref().map(|scope| {
            let paragraph = to_u32(prepared.paragraphs.len());
            match prepared.scopes.last_mut() {
                Some(span)
                    if Arc::ptr_eq(&span.scope, scope) && span.paragraphs.end == paragraph =>
                {
                    span.paragraphs.end += 1;
                }
                _ => prepared.scopes.push(ScopeSpan {
                    scope: scope.clone(),
                    paragraphs: paragraph..paragraph + 1,
                }),
            }
            to_u32(prepared.scopes.len() - 1)
        });

        prepared.paragraphs.push(PreparedParagraph {
            range: u32_range(bounds.range.clone()),
            terminator_len: to_u32(bounds.terminator_len),
            style,
            base_level: bidi.base_level,
            alignment,
            clusters: cluster_start..cluster_end,
            scope,
            attributes,
        });
    }
    prepared
}

/// Shapes the content of one paragraph and appends its clusters to `storage`.
fn shape_paragraph(
    string: &StyledString,
    content: Range<usize>,
    levels: &[BidiLevel],
    shaper: &dyn Shaper,
    storage: &mut TextStorage,
) {
    let text = string.code_units();
    let paragraph_text = &text[content.clone()];
    let breaks = shaper.line_break_opportunities(paragraph_text);
    let graphemes = shaper.grapheme_boundaries(paragraph_text);
    let mut is_grapheme_boundary = vec![false; paragraph_text.len() + 1];
    for &boundary in &graphemes {
        if boundary <= paragraph_text.len() {
            is_grapheme_boundary[boundary] = true;
        }
    }
    is_grapheme_boundary[0] = true;
    is_grapheme_boundary[paragraph_text.len()] = true;

    let first_cluster = storage.clusters.len();
    for run in string.runs_in(content.clone()) {
        // Split the attribute run at bidi level changes.
        let mut start = run.range.start;
        while start < run.range.end {
            let level = levels[start - content.start];
            let mut end = start + 1;
            while end < run.range.end && levels[end - content.start] == level {
                end += 1;
            }
            let style = storage.style_index(&run.attributes);
            if let Some(attachment) = &run.attributes.attachment {
                let (width, ascent, descent, leading) = attachment.metrics();
                let font_metrics = RunMetrics::from_attributes(&run.attributes);
                storage.runs.push(RunData {
                    style,
                    metrics: RunMetrics {
                        ascent,
                        descent,
                        leading,
                        cap_height: font_metrics.cap_height,
                        x_height: font_metrics.x_height,
                    },
                });
                let run_index = to_u32(storage.runs.len() - 1);
                let mut cluster_start = start;
                for i in start + 1..=end {
                    if i == end || is_grapheme_boundary[i - content.start] {
                        storage.clusters.push(ClusterData {
                            source: ClusterSource::Original,
                            text: to_u32(cluster_start)..to_u32(i),
                            glyphs: 0..0,
                            run: run_index,
                            advance: width,
                            level,
                            break_before: BreakKind::None,
                            flags: ClusterFlags::ATTACHMENT,
                            graphemes: 1,
                        });
                        cluster_start = i;
                    }
                }
            } else {
                let direction = Direction::from_level(level);
                let shaped = shaper.shape(&text[start..end], &run.attributes, direction);
                storage.runs.push(RunData {
                    style,
                    metrics: shaped.metrics,
                });
                let run_index = to_u32(storage.runs.len() - 1);
                push_clusters(
                    storage,
                    ClusterSource::Original,
                    run_index,
                    start..end,
                    level,
                    &shaped.glyphs,
                );
            }
            start = end;
        }
    }

    // Clusters must not split grapheme clusters; merge clusters ending inside one.
    let mut merged: Vec<ClusterData> = Vec::with_capacity(storage.clusters.len() - first_cluster);
    for cluster in storage.clusters.drain(first_cluster..) {
        match merged.last_mut() {
            Some(last)
                if !is_grapheme_boundary[last.text.end as usize - content.start]
                    && last.run == cluster.run =>
            {
                last.text.end = cluster.text.end;
                last.glyphs.end = cluster.glyphs.end;
                last.advance += cluster.advance;
            }
            _ => merged.push(cluster),
        }
    }
    for cluster in &mut merged {
        let start = cluster.text.start as usize;
        let end = cluster.text.end as usize;
        let relative = start - content.start..end - content.start;
        cluster.break_before = breaks
            .get(relative.start)
            .copied()
            .unwrap_or(BreakKind::None);
        let graphemes = is_grapheme_boundary[relative.start + 1..relative.end]
            .iter()
            .filter(|boundary| **boundary)
            .count()
            + 1;
        cluster.graphemes = u16::try_from(graphemes).unwrap_or(u16::MAX);
        if graphemes > 1 {
            cluster.flags |= ClusterFlags::LIGATURE;
        }
        let first = analysis::code_point_at(text, start);
        if graphemes == 1 && analysis::is_whitespace(first) {
            cluster.flags |= ClusterFlags::WHITESPACE;
        }
        if text[start..end].contains(&LINE_SEPARATOR) {
            cluster.flags |= ClusterFlags::LINE_SEPARATOR | ClusterFlags::WHITESPACE;
        }
    }
    storage.clusters.extend(merged);
}

/// Shapes a truncation token or a hyphen and appends its clusters to `storage`.
///
/// Inserted text is shaped in the given bidi level as a whole and never split into lines.
pub(crate) fn shape_inserted(
    storage: &mut TextStorage,
    shaper: &dyn Shaper,
    string: &StyledString,
    source: ClusterSource,
    level: BidiLevel,
) -> Range<usize> {
    let first = storage.clusters.len();
    let direction = Direction::from_level(level);
    for run in string.runs_in(0..string.len()) {
        let shaped = shaper.shape(
            &string.code_units()[run.range.clone()],
            &run.attributes,
            direction,
        );
        let style = storage.style_index(&run.attributes);
        storage.runs.push(RunData {
            style,
            metrics: shaped.metrics,
        });
        let run_index = to_u32(storage.runs.len() - 1);
        push_clusters(storage, source, run_index, run.range, level, &shaped.glyphs);
    }
    first..storage.clusters.len()
}

/// Groups the glyphs of a shaped run into clusters covering `range`.
fn push_clusters(
    storage: &mut TextStorage,
    source: ClusterSource,
    run: u32,
    range: Range<usize>,
    level: BidiLevel,
    glyphs: &[Glyph],
) {
    let start = range.start;
    let len = range.len();
    let mut i = 0;
    let mut cluster_start = 0;
    while cluster_start < len {
        let glyph_start = storage.glyphs.len();
        let mut advance = 0.;
        // Glyphs for offsets before the cluster start belong to it as well.
        while i < glyphs.len() && (glyphs[i].cluster as usize) <= cluster_start {
            push_glyph(storage, &glyphs[i], &mut advance);
            i += 1;
        }
        let cluster_end = glyphs
            .get(i)
            .map(|glyph| (glyph.cluster as usize).min(len))
            .unwrap_or(len)
            .max(cluster_start + 1);
        storage.clusters.push(ClusterData {
            source,
            text: to_u32(start + cluster_start)..to_u32(start + cluster_end),
            glyphs: to_u32(glyph_start)..to_u32(storage.glyphs.len()),
            run,
            advance,
            level,
            break_before: BreakKind::None,
            flags: ClusterFlags::empty(),
            graphemes: 1,
        });
        cluster_start = cluster_end;
    }
}

fn push_glyph(storage: &mut TextStorage, glyph: &Glyph, advance: &mut f32) {
    *advance += glyph.advance;
    storage.glyphs.push(GlyphData {
        id: glyph.id,
        advance: glyph.advance,
        x_offset: glyph.x_offset,
        y_offset: glyph.y_offset,
    });
}
