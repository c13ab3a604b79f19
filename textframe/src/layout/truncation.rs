// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Choosing the text removed from a truncated line.

use core::ops::Range;

use crate::layout::data::ClusterData;
use crate::layout::line_break::content_width;
use crate::layout::prepare::PreparedParagraph;
use crate::util::{u32_range, usize_range};
use crate::{LastLineTruncationMode, StyledString, TruncationRangeAdjuster};

/// Widths are compared with this tolerance to absorb rounding of summed advances.
const WIDTH_EPSILON: f32 = 1. / 1024.;

pub(crate) struct TruncationRequest<'a> {
    /// [`LastLineTruncationMode::Clip`] removes the text after the line without a token.
    pub(crate) mode: LastLineTruncationMode,
    /// Original string range that may be removed.
    pub(crate) truncatable: Range<u32>,
    /// Everything from the line start up to this offset is either kept on the line or removed.
    pub(crate) removal_end: u32,
    pub(crate) adjuster: Option<&'a TruncationRangeAdjuster>,
    pub(crate) token_width: f32,
}

/// The result of truncating a line, in cluster indices of the original storage.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Truncation {
    /// The mode actually applied.
    pub(crate) mode: LastLineTruncationMode,
    /// Clusters kept before the token.
    pub(crate) head: Range<usize>,
    /// Clusters kept after the token, including trailing whitespace.
    pub(crate) tail: Range<usize>,
    /// The paragraph owning the tail clusters.
    pub(crate) tail_paragraph: usize,
    /// The last paragraph starting before the removal end.
    pub(crate) last_paragraph: usize,
    /// Original string range replaced by the token.
    pub(crate) excised: Range<u32>,
}

/// The line to truncate.
pub(crate) struct TruncatedLine {
    pub(crate) paragraph: usize,
    /// First cluster of the line.
    pub(crate) start: usize,
    /// End of the content clusters of the line as broken.
    pub(crate) content_end: usize,
    pub(crate) available_width: f32,
}

/// Truncates `line` so that the text up to the removal end is either kept on it or excised.
pub(crate) fn truncate_line(
    string: &StyledString,
    clusters: &[ClusterData],
    paragraphs: &[PreparedParagraph],
    line: &TruncatedLine,
    request: &TruncationRequest<'_>,
) -> Truncation {
    let p = line.paragraph;
    let start = line.start;
    let paragraph = &paragraphs[p];
    let head_end = paragraph.clusters.end as usize;
    let line_start = if start < head_end {
        clusters[start].text.start
    } else {
        paragraph.range.start
    };
    let crossed = paragraphs[p + 1..]
        .iter()
        .take_while(|next| next.range.start < request.removal_end)
        .count();
    let mut mode = request.mode;
    if crossed > 1 && is_two_sided(mode) {
        log::trace!("Truncation crosses {crossed} paragraph boundaries, truncating at the end");
        mode = LastLineTruncationMode::End;
    }
    let removal_end = request.removal_end.max(line_start);
    let truncatable_start = request.truncatable.start.clamp(line_start, removal_end);
    let truncatable_end = request.truncatable.end.clamp(truncatable_start, removal_end);
    let boundary = |index: usize| {
        if index > start {
            clusters[index - 1].text.end
        } else {
            line_start
        }
    };
    let trimmed = |head: usize| {
        (start..head)
            .rev()
            .find(|&i| !clusters[i].is_whitespace())
            .map_or(start, |i| i + 1)
    };

    // Clusters before the truncatable range stay on the line.
    let min_head = start
        + clusters[start..head_end]
            .iter()
            .take_while(|cluster| cluster.text.start < truncatable_start)
            .count();
    let fitter = Fitter {
        clusters,
        start,
        limit: line.available_width + WIDTH_EPSILON,
        token_width: request.token_width,
    };

    let mut truncation = None;
    if is_two_sided(mode) {
        let tail_paragraph = if crossed == 1 { p + 1 } else { p };
        let tail_clusters = if tail_paragraph == p {
            start..head_end
        } else {
            usize_range(&paragraphs[tail_paragraph].clusters)
        };
        // Clusters after the truncatable range stay on the line.
        let max_tail = tail_clusters.start
            + clusters[tail_clusters.clone()]
                .iter()
                .take_while(|cluster| cluster.text.start < truncatable_end)
                .count();
        let bounds = TwoSidedBounds {
            min_head,
            head_end,
            max_tail,
            tail: tail_clusters.clone(),
            same_paragraph: tail_paragraph == p,
        };
        if let Some((head, tail)) = fitter.two_sided(&bounds, mode == LastLineTruncationMode::Middle)
        {
            let head = start..trimmed(head).max(min_head);
            let tail = tail.start
                + clusters[tail.clone()]
                    .iter()
                    .take_while(|cluster| cluster.is_whitespace())
                    .count();
            let excised_end = if tail < tail_clusters.end {
                clusters[tail].text.start
            } else {
                paragraphs[tail_paragraph].content_end()
            };
            truncation = Some(Truncation {
                mode,
                excised: boundary(head.end)..excised_end.max(boundary(head.end)),
                head,
                tail: tail..tail_clusters.end,
                tail_paragraph,
                last_paragraph: p + crossed,
            });
        } else {
            mode = LastLineTruncationMode::End;
        }
    }
    let mut truncation = truncation.unwrap_or_else(|| {
        let head = if mode == LastLineTruncationMode::Clip {
            line.content_end.max(min_head)
        } else {
            trimmed(fitter.end(min_head, head_end)).max(min_head)
        };
        Truncation {
            mode,
            head: start..head,
            tail: head_end..head_end,
            tail_paragraph: p,
            last_paragraph: p + crossed,
            excised: boundary(head)..removal_end.max(boundary(head)),
        }
    });
    if let Some(adjuster) = request.adjuster {
        adjust(
            &mut truncation,
            string,
            clusters,
            paragraphs,
            line,
            line_start..removal_end,
            adjuster,
        );
    }
    log::trace!(
        "Truncated line at {line_start} with {:?}, excised {:?}",
        truncation.mode,
        truncation.excised
    );
    truncation
}

fn is_two_sided(mode: LastLineTruncationMode) -> bool {
    matches!(
        mode,
        LastLineTruncationMode::Start | LastLineTruncationMode::Middle
    )
}

struct TwoSidedBounds {
    min_head: usize,
    head_end: usize,
    max_tail: usize,
    tail: Range<usize>,
    same_paragraph: bool,
}

struct Fitter<'a> {
    clusters: &'a [ClusterData],
    start: usize,
    limit: f32,
    token_width: f32,
}

impl Fitter<'_> {
    /// Width of the head, token and tail, ignoring whitespace around the token and at the end.
    fn width(&self, head: usize, tail: Range<usize>) -> f32 {
        let tail = &self.clusters[tail];
        let leading = tail
            .iter()
            .take_while(|cluster| cluster.is_whitespace())
            .count();
        content_width(&self.clusters[self.start..head])
            + self.token_width
            + content_width(&tail[leading..])
    }

    /// The end of the longest head reaching at least `min_head` that fits with the token.
    fn end(&self, min_head: usize, head_end: usize) -> usize {
        let mut best = min_head;
        let mut width = 0.;
        let mut trimmed = 0.;
        for i in self.start..head_end {
            let cluster = &self.clusters[i];
            width += cluster.advance;
            if !cluster.is_whitespace() {
                trimmed = width;
            }
            if i < min_head {
                continue;
            }
            if trimmed + self.token_width > self.limit {
                break;
            }
            best = i + 1;
        }
        best
    }

    /// Grows the head forwards and the tail backwards, alternating, while the line fits.
    ///
    /// Returns `None` if the parts that must be kept do not fit.
    fn two_sided(
        &self,
        bounds: &TwoSidedBounds,
        grow_head: bool,
    ) -> Option<(usize, Range<usize>)> {
        let mut head = bounds.min_head;
        let mut tail = bounds.max_tail;
        if bounds.same_paragraph {
            tail = tail.max(head);
        }
        if self.width(head, tail..bounds.tail.end) > self.limit {
            return None;
        }
        loop {
            let mut grew = false;
            let head_limit = if bounds.same_paragraph {
                tail
            } else {
                bounds.head_end
            };
            if grow_head
                && head < head_limit
                && self.width(head + 1, tail..bounds.tail.end) <= self.limit
            {
                head += 1;
                grew = true;
            }
            let tail_limit = if bounds.same_paragraph {
                head
            } else {
                bounds.tail.start
            };
            if tail > tail_limit && self.width(head, tail - 1..bounds.tail.end) <= self.limit {
                tail -= 1;
                grew = true;
            }
            if !grew {
                break;
            }
        }
        Some((head, tail..bounds.tail.end))
    }
}

/// Applies the caller's adjustment of the excised range.
fn adjust(
    truncation: &mut Truncation,
    string: &StyledString,
    clusters: &[ClusterData],
    paragraphs: &[PreparedParagraph],
    line: &TruncatedLine,
    full: Range<u32>,
    adjuster: &TruncationRangeAdjuster,
) {
    let start = line.start;
    let head_end = paragraphs[line.paragraph].clusters.end as usize;
    let adjusted = adjuster(
        string,
        usize_range(&full),
        usize_range(&truncation.excised),
    );
    let adjusted = u32_range(adjusted.start.min(adjusted.end)..adjusted.end);
    let adjusted_start = adjusted.start.clamp(full.start, full.end);
    let adjusted_end = adjusted.end.clamp(adjusted_start, full.end);

    // Snap the start down to a cluster boundary.
    let head = start
        + clusters[start..head_end]
            .iter()
            .take_while(|cluster| cluster.text.end <= adjusted_start)
            .count();
    let excised_start = if head > start {
        clusters[head - 1].text.end
    } else {
        full.start
    };
    truncation.head = start..head;
    if !is_two_sided(truncation.mode) {
        truncation.excised = excised_start..truncation.excised.end.max(excised_start);
        return;
    }
    let tail_paragraph = &paragraphs[truncation.tail_paragraph];
    let tail_end = tail_paragraph.clusters.end as usize;
    let (tail_floor, end) = if truncation.tail_paragraph == line.paragraph {
        (head, adjusted_end.max(excised_start))
    } else {
        (
            tail_paragraph.clusters.start as usize,
            adjusted_end.max(tail_paragraph.range.start),
        )
    };
    // Snap the end up to a cluster boundary.
    let tail = (tail_floor..tail_end)
        .find(|&i| clusters[i].text.start >= end)
        .unwrap_or(tail_end);
    truncation.tail = tail..tail_end;
    let excised_end = if tail < tail_end {
        clusters[tail].text.start
    } else {
        tail_paragraph.content_end()
    };
    truncation.excised = excised_start..excised_end.max(excised_start);
}
