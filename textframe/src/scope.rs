// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;
use std::sync::Arc;

use crate::{LastLineTruncationMode, StyledString};

/// An independent truncation policy for a range of paragraphs.
///
/// A scope is attached to text via
/// [`TextAttributes::truncation_scope`](crate::TextAttributes::truncation_scope). It covers the
/// maximal run of consecutive paragraphs whose first code unit carries the same scope, compared by
/// pointer identity. When the scope's text needs more than `max_line_count` lines, the last
/// allowed line is truncated with the scope's mode and token, and layout continues with the first
/// paragraph after the scope.
#[derive(Clone, Debug, PartialEq)]
pub struct TruncationScope {
    max_line_count: u32,
    mode: LastLineTruncationMode,
    token: Option<Arc<StyledString>>,
    truncatable_range: Option<Range<usize>>,
}

impl TruncationScope {
    /// Creates a scope limiting its text to `max_line_count` lines, truncated at the end with the
    /// default token. A count of zero is treated as one.
    pub fn new(max_line_count: u32) -> Self {
        Self {
            max_line_count: max_line_count.max(1),
            mode: LastLineTruncationMode::End,
            token: None,
            truncatable_range: None,
        }
    }

    /// Sets the truncation mode and token.
    #[must_use]
    pub fn with_truncation(
        mut self,
        mode: LastLineTruncationMode,
        token: Option<StyledString>,
    ) -> Self {
        self.mode = mode;
        self.token = token.filter(|token| !token.is_empty()).map(Arc::new);
        self
    }

    /// Restricts the text that may be removed to `range`, relative to the start of the scope.
    ///
    /// Text before and after the range is kept even if it does not fit.
    #[must_use]
    pub fn with_truncatable_range(mut self, range: Range<usize>) -> Self {
        self.truncatable_range = Some(range.start..range.end.max(range.start));
        self
    }

    /// The maximum number of lines.
    pub fn max_line_count(&self) -> u32 {
        self.max_line_count
    }

    /// The truncation mode for the last line.
    pub fn mode(&self) -> LastLineTruncationMode {
        self.mode
    }

    /// The truncation token, `None` for the default token.
    pub fn token(&self) -> Option<&Arc<StyledString>> {
        self.token.as_ref()
    }

    /// The truncatable range relative to the start of the scope.
    pub fn truncatable_range(&self) -> Option<Range<usize>> {
        self.truncatable_range.clone()
    }
}
