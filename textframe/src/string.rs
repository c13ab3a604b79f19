// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Styled UTF-16 strings.

use core::ops::Range;
use std::sync::Arc;

use crate::{TextAttachment, TextAttributes};
use crate::util::clamp_range;

/// A range of text sharing one set of attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeRun {
    /// Range in UTF-16 code units.
    pub range: Range<usize>,
    /// Attributes of the range.
    pub attributes: Arc<TextAttributes>,
}

/// UTF-16 text with attribute runs.
///
/// The runs are sorted, do not overlap and cover the whole text. All offsets are UTF-16 code unit
/// offsets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyledString {
    text: Vec<u16>,
    runs: Vec<AttributeRun>,
}

impl StyledString {
    /// Creates a string with a single attribute run.
    pub fn new(text: &str, attributes: TextAttributes) -> Self {
        let mut builder = StyledStringBuilder::new();
        builder.push(text, attributes);
        builder.build()
    }

    /// Creates a string from UTF-16 code units with a single attribute run.
    pub fn from_utf16(text: Vec<u16>, attributes: Arc<TextAttributes>) -> Self {
        let runs = if text.is_empty() {
            Vec::new()
        } else {
            vec![AttributeRun {
                range: 0..text.len(),
                attributes,
            }]
        };
        Self { text, runs }
    }

    /// The length in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns `true` if the string is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The UTF-16 code units.
    pub fn code_units(&self) -> &[u16] {
        &self.text
    }

    /// The attribute runs.
    pub fn runs(&self) -> &[AttributeRun] {
        &self.runs
    }

    /// Converts the text to a `String`, replacing unpaired surrogates.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.text)
    }

    /// Index of the run containing `index`. The last run for `index == len`.
    fn run_index(&self, index: usize) -> Option<usize> {
        if self.runs.is_empty() {
            return None;
        }
        let i = self.runs.partition_point(|run| run.range.end <= index);
        Some(i.min(self.runs.len() - 1))
    }

    /// The attributes at `index`, or of the last code unit if `index` is the end of the string.
    pub fn attributes_at(&self, index: usize) -> Option<&Arc<TextAttributes>> {
        self.run_index(index).map(|i| &self.runs[i].attributes)
    }

    /// Iterates over the runs intersecting `range`, clipped to the range.
    pub fn runs_in(&self, range: Range<usize>) -> impl Iterator<Item = AttributeRun> + '_ {
        let range = clamp_range(range, self.len());
        let first = self.runs.partition_point(|run| run.range.end <= range.start);
        self.runs[first..]
            .iter()
            .take_while(move |run| run.range.start < range.end)
            .map(move |run| AttributeRun {
                range: run.range.start.max(range.start)..run.range.end.min(range.end),
                attributes: run.attributes.clone(),
            })
    }

    /// Returns the substring in `range`.
    pub fn slice(&self, range: Range<usize>) -> Self {
        let range = clamp_range(range, self.len());
        let mut builder = StyledStringBuilder::new();
        for run in self.runs_in(range.clone()) {
            builder.push_utf16(&self.text[run.range], run.attributes);
        }
        builder.build()
    }

    /// Replaces the text in `range` with `replacement`.
    pub fn replace_range(&mut self, range: Range<usize>, replacement: &Self) {
        let range = clamp_range(range, self.len());
        let mut builder = StyledStringBuilder::new();
        for run in self.runs_in(0..range.start) {
            builder.push_utf16(&self.text[run.range], run.attributes);
        }
        builder.push_styled(replacement);
        for run in self.runs_in(range.end..self.len()) {
            builder.push_utf16(&self.text[run.range], run.attributes);
        }
        *self = builder.build();
    }

    /// Replaces every attachment with its string fallback.
    ///
    /// Each attachment run is replaced by the fallback text, repeated once per code point of
    /// the run. Attachments without a fallback are removed. The replacement keeps the attributes
    /// of the attachment run and remembers the replaced text, so that
    /// [`restore_attachments`](Self::restore_attachments) can undo the replacement exactly.
    pub fn replace_attachments_with_fallbacks(&self) -> Self {
        if !self.runs.iter().any(|run| run.attributes.attachment.is_some()) {
            return self.clone();
        }
        let mut builder = StyledStringBuilder::new();
        for (ordinal, run) in self.runs.iter().enumerate() {
            let Some(attachment) = &run.attributes.attachment else {
                builder.push_utf16(&self.text[run.range.clone()], run.attributes.clone());
                continue;
            };
            let original = &self.text[run.range.clone()];
            let fallback: Vec<u16> = attachment
                .string_fallback
                .as_deref()
                .unwrap_or("")
                .encode_utf16()
                .collect();
            let count = char::decode_utf16(original.iter().copied()).count();
            let mut replacement = Vec::with_capacity(fallback.len() * count);
            for _ in 0..count {
                replacement.extend_from_slice(&fallback);
            }
            if replacement.is_empty() {
                // An empty run cannot carry the marker, the attachment is dropped for good.
                continue;
            }
            let mut attributes = (*run.attributes).clone();
            attributes.attachment = None;
            attributes.replaced_attachment = Some(Arc::new(ReplacedAttachment {
                attachment: attachment.clone(),
                original: original.into(),
                ordinal,
            }));
            builder.push_utf16(&replacement, Arc::new(attributes));
        }
        builder.build()
    }

    /// Reverses [`replace_attachments_with_fallbacks`](Self::replace_attachments_with_fallbacks).
    ///
    /// Removed attachments without a fallback cannot be restored.
    pub fn restore_attachments(&self) -> Self {
        if !self
            .runs
            .iter()
            .any(|run| run.attributes.replaced_attachment.is_some())
        {
            return self.clone();
        }
        let mut builder = StyledStringBuilder::new();
        for run in &self.runs {
            let Some(replaced) = &run.attributes.replaced_attachment else {
                builder.push_utf16(&self.text[run.range.clone()], run.attributes.clone());
                continue;
            };
            let mut attributes = (*run.attributes).clone();
            attributes.replaced_attachment = None;
            attributes.attachment = Some(replaced.attachment.clone());
            builder.push_utf16(&replaced.original, Arc::new(attributes));
        }
        builder.build()
    }
}

/// Marks text that replaced an attachment.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ReplacedAttachment {
    attachment: Arc<TextAttachment>,
    original: Arc<[u16]>,
    // Keeps adjacent replacements of equal attachments in separate runs.
    ordinal: usize,
}

/// U+FFFC, the usual text of an attachment run.
pub const OBJECT_REPLACEMENT_CHARACTER: u16 = 0xFFFC;

/// Incrementally builds a [`StyledString`].
#[derive(Debug, Default)]
pub struct StyledStringBuilder {
    string: StyledString,
}

impl StyledStringBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `text` with the given attributes.
    pub fn push(&mut self, text: &str, attributes: TextAttributes) -> &mut Self {
        let units: Vec<u16> = text.encode_utf16().collect();
        self.push_utf16(&units, Arc::new(attributes))
    }

    /// Appends UTF-16 code units with shared attributes.
    pub fn push_utf16(&mut self, text: &[u16], attributes: Arc<TextAttributes>) -> &mut Self {
        if text.is_empty() {
            return self;
        }
        let start = self.string.text.len();
        self.string.text.extend_from_slice(text);
        let end = self.string.text.len();
        match self.string.runs.last_mut() {
            Some(last)
                if Arc::ptr_eq(&last.attributes, &attributes)
                    || *last.attributes == *attributes =>
            {
                last.range.end = end;
            }
            _ => self.string.runs.push(AttributeRun {
                range: start..end,
                attributes,
            }),
        }
        self
    }

    /// Appends a styled string.
    pub fn push_styled(&mut self, string: &StyledString) -> &mut Self {
        for run in &string.runs {
            self.push_utf16(&string.text[run.range.clone()], run.attributes.clone());
        }
        self
    }

    /// Finishes the string.
    pub fn build(self) -> StyledString {
        self.string
    }
}
