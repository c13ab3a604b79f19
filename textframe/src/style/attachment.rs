// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::Rect;

use crate::util::non_negative;

/// Color classification of an attachment's image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AttachmentColorInfo {
    /// The image only uses shades of gray.
    pub is_grayscale: bool,
    /// The image uses colors outside of the sRGB gamut.
    pub uses_extended_colors: bool,
}

/// An inline non-text element that takes part in line layout like a glyph.
///
/// An attachment is attached to a run of text via
/// [`TextAttributes::attachment`](crate::TextAttributes::attachment). The run is usually a single
/// U+FFFC OBJECT REPLACEMENT CHARACTER. Each grapheme cluster of the run is laid out as one
/// attachment with the declared metrics.
#[derive(Clone, Debug, PartialEq)]
pub struct TextAttachment {
    /// Advance width.
    pub width: f32,
    /// Height above the baseline.
    pub ascent: f32,
    /// Depth below the baseline.
    pub descent: f32,
    /// Extra line spacing requested by the attachment.
    pub leading: f32,
    /// Bounds of the drawn image relative to the attachment origin on the baseline, y-down.
    pub image_bounds: Rect,
    /// Color classification for rendering decisions.
    pub color_info: AttachmentColorInfo,
    /// Label for assistive technologies.
    pub accessibility_label: Option<String>,
    /// Text replacing the attachment when it cannot be displayed.
    pub string_fallback: Option<String>,
}

impl TextAttachment {
    /// Creates an attachment whose image bounds match its typographic bounds.
    pub fn new(width: f32, ascent: f32, descent: f32) -> Self {
        let width = non_negative(width);
        let ascent = non_negative(ascent);
        let descent = non_negative(descent);
        Self {
            width,
            ascent,
            descent,
            leading: 0.,
            image_bounds: Rect::new(0., -f64::from(ascent), f64::from(width), f64::from(descent)),
            color_info: AttachmentColorInfo::default(),
            accessibility_label: None,
            string_fallback: None,
        }
    }

    /// Sets the string fallback.
    #[must_use]
    pub fn with_string_fallback(mut self, fallback: &str) -> Self {
        self.string_fallback = Some(fallback.into());
        self
    }

    /// Sets the accessibility label.
    #[must_use]
    pub fn with_accessibility_label(mut self, label: &str) -> Self {
        self.accessibility_label = Some(label.into());
        self
    }

    pub(crate) fn metrics(&self) -> (f32, f32, f32, f32) {
        (
            non_negative(self.width),
            non_negative(self.ascent),
            non_negative(self.descent),
            non_negative(self.leading),
        )
    }
}
