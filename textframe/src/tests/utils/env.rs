// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use peniko::kurbo::Size;

use crate::{
    Direction, Font, ParagraphStyle, Shaper, SimpleShaper, StyledString, StyledStringBuilder,
    TextAttributes, TextFrame, TextFrameOptions,
};

pub(crate) const FONT_SIZE: f32 = 10.;

/// Asserts that two values are equal up to rounding of summed advances.
#[track_caller]
pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {expected}, got {actual}"
    );
}

/// Builds frames with a [`SimpleShaper`] and a 10pt font.
///
/// With the default shaper every character is 5pt wide and a space is 2.5pt wide. Lines are
/// 12pt high: 9.5pt above and 2.5pt below the baseline.
pub(crate) struct TestEnv {
    shaper: SimpleShaper,
    attributes: TextAttributes,
    options: TextFrameOptions,
    size: Size,
    display_scale: Option<f64>,
}

impl TestEnv {
    pub(crate) fn new() -> Self {
        Self {
            shaper: SimpleShaper::new(),
            attributes: TextAttributes::new(Font::new("test", FONT_SIZE)),
            options: TextFrameOptions::default(),
            size: Size::new(f64::INFINITY, f64::INFINITY),
            display_scale: None,
        }
    }

    pub(crate) fn with_shaper(mut self, shaper: SimpleShaper) -> Self {
        self.shaper = shaper;
        self
    }

    pub(crate) fn with_width(mut self, width: f64) -> Self {
        self.size.width = width;
        self
    }

    pub(crate) fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub(crate) fn with_options(mut self, options: TextFrameOptions) -> Self {
        self.options = options;
        self
    }

    pub(crate) fn with_display_scale(mut self, scale: f64) -> Self {
        self.display_scale = Some(scale);
        self
    }

    pub(crate) fn with_paragraph_style(mut self, style: ParagraphStyle) -> Self {
        self.attributes.paragraph_style = Some(Arc::new(style));
        self
    }

    pub(crate) fn shaper(&self) -> &SimpleShaper {
        &self.shaper
    }

    /// The default attributes of the text.
    pub(crate) fn attributes(&self) -> TextAttributes {
        self.attributes.clone()
    }

    pub(crate) fn string(&self, text: &str) -> Arc<StyledString> {
        Arc::new(StyledString::new(text, self.attributes()))
    }

    /// Builds a string from parts; `None` uses the default attributes.
    pub(crate) fn styled(&self, parts: &[(&str, Option<TextAttributes>)]) -> Arc<StyledString> {
        let mut builder = StyledStringBuilder::new();
        for (text, attributes) in parts {
            builder.push(
                text,
                attributes.clone().unwrap_or_else(|| self.attributes()),
            );
        }
        Arc::new(builder.build())
    }

    /// The advance of `text` with the default attributes.
    pub(crate) fn width(&self, text: &str) -> f64 {
        let units: Vec<u16> = text.encode_utf16().collect();
        let run = self
            .shaper
            .shape(&units, &self.attributes, Direction::LeftToRight);
        run.glyphs
            .iter()
            .map(|glyph| f64::from(glyph.advance))
            .sum()
    }

    pub(crate) fn frame(&self, text: &str) -> TextFrame {
        self.frame_for(self.string(text))
    }

    pub(crate) fn frame_for(&self, string: Arc<StyledString>) -> TextFrame {
        let range = 0..string.len();
        TextFrame::new(
            string,
            range,
            self.size,
            self.display_scale,
            &self.options,
            &self.shaper,
            None,
        )
        .expect("layout without a cancellation flag always succeeds")
    }
}
