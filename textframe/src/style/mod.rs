// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rich styling support.

mod attachment;
mod paragraph;

use std::sync::Arc;

pub use attachment::{AttachmentColorInfo, TextAttachment};
pub use paragraph::{FirstLineOffset, InitialLines, ParagraphStyle, TextAlignment};

use peniko::Color;
use peniko::kurbo::Vec2;

use crate::TruncationScope;
use crate::string::ReplacedAttachment;

/// Typographic font metrics relative to the font size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontMetrics {
    /// Distance from the baseline to the top of the line box, positive upwards.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the line box, positive downwards.
    pub descent: f32,
    /// Recommended additional spacing between lines.
    pub leading: f32,
    /// Height of capital letters above the baseline.
    pub cap_height: f32,
    /// Height of lowercase letters above the baseline.
    pub x_height: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            ascent: 0.95,
            descent: 0.25,
            leading: 0.,
            cap_height: 0.7,
            x_height: 0.5,
        }
    }
}

/// A font selection: a family name, a size and the metrics of the selected face.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    /// Family name, passed through to the shaper.
    pub family: Arc<str>,
    /// Font size in points.
    pub size: f32,
    /// Metrics per unit of font size.
    pub metrics: FontMetrics,
}

impl Font {
    /// Creates a font with default metrics.
    pub fn new(family: &str, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            metrics: FontMetrics::default(),
        }
    }

    /// Replaces the metrics of the font.
    #[must_use]
    pub fn with_metrics(mut self, metrics: FontMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Ascent in points.
    pub fn ascent(&self) -> f32 {
        self.metrics.ascent * self.size
    }

    /// Descent in points.
    pub fn descent(&self) -> f32 {
        self.metrics.descent * self.size
    }

    /// Leading in points.
    pub fn leading(&self) -> f32 {
        self.metrics.leading * self.size
    }

    /// Cap height in points.
    pub fn cap_height(&self) -> f32 {
        self.metrics.cap_height * self.size
    }

    /// X height in points.
    pub fn x_height(&self) -> f32 {
        self.metrics.x_height * self.size
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("sans-serif", 16.)
    }
}

/// Underline or strikethrough decoration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decoration {
    /// Decoration color. `None` uses the text color.
    pub color: Option<Color>,
    /// Line thickness. Zero selects a thickness derived from the font size.
    pub thickness: f32,
}

impl Default for Decoration {
    fn default() -> Self {
        Self {
            color: None,
            thickness: 0.,
        }
    }
}

/// A text shadow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    /// Offset of the shadow from the glyphs.
    pub offset: Vec2,
    /// Blur radius.
    pub blur_radius: f32,
    /// Shadow color.
    pub color: Color,
}

/// Glyph outline stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    /// Stroke width in points.
    pub width: f32,
    /// Stroke color. `None` uses the text color.
    pub color: Option<Color>,
    /// Whether the glyphs are also filled.
    pub fill: bool,
}

/// Text background.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Background {
    /// Fill color.
    pub color: Color,
    /// Extends the filled area beyond the typographic bounds of the text.
    pub outset: f32,
}

/// Attributes of a run of text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextAttributes {
    /// The font.
    pub font: Font,
    /// Text color.
    pub color: Color,
    /// Underline decoration.
    pub underline: Option<Decoration>,
    /// Strikethrough decoration.
    pub strikethrough: Option<Decoration>,
    /// Shadow drawn below the glyphs.
    pub shadow: Option<Shadow>,
    /// Glyph outline stroke.
    pub stroke: Option<Stroke>,
    /// Background fill.
    pub background: Option<Background>,
    /// Link target.
    pub link: Option<Arc<str>>,
    /// Paragraph style. Only the value at the start of a paragraph is used.
    pub paragraph_style: Option<Arc<ParagraphStyle>>,
    /// An inline attachment replacing the glyphs of the run.
    pub attachment: Option<Arc<TextAttachment>>,
    /// Vertical offset of the glyphs from the baseline, positive upwards.
    pub baseline_offset: f32,
    /// Locale used for dictionary based hyphenation, e.g. `"en"` or `"de-CH"`.
    pub hyphenation_locale: Option<Arc<str>>,
    /// Truncation scope. Only the value at the start of a paragraph is used.
    pub truncation_scope: Option<Arc<TruncationScope>>,
    /// Marks a run that replaced an attachment with its string fallback.
    pub(crate) replaced_attachment: Option<Arc<ReplacedAttachment>>,
}

impl TextAttributes {
    /// Creates attributes with the given font and default values otherwise.
    pub fn new(font: Font) -> Self {
        Self {
            font,
            ..Default::default()
        }
    }

    /// The color used for decorations without an explicit color.
    pub(crate) fn decoration_color(&self, decoration: &Decoration) -> Color {
        decoration.color.unwrap_or(self.color)
    }

    pub(crate) fn flags(&self) -> TextFlags {
        let mut flags = TextFlags::empty();
        flags.set(TextFlags::HAS_LINK, self.link.is_some());
        flags.set(TextFlags::HAS_BACKGROUND, self.background.is_some());
        flags.set(TextFlags::HAS_SHADOW, self.shadow.is_some());
        flags.set(TextFlags::HAS_UNDERLINE, self.underline.is_some());
        flags.set(TextFlags::HAS_STRIKETHROUGH, self.strikethrough.is_some());
        flags.set(TextFlags::HAS_STROKE, self.stroke.is_some());
        flags.set(TextFlags::HAS_ATTACHMENT, self.attachment.is_some());
        flags.set(TextFlags::HAS_BASELINE_OFFSET, self.baseline_offset != 0.);
        if let Some(attachment) = &self.attachment {
            flags.set(
                TextFlags::MAY_NOT_BE_GRAYSCALE,
                !attachment.color_info.is_grayscale,
            );
            flags.set(
                TextFlags::USES_EXTENDED_COLOR,
                attachment.color_info.uses_extended_colors,
            );
        }
        let components = self.color.components;
        if components[0] != components[1] || components[1] != components[2] {
            flags |= TextFlags::MAY_NOT_BE_GRAYSCALE;
        }
        flags
    }
}

impl Default for TextAttributes {
    fn default() -> Self {
        Self {
            font: Font::default(),
            color: Color::BLACK,
            underline: None,
            strikethrough: None,
            shadow: None,
            stroke: None,
            background: None,
            link: None,
            paragraph_style: None,
            attachment: None,
            baseline_offset: 0.,
            hyphenation_locale: None,
            truncation_scope: None,
            replaced_attachment: None,
        }
    }
}

bitflags::bitflags! {
    /// Summary of the attributes used by some text.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TextFlags: u16 {
        /// Some text has a link.
        const HAS_LINK = 1 << 0;
        /// Some text has a background.
        const HAS_BACKGROUND = 1 << 1;
        /// Some text has a shadow.
        const HAS_SHADOW = 1 << 2;
        /// Some text is underlined.
        const HAS_UNDERLINE = 1 << 3;
        /// Some text is struck through.
        const HAS_STRIKETHROUGH = 1 << 4;
        /// Some text is stroked.
        const HAS_STROKE = 1 << 5;
        /// The text contains attachments.
        const HAS_ATTACHMENT = 1 << 6;
        /// Some text has a baseline offset.
        const HAS_BASELINE_OFFSET = 1 << 7;
        /// Some colors are not gray.
        const MAY_NOT_BE_GRAYSCALE = 1 << 8;
        /// Some attachment uses extended range colors.
        const USES_EXTENDED_COLOR = 1 << 9;
    }
}
