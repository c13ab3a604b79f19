// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shaping interface consumed by layout.

use hashbrown::HashMap;
use icu_properties::CodePointMapData;
use icu_properties::props::GeneralCategory;

use crate::analysis::{self, BreakKind};
use crate::{Direction, TextAttributes};

/// A shaped glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Glyph {
    /// Glyph identifier in the font.
    pub id: u32,
    /// Offset of the first code unit of the glyph's cluster, relative to the shaped text.
    pub cluster: u32,
    /// Horizontal advance.
    pub advance: f32,
    /// Horizontal offset from the pen position.
    pub x_offset: f32,
    /// Vertical offset from the baseline, positive upwards.
    pub y_offset: f32,
}

/// Typographic metrics of a shaped run, in points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunMetrics {
    /// Ascent above the baseline.
    pub ascent: f32,
    /// Descent below the baseline.
    pub descent: f32,
    /// Line gap.
    pub leading: f32,
    /// Cap height.
    pub cap_height: f32,
    /// X height.
    pub x_height: f32,
}

impl RunMetrics {
    /// The metrics of the font of `attributes`.
    pub fn from_attributes(attributes: &TextAttributes) -> Self {
        let font = &attributes.font;
        Self {
            ascent: font.ascent(),
            descent: font.descent(),
            leading: font.leading(),
            cap_height: font.cap_height(),
            x_height: font.x_height(),
        }
    }
}

/// The result of shaping a run of text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapedRun {
    /// Glyphs in logical order: cluster offsets never decrease.
    pub glyphs: Vec<Glyph>,
    /// Metrics of the fonts used for the run.
    pub metrics: RunMetrics,
}

/// Converts styled text into glyphs.
///
/// Layout calls [`shape`](Self::shape) for runs of uniform attributes and bidi level that do not
/// cross paragraph boundaries. A shaper must be deterministic; the same input must always produce
/// the same glyphs.
pub trait Shaper {
    /// Shapes `text` with the given attributes and direction.
    fn shape(&self, text: &[u16], attributes: &TextAttributes, direction: Direction) -> ShapedRun;

    /// Grapheme cluster boundaries of `text`, including `0` and `text.len()`.
    fn grapheme_boundaries(&self, text: &[u16]) -> Vec<usize> {
        analysis::grapheme_boundaries(text)
    }

    /// Line break opportunities of paragraph text, one entry per code unit plus one.
    fn line_break_opportunities(&self, text: &[u16]) -> Vec<BreakKind> {
        analysis::line_break_opportunities(text)
    }
}

/// A shaper with a fixed advance per character, scaled by the font size.
///
/// Every code point becomes one glyph whose id is the code point, except for configured
/// ligatures, which become a single glyph. Format characters, combining marks and line
/// separators have no advance.
#[derive(Clone, Debug)]
pub struct SimpleShaper {
    default_advance: f32,
    advances: HashMap<char, f32>,
    ligatures: Vec<(Vec<u16>, u32)>,
}

impl Default for SimpleShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleShaper {
    /// Glyph ids of ligatures start here.
    pub const LIGATURE_GLYPH_BASE: u32 = 0x11_0000;

    /// Creates a shaper with an advance of 0.5 em, 0.25 em for spaces.
    pub fn new() -> Self {
        let mut advances = HashMap::new();
        advances.insert(' ', 0.25);
        advances.insert('\u{A0}', 0.25);
        advances.insert('\t', 1.);
        Self {
            default_advance: 0.5,
            advances,
            ligatures: Vec::new(),
        }
    }

    /// Sets the advance of `c` in em.
    #[must_use]
    pub fn with_advance(mut self, c: char, em: f32) -> Self {
        self.advances.insert(c, em);
        self
    }

    /// Sets the advance of characters without an explicit advance.
    #[must_use]
    pub fn with_default_advance(mut self, em: f32) -> Self {
        self.default_advance = em;
        self
    }

    /// Shapes `sequence` as a single ligature glyph.
    #[must_use]
    pub fn with_ligature(mut self, sequence: &str) -> Self {
        let id = Self::LIGATURE_GLYPH_BASE + u32::try_from(self.ligatures.len()).unwrap_or(0);
        let units: Vec<u16> = sequence.encode_utf16().collect();
        if units.len() > 1 {
            self.ligatures.push((units, id));
        }
        self
    }

    /// The advance of `c` in em.
    pub fn advance_em(&self, c: char) -> f32 {
        if let Some(advance) = self.advances.get(&c) {
            return *advance;
        }
        let category = CodePointMapData::<GeneralCategory>::new().get(c);
        match category {
            GeneralCategory::NonspacingMark
            | GeneralCategory::EnclosingMark
            | GeneralCategory::Format
            | GeneralCategory::LineSeparator
            | GeneralCategory::ParagraphSeparator
            | GeneralCategory::Control => 0.,
            _ => self.default_advance,
        }
    }

    fn ligature_at(&self, text: &[u16], index: usize) -> Option<(usize, u32)> {
        self.ligatures
            .iter()
            .find(|(units, _)| text[index..].starts_with(units))
            .map(|(units, id)| (units.len(), *id))
    }
}

impl Shaper for SimpleShaper {
    fn shape(&self, text: &[u16], attributes: &TextAttributes, _direction: Direction) -> ShapedRun {
        let size = attributes.font.size;
        let mut glyphs = Vec::with_capacity(text.len());
        let mut i = 0;
        while i < text.len() {
            let cluster = u32::try_from(i).unwrap_or(u32::MAX);
            if let Some((len, id)) = self.ligature_at(text, i) {
                let advance = char::decode_utf16(text[i..i + len].iter().copied())
                    .map(|c| self.advance_em(c.unwrap_or(char::REPLACEMENT_CHARACTER)))
                    .sum::<f32>();
                glyphs.push(Glyph {
                    id,
                    cluster,
                    advance: advance * size,
                    ..Default::default()
                });
                i += len;
                continue;
            }
            let c = analysis::code_point_at(text, i);
            glyphs.push(Glyph {
                id: u32::from(c),
                cluster,
                advance: self.advance_em(c) * size,
                ..Default::default()
            });
            i += c.len_utf16();
        }
        ShapedRun {
            glyphs,
            metrics: RunMetrics::from_attributes(attributes),
        }
    }
}
