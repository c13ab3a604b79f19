// Copyright 2025 the TextFrame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hyphenation opportunities from a caller supplied finder or from hyphenation dictionaries.

use core::ops::Range;

#[cfg(feature = "hyphenation")]
use hashbrown::HashMap;
#[cfg(feature = "hyphenation")]
use smallvec::SmallVec;

use crate::{HyphenationLocation, HyphenationLocationFinder, StyledString};

/// The hyphen inserted at soft hyphens and dictionary hyphenation points.
pub(crate) const HYPHEN: char = '\u{2010}';

/// Finds hyphenation opportunities for the line breaker.
///
/// Dictionary results are cached per word start, so that repeated queries with a shrinking range
/// and repeated layout passes at different scales hyphenate every word only once.
pub(crate) struct Hyphenator<'a> {
    finder: Option<&'a HyphenationLocationFinder>,
    #[cfg(feature = "hyphenation")]
    words: HashMap<usize, SmallVec<[usize; 8]>>,
}

impl<'a> Hyphenator<'a> {
    pub(crate) fn new(finder: Option<&'a HyphenationLocationFinder>) -> Self {
        Self {
            finder,
            #[cfg(feature = "hyphenation")]
            words: HashMap::new(),
        }
    }

    /// Returns the last hyphenation opportunity strictly inside `range`.
    ///
    /// Locations outside the range are discarded.
    pub(crate) fn find(
        &mut self,
        string: &StyledString,
        range: Range<usize>,
        locale: Option<&str>,
    ) -> Option<HyphenationLocation> {
        if range.len() < 2 {
            return None;
        }
        let location = match self.finder {
            Some(finder) => finder(string, range.clone()),
            None => self.find_in_dictionary(string, range.clone(), locale?),
        }?;
        if location.index <= range.start || location.index >= range.end {
            log::debug!(
                "Ignoring hyphenation location {} outside of the search range {range:?}",
                location.index
            );
            return None;
        }
        Some(location)
    }

    #[cfg(feature = "hyphenation")]
    fn find_in_dictionary(
        &mut self,
        string: &StyledString,
        range: Range<usize>,
        locale: &str,
    ) -> Option<HyphenationLocation> {
        if !self.words.contains_key(&range.start) {
            let lang = lang_from_locale(locale)?;
            let boundaries = syllable_boundaries(string.code_units(), range.clone(), lang);
            self.words.insert(range.start, boundaries);
        }
        let index = self
            .words
            .get(&range.start)?
            .iter()
            .rev()
            .copied()
            .find(|&index| index > range.start && index < range.end)?;
        Some(HyphenationLocation {
            index,
            hyphen: HYPHEN,
            options: 0,
        })
    }

    #[cfg(not(feature = "hyphenation"))]
    fn find_in_dictionary(
        &mut self,
        _string: &StyledString,
        _range: Range<usize>,
        _locale: &str,
    ) -> Option<HyphenationLocation> {
        None
    }
}

/// The dictionary language of a locale identifier such as `en-US`.
#[cfg(feature = "hyphenation")]
fn lang_from_locale(locale: &str) -> Option<hypher::Lang> {
    let language = locale.split(['-', '_']).next()?.to_ascii_lowercase();
    let bytes = language.as_bytes().try_into().ok()?;
    hypher::Lang::from_iso(bytes)
}

/// Word internal syllable boundaries of the word starting at `range.start`.
#[cfg(feature = "hyphenation")]
fn syllable_boundaries(
    text: &[u16],
    range: Range<usize>,
    lang: hypher::Lang,
) -> SmallVec<[usize; 8]> {
    let word = String::from_utf16_lossy(&text[range.clone()]);
    let word = word.trim_end_matches(|c: char| !c.is_alphabetic());
    let end = range.start + word.encode_utf16().count();
    let mut boundaries = SmallVec::new();
    if word.is_empty() {
        return boundaries;
    }
    let mut offset = range.start;
    for syllable in hypher::hyphenate(word, lang) {
        offset += syllable.encode_utf16().count();
        // Not after the final syllable.
        if offset < end {
            boundaries.push(offset);
        }
    }
    boundaries
}
