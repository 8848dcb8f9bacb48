//! Scene identifier normalization.
//!
//! User- and model-supplied scene labels arrive in many shapes: full-width
//! digits, localized words for "scene", trailing cut or shot qualifiers.
//! Everything that keys session state (`scene_config`, `movie_urls`) must
//! agree on one spelling, so this module canonicalizes labels to the form
//! `scene<N>`.
//!
//! Rules are applied in order, first match wins:
//!
//! 1. Fold full-width decimal digits to ASCII.
//! 2. Case-fold and replace localized synonyms for "scene" with the
//!    canonical token.
//! 3. Match the canonical token immediately followed by digits; trailing
//!    text (cut/part qualifiers) is discarded.
//! 4. Otherwise take the first run of digits anywhere in the label.
//! 5. Otherwise return the label unchanged, marked as a fallback.
//!
//! [`normalize`] is pure and idempotent: normalizing an already-canonical
//! identifier returns it unchanged.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

/// The canonical token every scene identifier starts with.
pub const CANONICAL_TOKEN: &str = "scene";

/// Localized synonyms replaced by [`CANONICAL_TOKEN`] during normalization.
///
/// Katakana, half-width katakana, and the kanji spelling — the forms that
/// actually show up in conversation traffic.
const SCENE_SYNONYMS: &[&str] = &["シーン", "ｼｰﾝ", "場面"];

static CANONICAL_WITH_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"scene(\d+)").expect("static pattern"));

static FIRST_DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("static pattern"));

/// Result of normalizing a scene label.
///
/// A fallback result means no digits were recoverable; the caller proceeds
/// with the raw label as the key (non-fatal).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedLabel {
    id: String,
    fallback: bool,
}

impl NormalizedLabel {
    /// The canonical identifier (or the raw label on fallback).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Consume self and return the identifier.
    #[must_use]
    pub fn into_id(self) -> String {
        self.id
    }

    /// Whether normalization fell back to the raw label.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

impl std::fmt::Display for NormalizedLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// Map full-width decimal digits (U+FF10–U+FF19) to their ASCII equivalents.
fn fold_fullwidth_digits(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '０'..='９' => {
                // U+FF10 ('０') aligns with '0'.
                char::from_u32(u32::from(c) - u32::from('０') + u32::from('0'))
                    .unwrap_or(c)
            }
            _ => c,
        })
        .collect()
}

/// Normalize an arbitrary scene label to the canonical `scene<N>` form.
///
/// Pure and deterministic. When no digits are recoverable at all the label
/// is returned unchanged with the fallback marker set, and a warning is
/// logged — processing continues with the raw label as the key.
#[must_use]
pub fn normalize(label: &str) -> NormalizedLabel {
    let folded = fold_fullwidth_digits(label);
    let mut lowered = folded.to_lowercase();
    for synonym in SCENE_SYNONYMS {
        if lowered.contains(synonym) {
            lowered = lowered.replace(synonym, CANONICAL_TOKEN);
        }
    }

    if let Some(caps) = CANONICAL_WITH_DIGITS.captures(&lowered) {
        return NormalizedLabel {
            id: format!("{CANONICAL_TOKEN}{}", &caps[1]),
            fallback: false,
        };
    }

    if let Some(digits) = FIRST_DIGIT_RUN.find(&lowered) {
        return NormalizedLabel {
            id: format!("{CANONICAL_TOKEN}{}", digits.as_str()),
            fallback: false,
        };
    }

    warn!(label = %label, "scene label has no recoverable number, using raw label as key");
    NormalizedLabel {
        id: label.to_owned(),
        fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn katakana_with_cut_qualifier() {
        let n = normalize("シーン３_cut2");
        assert_eq!(n.as_str(), "scene3");
        assert!(!n.is_fallback());
    }

    #[test]
    fn fullwidth_digits_after_canonical_token() {
        assert_eq!(normalize("scene１０").as_str(), "scene10");
    }

    #[test]
    fn halfwidth_katakana_synonym() {
        assert_eq!(normalize("ｼｰﾝ7").as_str(), "scene7");
    }

    #[test]
    fn kanji_synonym() {
        assert_eq!(normalize("場面2").as_str(), "scene2");
    }

    #[test]
    fn mixed_case_canonical() {
        assert_eq!(normalize("Scene5").as_str(), "scene5");
    }

    #[test]
    fn digits_separated_from_token() {
        // Rule 3 needs digits immediately after the token; rule 4 still
        // recovers the number.
        assert_eq!(normalize("scene 12").as_str(), "scene12");
    }

    #[test]
    fn bare_digits_anywhere() {
        assert_eq!(normalize("第4話").as_str(), "scene4");
    }

    #[test]
    fn no_digits_falls_back_to_raw_label() {
        let n = normalize("abc");
        assert_eq!(n.as_str(), "abc");
        assert!(n.is_fallback());
    }

    #[test]
    fn already_canonical_is_unchanged() {
        let n = normalize("scene3");
        assert_eq!(n.as_str(), "scene3");
        assert!(!n.is_fallback());
    }

    #[test]
    fn idempotent_on_known_inputs() {
        for label in ["シーン３_cut2", "scene１０", "abc", "Scene5", "場面2"] {
            let once = normalize(label);
            let twice = normalize(once.as_str());
            assert_eq!(once.as_str(), twice.as_str(), "label {label:?}");
        }
    }

    proptest! {
        #[test]
        fn idempotent_for_arbitrary_labels(label in ".*") {
            let once = normalize(&label);
            let twice = normalize(once.as_str());
            prop_assert_eq!(once.as_str(), twice.as_str());
        }
    }
}
