//! External verse references such as `ACF_GN_1_1`.
//!
//! The string form is used as a favorite key and as a deep link, so it must stay
//! stable across releases. Segments are joined by `_`:
//! `TRANSLATION_BOOKABBREV_CHAPTER_VERSE`, optionally followed by a fifth
//! segment carrying the raw verse row id. Both forms are accepted; the
//! canonical form written back out is always the four-segment one.

use std::fmt;

use thiserror::Error;

/// Delimiter between the segments of an external verse reference.
pub const DELIMITER: char = '_';

/// Book abbreviation to canonical reference id (1 to 66). This is the single
/// copy of the table; parsing and formatting both read from it.
pub const BOOK_ABBREVIATIONS: [(&str, i64); 66] = [
    ("GN", 1),
    ("EX", 2),
    ("LV", 3),
    ("NM", 4),
    ("DT", 5),
    ("JS", 6),
    ("JZ", 7),
    ("RT", 8),
    ("1SM", 9),
    ("2SM", 10),
    ("1RS", 11),
    ("2RS", 12),
    ("1CR", 13),
    ("2CR", 14),
    ("ED", 15),
    ("NE", 16),
    ("ET", 17),
    ("JB", 18),
    ("SL", 19),
    ("PV", 20),
    ("EC", 21),
    ("CT", 22),
    ("IS", 23),
    ("JR", 24),
    ("LM", 25),
    ("EZ", 26),
    ("DN", 27),
    ("OS", 28),
    ("JL", 29),
    ("AM", 30),
    ("OB", 31),
    ("JN", 32),
    ("MQ", 33),
    ("NA", 34),
    ("HC", 35),
    ("SF", 36),
    ("AG", 37),
    ("ZC", 38),
    ("ML", 39),
    ("MT", 40),
    ("MC", 41),
    ("LC", 42),
    ("JO", 43),
    ("AT", 44),
    ("RM", 45),
    ("1CO", 46),
    ("2CO", 47),
    ("GL", 48),
    ("EF", 49),
    ("FP", 50),
    ("CL", 51),
    ("1TS", 52),
    ("2TS", 53),
    ("1TM", 54),
    ("2TM", 55),
    ("TT", 56),
    ("FM", 57),
    ("HB", 58),
    ("TG", 59),
    ("1PE", 60),
    ("2PE", 61),
    ("1JO", 62),
    ("2JO", 63),
    ("3JO", 64),
    ("JD", 65),
    ("AP", 66),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("expected 4 or 5 segments, found {0}")]
    SegmentCount(usize),
    #[error("empty translation segment")]
    EmptyTranslation,
    #[error("unknown book abbreviation '{0}'")]
    UnknownBook(String),
    #[error("invalid {field} segment '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

/// Canonical reference id for a book abbreviation. Input is matched without
/// regard to ASCII case.
pub fn reference_id_for(abbreviation: &str) -> Option<i64> {
    BOOK_ABBREVIATIONS
        .iter()
        .find(|(abbrev, _)| abbrev.eq_ignore_ascii_case(abbreviation))
        .map(|(_, id)| *id)
}

pub fn abbreviation_for(reference_id: i64) -> Option<&'static str> {
    BOOK_ABBREVIATIONS
        .iter()
        .find(|(_, id)| *id == reference_id)
        .map(|(abbrev, _)| *abbrev)
}

/// Parsed external verse reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseRef {
    pub translation: String,
    pub book_reference_id: i64,
    pub chapter: i64,
    pub verse: i64,
    /// Trailing row id of the five-segment variant. Informational only; the
    /// lookup always goes through book, chapter and verse.
    pub raw_id: Option<i64>,
}

impl VerseRef {
    pub fn new(translation: &str, book_reference_id: i64, chapter: i64, verse: i64) -> Self {
        Self {
            translation: translation.to_string(),
            book_reference_id,
            chapter,
            verse,
            raw_id: None,
        }
    }

    pub fn parse(external_id: &str) -> Result<Self, ReferenceError> {
        let segments: Vec<&str> = external_id.trim().split(DELIMITER).collect();
        if segments.len() != 4 && segments.len() != 5 {
            return Err(ReferenceError::SegmentCount(segments.len()));
        }

        let translation = segments[0];
        if translation.is_empty() {
            return Err(ReferenceError::EmptyTranslation);
        }

        let book_reference_id = reference_id_for(segments[1])
            .ok_or_else(|| ReferenceError::UnknownBook(segments[1].to_string()))?;
        let chapter = parse_positive("chapter", segments[2])?;
        let verse = parse_positive("verse", segments[3])?;

        let raw_id = match segments.get(4) {
            Some(raw) => {
                log::debug!(
                    "five-segment verse reference '{external_id}'; the trailing id is ignored for lookup"
                );
                Some(parse_positive("id", raw)?)
            }
            None => None,
        };

        Ok(Self {
            translation: translation.to_string(),
            book_reference_id,
            chapter,
            verse,
            raw_id,
        })
    }

    pub fn abbreviation(&self) -> Option<&'static str> {
        abbreviation_for(self.book_reference_id)
    }
}

impl fmt::Display for VerseRef {
    /// Writes the canonical four-segment form. A reference id outside the
    /// table is written as a number and will not parse back.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.abbreviation() {
            Some(abbrev) => write!(f, "{}{DELIMITER}{abbrev}", self.translation)?,
            None => write!(f, "{}{DELIMITER}{}", self.translation, self.book_reference_id)?,
        }
        write!(f, "{DELIMITER}{}{DELIMITER}{}", self.chapter, self.verse)
    }
}

/// Only the canonical decimal form is accepted: ASCII digits, no sign and no
/// leading zero, so a parsed reference always formats back to its input.
fn parse_positive(field: &'static str, value: &str) -> Result<i64, ReferenceError> {
    let canonical = value.bytes().all(|b| b.is_ascii_digit()) && !value.starts_with('0');
    match value.parse::<i64>() {
        Ok(number) if canonical && number > 0 => Ok(number),
        _ => Err(ReferenceError::InvalidNumber {
            field,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_covers_every_canonical_book_once() {
        let ids: HashSet<i64> = BOOK_ABBREVIATIONS.iter().map(|(_, id)| *id).collect();
        let abbrevs: HashSet<&str> = BOOK_ABBREVIATIONS.iter().map(|(a, _)| *a).collect();
        assert_eq!(ids, (1..=66).collect());
        assert_eq!(abbrevs.len(), 66);
    }

    #[test]
    fn rejects_non_canonical_numbers() {
        for id in ["ACF_GN_+1_1", "ACF_GN_01_1", "ACF_GN_1_01", "ACF_GN_1_ 1", "ACF_GN_0_1"] {
            assert!(
                matches!(VerseRef::parse(id), Err(ReferenceError::InvalidNumber { .. })),
                "{id} should be rejected"
            );
        }
        assert!(VerseRef::parse("ACF_JO_3_16_+5").is_err());
    }

    #[test]
    fn parses_four_segment_reference() {
        let parsed = VerseRef::parse("ACF_GN_1_1").unwrap();
        assert_eq!(parsed, VerseRef::new("ACF", 1, 1, 1));
    }

    #[test]
    fn parses_five_segment_reference() {
        let parsed = VerseRef::parse("ACF_JO_3_16_26137").unwrap();
        assert_eq!(parsed.book_reference_id, 43);
        assert_eq!(parsed.chapter, 3);
        assert_eq!(parsed.verse, 16);
        assert_eq!(parsed.raw_id, Some(26137));
    }

    #[test]
    fn abbreviation_lookup_ignores_case() {
        assert_eq!(reference_id_for("1jo"), Some(62));
        assert_eq!(VerseRef::parse("NVI_ap_22_21").unwrap().book_reference_id, 66);
    }

    #[test]
    fn rejects_malformed_references() {
        assert_eq!(
            VerseRef::parse("ACF_XX_1_1"),
            Err(ReferenceError::UnknownBook("XX".to_string()))
        );
        assert_eq!(
            VerseRef::parse("ACF_GN_1"),
            Err(ReferenceError::SegmentCount(3))
        );
        assert_eq!(
            VerseRef::parse("ACF_GN_1_1_2_3"),
            Err(ReferenceError::SegmentCount(6))
        );
        assert!(matches!(
            VerseRef::parse("ACF_GN_um_1"),
            Err(ReferenceError::InvalidNumber { field: "chapter", .. })
        ));
        assert!(matches!(
            VerseRef::parse("ACF_GN_1_0"),
            Err(ReferenceError::InvalidNumber { field: "verse", .. })
        ));
        assert_eq!(
            VerseRef::parse("_GN_1_1"),
            Err(ReferenceError::EmptyTranslation)
        );
    }

    #[test]
    fn display_writes_canonical_form() {
        let parsed = VerseRef::parse("ARA_1co_13_4_999").unwrap();
        assert_eq!(parsed.to_string(), "ARA_1CO_13_4");
    }
}
