//! Categorical mappers for the risk questionnaire.
//!
//! The prediction model takes age and sex as small integer codes rather than raw values.
//! These mappers are the only place that conversion happens.

use crate::{CardioError, CardioResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the 13 age categories used by the risk model, ordinal 1 to 13.
///
/// Bands are five years wide from 18, except the first (18-24) and the last, which is open
/// ended up to 150.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AgeBracket(u8);

/// Inclusive `(low, high)` ages for brackets 1..=13, in order.
const AGE_BRACKET_RANGES: [(u16, u16); 13] = [
    (18, 24),
    (25, 29),
    (30, 34),
    (35, 39),
    (40, 44),
    (45, 49),
    (50, 54),
    (55, 59),
    (60, 64),
    (65, 69),
    (70, 74),
    (75, 79),
    (80, 150),
];

impl AgeBracket {
    pub const MIN_AGE: i64 = 18;
    pub const MAX_AGE: i64 = 150;

    /// Maps an age in years to its bracket.
    ///
    /// # Errors
    ///
    /// Returns [`CardioError::InvalidAge`] for ages below 18 or above 150. Callers treat this
    /// as an input-validation failure.
    pub fn from_age(age: i64) -> CardioResult<Self> {
        AGE_BRACKET_RANGES
            .iter()
            .position(|&(low, high)| (i64::from(low)..=i64::from(high)).contains(&age))
            .map(|index| Self(index as u8 + 1))
            .ok_or(CardioError::InvalidAge(age))
    }

    /// Ordinal in `1..=13`.
    pub fn ordinal(self) -> u8 {
        self.0
    }

    /// Inclusive age range covered by this bracket.
    pub fn range(self) -> (u16, u16) {
        AGE_BRACKET_RANGES[usize::from(self.0 - 1)]
    }

    /// Label used by the questionnaire dataset, e.g. `"40-44"` or `"80 or older"`.
    pub fn label(self) -> String {
        match self.range() {
            (low, _) if self.0 == 13 => format!("{low} or older"),
            (low, high) => format!("{low}-{high}"),
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (1..=13).map(Self)
    }
}

impl TryFrom<u8> for AgeBracket {
    type Error = CardioError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=13).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CardioError::InvalidInput(format!(
                "age category must be between 1 and 13, got {value}"
            )))
        }
    }
}

impl From<AgeBracket> for u8 {
    fn from(bracket: AgeBracket) -> Self {
        bracket.0
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.label())
    }
}

/// Convenience wrapper over [`AgeBracket::from_age`].
pub fn age_to_bracket(age: i64) -> CardioResult<AgeBracket> {
    AgeBracket::from_age(age)
}

/// Sex code sent to the risk model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SexCode {
    Masculino = 1,
    Femenino = 2,
}

impl SexCode {
    /// Maps a stored sex token (`"M"` or `"F"`) to its code. Matching is exact.
    pub fn from_token(token: &str) -> CardioResult<Self> {
        match token {
            "M" => Ok(Self::Masculino),
            "F" => Ok(Self::Femenino),
            other => Err(CardioError::InvalidSex(other.to_string())),
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::Masculino => "M",
            Self::Femenino => "F",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Masculino => "Masculino",
            Self::Femenino => "Femenino",
        }
    }
}

impl Serialize for SexCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

/// Convenience wrapper over [`SexCode::from_token`].
pub fn sex_to_code(token: &str) -> CardioResult<SexCode> {
    SexCode::from_token(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_age_maps_to_exactly_one_bracket() {
        for age in AgeBracket::MIN_AGE..=AgeBracket::MAX_AGE {
            let bracket = age_to_bracket(age).expect("age in supported range");
            let matching = AgeBracket::all()
                .filter(|b| {
                    let (low, high) = b.range();
                    (i64::from(low)..=i64::from(high)).contains(&age)
                })
                .count();
            assert_eq!(matching, 1, "age {age} matched {matching} brackets");
            assert!((1..=13).contains(&bracket.ordinal()));
        }
    }

    #[test]
    fn brackets_are_contiguous() {
        let ranges: Vec<_> = AgeBracket::all().map(AgeBracket::range).collect();
        assert_eq!(ranges.first().map(|r| r.0), Some(18));
        assert_eq!(ranges.last().map(|r| r.1), Some(150));
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].1 + 1, pair[1].0);
        }
    }

    #[test]
    fn band_edges() {
        assert_eq!(age_to_bracket(18).unwrap().ordinal(), 1);
        assert_eq!(age_to_bracket(24).unwrap().ordinal(), 1);
        assert_eq!(age_to_bracket(25).unwrap().ordinal(), 2);
        assert_eq!(age_to_bracket(44).unwrap().ordinal(), 5);
        assert_eq!(age_to_bracket(79).unwrap().ordinal(), 12);
        assert_eq!(age_to_bracket(80).unwrap().ordinal(), 13);
        assert_eq!(age_to_bracket(150).unwrap().ordinal(), 13);
    }

    #[test]
    fn ages_outside_the_table_are_rejected() {
        for age in [-1, 0, 17, 151, 200] {
            assert!(matches!(age_to_bracket(age), Err(CardioError::InvalidAge(a)) if a == age));
        }
    }

    #[test]
    fn labels_follow_the_dataset() {
        assert_eq!(age_to_bracket(20).unwrap().label(), "18-24");
        assert_eq!(age_to_bracket(42).unwrap().label(), "40-44");
        assert_eq!(age_to_bracket(95).unwrap().label(), "80 or older");
    }

    #[test]
    fn bracket_serialises_as_ordinal() {
        let bracket = age_to_bracket(52).unwrap();
        assert_eq!(serde_json::to_string(&bracket).unwrap(), "7");
        assert!(serde_json::from_str::<AgeBracket>("14").is_err());
    }

    #[test]
    fn sex_tokens() {
        assert_eq!(sex_to_code("M").unwrap().code(), 1);
        assert_eq!(sex_to_code("F").unwrap().code(), 2);
        assert!(matches!(sex_to_code("X"), Err(CardioError::InvalidSex(t)) if t == "X"));
        assert!(sex_to_code("m").is_err());
        assert!(sex_to_code("").is_err());
    }
}
