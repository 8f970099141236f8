//! Validated text types shared by the cardio crates.
//!
//! Each type checks its invariant once at construction so downstream code can take the
//! value as-is. All of them serialise as plain JSON strings and re-validate on the way in.

use std::fmt;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input does not look like `local@domain.tld`
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    /// The input is not an 8-digit national identity number
    #[error("DNI must be exactly {DNI_LEN} digits, got: '{0}'")]
    InvalidDni(String),
}

/// Number of digits in a national identity document (DNI) number.
pub const DNI_LEN: usize = 8;

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText`, or `TextError::Empty` if nothing is left after trimming.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An email address with the minimal `local@domain.tld` shape the user forms require.
///
/// Stored lowercased so look-ups and comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses and normalises an email address.
    ///
    /// Accepts ASCII only, exactly one `@`, a non-empty local part, and a domain containing at
    /// least one interior `.`. No whitespace is allowed anywhere.
    pub fn parse(input: &str) -> Result<Self, TextError> {
        let candidate = input.trim();
        if candidate.is_empty() {
            return Err(TextError::Empty);
        }

        let invalid = || TextError::InvalidEmail(candidate.to_owned());

        if !candidate.is_ascii() || candidate.bytes().any(|b| b.is_ascii_whitespace()) {
            return Err(invalid());
        }

        let (local, domain) = candidate.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.contains('@') {
            return Err(invalid());
        }

        let dot = domain.rfind('.').ok_or_else(invalid)?;
        if dot == 0 || dot == domain.len() - 1 || domain.starts_with('.') {
            return Err(invalid());
        }

        let domain_ok = domain
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-'));
        if !domain_ok {
            return Err(invalid());
        }

        Ok(Self(candidate.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Peruvian-style national identity number: exactly [`DNI_LEN`] ASCII digits.
///
/// Kept as text so leading zeros survive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dni(String);

impl Dni {
    pub fn parse(input: &str) -> Result<Self, TextError> {
        let candidate = input.trim();
        if candidate.is_empty() {
            return Err(TextError::Empty);
        }
        if candidate.len() != DNI_LEN || !candidate.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TextError::InvalidDni(candidate.to_owned()));
        }
        Ok(Self(candidate.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_newtype_impls {
    ($ty:ident, $ctor:path) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $ctor(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

string_newtype_impls!(NonEmptyText, NonEmptyText::new);
string_newtype_impls!(EmailAddress, EmailAddress::parse);
string_newtype_impls!(Dni, Dni::parse);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_and_rejects_blank() {
        assert_eq!(NonEmptyText::new("  Pérez ").unwrap().as_str(), "Pérez");
        assert_eq!(NonEmptyText::new(" \t").unwrap_err(), TextError::Empty);
    }

    #[test]
    fn email_is_lowercased() {
        let email = EmailAddress::parse("Ana.Lopez@Clinica.PE").unwrap();
        assert_eq!(email.as_str(), "ana.lopez@clinica.pe");
    }

    #[test]
    fn email_rejects_malformed_shapes() {
        for bad in [
            "ana",
            "@clinica.pe",
            "ana@clinica",
            "ana@.pe",
            "ana@clinica.",
            "ana@@clinica.pe",
            "ana lopez@clinica.pe",
            "ana@clínica.pe",
        ] {
            assert!(
                matches!(EmailAddress::parse(bad), Err(TextError::InvalidEmail(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn dni_requires_eight_digits() {
        assert_eq!(Dni::parse("01234567").unwrap().as_str(), "01234567");
        assert!(matches!(Dni::parse("1234567"), Err(TextError::InvalidDni(_))));
        assert!(matches!(Dni::parse("1234567a"), Err(TextError::InvalidDni(_))));
        assert_eq!(Dni::parse("").unwrap_err(), TextError::Empty);
    }

    #[test]
    fn deserialising_revalidates() {
        let ok: Dni = serde_json::from_str("\"87654321\"").unwrap();
        assert_eq!(ok.to_string(), "87654321");
        assert!(serde_json::from_str::<EmailAddress>("\"nope\"").is_err());
    }
}
