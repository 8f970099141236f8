use crate::{CardioError, CardioResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of an authenticated user. Every role-gated view matches on this exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Role {
    Admin,
    Medico,
    Paciente,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Medico => "medico",
            Self::Paciente => "paciente",
        }
    }
}

impl FromStr for Role {
    type Err = CardioError;

    fn from_str(s: &str) -> CardioResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "medico" => Ok(Self::Medico),
            "paciente" => Ok(Self::Paciente),
            _ => Err(CardioError::UnknownRole(s.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = CardioError;

    fn try_from(value: String) -> CardioResult<Self> {
        value.parse()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
