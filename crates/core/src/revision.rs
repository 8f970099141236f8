//! Clinical revisions: a clinician's annotation of a risk result.
//!
//! A revision records when the review started and ended (as [`ClockSeconds`]), the
//! diagnosis, key factors and a severity. The end time must be strictly after the start
//! time for every create and update.

use crate::clock::ClockSeconds;
use crate::{CardioError, CardioResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PatientStatus {
    #[default]
    Leve,
    Medio,
    Grave,
}

impl PatientStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Leve => "LEVE",
            Self::Medio => "MEDIO",
            Self::Grave => "GRAVE",
        }
    }
}

impl FromStr for PatientStatus {
    type Err = CardioError;

    fn from_str(s: &str) -> CardioResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LEVE" => Ok(Self::Leve),
            "MEDIO" => Ok(Self::Medio),
            "GRAVE" => Ok(Self::Grave),
            _ => Err(CardioError::UnknownPatientStatus(s.to_string())),
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored revision as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub id: i64,
    pub results_id: i64,
    pub start_time: ClockSeconds,
    pub end_time: ClockSeconds,
    pub diagnosis: String,
    pub key_factors: String,
    pub patient_status: PatientStatus,
    pub date_created: DateTime<Utc>,
}

impl Revision {
    /// Editable copy of this revision. The draft is not authoritative; the server's copy
    /// wins on the next list.
    pub fn to_draft(&self) -> RevisionDraft {
        RevisionDraft {
            results_id: self.results_id,
            start_time: self.start_time,
            end_time: self.end_time,
            diagnosis: self.diagnosis.clone(),
            key_factors: self.key_factors.clone(),
            patient_status: self.patient_status,
            date_created: self.date_created,
        }
    }
}

/// Body for creating or updating a revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionDraft {
    pub results_id: i64,
    pub start_time: ClockSeconds,
    pub end_time: ClockSeconds,
    pub diagnosis: String,
    pub key_factors: String,
    pub patient_status: PatientStatus,
    pub date_created: DateTime<Utc>,
}

impl RevisionDraft {
    /// Blank draft for reviewing `results_id`: midnight times, `LEVE`, created now.
    pub fn for_result(results_id: i64) -> Self {
        Self {
            results_id,
            start_time: ClockSeconds::MIDNIGHT,
            end_time: ClockSeconds::MIDNIGHT,
            diagnosis: String::new(),
            key_factors: String::new(),
            patient_status: PatientStatus::default(),
            date_created: Utc::now(),
        }
    }

    /// Checks the draft before it is sent.
    ///
    /// # Errors
    ///
    /// - [`CardioError::InvalidTimeRange`] unless `end_time > start_time`
    /// - [`CardioError::InvalidInput`] if the diagnosis is blank
    pub fn validate(&self) -> CardioResult<()> {
        if self.end_time <= self.start_time {
            return Err(CardioError::InvalidTimeRange {
                start: self.start_time.to_string(),
                end: self.end_time.to_string(),
            });
        }
        if self.diagnosis.trim().is_empty() {
            return Err(CardioError::InvalidInput("diagnosis is required".into()));
        }
        Ok(())
    }

    /// Review duration in seconds. Only meaningful for a validated draft.
    pub fn duration_seconds(&self) -> u32 {
        self.end_time.seconds().saturating_sub(self.start_time.seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::clock_to_seconds;

    fn at(clock: &str) -> ClockSeconds {
        ClockSeconds::new(clock_to_seconds(clock).unwrap()).unwrap()
    }

    fn draft(start: &str, end: &str) -> RevisionDraft {
        RevisionDraft {
            start_time: at(start),
            end_time: at(end),
            diagnosis: "Hipertensión estadio 1".into(),
            key_factors: "IMC 31, fumador".into(),
            ..RevisionDraft::for_result(12)
        }
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = draft("09:00:00", "08:30:00").validate().unwrap_err();
        assert!(matches!(
            err,
            CardioError::InvalidTimeRange { ref start, ref end }
                if start == "09:00:00" && end == "08:30:00"
        ));
    }

    #[test]
    fn equal_times_are_rejected() {
        assert!(draft("09:00:00", "09:00:00").validate().is_err());
    }

    #[test]
    fn valid_draft_passes() {
        let d = draft("09:00:00", "09:45:00");
        d.validate().unwrap();
        assert_eq!(d.duration_seconds(), 45 * 60);
    }

    #[test]
    fn blank_diagnosis_is_rejected() {
        let mut d = draft("09:00:00", "10:00:00");
        d.diagnosis = "  ".into();
        assert!(matches!(d.validate(), Err(CardioError::InvalidInput(_))));
    }

    #[test]
    fn new_drafts_default_to_leve() {
        let d = RevisionDraft::for_result(5);
        assert_eq!(d.patient_status, PatientStatus::Leve);
        assert_eq!(d.start_time, ClockSeconds::MIDNIGHT);
        // a blank draft cannot be saved as-is
        assert!(d.validate().is_err());
    }

    #[test]
    fn wire_format_sends_clock_strings() {
        let body = serde_json::to_value(draft("09:00:00", "09:30:00")).unwrap();
        assert_eq!(body["start_time"], "09:00:00");
        assert_eq!(body["end_time"], "09:30:00");
        assert_eq!(body["patient_status"], "LEVE");
    }

    #[test]
    fn revisions_read_either_time_encoding() {
        let raw = r#"{"id":1,"results_id":12,"start_time":32400,"end_time":"09:30:00",
                      "diagnosis":"d","key_factors":"k","patient_status":"GRAVE",
                      "date_created":"2024-05-02T10:00:00Z"}"#;
        let revision: Revision = serde_json::from_str(raw).unwrap();
        assert_eq!(revision.start_time.to_string(), "09:00:00");
        assert_eq!(revision.patient_status, PatientStatus::Grave);
        assert!(revision.to_draft().validate().is_ok());
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("medio".parse::<PatientStatus>().unwrap(), PatientStatus::Medio);
        assert!("CRITICO".parse::<PatientStatus>().is_err());
    }
}
