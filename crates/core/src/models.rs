//! Wire models for the risk-tracking API.
//!
//! Read models are lenient (most fields optional) because the server's payloads vary
//! between endpoints. Write models are built from validated forms only.

use crate::role::Role;
use crate::session::Session;
use cardio_types::{Dni, EmailAddress, NonEmptyText};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account as listed by `GET /users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role_id: Option<i64>,
    #[serde(rename = "DNI", default)]
    pub dni: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Body for `POST /users` and `PUT /users/{id}`; produced by
/// [`UserForm::validate`](crate::validation::UserForm::validate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPayload {
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    pub username: NonEmptyText,
    pub email: EmailAddress,
    #[serde(rename = "DNI")]
    pub dni: Dni,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Entry of `GET /roles`. Ids arrive as numbers or strings depending on the server build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: i64,
    pub name: String,
}

fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// A patient ("client") as listed for doctors by `GET /clients`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "DNI", default)]
    pub dni: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub sex: Option<String>,
}

/// One risk assessment ("consulta") from `GET /results/{clientId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    pub id: i64,
    #[serde(rename = "HeartDisease")]
    pub heart_disease: u8,
    #[serde(rename = "RiskPercentage")]
    pub risk_percentage: f64,
    #[serde(rename = "dateRegistration")]
    pub date_registration: DateTime<Utc>,
}

impl RiskResult {
    pub fn heart_disease_label(&self) -> &'static str {
        if self.heart_disease == 1 {
            "Enfermedad Cardiaca"
        } else {
            "No posee"
        }
    }
}

/// A result from `GET /results/with_state_revision/{clientId}`, flagged with whether a
/// clinician has already reviewed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultWithRevisionState {
    #[serde(flatten)]
    pub result: RiskResult,
    #[serde(default)]
    pub state_revision: bool,
}

/// One entry of a patient's consultation history (`GET /historial/{userId}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "RiskPercentage", default)]
    pub risk_percentage: Option<f64>,
    #[serde(default)]
    pub diagnostico: Option<String>,
    #[serde(rename = "dateRegistration", default)]
    pub date_registration: Option<DateTime<Utc>>,
}

/// Time series behind the client report charts (`GET /clients/{id}/report`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportHistory {
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub bmi: Vec<f64>,
    #[serde(default)]
    pub mental_health_days: Vec<f64>,
    #[serde(default)]
    pub physical_health_days: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientReport {
    #[serde(default)]
    pub history: Option<ReportHistory>,
}

/// Raw `POST /login` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl LoginResponse {
    /// Turns a successful response into a [`Session`].
    ///
    /// Returns `Ok(None)` when the server reports anything other than success, and an error
    /// when it reports success but with an unknown role.
    pub fn into_session(self) -> crate::CardioResult<Option<Session>> {
        if self.message != crate::constants::LOGIN_SUCCESS_MESSAGE {
            return Ok(None);
        }
        let (Some(user_id), Some(username), Some(role)) = (self.user_id, self.username, self.role)
        else {
            return Ok(None);
        };
        Ok(Some(Session {
            user_id,
            username,
            role: role.parse::<Role>()?,
        }))
    }
}

/// Aggregate counts shown on the reports screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub users: Option<u64>,
    pub doctors: Option<u64>,
    pub patients_detected: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CardioError;

    #[test]
    fn user_reads_dni_and_tolerates_missing_fields() {
        let user: User = serde_json::from_str(
            r#"{"id":4,"first_name":"Rosa","last_name":"Huamán","DNI":"10293847"}"#,
        )
        .unwrap();
        assert_eq!(user.dni.as_deref(), Some("10293847"));
        assert_eq!(user.full_name(), "Rosa Huamán");
        assert!(user.role_id.is_none());
    }

    #[test]
    fn role_ids_accept_strings() {
        let roles: Vec<RoleRecord> =
            serde_json::from_str(r#"[{"id":"1","name":"admin"},{"id":2,"name":"medico"}]"#)
                .unwrap();
        assert_eq!(roles[0].id, 1);
        assert_eq!(roles[1].id, 2);
    }

    #[test]
    fn results_use_server_field_names() {
        let raw = r#"{"id":9,"HeartDisease":1,"RiskPercentage":63.5,
                      "dateRegistration":"2024-05-02T10:00:00Z","state_revision":true}"#;
        let flagged: ResultWithRevisionState = serde_json::from_str(raw).unwrap();
        assert!(flagged.state_revision);
        assert_eq!(flagged.result.heart_disease_label(), "Enfermedad Cardiaca");
    }

    #[test]
    fn login_success_becomes_session() {
        let ok: LoginResponse = serde_json::from_str(
            r#"{"message":"Login successful","user_id":3,"username":"drperez","role":"medico"}"#,
        )
        .unwrap();
        let session = ok.into_session().unwrap().unwrap();
        assert_eq!(session.role, Role::Medico);

        let failed: LoginResponse =
            serde_json::from_str(r#"{"message":"Invalid credentials"}"#).unwrap();
        assert_eq!(failed.into_session().unwrap(), None);

        let odd_role: LoginResponse = serde_json::from_str(
            r#"{"message":"Login successful","user_id":3,"username":"x","role":"root"}"#,
        )
        .unwrap();
        assert!(matches!(odd_role.into_session(), Err(CardioError::UnknownRole(_))));
    }

    #[test]
    fn report_history_is_camel_case() {
        let report: ClientReport = serde_json::from_str(
            r#"{"history":{"dates":["2024-01"],"bmi":[27.1],"mentalHealthDays":[2],"physicalHealthDays":[0]}}"#,
        )
        .unwrap();
        let history = report.history.unwrap();
        assert_eq!(history.mental_health_days, vec![2.0]);
    }
}
