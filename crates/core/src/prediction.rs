//! Risk-prediction request building.
//!
//! The questionnaire collects raw answers (age in years, sex token, yes/no questions). The
//! model expects the coded form: an age category, a sex code and 0/1 flags. Building a
//! [`PredictRequest`] is where those mappers run, so an invalid age or sex stops the
//! request before it is sent.

use crate::categories::{AgeBracket, SexCode};
use crate::validation::FieldError;
use crate::{CardioError, CardioResult};
use serde::{Deserialize, Serialize, Serializer};

/// Raw questionnaire answers for one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientAnswers {
    pub client_id: i64,
    pub age: i64,
    pub sex: String,
    pub bmi: f64,
    pub smoking: bool,
    pub alcohol_drinking: bool,
    pub stroke: bool,
    /// Days of poor physical health in the last 30.
    pub physical_health_days: u8,
    /// Days of poor mental health in the last 30.
    pub mental_health_days: u8,
    pub diff_walking: bool,
    pub race: u8,
    pub diabetic: u8,
    pub physical_activity: bool,
    /// Self-rated general health, 1 (poor) to 5 (excellent).
    pub gen_health: u8,
    pub sleep_hours: f64,
    pub asthma: bool,
    pub kidney_disease: bool,
    pub skin_cancer: bool,
}

fn flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

/// Body of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictRequest {
    pub client_id: i64,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    #[serde(rename = "Smoking", serialize_with = "flag")]
    pub smoking: bool,
    #[serde(rename = "AlcoholDrinking", serialize_with = "flag")]
    pub alcohol_drinking: bool,
    #[serde(rename = "Stroke", serialize_with = "flag")]
    pub stroke: bool,
    #[serde(rename = "PhysicalHealth")]
    pub physical_health: u8,
    #[serde(rename = "MentalHealth")]
    pub mental_health: u8,
    #[serde(rename = "DiffWalking", serialize_with = "flag")]
    pub diff_walking: bool,
    #[serde(rename = "Sex")]
    pub sex: SexCode,
    #[serde(rename = "AgeCategory")]
    pub age_category: AgeBracket,
    #[serde(rename = "Race")]
    pub race: u8,
    #[serde(rename = "Diabetic")]
    pub diabetic: u8,
    #[serde(rename = "PhysicalActivity", serialize_with = "flag")]
    pub physical_activity: bool,
    #[serde(rename = "GenHealth")]
    pub gen_health: u8,
    #[serde(rename = "SleepTime")]
    pub sleep_time: f64,
    #[serde(rename = "Asthma", serialize_with = "flag")]
    pub asthma: bool,
    #[serde(rename = "KidneyDisease", serialize_with = "flag")]
    pub kidney_disease: bool,
    #[serde(rename = "SkinCancer", serialize_with = "flag")]
    pub skin_cancer: bool,
}

impl PredictRequest {
    /// Codes and range-checks the answers.
    ///
    /// # Errors
    ///
    /// [`CardioError::Validation`] listing every out-of-range answer, including an age
    /// outside the age categories or an unknown sex token.
    pub fn from_answers(answers: &PatientAnswers) -> CardioResult<Self> {
        let mut errors = Vec::new();

        let age_category = AgeBracket::from_age(answers.age)
            .map_err(|e| errors.push(FieldError::new("age", e.to_string())))
            .ok();
        let sex = SexCode::from_token(answers.sex.trim())
            .map_err(|e| errors.push(FieldError::new("sex", e.to_string())))
            .ok();

        if !(answers.bmi.is_finite() && answers.bmi > 0.0) {
            errors.push(FieldError::new("bmi", "must be a positive number"));
        }
        if answers.physical_health_days > 30 {
            errors.push(FieldError::new("physical_health_days", "must be 0 to 30"));
        }
        if answers.mental_health_days > 30 {
            errors.push(FieldError::new("mental_health_days", "must be 0 to 30"));
        }
        if !(1..=5).contains(&answers.gen_health) {
            errors.push(FieldError::new("gen_health", "must be 1 to 5"));
        }
        if !(answers.sleep_hours.is_finite() && (0.0..=24.0).contains(&answers.sleep_hours)) {
            errors.push(FieldError::new("sleep_hours", "must be 0 to 24"));
        }

        match (age_category, sex) {
            (Some(age_category), Some(sex)) if errors.is_empty() => Ok(Self {
                client_id: answers.client_id,
                bmi: answers.bmi,
                smoking: answers.smoking,
                alcohol_drinking: answers.alcohol_drinking,
                stroke: answers.stroke,
                physical_health: answers.physical_health_days,
                mental_health: answers.mental_health_days,
                diff_walking: answers.diff_walking,
                sex,
                age_category,
                race: answers.race,
                diabetic: answers.diabetic,
                physical_activity: answers.physical_activity,
                gen_health: answers.gen_health,
                sleep_time: answers.sleep_hours,
                asthma: answers.asthma,
                kidney_disease: answers.kidney_disease,
                skin_cancer: answers.skin_cancer,
            }),
            _ => Err(CardioError::Validation(errors)),
        }
    }
}

/// Response of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Risk percentage.
    pub riesgo: f64,
    pub impacto: String,
    pub diagnostico: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers() -> PatientAnswers {
        PatientAnswers {
            client_id: 21,
            age: 58,
            sex: "M".into(),
            bmi: 29.4,
            smoking: true,
            alcohol_drinking: false,
            stroke: false,
            physical_health_days: 3,
            mental_health_days: 0,
            diff_walking: false,
            race: 1,
            diabetic: 0,
            physical_activity: true,
            gen_health: 3,
            sleep_hours: 7.0,
            asthma: false,
            kidney_disease: false,
            skin_cancer: false,
        }
    }

    #[test]
    fn request_uses_coded_fields() {
        let body = serde_json::to_value(PredictRequest::from_answers(&answers()).unwrap()).unwrap();
        assert_eq!(body["AgeCategory"], 8);
        assert_eq!(body["Sex"], 1);
        assert_eq!(body["Smoking"], 1);
        assert_eq!(body["AlcoholDrinking"], 0);
        assert_eq!(body["PhysicalActivity"], 1);
        assert_eq!(body.as_object().unwrap().len(), 18);
    }

    #[test]
    fn invalid_age_and_sex_block_the_request() {
        let mut a = answers();
        a.age = 16;
        a.sex = "X".into();
        a.gen_health = 0;
        let CardioError::Validation(errors) = PredictRequest::from_answers(&a).unwrap_err() else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["age", "sex", "gen_health"]);
    }

    #[test]
    fn response_parses() {
        let res: PredictResponse = serde_json::from_str(
            r#"{"riesgo":41.2,"impacto":"moderado","diagnostico":"Control en 6 meses"}"#,
        )
        .unwrap();
        assert_eq!(res.riesgo, 41.2);
    }
}
