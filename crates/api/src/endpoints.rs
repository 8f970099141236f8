//! REST paths of the risk-tracking API, relative to the base URL.

use cardio_core::KpiKind;

pub const LOGIN: &str = "/login";
pub const USERS: &str = "/users";
pub const ROLES: &str = "/roles";
pub const CLIENTS: &str = "/clients";
pub const REVISIONS: &str = "/revisions";
pub const PREDICT: &str = "/predict";
pub const USERS_COUNT: &str = "/users/count";
pub const DOCTORS_COUNT: &str = "/doctors/count";
pub const PATIENTS_DETECTED_COUNT: &str = "/patients/detected/count";

pub fn user(id: i64) -> String {
    format!("{USERS}/{id}")
}

pub fn revision(id: i64) -> String {
    format!("{REVISIONS}/{id}")
}

/// Per-result review flow: create a revision.
pub const REVISION_SAVE: &str = "/api/revision/save";

/// Per-result review flow: update a revision.
pub fn revision_update(id: i64) -> String {
    format!("/api/revision/update/{id}")
}

pub fn revision_by_result(result_id: i64) -> String {
    format!("/api/revision/by_result_id/{result_id}")
}

pub fn results(client_id: i64) -> String {
    format!("/results/{client_id}")
}

pub fn results_with_revision_state(client_id: i64) -> String {
    format!("/results/with_state_revision/{client_id}")
}

pub fn history(user_id: i64) -> String {
    format!("/historial/{user_id}")
}

pub fn client_report(client_id: i64) -> String {
    format!("{CLIENTS}/{client_id}/report")
}

/// KPI paths keep their trailing slash.
pub fn kpi(kind: KpiKind) -> String {
    format!("/kpi/{}/", kind.metric())
}
