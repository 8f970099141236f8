//! Typed calls against the risk-tracking REST API.

use crate::endpoints;
use crate::transport::{HttpRequest, HttpTransport, Method, ReqwestTransport};
use crate::{ApiError, ApiResult};
use cardio_core::models::{
    Client, ClientReport, HistoryEntry, LoginResponse, ResultWithRevisionState, RiskResult,
    RoleRecord, User, UserPayload,
};
use cardio_core::prediction::{PredictRequest, PredictResponse};
use cardio_core::validation::Credentials;
use cardio_core::{CoreConfig, KpiKind, Revision, RevisionDraft, Session};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Aggregate counters exposed by the reports endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountKind {
    Users,
    Doctors,
    PatientsDetected,
}

impl CountKind {
    fn path(self) -> &'static str {
        match self {
            Self::Users => endpoints::USERS_COUNT,
            Self::Doctors => endpoints::DOCTORS_COUNT,
            Self::PatientsDetected => endpoints::PATIENTS_DETECTED_COUNT,
        }
    }
}

/// Cheap to clone; clones share one transport.
#[derive(Debug)]
pub struct ApiClient<T = ReqwestTransport> {
    transport: Arc<T>,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl ApiClient<ReqwestTransport> {
    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(ReqwestTransport::new(cfg.api_base_url()))
    }
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn request(
        &self,
        method: Method,
        path: String,
        body: Option<serde_json::Value>,
    ) -> ApiResult<String> {
        let response = self
            .transport
            .send(HttpRequest {
                method,
                path: path.clone(),
                body,
            })
            .await?;
        if !response.is_success() {
            return Err(ApiError::Status {
                method,
                path,
                status: response.status,
                body: response.body,
            });
        }
        Ok(response.body)
    }

    async fn get_json<R: DeserializeOwned>(&self, path: String) -> ApiResult<R> {
        let body = self.request(Method::Get, path.clone(), None).await?;
        decode(&path, &body)
    }

    async fn send_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        method: Method,
        path: String,
        payload: &B,
    ) -> ApiResult<R> {
        let value = serde_json::to_value(payload).map_err(ApiError::Encode)?;
        let body = self.request(method, path.clone(), Some(value)).await?;
        decode(&path, &body)
    }

    async fn delete(&self, path: String) -> ApiResult<()> {
        self.request(Method::Delete, path, None).await.map(|_| ())
    }

    /// Authenticates and returns the session to cache.
    ///
    /// # Arguments
    ///
    /// * `credentials` - Validated email and password (see `validate_login`).
    ///
    /// # Returns
    ///
    /// The [`Session`] built from the server's reply. A 2xx response whose message is not
    /// the success marker is still [`ApiError::LoginFailed`].
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<Session> {
        let response: LoginResponse = self
            .send_json(Method::Post, endpoints::LOGIN.to_string(), credentials)
            .await?;
        let message = response.message.clone();
        match response.into_session()? {
            Some(session) => {
                tracing::info!("Logged in as {} ({})", session.username, session.role);
                Ok(session)
            }
            None => Err(ApiError::LoginFailed(message)),
        }
    }

    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.get_json(endpoints::USERS.to_string()).await
    }

    pub async fn get_user(&self, id: i64) -> ApiResult<User> {
        self.get_json(endpoints::user(id)).await
    }

    pub async fn create_user(&self, payload: &UserPayload) -> ApiResult<User> {
        self.send_json(Method::Post, endpoints::USERS.to_string(), payload)
            .await
    }

    pub async fn update_user(&self, id: i64, payload: &UserPayload) -> ApiResult<User> {
        self.send_json(Method::Put, endpoints::user(id), payload)
            .await
    }

    pub async fn delete_user(&self, id: i64) -> ApiResult<()> {
        self.delete(endpoints::user(id)).await
    }

    pub async fn list_roles(&self) -> ApiResult<Vec<RoleRecord>> {
        self.get_json(endpoints::ROLES.to_string()).await
    }

    pub async fn list_clients(&self) -> ApiResult<Vec<Client>> {
        self.get_json(endpoints::CLIENTS.to_string()).await
    }

    pub async fn list_results(&self, client_id: i64) -> ApiResult<Vec<RiskResult>> {
        self.get_json(endpoints::results(client_id)).await
    }

    pub async fn list_results_with_revision_state(
        &self,
        client_id: i64,
    ) -> ApiResult<Vec<ResultWithRevisionState>> {
        self.get_json(endpoints::results_with_revision_state(client_id))
            .await
    }

    pub async fn list_revisions(&self) -> ApiResult<Vec<Revision>> {
        self.get_json(endpoints::REVISIONS.to_string()).await
    }

    /// Rejects drafts whose time range is inverted before anything is sent.
    pub async fn create_revision(&self, draft: &RevisionDraft) -> ApiResult<Revision> {
        draft.validate()?;
        self.send_json(Method::Post, endpoints::REVISIONS.to_string(), draft)
            .await
    }

    pub async fn update_revision(&self, id: i64, draft: &RevisionDraft) -> ApiResult<Revision> {
        draft.validate()?;
        self.send_json(Method::Put, endpoints::revision(id), draft)
            .await
    }

    pub async fn delete_revision(&self, id: i64) -> ApiResult<()> {
        self.delete(endpoints::revision(id)).await
    }

    /// Saves a new revision through the per-result review endpoint.
    ///
    /// The server's reply body is not used; re-read with
    /// [`revision_by_result`](Self::revision_by_result) if the stored copy is needed.
    pub async fn save_revision(&self, draft: &RevisionDraft) -> ApiResult<()> {
        self.send_unit(Method::Post, endpoints::REVISION_SAVE.to_string(), draft)
            .await
    }

    /// Updates revision `id` through the per-result review endpoint.
    pub async fn update_saved_revision(&self, id: i64, draft: &RevisionDraft) -> ApiResult<()> {
        self.send_unit(Method::Put, endpoints::revision_update(id), draft)
            .await
    }

    async fn send_unit(&self, method: Method, path: String, draft: &RevisionDraft) -> ApiResult<()> {
        draft.validate()?;
        let value = serde_json::to_value(draft).map_err(ApiError::Encode)?;
        self.request(method, path, Some(value)).await.map(|_| ())
    }

    /// The revision attached to a result, or `None` when the server answers 404.
    pub async fn revision_by_result(&self, result_id: i64) -> ApiResult<Option<Revision>> {
        match self.get_json(endpoints::revision_by_result(result_id)).await {
            Ok(revision) => Ok(Some(revision)),
            Err(err) if err.status() == Some(404) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn history(&self, user_id: i64) -> ApiResult<Vec<HistoryEntry>> {
        self.get_json(endpoints::history(user_id)).await
    }

    /// Current KPI percentage; the server may answer `null` when it has no data.
    pub async fn kpi(&self, kind: KpiKind) -> ApiResult<Option<f64>> {
        self.get_json(endpoints::kpi(kind)).await
    }

    pub async fn count(&self, kind: CountKind) -> ApiResult<u64> {
        self.get_json(kind.path().to_string()).await
    }

    pub async fn client_report(&self, client_id: i64) -> ApiResult<ClientReport> {
        self.get_json(endpoints::client_report(client_id)).await
    }

    pub async fn predict(&self, request: &PredictRequest) -> ApiResult<PredictResponse> {
        self.send_json(Method::Post, endpoints::PREDICT.to_string(), request)
            .await
    }
}

fn decode<R: DeserializeOwned>(path: &str, body: &str) -> ApiResult<R> {
    serde_json::from_str(body).map_err(|source| ApiError::Decode {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use cardio_core::validation::validate_login;
    use cardio_core::{ClockSeconds, CardioError, Role};

    #[tokio::test]
    async fn login_success_builds_session() {
        let transport = ScriptedTransport::new().on(
            Method::Post,
            "/login",
            200,
            r#"{"message":"Login successful","user_id":5,"username":"ana","role":"medico"}"#,
        );
        let client = ApiClient::new(transport);
        let creds = validate_login("ana@example.com", "secret123").unwrap();

        let session = client.login(&creds).await.unwrap();
        assert_eq!(session.user_id, 5);
        assert_eq!(session.role, Role::Medico);

        let sent = client.transport().requests();
        assert_eq!(
            sent[0].body,
            Some(serde_json::json!({"email":"ana@example.com","password":"secret123"}))
        );
    }

    #[tokio::test]
    async fn login_with_other_message_fails() {
        let transport = ScriptedTransport::new().on(
            Method::Post,
            "/login",
            200,
            r#"{"message":"Invalid credentials"}"#,
        );
        let client = ApiClient::new(transport);
        let creds = validate_login("a@b.co", "whatever1").unwrap();

        let err = client.login(&creds).await.unwrap_err();
        assert!(matches!(err, ApiError::LoginFailed(m) if m == "Invalid credentials"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let transport = ScriptedTransport::new().on(Method::Get, "/users", 500, "boom");
        let client = ApiClient::new(transport);

        let err = client.list_users().await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn revision_by_result_maps_404_to_none() {
        let transport =
            ScriptedTransport::new().on(Method::Get, "/api/revision/by_result_id/3", 404, "{}");
        let client = ApiClient::new(transport);

        assert_eq!(client.revision_by_result(3).await.unwrap(), None);
    }

    #[tokio::test]
    async fn inverted_revision_is_rejected_before_sending() {
        let client = ApiClient::new(ScriptedTransport::new());
        let mut draft = RevisionDraft::for_result(1);
        draft.start_time = ClockSeconds::new(3600).unwrap();
        draft.end_time = ClockSeconds::new(1800).unwrap();
        draft.diagnosis = "stable".into();

        let err = client.create_revision(&draft).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Core(CardioError::InvalidTimeRange { .. })
        ));
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn revision_times_go_out_as_clock_strings() {
        let transport = ScriptedTransport::new().on(
            Method::Post,
            "/revisions",
            200,
            r#"{"id":8,"results_id":1,"start_time":"09:00:00","end_time":"09:30:00",
                "diagnosis":"stable","key_factors":"","patient_status":"LEVE",
                "date_created":"2024-05-01T10:00:00Z"}"#,
        );
        let client = ApiClient::new(transport);
        let mut draft = RevisionDraft::for_result(1);
        draft.start_time = ClockSeconds::new(9 * 3600).unwrap();
        draft.end_time = ClockSeconds::new(9 * 3600 + 1800).unwrap();
        draft.diagnosis = "stable".into();

        let created = client.create_revision(&draft).await.unwrap();
        assert_eq!(created.id, 8);

        let body = client.transport().requests()[0].body.clone().unwrap();
        assert_eq!(body["start_time"], "09:00:00");
        assert_eq!(body["end_time"], "09:30:00");
    }

    #[tokio::test]
    async fn kpi_accepts_null() {
        let transport = ScriptedTransport::new()
            .on(Method::Get, "/kpi/diagnosis-accuracy-rate/", 200, "null")
            .on(Method::Get, "/kpi/severe-case-reduction-rate/", 200, "42.5");
        let client = ApiClient::new(transport);

        assert_eq!(client.kpi(KpiKind::DiagnosisAccuracy).await.unwrap(), None);
        assert_eq!(
            client.kpi(KpiKind::SevereCaseReduction).await.unwrap(),
            Some(42.5)
        );
    }

    fn reviewed_draft() -> RevisionDraft {
        let mut draft = RevisionDraft::for_result(5);
        draft.start_time = ClockSeconds::new(10 * 3600).unwrap();
        draft.end_time = ClockSeconds::new(10 * 3600 + 900).unwrap();
        draft.diagnosis = "follow up".into();
        draft
    }

    #[tokio::test]
    async fn review_flow_saves_and_updates_under_api_revision() {
        let transport = ScriptedTransport::new()
            .on(Method::Post, "/api/revision/save", 201, r#"{"message":"saved"}"#)
            .on(Method::Put, "/api/revision/update/4", 200, "");
        let client = ApiClient::new(transport);

        client.save_revision(&reviewed_draft()).await.unwrap();
        client.update_saved_revision(4, &reviewed_draft()).await.unwrap();

        assert_eq!(
            client.transport().calls(),
            vec!["POST /api/revision/save", "PUT /api/revision/update/4"]
        );
        let body = client.transport().requests()[0].body.clone().unwrap();
        assert_eq!(body["results_id"], 5);
        assert_eq!(body["start_time"], "10:00:00");
        assert_eq!(body["patient_status"], "LEVE");
    }

    #[tokio::test]
    async fn review_flow_rejects_inverted_times_before_sending() {
        let client = ApiClient::new(ScriptedTransport::new());
        let mut draft = reviewed_draft();
        draft.end_time = ClockSeconds::new(9 * 3600).unwrap();

        let err = client.update_saved_revision(4, &draft).await.unwrap_err();
        assert!(matches!(err, ApiError::Core(CardioError::InvalidTimeRange { .. })));
        assert!(client.transport().calls().is_empty());
    }
}
