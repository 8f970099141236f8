//! Role-gated landing view.

use crate::transport::HttpTransport;
use crate::{ApiClient, ApiResult};
use cardio_core::models::{Client, HistoryEntry, User};
use cardio_core::{Role, SessionContext};

/// What the signed-in user sees first.
#[derive(Debug, Clone, PartialEq)]
pub enum HomeView {
    /// Admins manage accounts.
    Users(Vec<User>),
    /// Doctors pick a client to review.
    Clients(Vec<Client>),
    /// Patients see their own consultations.
    History(Vec<HistoryEntry>),
}

impl HomeView {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Users(_) => "Users",
            Self::Clients(_) => "Clients",
            Self::History(_) => "My consultations",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Users(v) => v.len(),
            Self::Clients(v) => v.len(),
            Self::History(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Loads the home view for the active session.
///
/// Fails with `NoActiveSession` when nobody is logged in.
pub async fn load<T: HttpTransport>(
    ctx: &SessionContext,
    client: &ApiClient<T>,
) -> ApiResult<HomeView> {
    let session = ctx.require()?;
    let view = match session.role {
        Role::Admin => HomeView::Users(client.list_users().await?),
        Role::Medico => HomeView::Clients(client.list_clients().await?),
        Role::Paciente => HomeView::History(client.history(session.user_id).await?),
    };
    tracing::debug!("Home view for {}: {} rows", session.role, view.len());
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use crate::transport::Method;
    use crate::ApiError;
    use cardio_core::{CardioError, Session};

    fn ctx(role: Role) -> SessionContext {
        SessionContext::new(Some(Session {
            user_id: 7,
            username: "u".into(),
            role,
        }))
    }

    fn client() -> ApiClient<ScriptedTransport> {
        ApiClient::new(
            ScriptedTransport::new()
                .on(Method::Get, "/users", 200, "[]")
                .on(Method::Get, "/clients", 200, r#"[{"id":1}]"#)
                .on(Method::Get, "/historial/7", 200, "[]"),
        )
    }

    #[tokio::test]
    async fn each_role_gets_its_view() {
        let c = client();
        assert!(matches!(load(&ctx(Role::Admin), &c).await.unwrap(), HomeView::Users(_)));
        assert!(matches!(load(&ctx(Role::Medico), &c).await.unwrap(), HomeView::Clients(v) if v.len() == 1));
        assert!(matches!(load(&ctx(Role::Paciente), &c).await.unwrap(), HomeView::History(_)));
        assert_eq!(
            c.transport().calls(),
            vec!["GET /users", "GET /clients", "GET /historial/7"]
        );
    }

    #[tokio::test]
    async fn no_session_no_requests() {
        let c = client();
        let err = load(&SessionContext::default(), &c).await.unwrap_err();
        assert!(matches!(err, ApiError::Core(CardioError::NoActiveSession)));
        assert!(c.transport().calls().is_empty());
    }
}
