//! # Cardio API
//!
//! Network side of the risk-tracking client:
//! - [`ApiClient`] over the [`HttpTransport`] seam (reqwest in production)
//! - list-refresh repositories that re-fetch after every mutation
//! - the role-gated home view and KPI report
//! - the generative chat assistant

pub mod assistant;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod home;
pub mod reports;
pub mod repositories;
pub mod transport;

#[cfg(test)]
mod testing;

pub use assistant::{Assistant, AssistantConfig, AssistantReply};
pub use client::{ApiClient, CountKind};
pub use error::{ApiError, ApiResult};
pub use home::HomeView;
pub use reports::KpiReport;
pub use repositories::{EntityApi, ListRefresh, RevisionsApi, UsersApi};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
