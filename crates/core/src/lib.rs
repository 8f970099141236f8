//! # Cardio Core
//!
//! Core logic for the cardiovascular-risk tracking client.
//!
//! This crate contains pure data operations and local persistence:
//! - Categorical mappers (age category, sex code, KPI tiers)
//! - The `HH:mm:ss` clock codec used by revisions
//! - The local session cache and chat history, over a key-value store
//! - Form validation and the API's wire models
//!
//! **No network concerns**: HTTP calls, the list-refresh repositories and the assistant
//! belong in `cardio-api`.

pub mod categories;
pub mod chat;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod filter;
pub mod kpi;
pub mod models;
pub mod prediction;
pub mod revision;
pub mod role;
pub mod session;
pub mod storage;
pub mod validation;

pub use cardio_types::{Dni, EmailAddress, NonEmptyText, TextError};
pub use categories::{age_to_bracket, sex_to_code, AgeBracket, SexCode};
pub use clock::{clock_to_seconds, seconds_to_clock, seconds_to_clock_12h, ClockSeconds};
pub use config::CoreConfig;
pub use error::{CardioError, CardioResult};
pub use kpi::{classify_kpi, KpiKind, KpiReading, KpiTier};
pub use revision::{PatientStatus, Revision, RevisionDraft};
pub use role::Role;
pub use session::{Session, SessionContext, SessionStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
