//! KPI dashboard data.

use crate::client::CountKind;
use crate::transport::HttpTransport;
use crate::{ApiClient, ApiResult};
use cardio_core::models::Counts;
use cardio_core::{KpiKind, KpiReading};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct KpiReport {
    pub readings: Vec<KpiReading>,
    pub counts: Counts,
    /// Whether counts were requested; failed counts still render as `-`.
    pub with_counts: bool,
}

/// Fetches the three KPIs and, when `with_counts`, the aggregate counters.
///
/// A failed fetch is logged and shows up as a missing value rather than failing the report.
pub async fn fetch<T: HttpTransport>(client: &ApiClient<T>, with_counts: bool) -> KpiReport {
    let (accuracy, severe, time) = tokio::join!(
        fetch_kpi(client, KpiKind::DiagnosisAccuracy),
        fetch_kpi(client, KpiKind::SevereCaseReduction),
        fetch_kpi(client, KpiKind::DiagnosisTimeReduction),
    );

    let counts = if with_counts {
        let (users, doctors, patients_detected) = tokio::join!(
            fetch_count(client, CountKind::Users),
            fetch_count(client, CountKind::Doctors),
            fetch_count(client, CountKind::PatientsDetected),
        );
        Counts {
            users,
            doctors,
            patients_detected,
        }
    } else {
        Counts::default()
    };

    KpiReport {
        readings: vec![accuracy, severe, time],
        counts,
        with_counts,
    }
}

async fn fetch_kpi<T: HttpTransport>(client: &ApiClient<T>, kind: KpiKind) -> KpiReading {
    let value = log_failure(kind.label(), client.kpi(kind).await).flatten();
    KpiReading::new(kind, value)
}

async fn fetch_count<T: HttpTransport>(client: &ApiClient<T>, kind: CountKind) -> Option<u64> {
    log_failure(&format!("{kind:?} count"), client.count(kind).await)
}

fn log_failure<V>(what: &str, result: ApiResult<V>) -> Option<V> {
    match result {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::error!("Error fetching {what}: {err}");
            None
        }
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for reading in &self.readings {
            writeln!(f, "{reading}")?;
        }
        let show = |v: Option<u64>| v.map_or_else(|| "-".to_string(), |n| n.to_string());
        if self.with_counts {
            writeln!(f, "Users: {}", show(self.counts.users))?;
            writeln!(f, "Doctors: {}", show(self.counts.doctors))?;
            writeln!(f, "Patients detected: {}", show(self.counts.patients_detected))?;
        }
        Ok(())
    }
}
