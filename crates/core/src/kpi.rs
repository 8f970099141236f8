//! KPI tier classification.
//!
//! Three reporting KPIs, each with its own hand-tuned green/yellow/red cut points. The
//! tables are independent: kind 3 treats 60 as green while kind 1 treats 60 as yellow.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three tracked KPIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KpiKind {
    /// KPI 1: diagnosis accuracy rate.
    DiagnosisAccuracy,
    /// KPI 2: severe case reduction rate.
    SevereCaseReduction,
    /// KPI 3: diagnosis time reduction rate.
    DiagnosisTimeReduction,
}

impl KpiKind {
    pub const ALL: [KpiKind; 3] = [
        KpiKind::DiagnosisAccuracy,
        KpiKind::SevereCaseReduction,
        KpiKind::DiagnosisTimeReduction,
    ];

    /// Legacy numbering (1, 2, 3).
    pub fn number(self) -> u8 {
        match self {
            Self::DiagnosisAccuracy => 1,
            Self::SevereCaseReduction => 2,
            Self::DiagnosisTimeReduction => 3,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::DiagnosisAccuracy),
            2 => Some(Self::SevereCaseReduction),
            3 => Some(Self::DiagnosisTimeReduction),
            _ => None,
        }
    }

    /// Path segment under `/kpi/`.
    pub fn metric(self) -> &'static str {
        match self {
            Self::DiagnosisAccuracy => "diagnosis-accuracy-rate",
            Self::SevereCaseReduction => "severe-case-reduction-rate",
            Self::DiagnosisTimeReduction => "diagnosis-time-reduction-rate",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DiagnosisAccuracy => "Diagnosis Accuracy Rate",
            Self::SevereCaseReduction => "Severe Case Reduction Rate",
            Self::DiagnosisTimeReduction => "Diagnosis Time Reduction Rate",
        }
    }
}

/// Traffic-light tier for a KPI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiTier {
    Green,
    Yellow,
    Red,
    /// No value was available.
    Unknown,
}

impl KpiTier {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Green => "🟢",
            Self::Yellow => "🟡",
            Self::Red => "🔴",
            Self::Unknown => "⚪️",
        }
    }
}

impl fmt::Display for KpiTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// Classify a KPI percentage against its fixed threshold table.
pub fn classify_kpi(value: Option<f64>, kind: KpiKind) -> KpiTier {
    let Some(value) = value else {
        return KpiTier::Unknown;
    };

    match kind {
        KpiKind::DiagnosisAccuracy => {
            if value > 60.0 {
                KpiTier::Green
            } else if (40.0..=60.0).contains(&value) {
                KpiTier::Yellow
            } else {
                KpiTier::Red
            }
        }
        KpiKind::SevereCaseReduction => {
            if value > 50.0 {
                KpiTier::Green
            } else if (20.0..=50.0).contains(&value) {
                KpiTier::Yellow
            } else {
                KpiTier::Red
            }
        }
        KpiKind::DiagnosisTimeReduction => {
            if value >= 60.0 {
                KpiTier::Green
            } else if (20.0..60.0).contains(&value) {
                KpiTier::Yellow
            } else {
                KpiTier::Red
            }
        }
    }
}

/// One rendered KPI line: value plus tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiReading {
    pub kind: KpiKind,
    pub value: Option<f64>,
    pub tier: KpiTier,
}

impl KpiReading {
    pub fn new(kind: KpiKind, value: Option<f64>) -> Self {
        Self {
            kind,
            value,
            tier: classify_kpi(value, kind),
        }
    }
}

impl fmt::Display for KpiReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(value) => write!(f, "{}: {}% {}", self.kind.label(), value, self.tier),
            None => write!(f, "{}: - {}", self.kind.label(), self.tier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use KpiKind::*;
    use KpiTier::*;

    #[test]
    fn diagnosis_accuracy_table() {
        assert_eq!(classify_kpi(Some(61.0), DiagnosisAccuracy), Green);
        assert_eq!(classify_kpi(Some(60.0), DiagnosisAccuracy), Yellow);
        assert_eq!(classify_kpi(Some(40.0), DiagnosisAccuracy), Yellow);
        assert_eq!(classify_kpi(Some(39.0), DiagnosisAccuracy), Red);
        assert_eq!(classify_kpi(None, DiagnosisAccuracy), Unknown);
    }

    #[test]
    fn severe_case_reduction_table() {
        assert_eq!(classify_kpi(Some(50.5), SevereCaseReduction), Green);
        assert_eq!(classify_kpi(Some(50.0), SevereCaseReduction), Yellow);
        assert_eq!(classify_kpi(Some(20.0), SevereCaseReduction), Yellow);
        assert_eq!(classify_kpi(Some(19.9), SevereCaseReduction), Red);
    }

    #[test]
    fn diagnosis_time_reduction_table() {
        assert_eq!(classify_kpi(Some(60.0), DiagnosisTimeReduction), Green);
        assert_eq!(classify_kpi(Some(59.9), DiagnosisTimeReduction), Yellow);
        assert_eq!(classify_kpi(Some(20.0), DiagnosisTimeReduction), Yellow);
        assert_eq!(classify_kpi(Some(19.0), DiagnosisTimeReduction), Red);
    }

    #[test]
    fn green_boundary_differs_between_kinds() {
        assert_eq!(classify_kpi(Some(60.0), DiagnosisTimeReduction), Green);
        assert_eq!(classify_kpi(Some(60.0), DiagnosisAccuracy), Yellow);
    }

    #[test]
    fn legacy_numbers_round_trip() {
        for kind in KpiKind::ALL {
            assert_eq!(KpiKind::from_number(kind.number()), Some(kind));
        }
        assert_eq!(KpiKind::from_number(4), None);
    }

    #[test]
    fn reading_display() {
        let reading = KpiReading::new(DiagnosisAccuracy, Some(72.5));
        assert_eq!(reading.to_string(), "Diagnosis Accuracy Rate: 72.5% 🟢");
        let missing = KpiReading::new(SevereCaseReduction, None);
        assert_eq!(missing.to_string(), "Severe Case Reduction Rate: - ⚪️");
    }
}
