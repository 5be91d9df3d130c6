// Aggregate audit domain models
use super::error::ValidationError;
use super::telemetry::finite;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditSnapshot {
    pub total_consumption_24h: f64,
    pub peak_demand: f64,
    pub renewable_percentage: f64,
    pub efficiency_score: f64,
    pub optimization_suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAuditSnapshot {
    pub total_consumption_24h: Option<f64>,
    pub peak_demand: Option<f64>,
    pub renewable_percentage: Option<f64>,
    pub efficiency_score: Option<f64>,
    pub optimization_suggestions: Option<Vec<String>>,
}

impl AuditSnapshot {
    pub fn from_value(value: serde_json::Value) -> Result<Self, ValidationError> {
        let raw: RawAuditSnapshot =
            serde_json::from_value(value).map_err(|e| ValidationError::Json(e.to_string()))?;
        Self::try_from(raw)
    }

    /// Suggestions tagged with the kind implied by their rank.
    pub fn ranked_suggestions(&self) -> Vec<Suggestion> {
        self.optimization_suggestions
            .iter()
            .enumerate()
            .map(|(rank, text)| Suggestion {
                kind: SuggestionKind::for_rank(rank),
                text: text.clone(),
            })
            .collect()
    }
}

impl TryFrom<RawAuditSnapshot> for AuditSnapshot {
    type Error = ValidationError;

    fn try_from(raw: RawAuditSnapshot) -> Result<Self, Self::Error> {
        let total_consumption_24h = non_negative(
            "total_consumption_24h",
            finite("total_consumption_24h", raw.total_consumption_24h)?,
        )?;
        let peak_demand = non_negative("peak_demand", finite("peak_demand", raw.peak_demand)?)?;
        let renewable_percentage = in_range(
            "renewable_percentage",
            finite("renewable_percentage", raw.renewable_percentage)?,
            0.0,
            100.0,
        )?;
        let efficiency_score = in_range(
            "efficiency_score",
            finite("efficiency_score", raw.efficiency_score)?,
            0.0,
            1.0,
        )?;
        let optimization_suggestions = raw
            .optimization_suggestions
            .ok_or(ValidationError::MissingField("optimization_suggestions"))?;

        Ok(Self {
            total_consumption_24h,
            peak_demand,
            renewable_percentage,
            efficiency_score,
            optimization_suggestions,
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    in_range(field, value, 0.0, f64::MAX)
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

/// The latest applied audit together with when and by which fetch it arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub snapshot: AuditSnapshot,
    pub fetched_at: DateTime<Utc>,
    pub sequence: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Insight,
    Trend,
    Warning,
}

impl SuggestionKind {
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            0 => SuggestionKind::Insight,
            1 => SuggestionKind::Trend,
            _ => SuggestionKind::Warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> serde_json::Value {
        json!({
            "total_consumption_24h": 2400.5,
            "peak_demand": 180.0,
            "renewable_percentage": 42.0,
            "efficiency_score": 0.87,
            "optimization_suggestions": ["Shift load", "Solar rising", "Check feeder 3", "Cap peak"]
        })
    }

    #[test]
    fn test_parse_valid_audit() {
        let audit = AuditSnapshot::from_value(valid()).unwrap();
        assert_eq!(audit.peak_demand, 180.0);
        assert_eq!(audit.optimization_suggestions.len(), 4);
    }

    #[test]
    fn test_suggestion_kinds_follow_rank() {
        let audit = AuditSnapshot::from_value(valid()).unwrap();
        let kinds: Vec<SuggestionKind> = audit.ranked_suggestions().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SuggestionKind::Insight,
                SuggestionKind::Trend,
                SuggestionKind::Warning,
                SuggestionKind::Warning
            ]
        );
    }

    #[test]
    fn test_out_of_range_fields_are_rejected() {
        let mut value = valid();
        value["renewable_percentage"] = json!(140.0);
        assert!(matches!(
            AuditSnapshot::from_value(value),
            Err(ValidationError::OutOfRange { field: "renewable_percentage", .. })
        ));

        let mut value = valid();
        value["efficiency_score"] = json!(1.5);
        assert!(matches!(
            AuditSnapshot::from_value(value),
            Err(ValidationError::OutOfRange { field: "efficiency_score", .. })
        ));

        let mut value = valid();
        value["peak_demand"] = json!(-1.0);
        assert!(matches!(
            AuditSnapshot::from_value(value),
            Err(ValidationError::OutOfRange { field: "peak_demand", .. })
        ));
    }

    #[test]
    fn test_missing_suggestions_are_rejected() {
        let mut value = valid();
        value.as_object_mut().unwrap().remove("optimization_suggestions");
        assert_eq!(
            AuditSnapshot::from_value(value).unwrap_err(),
            ValidationError::MissingField("optimization_suggestions")
        );
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(matches!(
            AuditSnapshot::from_value(json!([1, 2, 3])),
            Err(ValidationError::Json(_))
        ));
    }
}
