// Live telemetry domain models
use super::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Stability above this value is reported as healthy.
pub const HEALTHY_STABILITY_THRESHOLD: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenewableGeneration {
    pub solar: f64,
    pub wind: f64,
}

impl RenewableGeneration {
    pub fn total(&self) -> f64 {
        self.solar + self.wind
    }
}

/// One validated reading from the live feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySample {
    pub timestamp: String,
    pub total_load: f64,
    pub renewable_generation: RenewableGeneration,
    pub grid_stability: f64,
}

/// Wire shape of a sample before validation. Every field is optional so that
/// a missing field is reported as such instead of as a generic parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTelemetrySample {
    pub timestamp: Option<String>,
    pub total_load: Option<f64>,
    pub renewable_generation: Option<RawRenewableGeneration>,
    pub grid_stability: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRenewableGeneration {
    pub solar: Option<f64>,
    pub wind: Option<f64>,
}

impl TelemetrySample {
    /// Parse and validate one inbound message.
    pub fn from_json(payload: &str) -> Result<Self, ValidationError> {
        let raw: RawTelemetrySample =
            serde_json::from_str(payload).map_err(|e| ValidationError::Json(e.to_string()))?;
        Self::try_from(raw)
    }

    /// Renewable share and the clamped non-renewable remainder.
    pub fn energy_mix(&self) -> EnergyMix {
        let renewable = self.renewable_generation.total();
        EnergyMix {
            renewable,
            non_renewable: (self.total_load - renewable).max(0.0),
        }
    }

    pub fn stability_health(&self) -> StabilityHealth {
        StabilityHealth::from_stability(self.grid_stability)
    }
}

impl TryFrom<RawTelemetrySample> for TelemetrySample {
    type Error = ValidationError;

    fn try_from(raw: RawTelemetrySample) -> Result<Self, Self::Error> {
        let timestamp = raw
            .timestamp
            .ok_or(ValidationError::MissingField("timestamp"))?;
        let total_load = finite("total_load", raw.total_load)?;
        let generation = raw
            .renewable_generation
            .ok_or(ValidationError::MissingField("renewable_generation"))?;
        let solar = finite("renewable_generation.solar", generation.solar)?;
        let wind = finite("renewable_generation.wind", generation.wind)?;
        let grid_stability = finite("grid_stability", raw.grid_stability)?;

        Ok(Self {
            timestamp,
            total_load,
            renewable_generation: RenewableGeneration { solar, wind },
            grid_stability,
        })
    }
}

pub(crate) fn finite(field: &'static str, value: Option<f64>) -> Result<f64, ValidationError> {
    match value {
        None => Err(ValidationError::MissingField(field)),
        Some(v) if !v.is_finite() => Err(ValidationError::NonFinite { field }),
        Some(v) => Ok(v),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyMix {
    pub renewable: f64,
    pub non_renewable: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityHealth {
    Healthy,
    Degraded,
}

impl StabilityHealth {
    pub fn from_stability(grid_stability: f64) -> Self {
        if grid_stability > HEALTHY_STABILITY_THRESHOLD {
            StabilityHealth::Healthy
        } else {
            StabilityHealth::Degraded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_sample() {
        let sample = TelemetrySample::from_json(
            r#"{"timestamp":"T1","total_load":100,"renewable_generation":{"solar":30,"wind":20},"grid_stability":0.95}"#,
        )
        .unwrap();

        assert_eq!(sample.timestamp, "T1");
        assert_eq!(sample.total_load, 100.0);
        assert_eq!(sample.renewable_generation.total(), 50.0);
        assert_eq!(sample.energy_mix().non_renewable, 50.0);
        assert_eq!(sample.stability_health(), StabilityHealth::Healthy);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let err = TelemetrySample::from_json(
            r#"{"timestamp":"T1","total_load":100,"renewable_generation":{"solar":30,"wind":20}}"#,
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("grid_stability"));

        let err = TelemetrySample::from_json(
            r#"{"timestamp":"T1","total_load":100,"renewable_generation":{"solar":30},"grid_stability":0.5}"#,
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("renewable_generation.wind"));
    }

    #[test]
    fn test_non_finite_field_is_rejected() {
        let raw = RawTelemetrySample {
            timestamp: Some("T1".to_string()),
            total_load: Some(f64::NAN),
            renewable_generation: Some(RawRenewableGeneration {
                solar: Some(1.0),
                wind: Some(1.0),
            }),
            grid_stability: Some(0.5),
        };
        assert_eq!(
            TelemetrySample::try_from(raw).unwrap_err(),
            ValidationError::NonFinite { field: "total_load" }
        );
    }

    #[test]
    fn test_garbage_payload_is_rejected() {
        assert!(matches!(
            TelemetrySample::from_json("not json"),
            Err(ValidationError::Json(_))
        ));
        assert!(matches!(
            TelemetrySample::from_json(r#"{"total_load":"high"}"#),
            Err(ValidationError::Json(_))
        ));
    }

    #[test]
    fn test_non_renewable_share_is_clamped() {
        let sample = TelemetrySample {
            timestamp: "T2".to_string(),
            total_load: 40.0,
            renewable_generation: RenewableGeneration {
                solar: 30.0,
                wind: 25.0,
            },
            grid_stability: 0.5,
        };
        let mix = sample.energy_mix();
        assert_eq!(mix.renewable, 55.0);
        assert_eq!(mix.non_renewable, 0.0);
        assert_eq!(sample.stability_health(), StabilityHealth::Degraded);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert_eq!(StabilityHealth::from_stability(0.9), StabilityHealth::Degraded);
        assert_eq!(StabilityHealth::from_stability(0.9001), StabilityHealth::Healthy);
    }
}
