//! Settings loading and normalization.
//!
//! Everything that can make a calculation ambiguous is rejected here, before any period is
//! computed. Rates leave this module as [`Rate`] values in basis points; the engines never see
//! the configured unit.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::fiscal::{DeadlineSchedule, Rate};

pub const DEFAULT_TREASURY_BUFFER_CENTS: i64 = 30_000;
pub const DEFAULT_ALERT_DAYS: u32 = 7;
pub const DEFAULT_VAT_RATE: Rate = Rate::from_basis_points(2_000);
pub const DEFAULT_URSSAF_RATE: Rate = Rate::from_basis_points(2_200);
/// Highest day-of-month every month has.
pub const MAX_DEADLINE_DAY: u32 = 28;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RateUnit {
    Percent,
    BasisPoints,
    Ppm,
}

/// A configured rate. Only the tagged form is accepted; a bare number is kept so it can be
/// reported instead of guessed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RateSetting {
    Tagged { value: f64, unit: RateUnit },
    Bare(f64),
}

impl RateSetting {
    pub fn percent(value: f64) -> Self {
        RateSetting::Tagged {
            value,
            unit: RateUnit::Percent,
        }
    }

    fn resolve(&self, field: &str) -> Result<Rate, ConfigError> {
        let (value, unit) = match *self {
            RateSetting::Tagged { value, unit } => (value, unit),
            RateSetting::Bare(_) => {
                return Err(ConfigError::AmbiguousRateUnit {
                    field: field.to_string(),
                })
            }
        };
        let lossy = || ConfigError::LossyRate {
            field: field.to_string(),
            value: format!("{value} {unit:?}"),
        };
        match unit {
            RateUnit::Percent => Rate::from_percent_exact(value).ok_or_else(lossy),
            RateUnit::BasisPoints => whole(value)
                .map(Rate::from_basis_points)
                .ok_or_else(lossy),
            RateUnit::Ppm => whole(value)
                .and_then(Rate::from_ppm_exact)
                .ok_or_else(lossy),
        }
    }
}

fn whole(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64)
        .then_some(value as i64)
}

/// Settings as stored by the host application. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_vat_rate: Option<RateSetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_vat_rate_ppm: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urssaf_rate: Option<RateSetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urssaf_rate_ppm: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treasury_buffer_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_days_before_deadline: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_declaration_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_payment_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urssaf_payment_day: Option<u32>,
}

/// Validated settings consumed by the engines and services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub default_vat_rate: Rate,
    pub urssaf_rate: Rate,
    pub treasury_buffer_cents: i64,
    pub alert_days_before_deadline: u32,
    pub schedule: DeadlineSchedule,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_vat_rate: DEFAULT_VAT_RATE,
            urssaf_rate: DEFAULT_URSSAF_RATE,
            treasury_buffer_cents: DEFAULT_TREASURY_BUFFER_CENTS,
            alert_days_before_deadline: DEFAULT_ALERT_DAYS,
            schedule: DeadlineSchedule::default(),
        }
    }
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        Self::from_raw(&raw)
    }

    pub fn from_raw(raw: &RawSettings) -> Result<Self, ConfigError> {
        let defaults = DeadlineSchedule::default();
        let settings = Self {
            default_vat_rate: resolve_rate(
                "default_vat_rate",
                raw.default_vat_rate.as_ref(),
                raw.default_vat_rate_ppm,
                DEFAULT_VAT_RATE,
            )?,
            urssaf_rate: resolve_rate(
                "urssaf_rate",
                raw.urssaf_rate.as_ref(),
                raw.urssaf_rate_ppm,
                DEFAULT_URSSAF_RATE,
            )?,
            treasury_buffer_cents: treasury_buffer(raw.treasury_buffer_cents)?,
            alert_days_before_deadline: raw
                .alert_days_before_deadline
                .unwrap_or(DEFAULT_ALERT_DAYS),
            schedule: DeadlineSchedule {
                vat_declaration_day: deadline_day(
                    "vat_declaration_day",
                    raw.vat_declaration_day,
                    defaults.vat_declaration_day,
                )?,
                vat_payment_day: deadline_day(
                    "vat_payment_day",
                    raw.vat_payment_day,
                    defaults.vat_payment_day,
                )?,
                urssaf_payment_day: deadline_day(
                    "urssaf_payment_day",
                    raw.urssaf_payment_day,
                    defaults.urssaf_payment_day,
                )?,
            },
        };
        tracing::debug!(
            vat = %settings.default_vat_rate,
            urssaf = %settings.urssaf_rate,
            buffer = settings.treasury_buffer_cents,
            "settings loaded"
        );
        Ok(settings)
    }

    /// Stored form, with rates written in basis points so reloading is lossless.
    pub fn to_raw(&self) -> RawSettings {
        let bp = |rate: Rate| RateSetting::Tagged {
            value: rate.basis_points() as f64,
            unit: RateUnit::BasisPoints,
        };
        RawSettings {
            default_vat_rate: Some(bp(self.default_vat_rate)),
            default_vat_rate_ppm: None,
            urssaf_rate: Some(bp(self.urssaf_rate)),
            urssaf_rate_ppm: None,
            treasury_buffer_cents: Some(self.treasury_buffer_cents),
            alert_days_before_deadline: Some(self.alert_days_before_deadline),
            vat_declaration_day: Some(self.schedule.vat_declaration_day),
            vat_payment_day: Some(self.schedule.vat_payment_day),
            urssaf_payment_day: Some(self.schedule.urssaf_payment_day),
        }
    }
}

fn resolve_rate(
    field: &str,
    setting: Option<&RateSetting>,
    legacy_ppm: Option<i64>,
    default: Rate,
) -> Result<Rate, ConfigError> {
    let tagged = setting.map(|s| s.resolve(field)).transpose()?;
    let legacy = legacy_ppm
        .map(|ppm| {
            Rate::from_ppm_exact(ppm).ok_or_else(|| ConfigError::LossyRate {
                field: format!("{field}_ppm"),
                value: ppm.to_string(),
            })
        })
        .transpose()?;

    let rate = match (tagged, legacy) {
        (Some(a), Some(b)) if a != b => {
            return Err(ConfigError::ConflictingRates {
                field: field.to_string(),
            })
        }
        (Some(rate), _) | (None, Some(rate)) => rate,
        (None, None) => default,
    };
    if !rate.is_within_bounds() {
        return Err(ConfigError::RateOutOfRange {
            field: field.to_string(),
            basis_points: rate.basis_points(),
        });
    }
    Ok(rate)
}

fn treasury_buffer(value: Option<i64>) -> Result<i64, ConfigError> {
    match value.unwrap_or(DEFAULT_TREASURY_BUFFER_CENTS) {
        cents if cents < 0 => Err(ConfigError::NegativeBuffer { cents }),
        cents => Ok(cents),
    }
}

fn deadline_day(field: &str, value: Option<u32>, default: u32) -> Result<u32, ConfigError> {
    let day = value.unwrap_or(default);
    if (1..=MAX_DEADLINE_DAY).contains(&day) {
        Ok(day)
    } else {
        Err(ConfigError::InvalidDay {
            field: field.to_string(),
            day,
        })
    }
}
