//! Value normalization
//!
//! Pure presentation-layer helpers turning raw property values plus their
//! unit/resolution metadata into human-interpretable values, and mapping
//! host write keys back onto protocol property identifiers. Nothing here is
//! cached; the tree holds the authoritative latest value and normalization
//! is recomputed on every read.

use crate::error::{MirrorError, Result};
use crate::model::StatusFlags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places implied by a resolution/covIncrement hint.
///
/// `ceil(-log10(step))` for `step > 0`. Callers truncate instead of calling
/// this for hints `>= 1`.
pub fn decimal_places(step: f64) -> Result<u32> {
    if step <= 0.0 {
        return Err(MirrorError::invalid_argument(format!(
            "resolution must be greater than 0, got {step}"
        )));
    }
    Ok((-step.log10()).ceil().max(0.0) as u32)
}

/// Round a numeric present value according to its resolution hint.
///
/// A hint `>= 1` truncates to an integer, a hint `< 1` rounds to the
/// precision it implies, and no hint defaults to one decimal place.
pub fn round_value(value: f64, step: Option<f64>) -> f64 {
    match step {
        Some(step) if step >= 1.0 => value.trunc(),
        Some(step) => {
            let places = decimal_places(step).unwrap_or(1);
            let factor = 10f64.powi(places as i32);
            (value * factor).round() / factor
        }
        None => (value * 10.0).round() / 10.0,
    }
}

/// Decoded multi-state value: the state text when the 1-indexed lookup is
/// in bounds, the raw integer otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateLabel {
    Named(String),
    Raw(i64),
}

impl fmt::Display for StateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateLabel::Named(s) => f.write_str(s),
            StateLabel::Raw(n) => write!(f, "{n}"),
        }
    }
}

/// Decode a multi-state present value against its state text.
///
/// Protocol multi-state values are 1-indexed. An absent or empty state-text
/// sequence yields the raw integer; an out-of-bounds index is a data-quality
/// condition and also falls back to the raw integer, with a warning.
pub fn decode_multi_state(value: i64, state_text: &[String]) -> StateLabel {
    if state_text.is_empty() {
        return StateLabel::Raw(value);
    }
    match usize::try_from(value - 1)
        .ok()
        .and_then(|idx| state_text.get(idx))
    {
        Some(text) => StateLabel::Named(text.clone()),
        None => {
            tracing::warn!(
                value,
                states = state_text.len(),
                "Multi-state present value outside stateText bounds"
            );
            StateLabel::Raw(value)
        }
    }
}

/// Decode a binary present value from its wire representation.
///
/// Accepts the enumerated strings `"active"`/`"1"` and `"inactive"`/`"0"`,
/// integers (1 is active, everything else inactive) and booleans. Anything
/// else yields `None` with a diagnostic.
pub fn decode_binary_present_value(raw: &serde_json::Value) -> Option<bool> {
    match raw {
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::Number(n) => Some(n.as_i64() == Some(1)),
        serde_json::Value::String(s) => match s.as_str() {
            "active" | "1" => Some(true),
            "inactive" | "0" => Some(false),
            other => {
                tracing::debug!(value = other, "Unrecognized binary present value");
                None
            }
        },
        other => {
            tracing::debug!(?other, "Binary present value has no boolean representation");
            None
        }
    }
}

/// Positional decode of the protocol's 4-bit status-flags vector
pub fn decode_status_flags(bits: &[u8]) -> StatusFlags {
    StatusFlags::from_bits(bits)
}

/// A normalized, presentation-ready value derived from one object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayValue {
    /// Rounded numeric reading with its mapped display unit
    Numeric {
        value: f64,
        unit: Option<crate::units::DisplayUnit>,
    },
    /// Enumerated binary state
    Binary(bool),
    /// Decoded multi-state text (or the raw integer)
    State(StateLabel),
    /// Value the object's declared type could not explain, shown raw
    Raw(serde_json::Value),
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Numeric {
                value,
                unit: Some(unit),
            } => write!(f, "{value} {unit}"),
            DisplayValue::Numeric { value, unit: None } => write!(f, "{value}"),
            DisplayValue::Binary(true) => f.write_str("active"),
            DisplayValue::Binary(false) => f.write_str("inactive"),
            DisplayValue::State(label) => label.fmt(f),
            DisplayValue::Raw(v) => write!(f, "{v}"),
        }
    }
}

/// Derive the presentation value for an object from its present value and
/// unit/resolution/stateText metadata. Recomputed on every read; the tree
/// holds the authoritative raw value.
pub fn display_value(entry: &crate::model::ObjectEntry) -> DisplayValue {
    use crate::model::PresentValue;
    match &entry.present_value {
        PresentValue::Numeric(n) => DisplayValue::Numeric {
            value: round_value(*n, entry.resolution.or(entry.cov_increment)),
            unit: entry.units.as_deref().and_then(crate::units::map_unit),
        },
        PresentValue::Binary(active) => DisplayValue::Binary(*active),
        PresentValue::MultiState(n) => DisplayValue::State(decode_multi_state(
            *n,
            entry.state_text.as_deref().unwrap_or(&[]),
        )),
        PresentValue::Unknown(raw) => DisplayValue::Raw(raw.clone()),
    }
}

/// Protocol property a host write key resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKey {
    PresentValue,
    RelinquishDefault,
}

impl PropertyKey {
    /// Resolve a host write key through the fixed vocabulary. Unrecognized
    /// keys resolve to `None`, which forwards unset and lets the gateway
    /// apply its protocol default.
    pub fn resolve(key: Option<&str>) -> Option<PropertyKey> {
        match key {
            Some("present_value") | Some("presentValue") => Some(PropertyKey::PresentValue),
            Some("relinquish_default") | Some("relinquishDefault") => {
                Some(PropertyKey::RelinquishDefault)
            }
            _ => None,
        }
    }

    /// Protocol identifier of this property
    pub fn as_protocol_str(&self) -> &'static str {
        match self {
            PropertyKey::PresentValue => "presentValue",
            PropertyKey::RelinquishDefault => "relinquishDefault",
        }
    }
}
