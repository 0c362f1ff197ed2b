//! Performance models.
//!
//! A performance value normalises spin time `T` (seconds) by shoot power `ω`
//! under an assumed friction model. Higher is better. Values are raw `f64`;
//! rounding is left to the caller.

use std::fmt;
use std::str::FromStr;

/// Friction model used to normalise spin time by launch power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Model {
    /// `T / √ω`
    #[default]
    Sqrt,
    /// `T / ω`
    Linear,
    /// `T / ln(ω)`
    Log,
    /// `T / ωⁿ`
    Power,
}

impl Model {
    pub const ALL: [Model; 4] = [Model::Sqrt, Model::Linear, Model::Log, Model::Power];

    pub fn key(self) -> &'static str {
        match self {
            Model::Sqrt => "sqrt",
            Model::Linear => "linear",
            Model::Log => "log",
            Model::Power => "power",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Model::Sqrt => "Square-root model (T/√ω)",
            Model::Linear => "Linear model (T/ω)",
            Model::Log => "Logarithmic model (T/ln(ω))",
            Model::Power => "Power model (T/ωⁿ)",
        }
    }

    pub fn formula(self) -> &'static str {
        match self {
            Model::Sqrt => "performance = spin time (s) ÷ √shoot power",
            Model::Linear => "performance = spin time (s) ÷ shoot power",
            Model::Log => "performance = spin time (s) ÷ ln(shoot power)",
            Model::Power => "performance = spin time (s) ÷ shoot powerⁿ",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Model::Sqrt => "Mixed friction (empirical); the general case",
            Model::Linear => "Coulomb friction; heavy tops, low spin rates",
            Model::Log => "Viscous friction; light tops, high spin rates",
            Model::Power => "Generalised model; pick the exponent n experimentally",
        }
    }

    /// Apply the formula. No domain checks; see [`evaluate`].
    pub fn apply(self, t: f64, omega: f64, n: f64) -> f64 {
        match self {
            Model::Sqrt => t / omega.sqrt(),
            Model::Linear => t / omega,
            Model::Log => t / omega.ln(),
            Model::Power => t / omega.powf(n),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Unrecognised model key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model {0:?} (expected sqrt, linear, log or power)")]
pub struct UnknownModel(pub String);

impl FromStr for Model {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|m| m.key() == s)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

/// Total spin time in seconds. Missing or NaN parts count as zero.
pub fn total_seconds(minutes: Option<f64>, seconds: Option<f64>) -> f64 {
    let part = |v: Option<f64>| v.filter(|v| !v.is_nan()).unwrap_or(0.0);
    part(minutes) * 60.0 + part(seconds)
}

/// Performance value for one measurement, or `None` when it is undefined:
/// power missing, non-positive, or not finite; total time ≤ 0; `log` with
/// `ω ≤ 1`; unknown model key.
pub fn evaluate(
    power: Option<f64>,
    minutes: Option<f64>,
    seconds: Option<f64>,
    model_key: &str,
    exponent: f64,
) -> Option<f64> {
    let omega = power.filter(|w| w.is_finite() && *w > 0.0)?;
    let t = total_seconds(minutes, seconds);
    if t.is_nan() || t <= 0.0 {
        return None;
    }
    if model_key == Model::Log.key() && omega <= 1.0 {
        return None;
    }
    let model = model_key.parse::<Model>().ok()?;
    Some(model.apply(t, omega, exponent))
}

/// Coerce a form field to a number. Blank or unparsable text is empty.
pub fn parse_field(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn sqrt_reference_value() {
        let v = evaluate(Some(8100.0), Some(3.0), Some(12.15), "sqrt", 0.5).unwrap();
        assert!(close(v, 192.15 / 90.0));
        assert!((v - 2.1350).abs() < 1e-4);
    }

    #[test]
    fn each_model() {
        let t = 130.03;
        let w = 5000.0;
        let m = Some(2.0);
        let s = Some(10.03);
        assert!(close(evaluate(Some(w), m, s, "linear", 0.5).unwrap(), t / w));
        assert!(close(evaluate(Some(w), m, s, "log", 0.5).unwrap(), t / w.ln()));
        assert!(close(evaluate(Some(w), m, s, "power", 0.7).unwrap(), t / w.powf(0.7)));
        // power with n = 0.5 is the sqrt model
        assert!(close(
            evaluate(Some(w), m, s, "power", 0.5).unwrap(),
            evaluate(Some(w), m, s, "sqrt", 0.5).unwrap()
        ));
    }

    #[test]
    fn undefined_inputs() {
        assert_eq!(evaluate(Some(0.0), Some(1.0), Some(0.0), "sqrt", 0.5), None);
        assert_eq!(evaluate(Some(-5.0), Some(1.0), Some(0.0), "sqrt", 0.5), None);
        assert_eq!(evaluate(None, Some(1.0), Some(0.0), "sqrt", 0.5), None);
        assert_eq!(evaluate(Some(f64::NAN), Some(1.0), None, "sqrt", 0.5), None);
        assert_eq!(evaluate(Some(f64::INFINITY), Some(1.0), None, "sqrt", 0.5), None);
        assert_eq!(evaluate(Some(100.0), Some(0.0), Some(0.0), "linear", 0.5), None);
        assert_eq!(evaluate(Some(100.0), None, None, "linear", 0.5), None);
        assert_eq!(evaluate(Some(100.0), Some(-1.0), Some(30.0), "linear", 0.5), None);
        assert_eq!(evaluate(Some(1.0), Some(1.0), Some(0.0), "log", 0.5), None);
        assert_eq!(evaluate(Some(0.5), Some(1.0), Some(0.0), "log", 0.5), None);
        assert_eq!(evaluate(Some(100.0), Some(1.0), Some(0.0), "cubic", 0.5), None);
    }

    #[test]
    fn missing_minutes_count_as_zero() {
        let v = evaluate(Some(100.0), None, Some(50.0), "linear", 0.5).unwrap();
        assert!(close(v, 0.5));
        assert!(close(total_seconds(Some(f64::NAN), Some(4.0)), 4.0));
    }

    #[test]
    fn log_just_above_one() {
        assert!(evaluate(Some(1.5), Some(0.0), Some(10.0), "log", 0.5).is_some());
    }

    #[test]
    fn model_keys_round_trip() {
        for m in Model::ALL {
            assert_eq!(m.key().parse::<Model>().unwrap(), m);
            assert_eq!(m.to_string(), m.key());
        }
        assert!("SQRT".parse::<Model>().is_err());
        assert_eq!(Model::default(), Model::Sqrt);
    }

    #[test]
    fn parse_form_fields() {
        assert_eq!(parse_field(""), None);
        assert_eq!(parse_field("   "), None);
        assert_eq!(parse_field("abc"), None);
        assert_eq!(parse_field(" 12.5 "), Some(12.5));
        assert_eq!(parse_field("8100"), Some(8100.0));
    }
}
