use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

use super::ParamValue;
use crate::{config::ValidationMode, effects::EffectKind, error::FxError};

#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamUnit {
    Hertz,
    Decibels,
    Milliseconds,
    Semitones,
    Samples,
    Ratio,
    None,
}

impl ParamUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            ParamUnit::Hertz => "Hz",
            ParamUnit::Decibels => "dB",
            ParamUnit::Milliseconds => "ms",
            ParamUnit::Semitones => "st",
            ParamUnit::Samples => "smp",
            ParamUnit::Ratio | ParamUnit::None => "",
        }
    }
}

/// Declared range, default and unit of one effect parameter.
///
/// Choice parameters use `choices`; their `min`/`max`/`default` are indices.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub unit: ParamUnit,
    pub integer: bool,
    pub choices: &'static [&'static str],
    /// Feeds a recursive path; magnitudes at or above 1.0 are never accepted.
    pub feedback: bool,
}

impl ParamSpec {
    pub const fn number(name: &'static str, min: f32, max: f32, default: f32, unit: ParamUnit) -> Self {
        Self {
            name,
            min,
            max,
            default,
            unit,
            integer: false,
            choices: &[],
            feedback: false,
        }
    }

    pub const fn integer(name: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self {
            integer: true,
            ..Self::number(name, min, max, default, ParamUnit::None)
        }
    }

    pub const fn choice(name: &'static str, choices: &'static [&'static str], default: usize) -> Self {
        Self {
            name,
            min: 0.0,
            max: (choices.len() - 1) as f32,
            default: default as f32,
            unit: ParamUnit::None,
            integer: true,
            choices,
            feedback: false,
        }
    }

    pub const fn with_unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    pub const fn feedback(mut self) -> Self {
        self.feedback = true;
        self
    }

    pub fn is_choice(&self) -> bool {
        !self.choices.is_empty()
    }

    pub fn default_value(&self) -> ParamValue {
        if self.is_choice() {
            ParamValue::Choice(self.choices[self.default as usize].to_string())
        } else {
            ParamValue::Number(self.default)
        }
    }

    /// Validate one raw value. Returns the value to store and an optional
    /// warning describing a clamp.
    pub(crate) fn check(
        &self,
        effect: EffectKind,
        raw: &ParamValue,
        mode: ValidationMode,
    ) -> Result<(ParamValue, Option<FxError>), FxError> {
        let invalid = |reason: String| FxError::InvalidParameter {
            effect,
            name: self.name.to_string(),
            reason,
        };

        if self.is_choice() {
            let ParamValue::Choice(name) = raw else {
                return Err(invalid(format!("expected one of {:?}", self.choices)));
            };
            let lowered = name.to_ascii_lowercase();
            return match self.choices.iter().find(|c| **c == lowered) {
                Some(choice) => Ok((ParamValue::Choice(choice.to_string()), None)),
                None => Err(invalid(format!("`{name}` is not one of {:?}", self.choices))),
            };
        }

        let Some(value) = raw.as_number() else {
            return Err(invalid("expected a number".into()));
        };
        if !value.is_finite() {
            return Err(invalid(format!("{value} is not a finite number")));
        }
        let value = if self.integer { value.round() } else { value };

        if self.feedback && value.abs() >= 1.0 {
            let limit = value.clamp(self.min, self.max);
            return Ok((
                ParamValue::Number(limit),
                Some(FxError::UnstableConfiguration {
                    effect,
                    name: self.name,
                    value,
                    limit,
                }),
            ));
        }

        if (self.min..=self.max).contains(&value) {
            return Ok((ParamValue::Number(value), None));
        }

        let reason = format!(
            "{value}{} outside {}..={}",
            self.unit.suffix(),
            self.min,
            self.max
        );
        match mode {
            ValidationMode::Strict => Err(invalid(reason)),
            ValidationMode::Clamp => {
                let clamped = value.clamp(self.min, self.max);
                Ok((
                    ParamValue::Number(clamped),
                    Some(invalid(format!("{reason}, clamped to {clamped}"))),
                ))
            }
        }
    }
}

impl fmt::Display for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_choice() {
            let default = self.choices.get(self.default as usize).copied().unwrap_or("");
            return write!(f, "{} = {} [{}]", self.name, default, self.choices.join("|"));
        }
        let unit = self.unit.suffix();
        write!(f, "{} = {}{unit} [{}..{}]", self.name, self.default, self.min, self.max)?;
        if self.feedback {
            write!(f, " (feedback)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_lookup_is_case_insensitive() {
        let spec = ParamSpec::choice("curve", &["soft", "hard"], 0);
        let (value, warning) = spec
            .check(EffectKind::Distortion, &"HARD".into(), ValidationMode::Strict)
            .unwrap();
        assert_eq!(value, ParamValue::Choice("hard".into()));
        assert!(warning.is_none());
    }

    #[test]
    fn negative_feedback_beyond_unity_clamps_to_lower_bound() {
        let spec = ParamSpec::number("feedback", -0.95, 0.95, 0.0, ParamUnit::Ratio).feedback();
        let (value, warning) = spec
            .check(EffectKind::Flanger, &(-3.0).into(), ValidationMode::Clamp)
            .unwrap();
        assert_eq!(value, ParamValue::Number(-0.95));
        assert!(matches!(warning, Some(FxError::UnstableConfiguration { .. })));
    }

    #[test]
    fn number_spec_rejects_text() {
        let spec = ParamSpec::number("rate_hz", 0.1, 20.0, 5.0, ParamUnit::Hertz);
        assert!(spec
            .check(EffectKind::Tremolo, &"fast".into(), ValidationMode::Clamp)
            .is_err());
    }
}
