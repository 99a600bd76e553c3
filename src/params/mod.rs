//! Parameter schemas and validated parameter sets.
//!
//! Every effect type publishes a static schema (`&[ParamSpec]`). Raw values
//! coming from the control layer are collected in a [`ParameterSet`] and
//! checked against that schema before anything reaches the audio thread:
//!
//! ```text
//!   UI / caller ──→ ParameterSet (raw) ──→ validate ──→ ParameterSet (complete, in range)
//!                                              │
//!                                              └──→ ParamReport (clamps, rejections)
//! ```
//!
//! The validated set is then decoded into the effect's typed parameter struct.

mod spec;
mod value;

pub use spec::{ParamSpec, ParamUnit};
pub use value::ParamValue;

use tracing::warn;

use crate::{
    config::ValidationMode,
    effects::EffectKind,
    error::{FxError, Result},
};

/// Name → value mapping. Insertion order is kept so reports read naturally.
///
/// With the `serde` feature it reads and writes a plain object,
/// `{"time_ms": 120.0, "waveform": "sine"}`, in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    entries: Vec<(String, ParamValue)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Numeric value, or `0.0` if absent or not numeric.
    ///
    /// Validated sets always hold every schema entry, so effects read through
    /// this without further checks.
    pub fn number(&self, name: &str) -> f32 {
        self.get(name).and_then(ParamValue::as_number).unwrap_or(0.0)
    }

    pub fn choice(&self, name: &str) -> &str {
        self.get(name).and_then(ParamValue::as_choice).unwrap_or("")
    }

    /// A complete set holding each schema default.
    pub fn defaults(schema: &[ParamSpec]) -> Self {
        Self {
            entries: schema
                .iter()
                .map(|spec| (spec.name.to_string(), spec.default_value()))
                .collect(),
        }
    }

    /// Validate `input` against `schema` on top of the defaults.
    ///
    /// Used at construction time: any entry that cannot be clamped fails the
    /// whole call.
    pub fn resolve(
        effect: EffectKind,
        schema: &[ParamSpec],
        input: &ParameterSet,
        mode: ValidationMode,
    ) -> Result<(Self, ParamReport)> {
        let mut resolved = Self::defaults(schema);
        let report = resolved.merge(effect, schema, input, mode);
        match report.rejected.first() {
            Some(err) => Err(err.clone()),
            None => Ok((resolved, report)),
        }
    }

    /// Merge a partial update into this (already validated) set.
    ///
    /// Invalid entries are rejected individually; the rest are applied.
    pub fn merge(
        &mut self,
        effect: EffectKind,
        schema: &[ParamSpec],
        update: &ParameterSet,
        mode: ValidationMode,
    ) -> ParamReport {
        let mut report = ParamReport::default();

        for (name, raw) in update.iter() {
            let Some(spec) = schema.iter().find(|s| s.name == name) else {
                report.rejected.push(FxError::InvalidParameter {
                    effect,
                    name: name.to_string(),
                    reason: "unknown parameter".into(),
                });
                continue;
            };

            match spec.check(effect, raw, mode) {
                Ok((value, warning)) => {
                    if let Some(warning) = warning {
                        warn!(%effect, parameter = name, "{warning}");
                        report.warnings.push(warning);
                    }
                    self.set(spec.name, value);
                    report.applied += 1;
                }
                Err(err) => {
                    warn!(%effect, parameter = name, "rejected: {err}");
                    report.rejected.push(err);
                }
            }
        }

        report
    }
}

impl<K: AsRef<str>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.set(name.as_ref(), value);
        }
        set
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ParameterSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ParameterSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> serde::de::Visitor<'de> for SetVisitor {
            type Value = ParameterSet;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of parameter names to numbers or choice strings")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<ParameterSet, A::Error> {
                let mut set = ParameterSet::new();
                while let Some((name, value)) = access.next_entry::<String, ParamValue>()? {
                    set.set(&name, value);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SetVisitor)
    }
}

/// Outcome of validating a parameter write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamReport {
    /// Entries written (possibly after clamping).
    pub applied: usize,
    /// Values that were clamped (`InvalidParameter` or `UnstableConfiguration`).
    pub warnings: Vec<FxError>,
    /// Values that were not written.
    pub rejected: Vec<FxError>,
}

impl ParamReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.rejected.is_empty()
    }

    pub fn has_unstable(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, FxError::UnstableConfiguration { .. }))
    }
}
