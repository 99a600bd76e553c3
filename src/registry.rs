//! Effect type → constructor table.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    config::EngineConfig,
    effects::{
        Chorus, Compressor, Delay, Distortion, EffectKind, EffectNode, Flanger, ParametricEq,
        Phaser, PitchShift, Reverb, StereoWidener, Tremolo, VocalEnhancer,
    },
    error::{FxError, Result},
    params::{ParamReport, ParamSpec, ParameterSet},
};

/// Builds a node from a complete, validated parameter set.
pub type EffectConstructor =
    Box<dyn Fn(&ParameterSet, &EngineConfig) -> Box<dyn EffectNode> + Send + Sync>;

/// A constructed node together with the parameters it was built from.
pub struct Constructed {
    pub node: Box<dyn EffectNode>,
    pub params: ParameterSet,
    pub report: ParamReport,
}

pub struct EffectRegistry {
    constructors: HashMap<EffectKind, EffectConstructor>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registry holding all twelve built-in effects.
    pub fn with_builtin() -> Self {
        let builtin: [(EffectKind, fn(&ParameterSet, &EngineConfig) -> Box<dyn EffectNode>); 12] = [
            (EffectKind::Reverb, Reverb::build),
            (EffectKind::Delay, Delay::build),
            (EffectKind::Compressor, Compressor::build),
            (EffectKind::ParametricEq, ParametricEq::build),
            (EffectKind::Chorus, Chorus::build),
            (EffectKind::Distortion, Distortion::build),
            (EffectKind::Phaser, Phaser::build),
            (EffectKind::Tremolo, Tremolo::build),
            (EffectKind::Flanger, Flanger::build),
            (EffectKind::PitchShift, PitchShift::build),
            (EffectKind::VocalEnhancer, VocalEnhancer::build),
            (EffectKind::StereoWidener, StereoWidener::build),
        ];

        let mut registry = Self::new();
        for (kind, build) in builtin {
            registry.constructors.insert(kind, Box::new(build));
        }
        registry
    }

    /// Add a constructor. Each kind can be registered once.
    pub fn register<F>(&mut self, kind: EffectKind, constructor: F) -> Result<()>
    where
        F: Fn(&ParameterSet, &EngineConfig) -> Box<dyn EffectNode> + Send + Sync + 'static,
    {
        if self.constructors.contains_key(&kind) {
            return Err(FxError::DuplicateEffectType(kind));
        }
        self.constructors.insert(kind, Box::new(constructor));
        Ok(())
    }

    pub fn is_registered(&self, kind: EffectKind) -> bool {
        self.constructors.contains_key(&kind)
    }

    /// Registered kinds, in `EffectKind::ALL` order.
    pub fn kinds(&self) -> Vec<EffectKind> {
        EffectKind::ALL
            .into_iter()
            .filter(|kind| self.is_registered(*kind))
            .collect()
    }

    pub fn schema(&self, kind: EffectKind) -> Result<&'static [ParamSpec]> {
        if self.is_registered(kind) {
            Ok(kind.schema())
        } else {
            Err(FxError::UnknownEffectType(kind.to_string()))
        }
    }

    /// Validate `params` against the kind's schema and build a node.
    pub fn construct(
        &self,
        kind: EffectKind,
        params: &ParameterSet,
        config: &EngineConfig,
    ) -> Result<Constructed> {
        let constructor = self
            .constructors
            .get(&kind)
            .ok_or_else(|| FxError::UnknownEffectType(kind.to_string()))?;

        let (params, report) =
            ParameterSet::resolve(kind, kind.schema(), params, config.validation)?;
        let node = constructor(&params, config);
        debug!(effect = %kind, params = params.len(), "constructed effect node");

        Ok(Constructed {
            node,
            params,
            report,
        })
    }

    /// [`construct`](Self::construct) from a string identifier.
    pub fn construct_by_id(
        &self,
        id: &str,
        params: &ParameterSet,
        config: &EngineConfig,
    ) -> Result<Constructed> {
        self.construct(EffectKind::from_id(id)?, params, config)
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}
