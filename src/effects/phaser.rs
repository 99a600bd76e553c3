//! Phaser: a swept cascade of first-order all-pass stages.

/*
Phaser
======

    x ──┬──────────────────────────────────────────(×(1-mix))──→ (+) ──→ y
        └──→ (+) ──→ [AP] ──→ [AP] ──→ ... ──→ [AP] ──┬──(×mix)──┘
              ↑                                       │
              └───────────── (×feedback) ←── z⁻¹ ─────┘

Each all-pass stage leaves the level alone and shifts the phase, by 90° at
its break frequency. Mixed back with the dry signal, frequencies that come
out 180° shifted cancel: N stages give N/2 notches.

The LFO moves every break frequency together, two octaves either side of
`center_hz` at full depth:

    fc = center · 2^(2·m)        m = depth · waveform(phase) ∈ [-1, 1]

Feedback deepens the notches; it is capped at 0.9 so the loop gain stays
below unity.
*/

use super::{EffectKind, EffectNode, EffectParams};
use crate::{
    block::AudioBlock,
    config::EngineConfig,
    dsp::{filter::AllpassStage, mix::blend_dry_wet, Lfo, LfoWaveform},
    params::{ParamSpec, ParamUnit, ParameterSet},
};

pub const MAX_STAGES: usize = 12;
const SWEEP_OCTAVES: f32 = 2.0;

pub const SCHEMA: &[ParamSpec] = &[
    ParamSpec::number("rate_hz", 0.05, 10.0, 0.5, ParamUnit::Hertz),
    ParamSpec::number("depth", 0.0, 1.0, 0.7, ParamUnit::Ratio),
    ParamSpec::integer("stages", 2.0, MAX_STAGES as f32, 4.0),
    ParamSpec::number("center_hz", 200.0, 4_000.0, 1_000.0, ParamUnit::Hertz),
    ParamSpec::number("feedback", 0.0, 0.9, 0.3, ParamUnit::Ratio).feedback(),
    ParamSpec::choice("waveform", LfoWaveform::NAMES, 0),
    ParamSpec::number("mix", 0.0, 1.0, 0.5, ParamUnit::Ratio),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaserParams {
    pub rate_hz: f32,
    pub depth: f32,
    pub stages: usize,
    pub center_hz: f32,
    pub feedback: f32,
    pub waveform: LfoWaveform,
    pub mix: f32,
}

impl PhaserParams {
    pub fn from_set(set: &ParameterSet) -> Self {
        Self {
            rate_hz: set.number("rate_hz"),
            depth: set.number("depth"),
            stages: set.number("stages") as usize,
            center_hz: set.number("center_hz"),
            feedback: set.number("feedback"),
            waveform: LfoWaveform::from_name(set.choice("waveform")),
            mix: set.number("mix"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PhaserChannel {
    stages: [AllpassStage; MAX_STAGES],
    last: f32,
}

pub struct Phaser {
    channels: Vec<PhaserChannel>,
    lfo: Lfo,
    stages: usize,
    center_hz: f32,
    feedback: f32,
    mix: f32,
    sample_rate: f32,
}

impl Phaser {
    pub fn new(params: PhaserParams, config: &EngineConfig) -> Self {
        let mut phaser = Self {
            channels: vec![PhaserChannel::default(); config.channels],
            lfo: Lfo::new(config.sample_rate, params.rate_hz, params.depth, params.waveform),
            stages: 2,
            center_hz: 1_000.0,
            feedback: 0.0,
            mix: 0.0,
            sample_rate: config.sample_rate,
        };
        phaser.apply(params);
        phaser
    }

    pub fn build(set: &ParameterSet, config: &EngineConfig) -> Box<dyn EffectNode> {
        Box::new(Self::new(PhaserParams::from_set(set), config))
    }

    fn apply(&mut self, params: PhaserParams) {
        self.lfo.set_rate(params.rate_hz);
        self.lfo.set_depth(params.depth);
        self.lfo.set_waveform(params.waveform);
        self.stages = params.stages.clamp(2, MAX_STAGES);
        self.center_hz = params.center_hz;
        self.feedback = params.feedback.clamp(0.0, 0.9);
        self.mix = params.mix.clamp(0.0, 1.0);
    }
}

impl EffectNode for Phaser {
    fn kind(&self) -> EffectKind {
        EffectKind::Phaser
    }

    fn process(&mut self, block: &mut AudioBlock) {
        let start = self.lfo;
        let mut end = start;
        let stages = self.stages;

        for (channel, state) in block.channels_iter_mut().zip(self.channels.iter_mut()) {
            let mut lfo = start;
            for sample in channel.iter_mut() {
                let m = lfo.next_value();
                let fc = self.center_hz * (SWEEP_OCTAVES * m).exp2();
                let a = AllpassStage::coefficient(fc, self.sample_rate);

                let dry = *sample;
                let mut wet = dry + state.last * self.feedback;
                for stage in &mut state.stages[..stages] {
                    wet = stage.process(a, wet);
                }
                state.last = wet;
                *sample = blend_dry_wet(dry, wet, self.mix);
            }
            end = lfo;
        }

        self.lfo = end;
    }

    fn update_parameters(&mut self, params: &EffectParams) {
        if let EffectParams::Phaser(params) = params {
            self.apply(*params);
        }
    }

    fn reset(&mut self) {
        self.channels.fill(PhaserChannel::default());
        self.lfo.reset();
    }
}
