//! Control/audio split of the effects engine.

/*
Two Threads
===========

    control thread                          audio thread
    ──────────────                          ────────────
    EffectsController ──ChainCommand──→     EffectsRenderer
            ↑                                 │  SignalChain
            └──────Retired, EngineEvent───────┘

The controller validates parameters, builds nodes and keeps a descriptor of
every effect it has added. The renderer only moves what it's given: commands
are popped at the top of each block, nodes that leave the chain go back to the
controller to be freed, and problems are reported as plain events.

`AudioEffectsProcessor` holds both halves for single-threaded use (tests,
offline rendering) and applies each command as soon as it's sent.
*/

use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, info, warn};

use crate::{
    block::AudioBlock,
    chain::{ChainCommand, Retired, SignalChain, SLOT_LIMIT},
    config::EngineConfig,
    effects::{EffectKind, EffectParams},
    error::{FxError, Result},
    params::{ParamReport, ParamSpec, ParameterSet},
    registry::EffectRegistry,
    MAX_EFFECTS,
};

pub use crate::chain::{EffectHandle, EngineEvent};

/// Controller-side view of one effect in the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectDescriptor {
    pub handle: EffectHandle,
    pub kind: EffectKind,
    /// Complete, validated parameters.
    pub params: ParameterSet,
    pub enabled: bool,
}

/// Build a connected controller/renderer pair using the built-in effects.
pub fn split(config: EngineConfig) -> Result<(EffectsController, EffectsRenderer)> {
    split_with_registry(config, EffectRegistry::with_builtin())
}

pub fn split_with_registry(
    config: EngineConfig,
    registry: EffectRegistry,
) -> Result<(EffectsController, EffectsRenderer)> {
    config.validate()?;

    let (command_tx, command_rx) = RingBuffer::<ChainCommand>::new(config.command_capacity);
    // every node that can be in the chain at once, plus rejected inserts
    let (retired_tx, retired_rx) = RingBuffer::<Retired>::new(MAX_EFFECTS * 2 + config.command_capacity);
    let (event_tx, event_rx) = RingBuffer::<EngineEvent>::new(config.event_capacity);

    let renderer = EffectsRenderer {
        chain: SignalChain::new(config.channels, config.block_size, config.crossfade_frames()),
        config: config.clone(),
        commands: command_rx,
        retired: retired_tx,
        events: event_tx,
    };

    let controller = EffectsController {
        config,
        registry,
        descriptors: Vec::with_capacity(MAX_EFFECTS),
        fading: 0,
        next_handle: 1,
        commands: command_tx,
        retired: retired_rx,
        events: event_rx,
    };

    Ok((controller, renderer))
}

/* Controller
============== */

pub struct EffectsController {
    config: EngineConfig,
    registry: EffectRegistry,
    descriptors: Vec<EffectDescriptor>,
    /// Removed effects whose nodes haven't come back yet. They still hold a
    /// slot on the audio thread while they fade out.
    fading: usize,
    next_handle: u64,
    commands: Producer<ChainCommand>,
    retired: Consumer<Retired>,
    events: Consumer<EngineEvent>,
}

impl EffectsController {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    pub fn schema(&self, kind: EffectKind) -> Result<&'static [ParamSpec]> {
        self.registry.schema(kind)
    }

    /// Effects in processing order.
    pub fn effects(&self) -> &[EffectDescriptor] {
        &self.descriptors
    }

    pub fn effect(&self, handle: EffectHandle) -> Option<&EffectDescriptor> {
        self.descriptors.iter().find(|d| d.handle == handle)
    }

    /// Build an effect and append it to the end of the chain.
    pub fn add_effect(&mut self, kind: EffectKind, params: &ParameterSet) -> Result<EffectHandle> {
        self.collect_retired();

        let live = self.descriptors.len();
        if live >= MAX_EFFECTS || live + self.fading >= SLOT_LIMIT {
            return Err(FxError::ChainFull(MAX_EFFECTS));
        }
        if self.commands.is_full() {
            return Err(FxError::QueueFull);
        }

        let built = self.registry.construct(kind, params, &self.config)?;
        let handle = EffectHandle(self.next_handle);

        self.commands
            .push(ChainCommand::Insert {
                handle,
                node: built.node,
                enabled: true,
            })
            .map_err(|_| FxError::QueueFull)?;

        self.next_handle += 1;
        self.descriptors.push(EffectDescriptor {
            handle,
            kind,
            params: built.params,
            enabled: true,
        });
        info!(effect = %kind, %handle, warnings = built.report.warnings.len(), "added effect");

        Ok(handle)
    }

    /// [`add_effect`](Self::add_effect) from a string identifier such as `"pitch_shift"`.
    pub fn add_effect_by_id(&mut self, id: &str, params: &ParameterSet) -> Result<EffectHandle> {
        self.add_effect(EffectKind::from_id(id)?, params)
    }

    /// Fade an effect out and drop it from the chain. Stale handles are ignored.
    pub fn remove_effect(&mut self, handle: EffectHandle) -> Result<()> {
        let Some(index) = self.index_of(handle) else {
            debug!(%handle, "remove ignored, no such effect");
            return Ok(());
        };

        self.send(ChainCommand::Remove(handle))?;
        self.fading += 1;
        let removed = self.descriptors.remove(index);
        info!(effect = %removed.kind, %handle, "removed effect");
        Ok(())
    }

    /// Merge a partial update into an effect's parameters.
    ///
    /// Entries are validated one by one: rejected ones are listed in the
    /// report, the rest take effect.
    pub fn update_parameters(
        &mut self,
        handle: EffectHandle,
        update: &ParameterSet,
    ) -> Result<ParamReport> {
        let index = self
            .index_of(handle)
            .ok_or(FxError::UnknownHandle(handle.id()))?;
        let kind = self.descriptors[index].kind;

        let mut params = self.descriptors[index].params.clone();
        let report = params.merge(kind, kind.schema(), update, self.config.validation);
        if report.applied == 0 {
            return Ok(report);
        }

        self.send(ChainCommand::Update {
            handle,
            params: EffectParams::decode(kind, &params),
        })?;
        self.descriptors[index].params = params;
        debug!(effect = %kind, %handle, applied = report.applied, "updated parameters");

        Ok(report)
    }

    /// Bypass or re-enable an effect. A bypassed effect keeps its state.
    pub fn set_enabled(&mut self, handle: EffectHandle, enabled: bool) -> Result<()> {
        let index = self
            .index_of(handle)
            .ok_or(FxError::UnknownHandle(handle.id()))?;
        if self.descriptors[index].enabled == enabled {
            return Ok(());
        }

        self.send(ChainCommand::SetEnabled { handle, enabled })?;
        self.descriptors[index].enabled = enabled;
        debug!(%handle, enabled, "toggled effect");
        Ok(())
    }

    /// Clear delay lines, envelopes and other internal state of every effect.
    pub fn reset(&mut self) -> Result<()> {
        self.send(ChainCommand::Reset)
    }

    /// Frames the chain output lags its input, summed over enabled effects.
    pub fn latency_frames(&self) -> usize {
        self.descriptors
            .iter()
            .filter(|d| d.enabled)
            .map(|d| EffectParams::decode(d.kind, &d.params).latency_frames())
            .sum()
    }

    /// Free retired nodes and collect what the audio thread reported.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.collect_retired();

        let mut events = Vec::new();
        while let Ok(event) = self.events.pop() {
            match event {
                EngineEvent::ShapeMismatch {
                    expected_channels,
                    expected_frames,
                    channels,
                    frames,
                } => warn!(
                    expected_channels,
                    expected_frames, channels, frames, "block shape mismatch, output silenced"
                ),
                EngineEvent::NonFiniteOutput { handle, kind } => {
                    warn!(effect = %kind, %handle, "non-finite output, block silenced and effect reset")
                }
                EngineEvent::ChainFull { handle } => {
                    warn!(%handle, "insert rejected by the audio thread, chain full")
                }
            }
            events.push(event);
        }
        events
    }

    /// Drop nodes the audio thread has handed back. Returns how many.
    ///
    /// A node whose handle still has a descriptor never made it into the
    /// chain; its descriptor goes too.
    pub fn collect_retired(&mut self) -> usize {
        let mut count = 0;
        while let Ok(Retired { handle, node }) = self.retired.pop() {
            match self.index_of(handle) {
                Some(index) => {
                    self.descriptors.remove(index);
                    warn!(effect = %node.kind(), %handle, "insert sent back by the audio thread, effect dropped");
                }
                None => {
                    self.fading = self.fading.saturating_sub(1);
                    debug!(effect = %node.kind(), %handle, "freed retired node");
                }
            }
            drop(node);
            count += 1;
        }
        count
    }

    fn index_of(&self, handle: EffectHandle) -> Option<usize> {
        self.descriptors.iter().position(|d| d.handle == handle)
    }

    fn send(&mut self, command: ChainCommand) -> Result<()> {
        self.commands.push(command).map_err(|_| FxError::QueueFull)
    }
}

/* Renderer
============ */

pub struct EffectsRenderer {
    config: EngineConfig,
    chain: SignalChain,
    commands: Consumer<ChainCommand>,
    retired: Producer<Retired>,
    events: Producer<EngineEvent>,
}

impl EffectsRenderer {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of slots, including effects still fading out.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Apply every queued command without processing audio.
    pub fn apply_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            let is_insert = matches!(command, ChainCommand::Insert { .. });
            if let Some(rejected) = self.chain.apply(command) {
                if is_insert {
                    let _ = self.events.push(EngineEvent::ChainFull {
                        handle: rejected.handle,
                    });
                }
                // a full retire queue means the controller stopped collecting;
                // the node is dropped here as a last resort
                let _ = self.retired.push(rejected);
            }
        }
    }

    /// Process `input` into `output`. Both must match the configured shape;
    /// otherwise `output` is silenced and the mismatch is reported.
    pub fn process(&mut self, input: &AudioBlock, output: &mut AudioBlock) -> Result<()> {
        self.apply_commands();

        if let Err(err) = self
            .check_shape(input)
            .and_then(|()| self.check_shape(output))
        {
            output.silence();
            return Err(err);
        }

        output.copy_from(input);
        self.render(output);
        Ok(())
    }

    /// Process a block in place.
    pub fn process_in_place(&mut self, block: &mut AudioBlock) -> Result<()> {
        self.apply_commands();

        if let Err(err) = self.check_shape(block) {
            block.silence();
            return Err(err);
        }

        self.render(block);
        Ok(())
    }

    fn render(&mut self, block: &mut AudioBlock) {
        let events = &mut self.events;
        self.chain.process(block, |event| {
            let _ = events.push(event);
        });

        while self.retired.slots() > 0 {
            match self.chain.take_finished() {
                Some(retired) => {
                    let _ = self.retired.push(retired);
                }
                None => break,
            }
        }
    }

    fn check_shape(&mut self, block: &AudioBlock) -> Result<()> {
        let expected = (self.config.channels, self.config.block_size);
        if block.shape() == expected {
            return Ok(());
        }

        let (channels, frames) = block.shape();
        let _ = self.events.push(EngineEvent::ShapeMismatch {
            expected_channels: expected.0,
            expected_frames: expected.1,
            channels,
            frames,
        });
        Err(FxError::BufferShapeMismatch {
            expected_channels: expected.0,
            expected_frames: expected.1,
            channels,
            frames,
        })
    }
}

/* Single-threaded façade
========================== */

pub struct AudioEffectsProcessor {
    controller: EffectsController,
    renderer: EffectsRenderer,
}

impl AudioEffectsProcessor {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_registry(config, EffectRegistry::with_builtin())
    }

    pub fn with_registry(config: EngineConfig, registry: EffectRegistry) -> Result<Self> {
        let (controller, renderer) = split_with_registry(config, registry)?;
        Ok(Self {
            controller,
            renderer,
        })
    }

    /// Hand the two halves to their threads.
    pub fn split(self) -> (EffectsController, EffectsRenderer) {
        (self.controller, self.renderer)
    }

    pub fn config(&self) -> &EngineConfig {
        self.controller.config()
    }

    pub fn controller(&self) -> &EffectsController {
        &self.controller
    }

    pub fn effects(&self) -> &[EffectDescriptor] {
        self.controller.effects()
    }

    pub fn schema(&self, kind: EffectKind) -> Result<&'static [ParamSpec]> {
        self.controller.schema(kind)
    }

    pub fn add_effect(&mut self, kind: EffectKind, params: &ParameterSet) -> Result<EffectHandle> {
        let handle = self.controller.add_effect(kind, params)?;
        self.renderer.apply_commands();
        Ok(handle)
    }

    pub fn add_effect_by_id(&mut self, id: &str, params: &ParameterSet) -> Result<EffectHandle> {
        let handle = self.controller.add_effect_by_id(id, params)?;
        self.renderer.apply_commands();
        Ok(handle)
    }

    pub fn remove_effect(&mut self, handle: EffectHandle) -> Result<()> {
        self.controller.remove_effect(handle)?;
        self.renderer.apply_commands();
        Ok(())
    }

    pub fn update_parameters(
        &mut self,
        handle: EffectHandle,
        update: &ParameterSet,
    ) -> Result<ParamReport> {
        let report = self.controller.update_parameters(handle, update)?;
        self.renderer.apply_commands();
        Ok(report)
    }

    pub fn set_enabled(&mut self, handle: EffectHandle, enabled: bool) -> Result<()> {
        self.controller.set_enabled(handle, enabled)?;
        self.renderer.apply_commands();
        Ok(())
    }

    pub fn reset(&mut self) -> Result<()> {
        self.controller.reset()?;
        self.renderer.apply_commands();
        Ok(())
    }

    pub fn latency_frames(&self) -> usize {
        self.controller.latency_frames()
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.controller.drain_events()
    }

    pub fn process(&mut self, input: &AudioBlock, output: &mut AudioBlock) -> Result<()> {
        let result = self.renderer.process(input, output);
        self.controller.collect_retired();
        result
    }

    pub fn process_block(&mut self, input: &AudioBlock) -> Result<AudioBlock> {
        let mut output = AudioBlock::new(input.channels(), input.frames());
        self.process(input, &mut output)?;
        Ok(output)
    }

    /// Run interleaved audio through the chain block by block. The last
    /// block is zero-padded; the output has the same length as the input.
    pub fn render_offline(&mut self, interleaved: &[f32]) -> Result<Vec<f32>> {
        let channels = self.config().channels;
        let block_size = self.config().block_size;
        let chunk_len = channels * block_size;

        let mut input = AudioBlock::new(channels, block_size);
        let mut output = AudioBlock::new(channels, block_size);
        let mut rendered = vec![0.0; interleaved.len()];

        for (src, dst) in interleaved.chunks(chunk_len).zip(rendered.chunks_mut(chunk_len)) {
            input.read_interleaved(src);
            self.process(&input, &mut output)?;
            output.write_interleaved(dst);
        }

        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::sine_tone;

    fn config() -> EngineConfig {
        EngineConfig::new(48_000.0, 2, 256)
    }

    fn stereo_tone(frames: usize) -> AudioBlock {
        let tone = sine_tone(440.0, 0.5, 48_000.0, frames);
        AudioBlock::from_channels(&[tone.clone(), tone])
    }

    #[test]
    fn rejects_invalid_config() {
        let result = AudioEffectsProcessor::new(EngineConfig::new(48_000.0, 0, 256));
        assert!(matches!(result, Err(FxError::InvalidConfig(_))));
    }

    #[test]
    fn empty_chain_is_identity() {
        let mut fx = AudioEffectsProcessor::new(config()).unwrap();
        let input = stereo_tone(256);
        assert_eq!(fx.process_block(&input).unwrap(), input);
    }

    #[test]
    fn handles_are_unique_and_ordered() {
        let mut fx = AudioEffectsProcessor::new(config()).unwrap();
        let a = fx.add_effect(EffectKind::Delay, &ParameterSet::new()).unwrap();
        let b = fx.add_effect(EffectKind::Reverb, &ParameterSet::new()).unwrap();
        fx.remove_effect(a).unwrap();
        let c = fx.add_effect(EffectKind::Delay, &ParameterSet::new()).unwrap();

        assert!(a < b && b < c);
        let kinds: Vec<_> = fx.effects().iter().map(|d| d.kind).collect();
        assert_eq!(kinds, [EffectKind::Reverb, EffectKind::Delay]);
    }

    #[test]
    fn stale_handle_removal_is_ignored() {
        let mut fx = AudioEffectsProcessor::new(config()).unwrap();
        let handle = fx.add_effect(EffectKind::Chorus, &ParameterSet::new()).unwrap();
        fx.remove_effect(handle).unwrap();
        assert!(fx.remove_effect(handle).is_ok());
        assert!(fx.effects().is_empty());
    }

    #[test]
    fn unknown_id_leaves_chain_untouched() {
        let mut fx = AudioEffectsProcessor::new(config()).unwrap();
        let result = fx.add_effect_by_id("vocoder", &ParameterSet::new());
        assert!(matches!(result, Err(FxError::UnknownEffectType(_))));
        assert!(fx.effects().is_empty());
    }

    #[test]
    fn chain_full_is_reported() {
        let mut fx = AudioEffectsProcessor::new(config()).unwrap();
        for _ in 0..MAX_EFFECTS {
            fx.add_effect(EffectKind::Tremolo, &ParameterSet::new()).unwrap();
        }
        let result = fx.add_effect(EffectKind::Tremolo, &ParameterSet::new());
        assert_eq!(result, Err(FxError::ChainFull(MAX_EFFECTS)));
    }

    #[test]
    fn fading_removals_count_against_the_chain() {
        // one second of fade at 256 frames per block
        let mut fx = AudioEffectsProcessor::new(config().with_crossfade_ms(1_000.0)).unwrap();
        for _ in 0..2 {
            let handles: Vec<_> = (0..MAX_EFFECTS)
                .map(|_| fx.add_effect(EffectKind::Tremolo, &ParameterSet::new()).unwrap())
                .collect();
            for handle in handles {
                fx.remove_effect(handle).unwrap();
            }
        }

        let result = fx.add_effect(EffectKind::PitchShift, &ParameterSet::new());
        assert_eq!(result, Err(FxError::ChainFull(MAX_EFFECTS)));
        assert!(fx.effects().is_empty());
        assert_eq!(fx.latency_frames(), 0);
        assert!(fx.drain_events().is_empty());

        let input = stereo_tone(256);
        let mut output = AudioBlock::new(2, 256);
        for _ in 0..200 {
            fx.process(&input, &mut output).unwrap();
        }
        let handle = fx.add_effect(EffectKind::PitchShift, &ParameterSet::new()).unwrap();
        assert_eq!(fx.effects()[0].handle, handle);
        assert!(fx.drain_events().is_empty());
    }

    #[test]
    fn sent_back_insert_drops_its_descriptor() {
        let (mut controller, mut renderer) = split(config()).unwrap();
        let handle = controller.add_effect(EffectKind::Delay, &ParameterSet::new()).unwrap();
        // hand the insert straight back, as a full chain would
        let command = renderer.commands.pop().unwrap();
        let ChainCommand::Insert { node, .. } = command else {
            panic!("expected an insert");
        };
        renderer.retired.push(Retired { handle, node }).ok().unwrap();

        assert_eq!(controller.collect_retired(), 1);
        assert!(controller.effects().is_empty());
        assert_eq!(controller.latency_frames(), 0);
        assert_eq!(
            controller.update_parameters(handle, &ParameterSet::new()),
            Err(FxError::UnknownHandle(handle.id()))
        );
    }

    #[test]
    fn update_merges_into_stored_parameters() {
        let mut fx = AudioEffectsProcessor::new(config()).unwrap();
        let handle = fx.add_effect(EffectKind::Delay, &ParameterSet::new()).unwrap();
        let report = fx
            .update_parameters(handle, &ParameterSet::new().with("time_ms", 120.0).with("bogus", 1.0))
            .unwrap();

        assert_eq!(report.applied, 1);
        assert_eq!(report.rejected.len(), 1);
        let params = &fx.effects()[0].params;
        assert_eq!(params.number("time_ms"), 120.0);
        assert_eq!(params.number("mix"), 0.35);
    }

    #[test]
    fn update_on_unknown_handle_fails() {
        let mut fx = AudioEffectsProcessor::new(config()).unwrap();
        let result = fx.update_parameters(EffectHandle(42), &ParameterSet::new());
        assert_eq!(result, Err(FxError::UnknownHandle(42)));
    }

    #[test]
    fn latency_counts_enabled_effects() {
        let mut fx = AudioEffectsProcessor::new(config()).unwrap();
        let pitch = fx
            .add_effect(EffectKind::PitchShift, &ParameterSet::new().with("grain_size", 1024.0))
            .unwrap();
        fx.add_effect(EffectKind::Delay, &ParameterSet::new()).unwrap();
        assert_eq!(fx.latency_frames(), 1024);

        fx.set_enabled(pitch, false).unwrap();
        assert_eq!(fx.latency_frames(), 0);
    }

    #[test]
    fn shape_mismatch_silences_and_reports() {
        let mut fx = AudioEffectsProcessor::new(config()).unwrap();
        let input = stereo_tone(100);
        let mut output = AudioBlock::new(2, 100);
        output.fill(1.0);

        let result = fx.process(&input, &mut output);
        assert!(matches!(result, Err(FxError::BufferShapeMismatch { frames: 100, .. })));
        assert_eq!(output.peak(), 0.0);
        assert!(matches!(
            fx.drain_events().as_slice(),
            [EngineEvent::ShapeMismatch { frames: 100, .. }]
        ));
    }

    #[test]
    fn removed_nodes_come_back_to_the_controller() {
        let (mut controller, mut renderer) = split(config().with_crossfade_ms(0.0)).unwrap();
        let handle = controller.add_effect(EffectKind::Reverb, &ParameterSet::new()).unwrap();
        let input = stereo_tone(256);
        let mut output = AudioBlock::new(2, 256);

        renderer.process(&input, &mut output).unwrap();
        controller.remove_effect(handle).unwrap();
        renderer.process(&input, &mut output).unwrap();

        assert!(renderer.is_empty());
        assert_eq!(controller.collect_retired(), 1);
    }

    #[test]
    fn render_offline_keeps_length() {
        let mut fx = AudioEffectsProcessor::new(config()).unwrap();
        fx.add_effect(EffectKind::Distortion, &ParameterSet::new()).unwrap();
        let input = stereo_tone(1_000).to_interleaved();
        let output = fx.render_offline(&input).unwrap();
        assert_eq!(output.len(), input.len());
        assert!(output.iter().all(|x| x.is_finite()));
        assert_ne!(output, input);
    }
}
