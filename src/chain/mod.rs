//! Ordered effect slots, owned by the audio thread.

/*
Signal Chain
============

    input ──→ [ slot 0 ] ──→ [ slot 1 ] ──→ ... ──→ [ slot n ] ──→ output

Each slot processes the block in place, in insertion order. Removing a slot
never reorders the others.


Hot Swaps
---------

Switching an effect in or out between two samples is a discontinuity, i.e. a
click. Every slot carries a wet gain ramp instead:

    insert      0 → 1 over the crossfade
    enable      current → 1
    disable     current → 0, then the slot is skipped
    remove      current → 0, then the node is retired

While the ramp moves, the slot keeps a copy of its input in a scratch block
and blends:

    out = input · (1 - g) + effect(input) · g

A slot whose gain is settled at 0 is skipped entirely: its node keeps its
state but does no work, and the block passes through bit-for-bit.


Realtime Rules
--------------

Slot storage and the scratch block are allocated up front. Nodes arrive fully
built and leave through `take_finished`, so the audio thread never allocates
or frees.
*/

mod command;

pub use command::{ChainCommand, EffectHandle, EngineEvent, Retired};

use crate::{
    block::AudioBlock,
    dsp::{mix::crossfade, LinearRamp},
    effects::EffectNode,
    MAX_EFFECTS,
};

/// A full chain plus the same number of slots still fading out.
pub(crate) const SLOT_LIMIT: usize = MAX_EFFECTS * 2;

struct Slot {
    handle: EffectHandle,
    node: Box<dyn EffectNode>,
    enabled: bool,
    removing: bool,
    fade: LinearRamp,
}

impl Slot {
    /// Settled at zero gain: skip processing.
    fn is_silent(&self) -> bool {
        !self.fade.is_active() && self.fade.value() <= 0.0
    }

    fn is_finished(&self) -> bool {
        self.removing && self.is_silent()
    }
}

pub struct SignalChain {
    slots: Vec<Slot>,
    scratch: AudioBlock,
    crossfade_frames: usize,
}

impl SignalChain {
    pub fn new(channels: usize, block_size: usize, crossfade_frames: usize) -> Self {
        Self {
            slots: Vec::with_capacity(SLOT_LIMIT),
            scratch: AudioBlock::new(channels, block_size),
            crossfade_frames,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Handles in processing order, including slots still fading out.
    pub fn handles(&self) -> impl Iterator<Item = EffectHandle> + '_ {
        self.slots.iter().map(|slot| slot.handle)
    }

    /// Total latency of the slots currently audible.
    pub fn latency_frames(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.enabled && !slot.removing)
            .map(|slot| slot.node.latency_frames())
            .sum()
    }

    /// Apply one control message. Returns a node that has to go back to the
    /// control thread, if any.
    pub fn apply(&mut self, command: ChainCommand) -> Option<Retired> {
        match command {
            ChainCommand::Insert {
                handle,
                node,
                enabled,
            } => self.insert(handle, node, enabled),
            ChainCommand::Remove(handle) => {
                self.remove(handle);
                None
            }
            ChainCommand::Update { handle, params } => {
                if let Some(slot) = self.slot_mut(handle) {
                    slot.node.update_parameters(&params);
                }
                None
            }
            ChainCommand::SetEnabled { handle, enabled } => {
                self.set_enabled(handle, enabled);
                None
            }
            ChainCommand::Reset => {
                for slot in &mut self.slots {
                    slot.node.reset();
                }
                None
            }
        }
    }

    fn insert(
        &mut self,
        handle: EffectHandle,
        node: Box<dyn EffectNode>,
        enabled: bool,
    ) -> Option<Retired> {
        if self.slots.len() >= SLOT_LIMIT {
            return Some(Retired { handle, node });
        }

        let mut fade = LinearRamp::new(0.0);
        if enabled {
            fade.set_target(1.0, self.crossfade_frames);
        }
        self.slots.push(Slot {
            handle,
            node,
            enabled,
            removing: false,
            fade,
        });
        None
    }

    fn remove(&mut self, handle: EffectHandle) {
        let frames = self.crossfade_frames;
        if let Some(slot) = self.slot_mut(handle) {
            slot.removing = true;
            slot.fade.set_target(0.0, frames);
        }
    }

    fn set_enabled(&mut self, handle: EffectHandle, enabled: bool) {
        let frames = self.crossfade_frames;
        if let Some(slot) = self.slot_mut(handle) {
            if slot.removing || slot.enabled == enabled {
                return;
            }
            slot.enabled = enabled;
            slot.fade.set_target(if enabled { 1.0 } else { 0.0 }, frames);
        }
    }

    fn slot_mut(&mut self, handle: EffectHandle) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|slot| slot.handle == handle)
    }

    /// Run `block` through every audible slot, in order.
    ///
    /// A node that produces non-finite samples is reset, the block is
    /// silenced and `on_event` is told.
    pub fn process(&mut self, block: &mut AudioBlock, mut on_event: impl FnMut(EngineEvent)) {
        for slot in &mut self.slots {
            if slot.is_silent() {
                continue;
            }

            if slot.fade.is_active() || slot.fade.value() < 1.0 {
                self.scratch.copy_from(block);
                slot.node.process(block);

                let start = slot.fade;
                let mut end = start;
                for (ch, wet) in block.channels_iter_mut().enumerate() {
                    end = crossfade(self.scratch.channel(ch), wet, start);
                }
                slot.fade = end;
            } else {
                slot.node.process(block);
            }

            if !block.is_finite() {
                block.silence();
                slot.node.reset();
                on_event(EngineEvent::NonFiniteOutput {
                    handle: slot.handle,
                    kind: slot.node.kind(),
                });
            }
        }
    }

    /// Pop the first slot that finished fading out, if any.
    pub fn take_finished(&mut self) -> Option<Retired> {
        let index = self.slots.iter().position(Slot::is_finished)?;
        let slot = self.slots.remove(index);
        Some(Retired {
            handle: slot.handle,
            node: slot.node,
        })
    }
}
