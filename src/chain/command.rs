use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::effects::{EffectKind, EffectNode, EffectParams};

/// Identifies one effect instance for the lifetime of a processor. Handles
/// are never reused, so a stale handle can't address a newer effect.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectHandle(pub(crate) u64);

impl EffectHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Control thread → audio thread.
///
/// Nodes arrive fully constructed; the audio thread only moves the box.
pub enum ChainCommand {
    Insert {
        handle: EffectHandle,
        node: Box<dyn EffectNode>,
        enabled: bool,
    },
    Remove(EffectHandle),
    Update {
        handle: EffectHandle,
        params: EffectParams,
    },
    SetEnabled {
        handle: EffectHandle,
        enabled: bool,
    },
    /// Clear every node's internal state.
    Reset,
}

/// Audio thread → control thread: a node leaving the chain, to be dropped
/// where deallocation is allowed.
pub struct Retired {
    pub handle: EffectHandle,
    pub node: Box<dyn EffectNode>,
}

/// Problems the audio thread noticed. Plain data, so reporting never
/// allocates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// A block arrived with the wrong shape; the output was silenced.
    ShapeMismatch {
        expected_channels: usize,
        expected_frames: usize,
        channels: usize,
        frames: usize,
    },
    /// A node produced NaN or infinity; the block was silenced and the node reset.
    NonFiniteOutput {
        handle: EffectHandle,
        kind: EffectKind,
    },
    /// An insert arrived while every slot was taken; the node was sent back.
    ChainFull { handle: EffectHandle },
}
