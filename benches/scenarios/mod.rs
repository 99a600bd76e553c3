//! Real-world scenario benchmarks.
//!
//! These model actual usage: every built-in effect on a stereo block, and
//! complete vocal chains driven through the processor.

mod chain;
mod effects;

pub use chain::bench_chain;
pub use effects::bench_effects;
