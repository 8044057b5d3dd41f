//! Trial state machines, one per test protocol.
//!
//! Each engine owns its session state, the active phase's counters and the
//! results mapping. All of them implement [`AttentionTest`](crate::traits::AttentionTest)
//! and are generic over the clock and the random source.

mod cpt;
mod memory;
mod tova;

pub use cpt::CptEngine;
pub use memory::MemoryEngine;
pub use tova::TovaEngine;
