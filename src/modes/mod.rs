pub mod code;
pub mod compare;
pub mod discovery;
pub mod traditional;

use crate::agent::TokenCounters;

/// Per-run summary printed at the end of every mode and fed into the
/// comparison table.
pub struct ModeReport {
    pub mode: &'static str,
    pub final_answer: Option<String>,
    pub counters: TokenCounters,
    pub turns: u32,
    pub dispatches: u32,
    pub tools_in_context: usize,
}
