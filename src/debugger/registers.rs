use serde::{Deserialize, Serialize};

/// Register snapshot accompanying every control-command response: program
/// counter, the 32 general purpose registers and the two multiply/divide
/// accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterFile {
    pub pc: u32,
    pub gp: [u32; 32],
    pub lo: u32,
    pub hi: u32,
}

impl Default for RegisterFile {
    fn default() -> Self {
        RegisterFile {
            pc: 0,
            gp: [0; 32],
            lo: 0,
            hi: 0,
        }
    }
}
