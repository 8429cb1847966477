use crate::engine::proto::DisassembleResult;
use std::collections::HashMap;

/// What a session is debugging: raw assembly text (assembled by the engine
/// at configure time) or a previously loaded binary image that the engine
/// already disassembled.
///
/// A closed variant on purpose - configuration matches on it exhaustively
/// and no third kind is anticipated.
pub enum ExecutionProfile {
    Assembly,
    Elf {
        image: Vec<u8>,
        /// pc → source line table produced at disassembly time.
        breakpoints: HashMap<u32, u32>,
    },
}

impl ExecutionProfile {
    /// Profile (and displayable listing) for a binary image the engine has
    /// disassembled. A failed disassembly yields the diagnostic as the only
    /// listing line, the profile is still constructed around whatever
    /// breakpoint table came back.
    pub fn from_disassembly(image: Vec<u8>, listing: DisassembleResult) -> (Vec<String>, Self) {
        let lines = match listing.error {
            Some(error) => vec![error],
            None => listing.lines,
        };

        let profile = ExecutionProfile::Elf {
            image,
            breakpoints: listing.breakpoints,
        };

        (lines, profile)
    }
}

impl std::fmt::Debug for ExecutionProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionProfile::Assembly => f.write_str("Assembly"),
            ExecutionProfile::Elf { image, breakpoints } => f
                .debug_struct("Elf")
                .field("image_len", &image.len())
                .field("breakpoints", &breakpoints.len())
                .finish(),
        }
    }
}
