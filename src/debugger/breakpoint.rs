use std::collections::HashMap;

/// Bidirectional dictionary between source lines and machine program
/// counter addresses.
///
/// Built in a single pass from the pc→line table the engine returns at
/// configure (or disassemble) time and never mutated afterwards, so a map
/// may be shared freely between a control command in flight and any number
/// of readers highlighting the current stop location.
#[derive(Debug, Default)]
pub struct BreakpointMap {
    line_to_pc: HashMap<u32, u32>,
    pc_to_line: HashMap<u32, u32>,
}

impl BreakpointMap {
    /// `table` maps machine addresses to source lines.
    pub fn new(table: &HashMap<u32, u32>) -> Self {
        let mut map = BreakpointMap {
            line_to_pc: HashMap::with_capacity(table.len()),
            pc_to_line: HashMap::with_capacity(table.len()),
        };

        for (&pc, &line) in table {
            map.line_to_pc.insert(line, pc);
            map.pc_to_line.insert(pc, line);
        }

        map
    }

    /// Translate requested breakpoint lines into machine addresses.
    ///
    /// Lines with no emitted instruction (a comment or a blank line cannot
    /// host a breakpoint) are silently dropped, the caller is not expected
    /// to pre-validate which lines are breakpointable.
    pub fn translate_lines(&self, lines: &[u32]) -> Vec<u32> {
        lines
            .iter()
            .filter_map(|line| self.line_to_pc.get(line).copied())
            .collect()
    }

    /// Source line for the engine's reported program counter.
    pub fn line_for_pc(&self, pc: u32) -> Option<u32> {
        self.pc_to_line.get(&pc).copied()
    }

    pub fn pc_for_line(&self, line: u32) -> Option<u32> {
        self.line_to_pc.get(&line).copied()
    }

    pub fn len(&self) -> usize {
        self.pc_to_line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pc_to_line.is_empty()
    }
}
