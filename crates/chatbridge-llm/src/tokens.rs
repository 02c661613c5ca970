//! Token estimation
//!
//! The remote has no counting endpoint, so this is a length heuristic and
//! nothing more.

use crate::types::{GenerationRequest, Part, SystemInstruction, TokenCount};

/// Characters assumed per token
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimate the prompt size of a request from its text length
pub fn estimate_tokens(request: &GenerationRequest) -> TokenCount {
    let system = request
        .system_instruction
        .as_ref()
        .map_or(0, |instruction| SystemInstruction::text(instruction).chars().count());

    let turns: usize = request
        .contents
        .iter()
        .flat_map(|turn| &turn.parts)
        .filter_map(Part::as_text)
        .map(|text| text.chars().count())
        .sum();

    let tokens = (system + turns).div_ceil(CHARS_PER_TOKEN);
    TokenCount {
        total_tokens: u32::try_from(tokens).unwrap_or(u32::MAX),
    }
}
