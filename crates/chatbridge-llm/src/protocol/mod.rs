//! Wire format types for the remote chat-completions dialect
//!
//! Pure serde structs matching the JSON the remote accepts and returns. They
//! are only used at the boundary and never leak into the vendor-neutral types.

pub mod openai;
