//! Conversion between the vendor-neutral types and the chat-completions wire format
//!
//! Outbound requests go through [`RequestTranslator`]; complete responses
//! through [`reconstruct`]; streamed chunks through [`StreamReconstructor`].

mod arguments;
pub mod finish;
pub mod request;
pub mod response;
pub mod stream;

pub use finish::map_finish_reason;
pub use request::RequestTranslator;
pub use response::reconstruct;
pub use stream::{StreamReconstructor, reconstruct_stream};
