pub mod message;
pub mod traits;
pub mod types;

pub use message::{Caller, ChatMessage, Outcome};
pub use traits::ReplySink;
pub use types::{ParsePermissionError, PermissionLevel};
