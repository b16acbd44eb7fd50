//! Request handler module
//!
//! Routes requests and builds the assistant reply.

pub mod assistant;
pub mod router;

// Re-export main entry point
pub use assistant::Assistant;
pub use router::handle_request;
