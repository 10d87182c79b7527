//! Error taxonomy for the stability engine.

pub mod engine_error;
pub mod error_code;

pub use engine_error::AnchorError;
pub use error_code::AnchorErrorCode;
