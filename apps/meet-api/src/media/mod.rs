//! Media-transport collaborator seam.
//!
//! The SFU does the actual audio/video routing; this module only mints join
//! credentials and drives the SFU's control API.

pub mod token;
pub mod transport;

pub use token::TokenMinter;
pub use transport::{HttpMediaTransport, MediaTransport, NullTransport};
