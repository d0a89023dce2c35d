//! Secret source implementations

#[cfg(feature = "aws-secrets")]
pub mod aws;
pub mod memory;
