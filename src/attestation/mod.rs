//! Attestation submission and revocation.

mod error;
pub mod pipeline;
pub mod revoke;

pub use error::{AttestationSubmissionError, RevocationError, Stage, StageError};
pub use pipeline::{AttestationPipeline, AttestationResult};
pub use revoke::AttestationRevoker;
