//! Graphics error types.

use thiserror::Error;

/// Errors that can occur in the graphics system.
///
/// Most failures inside a frame degrade to "render nothing for this pass"
/// and are logged rather than propagated; the variants here surface from
/// the operations that do return `Result`, chiefly backend initialization
/// and resource creation.
#[derive(Debug, Error)]
pub enum GraphicsError {
    /// No usable graphics device. The one fatal condition: surfaced to the
    /// host integration layer as an initialization failure.
    #[error("initialization failed: {0}")]
    InitializationFailed(String),
    /// Failed to create a GPU resource.
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),
    /// Out of GPU memory.
    #[error("out of GPU memory")]
    OutOfMemory,
    /// The GPU device was lost.
    #[error("GPU device lost")]
    DeviceLost,
    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
