use thiserror::Error;

/// Failures turning raw bytes into pixels (or pixels back into bytes).
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("image input is empty")]
    Empty,

    #[error("image has no pixels ({width}x{height})")]
    ZeroSized { width: u32, height: u32 },

    #[error("failed to decode image: {source}")]
    Unreadable {
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode normalized image: {source}")]
    Encode {
        #[source]
        source: image::ImageError,
    },
}
