use crate::error::SwatchError;

/// The per-image work a worker performs between fetching the input blob and
/// storing the output blob.
pub trait ImageTransform: Send + Sync {
    fn apply(&self, input: &[u8]) -> Result<Vec<u8>, SwatchError>;
}
