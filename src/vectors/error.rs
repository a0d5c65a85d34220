use thiserror::Error;

/// Failures reported by the fixed-width vector operations.
///
/// Every operation checks the element type before it checks anything else,
/// so a call that is wrong in both ways reports the type failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum VectorError {
    /// The vector was instantiated with an element type outside the
    /// supported set of fixed-width integers and IEEE floats.
    #[error("unsupported vector element type `{type_name}`")]
    UnsupportedElementType { type_name: &'static str },

    /// An element index fell outside `[0, count)` for the active element type.
    #[error("index {index} out of range for a vector of {count} elements")]
    IndexOutOfRange { index: usize, count: usize },
}
