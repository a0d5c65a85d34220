pub mod vectors;

pub use vectors::{ElementKind, Vector128, Vector256, Vector64, VectorError};
