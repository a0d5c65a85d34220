mod element;
pub use self::element::ElementKind;

mod error;
pub use self::error::*;

mod vector64;
pub use self::vector64::*;

mod vector128;
pub use self::vector128::*;

mod vector256;
pub use self::vector256::*;

pub mod detect;
