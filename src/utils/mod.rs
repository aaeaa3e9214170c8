pub mod error;

pub use error::{FaceError, KycError};
