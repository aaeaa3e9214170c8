pub mod extract;
pub mod orientation;

pub use extract::MultiPassExtractor;
pub use orientation::{OrientationResolver, ResolvedText};
