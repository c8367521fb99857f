pub mod error;
pub mod paths;
pub mod update;

pub use error::UpdateError;
pub use paths::Paths;
pub use update::{UpdateOutcome, CURRENT_VERSION};
