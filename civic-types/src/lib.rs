pub mod models;
pub mod enums;
pub mod tally;

pub use models::*;
pub use enums::*;
pub use tally::{reconcile, VoteTally};
