pub mod compare;
pub mod listing;
pub mod scope;
pub mod snapshot;
pub mod vote;

pub use compare::*;
pub use listing::*;
pub use scope::*;
pub use snapshot::*;
pub use vote::*;
