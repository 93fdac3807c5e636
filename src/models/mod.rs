pub mod gold_type;
pub mod record;
pub mod summary;

pub use gold_type::*;
pub use record::*;
pub use summary::*;
