pub mod enums;
pub mod lenient;
pub mod record;
pub mod subject;

pub use enums::*;
pub use record::*;
pub use subject::*;
