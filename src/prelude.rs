pub use crate::backend::*;
pub use crate::env::*;
pub use crate::options::Options;
pub use crate::sequences::*;
pub use crate::test_db::*;
pub use crate::util::DatabaseName;
