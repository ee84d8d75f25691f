pub mod error;
pub mod ids;
pub mod pagination;
pub mod time;

pub use error::AppError;
pub use ids::parse_id;
pub use pagination::{PageQuery, PageRequest, Pagination};
pub use time::{TimeOfDay, TimeParseError};
