pub mod dynamodb;
pub mod models;
pub mod repositories;

pub use dynamodb::*;
pub use models::*;
pub use repositories::*;
