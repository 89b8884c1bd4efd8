pub mod caller;
pub mod errors;
pub mod repository;
pub mod service;
pub mod todo;

pub use caller::*;
pub use errors::*;
pub use repository::*;
pub use todo::*;
