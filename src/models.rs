pub mod message;
pub mod pagination;
pub mod query;
pub mod user;
