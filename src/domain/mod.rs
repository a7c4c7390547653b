pub mod auth;
pub mod category;
pub mod test_set;
pub mod types;
