pub mod auth;
pub mod test_sets;
