pub use errors::{ServiceError, ServiceResult};

pub mod errors;
pub mod test_sets;
