pub mod phone;
pub mod validate;

pub use phone::{PhoneError, PhoneNumber};
pub use validate::ValidatedQuery;
