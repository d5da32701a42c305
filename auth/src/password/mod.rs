pub mod errors;
pub mod hasher;

pub use errors::PasswordError;
pub use hasher::HashedPassword;
pub use hasher::PasswordHasher;
