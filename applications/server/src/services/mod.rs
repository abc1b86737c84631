/// Server services
pub mod password;

pub use password::BcryptPasswordHasher;
