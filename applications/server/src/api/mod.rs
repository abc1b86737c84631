/// API route modules
pub mod groups;
pub mod health;
pub mod membership;
pub mod passwords;
pub mod users;
