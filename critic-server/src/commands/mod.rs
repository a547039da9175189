//! CLI command implementations

pub mod check_db;
pub mod serve;
pub mod token;

pub use check_db::CheckDbArgs;
pub use serve::ServeArgs;
pub use token::TokenArgs;
