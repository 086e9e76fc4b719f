//! Command implementations for the `erate` CLI.

pub mod auth;
pub mod completions;
pub mod push;
pub mod table;
pub mod upload;
pub mod validate;

pub use auth::{run_login, run_logout, run_register, run_status};
pub use completions::generate_completions;
pub use push::run_push;
pub use table::run_table;
pub use upload::run_upload;
pub use validate::run_validate;
