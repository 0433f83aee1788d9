pub mod auth;
pub mod extract;
pub mod init;
