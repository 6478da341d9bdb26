pub mod ai;
pub mod common;
pub mod dash;
pub mod expenses;
pub mod login;
pub mod logout;
pub mod register;
pub mod tasks;
pub mod whoami;
