pub mod error;

pub mod arn;
pub mod cache;
pub mod client;
pub mod config;
pub mod env;
pub mod launch;
pub mod session;

pub mod cmd;

#[cfg(test)]
pub(crate) mod dev;
