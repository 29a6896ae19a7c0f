pub mod adapters;
pub mod bus;
pub mod cli;
pub mod config;
pub mod container;
pub mod domain;
pub mod error;
pub mod ports;
pub mod presenter;
pub mod service;
pub mod transaction;

pub use error::{ReleaseError, Result};

#[cfg(test)]
pub mod test_helpers;
