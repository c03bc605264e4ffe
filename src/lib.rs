//! `hotelflow` tracks the finances of a portfolio of hotel projects: the projects themselves,
//! their income and expense transactions, the user accounts allowed to see or change them, and a
//! display theme. Everything is persisted locally as JSON documents in a key/value store.
//!
//! The [`App`] type owns all state and is the only way to mutate it.
mod app;
pub mod args;
pub mod commands;
mod config;
pub mod dashboard;
mod error;
pub mod export;
mod fs;
mod ledger;
pub mod model;
mod session;
pub mod store;
mod utils;


pub use app::{App, AuthSettings, LOGIN_REJECTED};
pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use ledger::{Ledger, ProjectDeletion, UNKNOWN_PROJECT};
pub use session::Session;
