//! kakeibo: a household budgeting client core.
//!
//! Transactions live in a document store behind the `Store` trait. The `Controller` keeps the
//! canonical copy in memory, and everything shown to the user (monthly and daily lists, balances,
//! calendar entries and chart series) is derived from it on read.

pub mod args;
pub mod commands;
mod config;
pub mod controller;
mod error;
pub mod finance;
pub mod form;
pub mod model;
pub mod period;
pub mod store;
mod utils;
pub mod validation;
pub mod view;


pub use config::Config;
pub use controller::{Controller, LoadState, State};
pub use error::{Error, Fault, Operation, Result};
pub use store::{Mode, Store, StoreError};
