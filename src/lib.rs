//! A local gateway that serves a canister's pages to the browser and refuses any
//! body the canister did not certify.

#[macro_use]
extern crate log;

pub mod common;
pub mod error;
pub mod gateway;
pub mod models;
