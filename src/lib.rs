// select! over sixteen endpoints plus the cancellation case
#![recursion_limit = "256"]

pub mod config;
pub mod demo;
pub mod error;
pub mod io;
pub mod utils;

pub mod prelude;
