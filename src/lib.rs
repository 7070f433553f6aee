pub mod batch;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod naming;
pub mod report;
pub mod scratch;
pub mod select;
pub mod tools;
pub mod util;
