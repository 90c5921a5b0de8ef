//! cat2tbl library main entry point.

pub mod common;
pub mod convert;
pub mod error;
pub mod model;
pub mod tables;
pub mod tbl;
