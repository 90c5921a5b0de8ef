//! I/O helpers.

pub mod std;
