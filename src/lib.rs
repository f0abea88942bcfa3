//! Parley: a terminal chat client with a simulated assistant backend.

pub mod backend;
pub mod core;
pub mod tui;

#[cfg(test)]
pub mod test_support;
