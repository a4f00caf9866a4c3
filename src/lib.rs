//! Sunrank Library
//!
//! Ranks cities by favorable daytime weather. The modules are exposed for use
//! by the binary and by integration tests.

pub mod calculator;
pub mod cli;
pub mod data;
pub mod logging;
pub mod pipeline;
pub mod storage;
