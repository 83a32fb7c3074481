#![allow(dead_code)]

pub mod harness;

// Re-export commonly used test utilities
pub use harness::{context_with, heuristic_context, TestHarness};
