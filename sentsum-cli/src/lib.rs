// All summarization logic lives in sentsum-core.
// This CLI is a thin wrapper: argument parsing, console output, stage dumps.

pub mod output;

// Re-export core types for convenience
pub use sentsum_core::*;
