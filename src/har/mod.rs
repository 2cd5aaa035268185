//! HTTP Archive (HAR) output.
//!
//! | Module | Description |
//! |--------|-------------|
//! | `model` | HAR 1.2 document types |
//! | `assembler` | Builds a document from collected entries |

// ============================================================================
// Submodules
// ============================================================================

/// Entries to document.
pub mod assembler;

/// HAR 1.2 document types.
pub mod model;

// ============================================================================
// Re-exports
// ============================================================================

pub use assembler::HarAssembler;
pub use model::{
    Cache, Content, Creator, Entry, HAR_VERSION, HarDocument, Headers, Log, QueryParam, Request,
    Response, Timings, UNKNOWN,
};
