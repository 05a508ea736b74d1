//! # Host IR Model
//!
//! The shapes a host compiler hands to the engine: expression trees,
//! statements with source locations, and the block/function/unit nesting that
//! fixes iteration order.
//!
//! ## Module Structure
//!
//! ```text
//! ir/
//! ├── mod.rs          # This file - module definition and re-exports
//! ├── tree.rs         # HostType, Decl, Tree, TreeKind, TreeBinOp
//! ├── statement.rs    # Location, Callee, Statement, StatementKind
//! └── program.rs      # BasicBlock, Function, TranslationUnit
//! ```
//!
//! ## Key Types
//!
//! - [`Tree`] - Expression or memory-reference node (owns its operands)
//! - [`Statement`] - One sequential operation with its source location
//! - [`TranslationUnit`] - Functions in the order the host presents them
//!
//! Trees are plain owned data. A host adapter converts its native nodes into
//! these once per statement; the engine never reaches back into the host.

mod program;
mod statement;
mod tree;

pub use program::{BasicBlock, Function, TranslationUnit};
pub use statement::{Callee, Location, Statement, StatementKind};
pub use tree::{Decl, HostType, Tree, TreeBinOp, TreeKind};
