//! # Memlog - Memory Event Tracing for Compiler IR
//!
//! Memlog inspects the IR statements of one translation unit and writes a
//! JSON Lines trace of the memory-relevant ones: allocations, frees and
//! stores, each tagged with its source location and enclosing function. A
//! visualizer replays the trace to draw the program's stack and heap.
//!
//! ## Architecture
//!
//! ```text
//! Statement → ProvenanceFilter → StatementClassifier → Emitter → Sink
//!                                   │
//!                                   ├── build_expr         (descriptor)
//!                                   └── build_destination  (destination)
//! ```
//!
//! ### Main Components
//!
//! - [`ir`] - Host IR shapes: trees, statements, blocks, functions
//! - [`ProvenanceFilter`] - Skips statements outside user code
//! - [`build_expr`] / [`build_destination`] - IR trees to descriptors
//! - [`StatementClassifier`] - Store / alloc / free decisions
//! - [`Emitter`] - Site numbering and serialization
//! - [`Sink`] - File, stderr or in-memory output
//! - [`TraceSession`] - All of the above for one translation unit
//!
//! ## Usage
//!
//! ```rust
//! use memlog::ir::{BasicBlock, Function, HostType, Location, Statement, TranslationUnit, Tree};
//! use memlog::{read_events, EventKind, Sink, TraceOptions, TraceSession};
//!
//! let at = |line| Location::new("main.c", line, 5);
//! let p = Tree::typed_var("p", HostType::pointer());
//!
//! let unit = TranslationUnit::new("main.c").with_function(
//!     Function::new("main").with_block(
//!         BasicBlock::new("bb2")
//!             .with(Statement::assign(at(3), Tree::typed_var("x", HostType::int()), Tree::int(6)))
//!             .with(Statement::call(at(4), "malloc", Some(p.clone()), vec![Tree::int(31)]))
//!             .with(Statement::call(at(5), "free", None, vec![p])),
//!     ),
//! );
//!
//! let mut session = TraceSession::with_sink(&TraceOptions::default(), Sink::memory());
//! session.process_unit(&unit);
//!
//! let events = read_events(session.captured().unwrap()).unwrap();
//! let kinds: Vec<EventKind> = events.iter().map(|e| e.kind()).collect();
//! assert_eq!(kinds, [EventKind::Store, EventKind::Alloc, EventKind::Free]);
//! ```
//!
//! ## Wire Format
//!
//! One object per line, `v` selects the schema and `site` strictly increases:
//!
//! ```text
//! {"v":1,"site":1,"kind":"store","loc":{"file":"main.c","line":3,"col":5},"func":"main","store":{"lhs":{"k":"var","name":"x"},"bytes":4}}
//! ```
//!
//! Nothing in the engine aborts the host: unresolvable data degrades to
//! `"<unknown>"`, `"?"`, `null` or `{"k":"unknown"}`.

/// Version of the Memlog crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod classify;
pub mod config;
pub mod debug;
pub mod descriptor;
pub mod destination;
pub mod emitter;
pub mod error;
pub mod event;
pub mod filter;
pub mod ir;
pub mod json;
pub mod reader;
pub mod session;
pub mod sink;

// Re-export main types
pub use classify::{Classification, StatementClassifier, TrackedCallee};
pub use config::{session_output_path, TraceOptions};
pub use descriptor::{build_expr, BinOp, Expr, IntValue};
pub use destination::{build_destination, Destination};
pub use emitter::Emitter;
pub use error::{Error, Result};
pub use event::{Event, EventKind, EventPayload, SiteCounter, SourceLocation};
pub use filter::ProvenanceFilter;
pub use reader::{parse_line, read_events};
pub use session::{SessionSummary, TraceSession};
pub use sink::Sink;
