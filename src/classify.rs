//! Statement classification
//!
//! Decides, one statement at a time, whether it is an allocation, a free, a
//! store, or nothing of interest, and extracts the descriptors the event
//! needs.

use crate::descriptor::{build_expr, build_expr_opt, BinOp, Expr};
use crate::destination::{build_destination, is_traced_store_target};
use crate::event::{AllocRecord, EventPayload, FreeRecord, StoreRecord};
use crate::filter::ProvenanceFilter;
use crate::ir::{Callee, Statement, StatementKind, Tree};

/// Functions whose calls produce events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedCallee {
    /// `malloc(size)`
    Malloc,
    /// `calloc(count, size)`
    Calloc,
    /// `realloc(ptr, size)`
    Realloc,
    /// `free(ptr)`
    Free,
}

impl TrackedCallee {
    /// Recognizes a callee by exact name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "malloc" => Some(TrackedCallee::Malloc),
            "calloc" => Some(TrackedCallee::Calloc),
            "realloc" => Some(TrackedCallee::Realloc),
            "free" => Some(TrackedCallee::Free),
            _ => None,
        }
    }

    /// Function name
    pub fn name(&self) -> &'static str {
        match self {
            TrackedCallee::Malloc => "malloc",
            TrackedCallee::Calloc => "calloc",
            TrackedCallee::Realloc => "realloc",
            TrackedCallee::Free => "free",
        }
    }

    /// Symbolic byte count requested by an allocator call; `None` for `free`.
    ///
    /// `calloc` always yields `count * size` as a product descriptor, even
    /// when both arguments are literals. Missing arguments become unknown.
    pub fn size_expr(&self, args: &[Tree]) -> Option<Expr> {
        let arg = |i: usize| build_expr_opt(args.get(i));
        match self {
            TrackedCallee::Malloc => Some(arg(0)),
            TrackedCallee::Calloc => Some(Expr::binary(BinOp::Mul, arg(0), arg(1))),
            TrackedCallee::Realloc => Some(arg(1)),
            TrackedCallee::Free => None,
        }
    }
}

/// Outcome of classifying one statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Location is unknown or under a system prefix; nothing was inspected
    NotUserCode,
    /// User code, but not an event
    Ignored,
    /// An event should be emitted with this payload
    Event(EventPayload),
}

/// Applies the provenance filter and the event rules to statements
#[derive(Debug, Clone, Default)]
pub struct StatementClassifier {
    filter: ProvenanceFilter,
}

impl StatementClassifier {
    /// Creates a classifier using the given filter
    pub fn new(filter: ProvenanceFilter) -> Self {
        Self { filter }
    }

    /// Classifies one statement
    pub fn classify(&self, stmt: &Statement) -> Classification {
        if !self.filter.is_user_code(&stmt.location) {
            return Classification::NotUserCode;
        }
        match classify_kind(&stmt.kind) {
            Some(payload) => Classification::Event(payload),
            None => Classification::Ignored,
        }
    }
}

/// Event rules without the provenance filter
pub fn classify_kind(kind: &StatementKind) -> Option<EventPayload> {
    match kind {
        StatementKind::Call { callee, lhs, args } => classify_call(callee, lhs.as_ref(), args),
        StatementKind::Assign { lhs, .. } => classify_assign(lhs),
        StatementKind::Other { .. } => None,
    }
}

/// Allocation/free rules for a call statement.
///
/// Indirect calls and unnamed callees are never resolved.
pub fn classify_call(callee: &Callee, lhs: Option<&Tree>, args: &[Tree]) -> Option<EventPayload> {
    let tracked = TrackedCallee::from_name(callee.direct_name()?)?;

    match tracked {
        TrackedCallee::Free => Some(EventPayload::Free(FreeRecord {
            pointer: build_expr_opt(args.first()),
        })),
        TrackedCallee::Malloc | TrackedCallee::Calloc | TrackedCallee::Realloc => {
            let size = tracked.size_expr(args)?;
            Some(EventPayload::Alloc(AllocRecord {
                callee: tracked.name().to_string(),
                destination: lhs.map(build_expr),
                size,
            }))
        }
    }
}

/// Store rule for an assignment to `lhs`
pub fn classify_assign(lhs: &Tree) -> Option<EventPayload> {
    if !is_traced_store_target(lhs) {
        return None;
    }
    let (destination, bytes) = build_destination(lhs);
    Some(EventPayload::Store(StoreRecord { destination, bytes }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::Destination;
    use crate::ir::{HostType, Location};

    fn user_loc() -> Location {
        Location::new("main.c", 10, 5)
    }

    fn classify(stmt: &Statement) -> Classification {
        StatementClassifier::default().classify(stmt)
    }

    #[test]
    fn test_malloc_with_result() {
        let stmt = Statement::call(
            user_loc(),
            "malloc",
            Some(Tree::ssa(Tree::typed_var("m", HostType::pointer()), 4)),
            vec![Tree::int(31)],
        );
        assert_eq!(
            classify(&stmt),
            Classification::Event(EventPayload::Alloc(AllocRecord {
                callee: "malloc".to_string(),
                destination: Some(Expr::var("m")),
                size: Expr::int(31),
            }))
        );
    }

    #[test]
    fn test_discarded_result_is_null_destination() {
        let stmt = Statement::call(
            user_loc(),
            "realloc",
            None,
            vec![Tree::var("p"), Tree::var("n")],
        );
        match classify(&stmt) {
            Classification::Event(EventPayload::Alloc(record)) => {
                assert_eq!(record.callee, "realloc");
                assert_eq!(record.destination, None);
                assert_eq!(record.size, Expr::var("n"));
            }
            other => panic!("expected alloc, got {:?}", other),
        }
    }

    #[test]
    fn test_calloc_stays_symbolic() {
        let stmt = Statement::call(
            user_loc(),
            "calloc",
            Some(Tree::var("a")),
            vec![Tree::int(4), Tree::int(8)],
        );
        match classify(&stmt) {
            Classification::Event(EventPayload::Alloc(record)) => {
                assert_eq!(
                    record.size,
                    Expr::binary(BinOp::Mul, Expr::int(4), Expr::int(8))
                );
            }
            other => panic!("expected alloc, got {:?}", other),
        }
    }

    #[test]
    fn test_arity_mismatch_degrades_to_unknown() {
        let free = Statement::call(user_loc(), "free", None, vec![]);
        assert_eq!(
            classify(&free),
            Classification::Event(EventPayload::Free(FreeRecord {
                pointer: Expr::Unknown,
            }))
        );

        let calloc = Statement::call(user_loc(), "calloc", None, vec![Tree::var("n")]);
        match classify(&calloc) {
            Classification::Event(EventPayload::Alloc(record)) => {
                assert_eq!(
                    record.size,
                    Expr::binary(BinOp::Mul, Expr::var("n"), Expr::Unknown)
                );
            }
            other => panic!("expected alloc, got {:?}", other),
        }
    }

    #[test]
    fn test_untracked_and_indirect_calls() {
        let printf = Statement::call(user_loc(), "printf", None, vec![Tree::other("string_cst")]);
        assert_eq!(classify(&printf), Classification::Ignored);

        let indirect = Statement {
            location: user_loc(),
            kind: StatementKind::Call {
                callee: Callee::Indirect(Box::new(Tree::var("fp"))),
                lhs: None,
                args: vec![Tree::var("p")],
            },
        };
        assert_eq!(classify(&indirect), Classification::Ignored);

        let unnamed = Statement {
            location: user_loc(),
            kind: StatementKind::Call {
                callee: Callee::Direct(None),
                lhs: None,
                args: vec![],
            },
        };
        assert_eq!(classify(&unnamed), Classification::Ignored);
    }

    #[test]
    fn test_store_to_array_element() {
        let stmt = Statement::assign(
            user_loc(),
            Tree::array_ref(
                Tree::var("dynamic_array"),
                Tree::var("i"),
                Some(HostType::int()),
            ),
            Tree::var("i"),
        );
        assert_eq!(
            classify(&stmt),
            Classification::Event(EventPayload::Store(StoreRecord {
                destination: Destination::Indexed {
                    base: Expr::var("dynamic_array"),
                    index: Expr::var("i"),
                    element_bytes: Some(4),
                },
                bytes: Some(4),
            }))
        );
    }

    #[test]
    fn test_store_to_temporary_is_ignored() {
        let stmt = Statement::assign(
            user_loc(),
            Tree::temp(5, Some(HostType::int())),
            Tree::binary(crate::ir::TreeBinOp::Plus, Tree::var("x"), Tree::var("y")),
        );
        assert_eq!(classify(&stmt), Classification::Ignored);
    }

    #[test]
    fn test_system_code_is_skipped() {
        let stmt = Statement::assign(
            Location::new("/usr/include/bits/stdio.h", 3, 1),
            Tree::var("x"),
            Tree::int(1),
        );
        assert_eq!(classify(&stmt), Classification::NotUserCode);

        let unknown = Statement::call(Location::Unknown, "malloc", None, vec![Tree::int(1)]);
        assert_eq!(classify(&unknown), Classification::NotUserCode);
    }

    #[test]
    fn test_other_statements_are_ignored() {
        assert_eq!(
            classify(&Statement::other(user_loc(), "return")),
            Classification::Ignored
        );
    }

    #[test]
    fn test_tracked_callee_names() {
        for name in ["malloc", "calloc", "realloc", "free"] {
            assert_eq!(TrackedCallee::from_name(name).map(|c| c.name()), Some(name));
        }
        assert_eq!(TrackedCallee::from_name("Malloc"), None);
        assert_eq!(TrackedCallee::from_name("aligned_alloc"), None);
    }
}
