//! Assignment destination descriptors
//!
//! Left-hand sides get a richer descriptor than plain expressions: array
//! elements, struct fields, dereferences and raw memory references are all
//! named here, and the static byte size of the write is resolved alongside.

use crate::descriptor::{build_expr, decl_display_name, Expr};
use crate::ir::{Tree, TreeKind};
use serde::{Deserialize, Serialize};

/// Field name used when the host reports an unnamed field
pub const UNNAMED_FIELD: &str = "<field>";

/// Destination descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "k")]
pub enum Destination {
    /// Named variable or parameter
    #[serde(rename = "var")]
    Named {
        /// Declaration name, `"?"` when anonymous
        name: String,
    },

    /// `base[index]`
    #[serde(rename = "index")]
    Indexed {
        /// Array expression
        base: Expr,
        /// Index expression
        index: Expr,
        /// Element size; the key is omitted when unknown
        #[serde(rename = "elem_bytes", default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        element_bytes: Option<u64>,
    },

    /// `base.field` or `base->field`
    #[serde(rename = "field")]
    Field {
        /// Aggregate expression
        base: Expr,
        /// Field name
        field: String,
        /// Best-effort: base looked like a dereference
        via_ptr: bool,
    },

    /// `*base`
    #[serde(rename = "deref")]
    Dereferenced {
        /// Pointer expression
        base: Expr,
    },

    /// `*(base + offset)`
    #[serde(rename = "mem_ref")]
    GenericMemory {
        /// Pointer expression
        base: Expr,
        /// Offset expression
        offset: Expr,
    },

    /// Unrecognized destination
    #[serde(rename = "unknown")]
    Unknown,
}

impl Destination {
    /// Creates a named destination
    pub fn named(name: &str) -> Self {
        Destination::Named {
            name: name.to_string(),
        }
    }
}

/// Whether a field access goes through a pointer (`s->f` rather than `s.f`).
///
/// Best-effort: decided from the syntactic shape of the base alone. The same
/// source can lower to different shapes across compiler versions, so a
/// `false` here does not prove the access is direct.
pub fn is_pointer_like_base(base: &Tree) -> bool {
    matches!(base.kind(), TreeKind::IndirectRef | TreeKind::MemRef)
}

/// Whether an assignment to `lhs` is a store worth tracing.
///
/// True for named variables, parameters, and the memory-reference shapes.
/// Writes to declaration-less temporaries are not.
pub fn is_traced_store_target(lhs: &Tree) -> bool {
    matches!(
        lhs.strip_ssa().kind(),
        TreeKind::Var
            | TreeKind::Parm
            | TreeKind::MemRef
            | TreeKind::ArrayRef
            | TreeKind::ComponentRef
            | TreeKind::IndirectRef
    )
}

/// Builds the descriptor for an assignment destination together with the
/// static byte size of the written type (`None` when not a compile-time
/// constant, or when the destination is unrecognized).
pub fn build_destination(lhs: &Tree) -> (Destination, Option<u64>) {
    let bytes = lhs.static_size();
    let lhs = lhs.strip_ssa();

    let dest = match lhs {
        Tree::Var(_) | Tree::Parm(_) => Destination::Named {
            name: decl_display_name(lhs),
        },
        Tree::ArrayRef { base, index, .. } => Destination::Indexed {
            base: build_expr(base),
            index: build_expr(index),
            element_bytes: lhs.static_size(),
        },
        Tree::ComponentRef { base, field, .. } => Destination::Field {
            base: build_expr(base),
            field: field.as_deref().unwrap_or(UNNAMED_FIELD).to_string(),
            via_ptr: is_pointer_like_base(base),
        },
        Tree::IndirectRef { base, .. } => Destination::Dereferenced {
            base: build_expr(base),
        },
        Tree::MemRef { base, offset, .. } => Destination::GenericMemory {
            base: build_expr(base),
            offset: build_expr(offset),
        },
        Tree::SsaName { .. }
        | Tree::IntegerCst { .. }
        | Tree::Binary { .. }
        | Tree::Nop { .. }
        | Tree::AddrOf { .. }
        | Tree::Other { .. } => return (Destination::Unknown, None),
    };

    (dest, bytes)
}
