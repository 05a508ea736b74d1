//! Expression descriptors
//!
//! Converts host expression trees into [`Expr`], the canonical tree that is
//! written into the trace. Only a handful of shapes are recognized; every
//! other node, and a missing operand, becomes [`Expr::Unknown`].
//!
//! ```text
//! x_3 + 4        →  {"k":"bin","op":"+","a":{"k":"var","name":"x"},"b":{"k":"int","v":4}}
//! (long) &buf    →  {"k":"cast","to":"<nop>","x":{"k":"addr","x":{"k":"var","name":"buf"}}}
//! ```

use crate::ir::{Tree, TreeBinOp};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Name used for declarations the host left anonymous
pub const ANONYMOUS_NAME: &str = "?";

/// Wire value of an integer literal that does not fit in `i64`
pub const OVERFLOW_MARKER: &str = "<bigint>";

/// Integer literal value
///
/// Serializes as a JSON number, or as the string `"<bigint>"` when the host
/// literal is out of the signed 64-bit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntValue {
    /// Value fits in `i64`
    Exact(i64),
    /// Value was out of range and is not carried
    Overflow,
}

impl IntValue {
    /// Narrows a host literal, degrading to [`IntValue::Overflow`]
    pub fn from_wide(value: i128) -> Self {
        i64::try_from(value).map_or(IntValue::Overflow, IntValue::Exact)
    }

    /// Exact value, if carried
    pub fn exact(&self) -> Option<i64> {
        match self {
            IntValue::Exact(v) => Some(*v),
            IntValue::Overflow => None,
        }
    }
}

impl Serialize for IntValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            IntValue::Exact(v) => serializer.serialize_i64(*v),
            IntValue::Overflow => serializer.serialize_str(OVERFLOW_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for IntValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Marker(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(v) => Ok(IntValue::Exact(v)),
            Raw::Marker(s) if s == OVERFLOW_MARKER => Ok(IntValue::Overflow),
            Raw::Marker(s) => Err(D::Error::custom(format!(
                "expected integer or {:?}, got {:?}",
                OVERFLOW_MARKER, s
            ))),
        }
    }
}

/// Arithmetic operators carried in descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    /// `+`
    #[serde(rename = "+")]
    Add,
    /// `-`
    #[serde(rename = "-")]
    Sub,
    /// `*`
    #[serde(rename = "*")]
    Mul,
}

impl BinOp {
    /// Maps a host operator; only `+ - *` are carried
    pub fn from_tree_op(op: TreeBinOp) -> Option<Self> {
        match op {
            TreeBinOp::Plus => Some(BinOp::Add),
            TreeBinOp::Minus => Some(BinOp::Sub),
            TreeBinOp::Mult => Some(BinOp::Mul),
            TreeBinOp::Div
            | TreeBinOp::Mod
            | TreeBinOp::BitAnd
            | TreeBinOp::BitOr
            | TreeBinOp::BitXor
            | TreeBinOp::Shl
            | TreeBinOp::Shr => None,
        }
    }

    /// Operator symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
        }
    }
}

/// Target of a cast descriptor. Only value-preserving conversions are
/// recognized and the target type is not tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CastTarget {
    /// Value-preserving conversion
    #[default]
    #[serde(rename = "<nop>")]
    Nop,
}

/// Expression descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "k")]
pub enum Expr {
    /// Named variable or parameter
    #[serde(rename = "var")]
    Variable {
        /// Declaration name, `"?"` when anonymous
        name: String,
    },

    /// Integer literal
    #[serde(rename = "int")]
    IntegerConstant {
        /// Literal value
        #[serde(rename = "v")]
        value: IntValue,
    },

    /// `a op b`, operands in source order
    #[serde(rename = "bin")]
    BinaryOp {
        /// Operator
        op: BinOp,
        /// Left operand
        #[serde(rename = "a")]
        left: Box<Expr>,
        /// Right operand
        #[serde(rename = "b")]
        right: Box<Expr>,
    },

    /// Value-preserving conversion
    #[serde(rename = "cast")]
    Cast {
        /// Always `"<nop>"`
        #[serde(rename = "to", default)]
        target: CastTarget,
        /// Converted expression
        #[serde(rename = "x")]
        inner: Box<Expr>,
    },

    /// `&x`
    #[serde(rename = "addr")]
    AddressOf {
        /// Operand
        #[serde(rename = "x")]
        inner: Box<Expr>,
    },

    /// Unrecognized or missing expression
    #[serde(rename = "unknown")]
    Unknown,
}

impl Expr {
    /// Creates a variable descriptor
    pub fn var(name: &str) -> Self {
        Expr::Variable {
            name: name.to_string(),
        }
    }

    /// Creates an exact integer descriptor
    pub fn int(value: i64) -> Self {
        Expr::IntegerConstant {
            value: IntValue::Exact(value),
        }
    }

    /// Creates a binary descriptor from already-built operands
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates a cast descriptor
    pub fn cast(inner: Expr) -> Self {
        Expr::Cast {
            target: CastTarget::Nop,
            inner: Box::new(inner),
        }
    }

    /// Creates an address-of descriptor
    pub fn addr(inner: Expr) -> Self {
        Expr::AddressOf {
            inner: Box::new(inner),
        }
    }
}

/// Name of a `Var`/`Parm` node, with the anonymous placeholder applied
pub(crate) fn decl_display_name(tree: &Tree) -> String {
    tree.decl_name().unwrap_or(ANONYMOUS_NAME).to_string()
}

/// Builds the descriptor for an expression tree.
///
/// Versioned references are resolved to their declaration first. Never fails:
/// anything outside the recognized shapes yields [`Expr::Unknown`].
pub fn build_expr(tree: &Tree) -> Expr {
    let tree = tree.strip_ssa();
    match tree {
        Tree::Var(_) | Tree::Parm(_) => Expr::Variable {
            name: decl_display_name(tree),
        },
        Tree::IntegerCst { value, .. } => Expr::IntegerConstant {
            value: IntValue::from_wide(*value),
        },
        Tree::Binary { op, lhs, rhs, .. } => match BinOp::from_tree_op(*op) {
            Some(op) => Expr::binary(op, build_expr(lhs), build_expr(rhs)),
            None => Expr::Unknown,
        },
        Tree::Nop { operand, .. } => Expr::cast(build_expr(operand)),
        Tree::AddrOf { operand, .. } => Expr::addr(build_expr(operand)),
        Tree::SsaName { .. }
        | Tree::ArrayRef { .. }
        | Tree::ComponentRef { .. }
        | Tree::IndirectRef { .. }
        | Tree::MemRef { .. }
        | Tree::Other { .. } => Expr::Unknown,
    }
}

/// [`build_expr`] for an operand that may be missing
pub fn build_expr_opt(tree: Option<&Tree>) -> Expr {
    tree.map_or(Expr::Unknown, build_expr)
}
