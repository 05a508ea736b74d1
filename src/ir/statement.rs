//! Statement definitions

use super::tree::Tree;

/// Source location of a statement as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Location {
    /// The host has no location for this statement
    #[default]
    Unknown,
    /// A resolved location; `file` may still be missing
    Known {
        /// Source file path
        file: Option<String>,
        /// 1-based line
        line: u32,
        /// 1-based column
        column: u32,
    },
}

impl Location {
    /// Creates a known location
    pub fn new(file: &str, line: u32, column: u32) -> Self {
        Location::Known {
            file: Some(file.to_string()),
            line,
            column,
        }
    }

    /// File path, when the host reported one
    pub fn file(&self) -> Option<&str> {
        match self {
            Location::Known { file, .. } => file.as_deref(),
            Location::Unknown => None,
        }
    }
}

/// Call target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callee {
    /// Call to a declared function; `None` when the declaration has no name
    Direct(Option<String>),
    /// Call through a function pointer or virtual dispatch
    Indirect(Box<Tree>),
}

impl Callee {
    /// Creates a direct call target
    pub fn named(name: &str) -> Self {
        Callee::Direct(Some(name.to_string()))
    }

    /// Name of a directly called function
    pub fn direct_name(&self) -> Option<&str> {
        match self {
            Callee::Direct(name) => name.as_deref(),
            Callee::Indirect(_) => None,
        }
    }
}

/// What a statement does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    /// `lhs = rhs...`; one operand for copies/unary ops, two for binary ops
    Assign {
        /// Destination
        lhs: Tree,
        /// Source operands
        rhs: Vec<Tree>,
    },
    /// `[lhs =] callee(args...)`
    Call {
        /// Call target
        callee: Callee,
        /// Assigned result, `None` when the return value is discarded
        lhs: Option<Tree>,
        /// Positional arguments
        args: Vec<Tree>,
    },
    /// Any other statement (conditions, returns, labels, ...)
    Other {
        /// Host statement code
        code: String,
    },
}

/// One IR statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Where the statement came from
    pub location: Location,
    /// Statement shape
    pub kind: StatementKind,
}

impl Statement {
    /// Creates `lhs = rhs`
    pub fn assign(location: Location, lhs: Tree, rhs: Tree) -> Self {
        Self {
            location,
            kind: StatementKind::Assign {
                lhs,
                rhs: vec![rhs],
            },
        }
    }

    /// Creates `[lhs =] name(args...)` for a directly called function
    pub fn call(location: Location, name: &str, lhs: Option<Tree>, args: Vec<Tree>) -> Self {
        Self {
            location,
            kind: StatementKind::Call {
                callee: Callee::named(name),
                lhs,
                args,
            },
        }
    }

    /// Creates a statement the engine does not model
    pub fn other(location: Location, code: &str) -> Self {
        Self {
            location,
            kind: StatementKind::Other {
                code: code.to_string(),
            },
        }
    }
}
