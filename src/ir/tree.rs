//! Expression tree definitions

/// Type attached to a tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostType {
    /// Type name as the host spells it (informational only)
    pub name: String,
    /// Compile-time-constant size in bytes, `None` for variable-sized or
    /// incomplete types
    pub size: Option<u64>,
}

impl HostType {
    /// Creates a type with a constant byte size
    pub fn sized(name: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            size: Some(size),
        }
    }

    /// Creates a type whose size the host cannot report
    pub fn unsized_type(name: &str) -> Self {
        Self {
            name: name.to_string(),
            size: None,
        }
    }

    /// `int` on the usual LP64 hosts
    pub fn int() -> Self {
        Self::sized("int", 4)
    }

    /// Any data pointer on the usual LP64 hosts
    pub fn pointer() -> Self {
        Self::sized("void *", 8)
    }
}

/// Variable or parameter declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl {
    /// Source-level name; `None` for compiler-introduced declarations
    pub name: Option<String>,
    /// Declared type
    pub ty: Option<HostType>,
}

impl Decl {
    /// Creates a named declaration
    pub fn named(name: &str, ty: Option<HostType>) -> Self {
        Self {
            name: Some(name.to_string()),
            ty,
        }
    }

    /// Creates an anonymous declaration
    pub fn anonymous(ty: Option<HostType>) -> Self {
        Self { name: None, ty }
    }
}

/// Binary operator codes the host may present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeBinOp {
    /// Addition
    Plus,
    /// Subtraction
    Minus,
    /// Multiplication
    Mult,
    /// Truncating division
    Div,
    /// Remainder
    Mod,
    /// Bitwise and
    BitAnd,
    /// Bitwise or
    BitOr,
    /// Bitwise xor
    BitXor,
    /// Left shift
    Shl,
    /// Right shift
    Shr,
}

/// Fieldless discriminant of [`Tree`], used where only the syntactic kind matters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    /// Variable declaration
    Var,
    /// Parameter declaration
    Parm,
    /// Versioned (SSA) reference
    SsaName,
    /// Integer literal
    IntegerCst,
    /// Binary arithmetic
    Binary,
    /// Value-preserving conversion
    Nop,
    /// Address-of
    AddrOf,
    /// Array element access
    ArrayRef,
    /// Struct/union field access
    ComponentRef,
    /// Pointer dereference
    IndirectRef,
    /// Pointer plus byte offset
    MemRef,
    /// Anything else
    Other,
}

/// Host expression / memory-reference node
///
/// Every variant owns its operands; there is no sharing between trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree {
    /// Variable (local, static or global)
    Var(Decl),
    /// Function parameter
    Parm(Decl),
    /// Versioned reference to a base variable: `x_3`.
    /// `var` is `None` for compiler temporaries with no declaration.
    SsaName {
        /// Underlying declaration (`Var` or `Parm`)
        var: Option<Box<Tree>>,
        /// Definition-site version number
        version: u32,
        /// Type of the value
        ty: Option<HostType>,
    },
    /// Integer literal; hosts may present values wider than 64 bits
    IntegerCst {
        /// Literal value
        value: i128,
        /// Literal type
        ty: Option<HostType>,
    },
    /// Binary arithmetic: `lhs op rhs`
    Binary {
        /// Operator
        op: TreeBinOp,
        /// Left operand
        lhs: Box<Tree>,
        /// Right operand
        rhs: Box<Tree>,
        /// Result type
        ty: Option<HostType>,
    },
    /// Conversion that does not change the value (`(T *) p`)
    Nop {
        /// Converted operand
        operand: Box<Tree>,
        /// Target type
        ty: Option<HostType>,
    },
    /// Address-of: `&operand`
    AddrOf {
        /// Operand whose address is taken
        operand: Box<Tree>,
        /// Pointer type
        ty: Option<HostType>,
    },
    /// Array element: `base[index]`; `ty` is the element type
    ArrayRef {
        /// Array expression
        base: Box<Tree>,
        /// Index expression
        index: Box<Tree>,
        /// Element type
        ty: Option<HostType>,
    },
    /// Field access: `base.field`, or `base->field` when `base` is a dereference
    ComponentRef {
        /// Aggregate expression
        base: Box<Tree>,
        /// Field name; `None` for unnamed fields
        field: Option<String>,
        /// Field type
        ty: Option<HostType>,
    },
    /// Dereference: `*base`
    IndirectRef {
        /// Pointer expression
        base: Box<Tree>,
        /// Pointee type
        ty: Option<HostType>,
    },
    /// Generalized memory reference: `*(base + offset)`
    MemRef {
        /// Pointer expression
        base: Box<Tree>,
        /// Byte offset expression
        offset: Box<Tree>,
        /// Accessed type
        ty: Option<HostType>,
    },
    /// Any node the engine does not model (string/real constants, calls,
    /// comparisons, bit-field refs, ...). `code` is the host's name for it.
    Other {
        /// Host node code
        code: String,
        /// Node type
        ty: Option<HostType>,
    },
}

impl Tree {
    /// Creates a named variable without type information
    pub fn var(name: &str) -> Self {
        Tree::Var(Decl::named(name, None))
    }

    /// Creates a named variable of the given type
    pub fn typed_var(name: &str, ty: HostType) -> Self {
        Tree::Var(Decl::named(name, Some(ty)))
    }

    /// Creates a named parameter of the given type
    pub fn parm(name: &str, ty: Option<HostType>) -> Self {
        Tree::Parm(Decl::named(name, ty))
    }

    /// Creates an `int` literal
    pub fn int(value: i128) -> Self {
        Tree::IntegerCst {
            value,
            ty: Some(HostType::int()),
        }
    }

    /// Wraps a declaration in a versioned reference
    pub fn ssa(var: Tree, version: u32) -> Self {
        let ty = var.ty().cloned();
        Tree::SsaName {
            var: Some(Box::new(var)),
            version,
            ty,
        }
    }

    /// Creates a versioned compiler temporary with no declaration
    pub fn temp(version: u32, ty: Option<HostType>) -> Self {
        Tree::SsaName {
            var: None,
            version,
            ty,
        }
    }

    /// Creates a binary expression without a result type
    pub fn binary(op: TreeBinOp, lhs: Tree, rhs: Tree) -> Self {
        Tree::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            ty: None,
        }
    }

    /// Creates a value-preserving conversion
    pub fn nop(operand: Tree, ty: Option<HostType>) -> Self {
        Tree::Nop {
            operand: Box::new(operand),
            ty,
        }
    }

    /// Creates `&operand`
    pub fn addr_of(operand: Tree) -> Self {
        Tree::AddrOf {
            operand: Box::new(operand),
            ty: Some(HostType::pointer()),
        }
    }

    /// Creates `base[index]` with the given element type
    pub fn array_ref(base: Tree, index: Tree, ty: Option<HostType>) -> Self {
        Tree::ArrayRef {
            base: Box::new(base),
            index: Box::new(index),
            ty,
        }
    }

    /// Creates `base.field`
    pub fn component_ref(base: Tree, field: &str, ty: Option<HostType>) -> Self {
        Tree::ComponentRef {
            base: Box::new(base),
            field: Some(field.to_string()),
            ty,
        }
    }

    /// Creates `*base`
    pub fn indirect_ref(base: Tree, ty: Option<HostType>) -> Self {
        Tree::IndirectRef {
            base: Box::new(base),
            ty,
        }
    }

    /// Creates `*(base + offset)`
    pub fn mem_ref(base: Tree, offset: Tree, ty: Option<HostType>) -> Self {
        Tree::MemRef {
            base: Box::new(base),
            offset: Box::new(offset),
            ty,
        }
    }

    /// Creates an unmodelled node
    pub fn other(code: &str) -> Self {
        Tree::Other {
            code: code.to_string(),
            ty: None,
        }
    }

    /// Returns the syntactic kind of this node
    pub fn kind(&self) -> TreeKind {
        match self {
            Tree::Var(_) => TreeKind::Var,
            Tree::Parm(_) => TreeKind::Parm,
            Tree::SsaName { .. } => TreeKind::SsaName,
            Tree::IntegerCst { .. } => TreeKind::IntegerCst,
            Tree::Binary { .. } => TreeKind::Binary,
            Tree::Nop { .. } => TreeKind::Nop,
            Tree::AddrOf { .. } => TreeKind::AddrOf,
            Tree::ArrayRef { .. } => TreeKind::ArrayRef,
            Tree::ComponentRef { .. } => TreeKind::ComponentRef,
            Tree::IndirectRef { .. } => TreeKind::IndirectRef,
            Tree::MemRef { .. } => TreeKind::MemRef,
            Tree::Other { .. } => TreeKind::Other,
        }
    }

    /// Returns the type the host attached to this node
    pub fn ty(&self) -> Option<&HostType> {
        match self {
            Tree::Var(decl) | Tree::Parm(decl) => decl.ty.as_ref(),
            Tree::SsaName { ty, .. }
            | Tree::IntegerCst { ty, .. }
            | Tree::Binary { ty, .. }
            | Tree::Nop { ty, .. }
            | Tree::AddrOf { ty, .. }
            | Tree::ArrayRef { ty, .. }
            | Tree::ComponentRef { ty, .. }
            | Tree::IndirectRef { ty, .. }
            | Tree::MemRef { ty, .. }
            | Tree::Other { ty, .. } => ty.as_ref(),
        }
    }

    /// Compile-time-constant byte size of this node's type, if known
    pub fn static_size(&self) -> Option<u64> {
        self.ty().and_then(|ty| ty.size)
    }

    /// Resolves a versioned reference to its base declaration.
    ///
    /// Version numbers are dropped. Temporaries without a declaration are
    /// returned unchanged.
    pub fn strip_ssa(&self) -> &Tree {
        match self {
            Tree::SsaName { var: Some(var), .. } => var,
            other => other,
        }
    }

    /// Declaration name for `Var`/`Parm` nodes
    pub fn decl_name(&self) -> Option<&str> {
        match self {
            Tree::Var(decl) | Tree::Parm(decl) => decl.name.as_deref(),
            _ => None,
        }
    }
}
