//! Translation unit and basic block definitions

use super::statement::Statement;

/// Basic block: statements in host order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicBlock {
    /// Label identifying this basic block
    pub label: String,
    /// Statements in this block
    pub statements: Vec<Statement>,
}

impl BasicBlock {
    /// Create a new basic block with the given label
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            statements: Vec::new(),
        }
    }

    /// Appends a statement, builder style
    pub fn with(mut self, stmt: Statement) -> Self {
        self.statements.push(stmt);
        self
    }
}

/// Function body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Function {
    /// Function name; `None` when the host has no name for it
    pub name: Option<String>,
    /// Blocks in the order the host presents them
    pub blocks: Vec<BasicBlock>,
}

impl Function {
    /// Create an empty function
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            blocks: Vec::new(),
        }
    }

    /// Appends a block, builder style
    pub fn with_block(mut self, block: BasicBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Total statement count across all blocks
    pub fn statement_count(&self) -> usize {
        self.blocks.iter().map(|b| b.statements.len()).sum()
    }
}

/// One translation unit: the scope of a trace session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationUnit {
    /// Main source file name
    pub name: String,
    /// Functions in host order
    pub functions: Vec<Function>,
}

impl TranslationUnit {
    /// Create an empty unit
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            functions: Vec::new(),
        }
    }

    /// Appends a function, builder style
    pub fn with_function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }
}
