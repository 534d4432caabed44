//! AST node model for the Paper language.
//!
//! Nodes are built once during a single parse pass and never mutated
//! afterwards. Ownership is strictly tree-shaped: a block exclusively owns its
//! clauses and their nodes. Execution of instructions and of the executable
//! block forms belongs to the host interpreter; the only obligation met here
//! is the `execute` capability every node exposes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One `|`-delimited alternative body inside a block. The grammar guarantees
/// every clause holds at least one node.
pub type Clause = Vec<Node>;

/// One source line: the top-level nodes parsed between linebreaks.
pub type Line = Vec<Node>;

/// A parsed Paper program: the ordered line groups of the source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub lines: Vec<Line>,
}

impl Program {
    /// Reconstructs the surface syntax of the whole program.
    pub fn pretty(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.iter().map(Node::pretty).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}

/// A value on the interpreter's stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Text(String),
    /// A pushed block literal, carried unexecuted.
    Block(Vec<Clause>),
}

/// The closed set of Paper expression nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    StringLiteral(String),
    IntegerLiteral(i64),
    /// A primitive operation code, dispatched by the host instruction table.
    Instruction(char),
    /// A pushable block value; not executed at parse time.
    BlockLiteral(Vec<Clause>),
    MapBlock(Vec<Clause>),
    RepeatBlock(Vec<Clause>),
    DecisionBlock(Vec<Clause>),
}

impl Node {
    /// Apply this node to the value stack and return the next line index.
    ///
    /// Literals push their value. Instruction dispatch and the semantics of
    /// the map/repeat/decision blocks live in the host interpreter, so those
    /// nodes leave the machine untouched here.
    pub fn execute(&self, stack: &mut Vec<Value>, current_line: usize) -> usize {
        match self {
            Node::StringLiteral(text) => {
                stack.push(Value::Text(text.clone()));
                current_line
            }
            Node::IntegerLiteral(n) => {
                stack.push(Value::Int(*n));
                current_line
            }
            Node::BlockLiteral(clauses) => {
                stack.push(Value::Block(clauses.clone()));
                current_line
            }
            Node::Instruction(_)
            | Node::MapBlock(_)
            | Node::RepeatBlock(_)
            | Node::DecisionBlock(_) => current_line,
        }
    }

    /// Reconstructs the surface syntax of this node.
    pub fn pretty(&self) -> String {
        match self {
            Node::StringLiteral(text) => format!("\"{text}\""),
            Node::IntegerLiteral(n) if (0..=9).contains(n) => n.to_string(),
            Node::IntegerLiteral(n) => format!("#{n}"),
            Node::Instruction(c) => c.to_string(),
            Node::BlockLiteral(clauses) => Self::pretty_block('{', clauses),
            Node::MapBlock(clauses) => Self::pretty_block('M', clauses),
            Node::RepeatBlock(clauses) => Self::pretty_block('R', clauses),
            Node::DecisionBlock(clauses) => Self::pretty_block('?', clauses),
        }
    }

    fn pretty_block(marker: char, clauses: &[Clause]) -> String {
        let body = clauses
            .iter()
            .map(|clause| clause.iter().map(Node::pretty).collect::<String>())
            .collect::<Vec<_>>()
            .join("|");
        format!("{marker}{body}}}")
    }

    /// The node kind as a string, for diagnostics and debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::StringLiteral(_) => "StringLiteral",
            Node::IntegerLiteral(_) => "IntegerLiteral",
            Node::Instruction(_) => "Instruction",
            Node::BlockLiteral(_) => "BlockLiteral",
            Node::MapBlock(_) => "MapBlock",
            Node::RepeatBlock(_) => "RepeatBlock",
            Node::DecisionBlock(_) => "DecisionBlock",
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}
