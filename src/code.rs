//! Bytecode addressing
//!
//! Loaded bytecode lives in four kinds of bodies: the update program, the
//! transient scratch buffer (immediate-eval frames and the initialization
//! expression), per-node updater bodies and function bodies. An executing
//! instruction pointer is a segment plus a byte offset, and a saved
//! instruction pointer on the value stack is the same pair wrapped in a
//! value word.

/// Which bytecode body an address points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeSeg {
    /// The stored update program.
    Update,
    /// The transient buffer holding an eval frame or init expression.
    Scratch,
    /// The updater body of the node with this index.
    Node(u32),
    /// The function body with this index.
    Func(u32),
}

/// An instruction address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodeAddr {
    pub(crate) seg: CodeSeg,
    pub(crate) offset: u32,
}

impl CodeAddr {
    /// The first instruction of a body.
    pub(crate) const fn entry(seg: CodeSeg) -> Self {
        Self { seg, offset: 0 }
    }
}
