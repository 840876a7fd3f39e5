//! Engine parameters

/// Value stack capacity, in value words.
pub const STACK_SIZE: usize = 128;

/// Size of one wire-level value word, in bytes.
pub const WORD_SIZE: usize = 4;

/// Default memory budget for a machine instance, in bytes.
///
/// Sized for a small-RAM device once the value stack, registries, heap
/// objects and bytecode bodies are all charged against it. Glue code for a
/// specific board picks its own figure through
/// [`crate::interpreter::Interpreter::with_memory_limit`].
pub const DEFAULT_MEM_LIMIT: usize = 64 * 1024;
