/// Invariant violations the engine can detect during execution.
///
/// A well-formed program image never triggers any of these; they exist so a
/// miscompiled or corrupted image surfaces as a diagnosable error instead of
/// memory unsafety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[non_exhaustive]
pub enum PanicReason {
    /// A push would move the stack pointer past the value stack.
    StackOverflow,
    /// A pop would move the stack pointer below the value stack.
    StackUnderflow,
    /// The stack pointer was not back at the stack base when `Halt` ran.
    UnbalancedStack,
    /// An instruction expected an integer word on the stack.
    IntegerExpected,
    /// An instruction expected an object reference on the stack.
    ObjectExpected,
    /// An update epilogue expected a saved instruction pointer on the stack.
    ReturnAddressExpected,
    /// `Ret` executed with no live call frame.
    CallFrameMissing,
    /// An update dispatch targeted a node with no installed bytecode body.
    NodeBodyMissing,
    /// A device-input dispatch targeted a user node.
    DeviceInputExpected,
    /// A bytecode body was installed over a device-input node.
    UserNodeExpected,
    /// The right operand of `Div` or `Mod` was zero.
    DivisionByZero,
}

impl std::error::Error for PanicReason {}
