//! The stack-machine IR instruction set and the shape of an emitted
//! [`Script`].
//!
//! Mirrors the closed instruction table the original bytecode layer
//! (`comp::as::Instruction`) and its block/script containers (`qil::
//! BasicBlock`, `qil::Script`) describe, collapsed into one enum of
//! discriminated operands instead of a class hierarchy with a `Kind` tag.
//! A [`BasicBlock`] is either being filled (its `terminator` is `None`) or
//! closed (exactly one [`Terminator`] appended); [`FunctionIr::push`] and
//! [`FunctionIr::terminate`] are the only ways to grow one, and both panic
//! if that discipline is violated.

use glint_sema::{GlobalId, LocalId, TypeId};
use serde::{Deserialize, Serialize};

/// Index of a basic block within one function body's block table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(u32);

impl BlockId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index into a [`Script`]'s string-literal pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringLiteralId(u32);

impl StringLiteralId {
    pub(crate) fn new(index: u32) -> Self {
        StringLiteralId(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies one of the finite, hard-coded binary-operator functions a
/// `+`/`-`/.../`==` expression can dispatch to once both operands have been
/// widened to a common type. Named after the widened operand types the way
/// the original runtime names its operator-function globals
/// (`StringPlusString`, `IntPlusInt`, `AnyPlusAny`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorId {
    AnyOp(AnyOp),
    SoftIntOp(ArithOp),
    SoftStringOp(StringOp),
    SoftBoolLogic(LogicOp),
    AnyPlusEquals,
}

/// The widened-to-`any` family: every arithmetic/relational/equality
/// operator has an `any`-typed fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnyOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// Operators valid once both operands are widened to `softint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// Operators valid once both operands are widened to `softstring`. Bitwise,
/// shift, and arithmetic-besides-`+` are not defined on strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StringOp {
    Add,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// `&&` / `||`, evaluated directly on `softbool` with no widening step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicOp {
    And,
    Or,
}

/// Identifies one of the finite built-in value conversions. `None` (no
/// variant) is represented at the call site by simply not emitting
/// `InvokeConversion` at all, per the "S = D: identity, no wrapper" rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConversionId {
    AnyToString,
    IntToString,
    IntToSoftBool,
    StringToSoftInt,
    IntToAny,
}

/// One instruction in a basic block. Every variant here corresponds to
/// exactly one row of the closed instruction table; operand shapes must not
/// drift from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Op {
    ConstInt(i64),
    ConstString(StringLiteralId),
    LocalGet(LocalId),
    LocalSet(LocalId),
    GlobalGet(GlobalId),
    GlobalSet(GlobalId),
    GlobalInit(GlobalId),
    GlobalReadLock(GlobalId),
    GlobalReadUnlock(GlobalId),
    GlobalWriteLock(GlobalId),
    GlobalWriteUnlock(GlobalId),
    RefInc,
    RefDec,
    RefDecNoexcept,
    InvokeBinaryOperator(OperatorId),
    InvokeConversion(ConversionId),
    LifetimeStart(LocalId),
    LifetimeEnd(LocalId),
    LandingPad(Option<LocalId>),
}

impl Op {
    /// Whether this instruction may transfer control to a landing pad if
    /// one is installed. Matches the "May throw" column of the closed
    /// instruction table.
    pub fn may_throw(&self) -> bool {
        matches!(
            self,
            Op::GlobalInit(_)
                | Op::RefDec
                | Op::InvokeBinaryOperator(_)
                | Op::InvokeConversion(_)
        )
    }
}

/// One instruction plus the landing-pad block control transfers to if it
/// throws and no handler further up already caught it. Only instructions
/// for which [`Op::may_throw`] holds ever carry `Some`; the emitter
/// enforces this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub op: Op,
    pub lpad: Option<BlockId>,
}

/// Closes a basic block. Every block has exactly one, appended last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Terminator {
    /// Unconditional successor.
    Jump(BlockId),
    /// Consumes one `softbool` off the stack; takes `on_true` if it is
    /// true, `on_false` otherwise.
    Branch { on_true: BlockId, on_false: BlockId },
    /// Consumes one value off the stack and returns it.
    Ret,
    RetVoid,
    /// Continues unwinding past this function after cleanup has run.
    ResumeUnwind,
}

/// A sequence of non-terminator instructions, closed by exactly one
/// [`Terminator`]. `terminator` is `None` while the block is still being
/// filled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlock {
    pub instructions: Vec<Instruction>,
    pub terminator: Option<Terminator>,
}

impl BasicBlock {
    fn open() -> Self {
        BasicBlock { instructions: Vec::new(), terminator: None }
    }

    pub fn is_closed(&self) -> bool {
        self.terminator.is_some()
    }
}

/// One function body: a control-flow graph of basic blocks plus the number
/// of local-variable slots its activation frame needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionIr {
    pub blocks: Vec<BasicBlock>,
    pub entry: BlockId,
    pub local_count: usize,
}

impl FunctionIr {
    pub fn new() -> (Self, BlockId) {
        let entry = BlockId(0);
        (FunctionIr { blocks: vec![BasicBlock::open()], entry, local_count: 0 }, entry)
    }

    /// Allocates a new, open block, returning its id.
    pub fn new_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(BasicBlock::open());
        id
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.index()]
    }

    /// Appends a non-terminator instruction to `block`.
    ///
    /// # Panics
    ///
    /// Panics if `block` is already closed, matching the "non-terminator
    /// instructions may not be appended to a closed block" rule.
    pub fn push(&mut self, block: BlockId, op: Op, lpad: Option<BlockId>) {
        let b = &mut self.blocks[block.index()];
        assert!(!b.is_closed(), "cannot append an instruction to a closed block");
        debug_assert!(lpad.is_none() || op.may_throw(), "lpad set on an instruction that cannot throw");
        b.instructions.push(Instruction { op, lpad });
    }

    /// Closes `block` with `terminator`.
    ///
    /// # Panics
    ///
    /// Panics if `block` is already closed.
    pub fn terminate(&mut self, block: BlockId, terminator: Terminator) {
        let b = &mut self.blocks[block.index()];
        assert!(!b.is_closed(), "block already has a terminator");
        b.terminator = Some(terminator);
    }
}

impl Default for FunctionIr {
    fn default() -> Self {
        Self::new().0
    }
}

/// One free-function or synthesized entry point's exported shape: its
/// declared parameter/return types alongside the lowered body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<TypeId>,
    pub return_type: TypeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFunction {
    pub name: String,
    pub signature: Signature,
    pub body: FunctionIr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalDecl {
    pub name: String,
    pub ty: TypeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StringLiteral {
    pub value: String,
}

/// The complete artifact of one successful compilation: everything the
/// pipeline needs to hand off to a backend or a persistence layer. Per the
/// core's contract, a `Script` is only ever produced for a compilation that
/// reported zero `Error`-level diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub strings: Vec<StringLiteral>,
    pub globals: Vec<GlobalDecl>,
    pub user_functions: Vec<UserFunction>,
    /// Synthesized entry point: every free-floating top-level statement,
    /// prefixed by a `GlobalInit` prologue for every global with an
    /// initializer, in source order.
    pub top_level: FunctionIr,
}
