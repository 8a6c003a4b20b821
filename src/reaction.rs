//! The reaction ABI consumed by the `EXE` opcode.
//!
//! The original scheduler stores a reaction's code address directly in a
//! register and reinterprets the register holding its argument as a raw
//! `void*`. Rust has no safe equivalent of that type pun, so this crate
//! keeps reactions in a parallel table and has `EXE` carry a table index
//! instead of a register-encoded function pointer (the option spec.md §9
//! recommends over type-punning). The argument stays a plain `u64` — the
//! VM never inspects it, matching the "opaque argument" contract.

use std::sync::Arc;

/// Index of a registered reaction in a [`ReactionTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReactionId(pub usize);

/// A reaction body: consumes one opaque `u64` argument, returns nothing.
/// Must not call back into the VM dispatch loop.
pub type Reaction = dyn Fn(u64) + Send + Sync;

/// The table `EXE` dispatches through.
///
/// Built once before [`crate::VirtualMachine::new`] and treated as
/// immutable afterwards, mirroring how instruction arrays are
/// compiler-emitted constants.
#[derive(Clone, Default)]
pub struct ReactionTable {
    reactions: Vec<Arc<Reaction>>,
}

impl ReactionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reaction body, returning the id `EXE` instructions use to
    /// refer to it.
    pub fn register<F>(&mut self, body: F) -> ReactionId
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        let id = ReactionId(self.reactions.len());
        self.reactions.push(Arc::new(body));
        id
    }

    pub fn len(&self) -> usize {
        self.reactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reactions.is_empty()
    }

    /// Invoke the reaction at `id` synchronously with `arg`.
    ///
    /// Panics if `id` is out of range; [`crate::VirtualMachine::new`]
    /// validates every `EXE` instruction's reaction id against this table
    /// before any worker runs, so this should never trigger in practice.
    pub fn call(&self, id: ReactionId, arg: u64) {
        (self.reactions[id.0])(arg);
    }
}
