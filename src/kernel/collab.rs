//! Narrow views of the runtime subsystems this layer is wired to. Their
//! implementations live elsewhere; only what the execution context carries
//! is described here.
//!
//! This layer only holds these handles. Their methods are host-facing: the
//! scheduler and embedders reach them through `ExecutionContext` accessors.
//! Nothing here calls into the memory manager; it reports to telemetry on
//! its own.

use std::collections::HashMap;

/// Linear-memory address of a function, closure or static.
pub type Address = u64;

/// Opaque index into the stable pointer table.
pub type StablePtr = u32;

/// Heap owner. Reports megablock activity to the telemetry collector on its
/// own schedule.
pub trait MemoryManager: Send + Sync {
    fn megablocks_in_use(&self) -> u64;
}

/// Guards against re-entering compiled code from a foreign callback.
pub trait ReentrancyGuard: Send + Sync {
    fn enter(&self, flag: u32);
    fn exit(&self, flag: u32);
}

/// Name -> address resolution for the compiled program.
pub trait SymbolTable: Send + Sync {
    fn address_of(&self, name: &str) -> Option<Address>;
}

impl SymbolTable for HashMap<String, Address> {
    fn address_of(&self, name: &str) -> Option<Address> {
        self.get(name).copied()
    }
}

/// GC-safe handles to heap objects held from outside the managed heap.
pub trait StablePtrTable: Send + Sync {
    fn new_stable_ptr(&self, addr: Address) -> StablePtr;
    fn deref_stable_ptr(&self, sp: StablePtr) -> Option<Address>;
    fn free_stable_ptr(&self, sp: StablePtr);
}
