use alloc::alloc::handle_alloc_error;
use core::alloc::Layout;

/// Why a table could not allocate or place a slot.
///
/// A missing key is never a `Failure`; lookups report it with `None` and
/// [`delete`] with `false`.
///
/// [`delete`]: crate::HashTable::delete
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    /// The number of slots, or their size in bytes, overflows the address
    /// space.
    #[error("slot array size overflows the address space")]
    CapacityOverflow,
    /// Growth would exceed the limit set with
    /// [`set_max_capacity`](crate::HashTable::set_max_capacity).
    #[error("capacity of {requested} slots exceeds the limit of {limit}")]
    CapacityLimit {
        /// Slot count the resize asked for.
        requested: usize,
        /// Configured ceiling.
        limit: usize,
    },
    /// The allocator could not provide the slot array.
    #[error("failed to allocate {} bytes for the slot array", .layout.size())]
    OutOfMemory {
        /// Layout of the rejected allocation.
        layout: Layout,
    },
    /// Every slot is filled and the table could not grow.
    #[error("every slot is filled and the table cannot grow")]
    Full,
}

impl Failure {
    /// Reports the failure the way infallible `alloc` collections do.
    #[cold]
    #[inline(never)]
    pub(crate) fn raise(self) -> ! {
        match self {
            Failure::OutOfMemory { layout } => handle_alloc_error(layout),
            other => panic!("{other}"),
        }
    }
}
