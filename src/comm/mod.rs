//! Typed collective operations and the substrate contract they run on.

pub mod error;
pub mod local;

pub use error::CommError;
pub use local::LocalComm;

use crate::scalar::Scalar;

/// Receiver designation for a collective: one rank, or every rank (the
/// all-variant of the operation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
    All,
    Rank(usize),
}

impl Root {
    /// Does `rank` receive the result of a collective rooted here?
    pub fn receives(self, rank: usize) -> bool {
        match self {
            Root::All => true,
            Root::Rank(r) => r == rank,
        }
    }
}

/// Element-wise combining operation for [`Communicator::reduce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    Sum,
}

/// Wire datatype handles for the supported scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datatype {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
}

impl Datatype {
    /// Size of one element on the wire.
    pub fn size_in_bytes(self) -> usize {
        match self {
            Datatype::Int8 | Datatype::Uint8 => 1,
            Datatype::Int16 | Datatype::Uint16 => 2,
            Datatype::Int32 | Datatype::Uint32 | Datatype::Float32 => 4,
            Datatype::Int64 | Datatype::Uint64 | Datatype::Float64 => 8,
        }
    }
}

/// Scalars that can travel through a [`Communicator`].
pub trait CommScalar: Scalar + Send + Sync {
    /// Substrate datatype handle for this scalar.
    const DATATYPE: Datatype;
}

macro_rules! impl_comm_scalar {
    ($($ty:ty => $dt:ident),* $(,)?) => {
        $(impl CommScalar for $ty {
            const DATATYPE: Datatype = Datatype::$dt;
        })*
    };
}

impl_comm_scalar! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    f32 => Float32,
    f64 => Float64,
}

// Indices travel as 64-bit unsigned words.
impl CommScalar for usize {
    const DATATYPE: Datatype = Datatype::Uint64;
}

/// Blocking collectives over a group of ranks.
///
/// Every method is a collective: all ranks of the group must call it, in the
/// same order, with compatible arguments, and ranks that arrive early block
/// until the whole group has entered. That call ordering is the only
/// coordination protocol between ranks. Receive-side arguments are ignored on
/// ranks that `root` does not designate; empty slices are fine there.
pub trait Communicator {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn barrier(&self) -> Result<(), CommError>;

    /// Element-wise combine `buf` across ranks, in place: receiving ranks end
    /// up with the combined vector, every other rank's buffer is unchanged.
    fn reduce<T: CommScalar>(&self, root: Root, op: ReduceOp, buf: &mut [T])
    -> Result<(), CommError>;

    /// Gather `send` (same length on every rank) into `recv`, in rank order.
    fn gather<T: CommScalar>(&self, root: Root, send: &[T], recv: &mut [T])
    -> Result<(), CommError>;

    /// Variable-length gather: rank `r` contributes `counts[r]` elements,
    /// placed into `recv` starting at `displs[r]`.
    fn gatherv<T: CommScalar>(
        &self,
        root: Root,
        send: &[T],
        recv: &mut [T],
        counts: &[usize],
        displs: &[usize],
    ) -> Result<(), CommError>;
}
