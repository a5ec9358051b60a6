//! Shared substrate for the sepia CSS compiler: the growable byte source the
//! tokenizer reads from, the interned string pool, fixed-point numerics and
//! the common error type.

pub mod byte_stream;
pub mod errors;
pub mod fixed;
pub mod interner;
