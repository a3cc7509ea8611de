/// Runtime value representation.
///
/// Defines the `Value` enum and all supported value variants, together with
/// conversion, promotion, equality and ordering helpers used throughout
/// evaluation.
pub mod core;
/// Environment frames and closures.
///
/// Defines the frame chain used for lexical scoping and the closure type
/// pairing code with its captured frame.
pub mod env;
/// Hashable value keys.
///
/// Defines the `ValueKey` type, the hashable subset of values usable as set
/// elements and map keys.
pub mod key;
