// ABOUTME: Sealed trait pattern for backend traits.
// ABOUTME: Prevents external implementations, allowing non-breaking evolution.

/// Only the backends in this crate can implement the backend traits.
pub trait Sealed {}
