//! Deduplicated, cancellable walk over a character's past appearances.

pub mod fingerprint;
pub mod sink;
pub mod walker;
