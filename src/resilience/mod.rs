//! Resilience utilities for the remote tier.

pub mod retry;
