//! Shared helpers for the SegLog benchmarks.

/// Creates a deterministic payload of the given size.
#[must_use]
pub fn payload(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}
