//! Error handling for the sequora library
//!
//! This module provides the error type shared by all container operations,
//! with enough structure that callers can distinguish recoverable conditions
//! (allocation pressure) from misuse (bad indices, inverted ranges).

use thiserror::Error;

/// Main error type for the sequora library
#[derive(Error, Debug)]
pub enum SequoraError {
    /// Index out of bounds access
    #[error("Out of bounds: index {index}, size {size}")]
    OutOfBounds {
        /// The invalid index
        index: usize,
        /// The valid size/length
        size: usize,
    },

    /// Memory allocation failures
    #[error("Memory allocation failed: requested {size} bytes")]
    OutOfMemory {
        /// Number of bytes requested
        size: usize,
    },

    /// A range whose bounds are inverted or exceed the container
    #[error("Invalid range: [{start}, {end}) over size {size}")]
    InvalidRange {
        /// Start of the offending range
        start: usize,
        /// One-past-the-end of the offending range
        end: usize,
        /// The valid size/length
        size: usize,
    },

    /// A length or capacity computation overflowed
    #[error("Capacity overflow: requested {requested} elements")]
    CapacityOverflow {
        /// Number of elements requested
        requested: usize,
    },
}

impl SequoraError {
    /// Create an out of bounds error
    pub fn out_of_bounds(index: usize, size: usize) -> Self {
        Self::OutOfBounds { index, size }
    }

    /// Create an out of memory error
    pub fn out_of_memory(size: usize) -> Self {
        Self::OutOfMemory { size }
    }

    /// Create an invalid range error
    pub fn invalid_range(start: usize, end: usize, size: usize) -> Self {
        Self::InvalidRange { start, end, size }
    }

    /// Create a capacity overflow error
    pub fn capacity_overflow(requested: usize) -> Self {
        Self::CapacityOverflow { requested }
    }

    /// Check if this is a recoverable error
    ///
    /// Allocation pressure is recoverable (retry after freeing memory);
    /// bounds and range violations indicate caller bugs and are not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::OutOfMemory { .. } => true,
            Self::OutOfBounds { .. } => false,
            Self::InvalidRange { .. } => false,
            Self::CapacityOverflow { .. } => false,
        }
    }

    /// Get the error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::OutOfBounds { .. } => "bounds",
            Self::OutOfMemory { .. } => "memory",
            Self::InvalidRange { .. } => "range",
            Self::CapacityOverflow { .. } => "capacity",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SequoraError>;

/// Assert that an index is within bounds
#[inline]
pub fn check_bounds(index: usize, size: usize) -> Result<()> {
    if index >= size {
        Err(SequoraError::out_of_bounds(index, size))
    } else {
        Ok(())
    }
}

/// Assert that a half-open range is within bounds
#[inline]
pub fn check_range(start: usize, end: usize, size: usize) -> Result<()> {
    if start > end || end > size {
        Err(SequoraError::invalid_range(start, end, size))
    } else {
        Ok(())
    }
}
