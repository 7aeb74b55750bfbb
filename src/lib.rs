//! Blu-ray HDMV Navigation Data
//!
//! Decoding and state backbone for an HDMV (movie-mode) playback engine:
//! a strict parser for the `MovieObject.bdmv` container and a thread-safe
//! bank of Player Status Registers (PSR) and General Purpose Registers (GPR).
//!
//! # Features
//! - Bit-exact MovieObject container parsing (signature, versions 0100/0200)
//! - Structural decode of the 32-bit HDMV instruction word
//! - All-or-nothing parse semantics (no partial object trees)
//! - Policy-checked PSR writes (writable / read-only / masked / backup slots)
//! - Atomic save/restore of the resume register set
//! - Change/restore notifications delivered outside the lock, in
//!   registration order
//!
//! # Crate feature flags
//! - `mobj-format` (default): MovieObject parsing and instruction decoding
//!   (`bits`, `mobj`)
//!
//! # Quick start
//! ## Parse a MovieObject file
//! ```no_run
//! use bdnav::mobj;
//! let file = mobj::parse("BDMV/MovieObject.bdmv").unwrap();
//! for (i, obj) in file.objects.iter().enumerate() {
//!     println!("object {}: {} commands", i, obj.cmds.len());
//! }
//! ```
//!
//! ## Player registers
//! ```
//! use bdnav::registers::{PsrIndex, RegisterBank};
//! let bank = RegisterBank::new();
//! bank.psr_write(PsrIndex::Chapter as usize, 3).unwrap();
//! assert_eq!(bank.psr_read(PsrIndex::Chapter as usize).unwrap(), 3);
//! ```

#![warn(missing_docs)]

// Domain modules (parsing side is feature-gated for modular use)
#[cfg(feature = "mobj-format")]
pub mod bits; // Bit-level reader over in-memory file data
#[cfg(feature = "mobj-format")]
pub mod mobj; // MovieObject container parsing + instruction decode
pub mod registers; // PSR/GPR register bank (core)

/// Error types for navigation data operations
#[derive(thiserror::Error, Debug)]
pub enum BdNavError {
    /// IO error at the file boundary (open/read)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Signature mismatch or truncated/short read
    #[error("format error: {0}")]
    Format(String),

    /// Allocation failure while building the object tree
    #[error("resource error: {0}")]
    Resource(String),

    /// Register access outside the declared index range
    #[error("invalid register index {0}")]
    InvalidRegister(usize),

    /// Policy-checked write to a read-only or backup register rejected
    #[error("register {0} is read-only")]
    ReadOnlyRegister(usize),
}

/// Result type for navigation data operations
pub type Result<T> = std::result::Result<T, BdNavError>;

// Public API exports
pub use registers::{PsrEvent, PsrEventKind, PsrIndex, PsrObserver, RegisterBank};

#[cfg(feature = "mobj-format")]
pub use bits::BitReader;
#[cfg(feature = "mobj-format")]
pub use mobj::{Instruction, MobjCommand, MobjVersion, MovieObject, MovieObjectFile, ObjectFlags};
