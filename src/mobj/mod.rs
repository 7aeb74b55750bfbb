//! MovieObject container domain
//!
//! A `MovieObject.bdmv` file holds the disc's movie-mode programs: a flat
//! list of objects, each carrying three playback-control flags and a list of
//! fixed-width navigation commands for the HDMV virtual machine.
//!
//! This module only decodes and owns the data; interpreting the commands is
//! the virtual machine's job.

pub mod insn;
pub mod parser;

pub use insn::Instruction;
pub use parser::{parse, parse_bytes};

use bitflags::bitflags;
use serde::Serialize;

/// Accepted MovieObject container versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MobjVersion {
    /// Version tag "0100"
    V0100,
    /// Version tag "0200"
    V0200,
}

bitflags! {
    /// Per-object playback control flags (leading 3 bits of an object record)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ObjectFlags: u8 {
        /// Resume playback of this title after menu call
        const RESUME_INTENTION = 0x01;
        /// Menu call is masked (disabled) while this object runs
        const MENU_CALL_MASK = 0x02;
        /// Title search is masked (disabled) while this object runs
        const TITLE_SEARCH_MASK = 0x04;
    }
}

/// One navigation command: a decoded instruction word plus its two operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MobjCommand {
    /// Decoded instruction word
    pub insn: Instruction,
    /// Destination operand
    pub dst: u32,
    /// Source operand
    pub src: u32,
}

/// One movie object: control flags plus its command program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieObject {
    /// Playback control flags
    pub flags: ObjectFlags,
    /// Command program, in execution order
    pub cmds: Vec<MobjCommand>,
}

impl MovieObject {
    /// Resume playback of this title after a menu call
    pub fn resume_intention(&self) -> bool {
        self.flags.contains(ObjectFlags::RESUME_INTENTION)
    }

    /// Menu call is masked while this object runs
    pub fn menu_call_mask(&self) -> bool {
        self.flags.contains(ObjectFlags::MENU_CALL_MASK)
    }

    /// Title search is masked while this object runs
    pub fn title_search_mask(&self) -> bool {
        self.flags.contains(ObjectFlags::TITLE_SEARCH_MASK)
    }
}

/// A fully parsed MovieObject container
///
/// Owns the complete object tree; dropping it releases everything at once.
/// Instances only come out of [`parse`]/[`parse_bytes`] fully built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieObjectFile {
    /// Container version tag
    pub version: MobjVersion,
    /// Byte offset of the extension data block (retained for forward use)
    pub extension_data_start: u32,
    /// Movie objects, in file order
    pub objects: Vec<MovieObject>,
}
