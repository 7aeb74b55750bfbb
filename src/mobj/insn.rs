//! HDMV instruction word decoding
//!
//! Every navigation command starts with one 32-bit instruction word whose
//! fields are fixed bit ranges, MSB first:
//!
//! ```text
//! 31-29 op_cnt    28-27 grp      26-24 sub_grp
//! 23    imm_op1   22    imm_op2  21-20 reserved  19-16 branch_opt
//! 15-12 reserved  11-8  cmp_opt
//!  7-5  reserved   4-0  set_opt
//! ```
//!
//! Decoding is purely structural: fields are extracted by shift and mask
//! against these positions, never by in-memory struct layout, and no
//! combination of values is rejected here. Whether a field combination is
//! legal is the virtual machine's call.

use serde::Serialize;

/// Decoded fields of one 32-bit HDMV instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Instruction {
    /// Operand count (0-3)
    pub op_cnt: u8,
    /// Instruction group (0-3)
    pub grp: u8,
    /// Instruction sub-group (0-7)
    pub sub_grp: u8,
    /// First operand is an immediate value
    pub imm_op1: bool,
    /// Second operand is an immediate value
    pub imm_op2: bool,
    /// Branch option (0-15)
    pub branch_opt: u8,
    /// Compare option (0-15)
    pub cmp_opt: u8,
    /// Set option (0-31)
    pub set_opt: u8,
}

impl Instruction {
    /// Extract all fields from an instruction word.
    ///
    /// Reserved bits (21-20, 15-12, 7-5) are dropped without inspection.
    pub fn decode(word: u32) -> Self {
        Instruction {
            op_cnt: ((word >> 29) & 0x07) as u8,
            grp: ((word >> 27) & 0x03) as u8,
            sub_grp: ((word >> 24) & 0x07) as u8,
            imm_op1: (word >> 23) & 0x01 != 0,
            imm_op2: (word >> 22) & 0x01 != 0,
            branch_opt: ((word >> 16) & 0x0F) as u8,
            cmp_opt: ((word >> 8) & 0x0F) as u8,
            set_opt: (word & 0x1F) as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an instruction word from field values placed at their bit
    /// positions, leaving reserved bits clear.
    fn word(
        op_cnt: u32,
        grp: u32,
        sub_grp: u32,
        imm_op1: bool,
        imm_op2: bool,
        branch_opt: u32,
        cmp_opt: u32,
        set_opt: u32,
    ) -> u32 {
        (op_cnt << 29)
            | (grp << 27)
            | (sub_grp << 24)
            | ((imm_op1 as u32) << 23)
            | ((imm_op2 as u32) << 22)
            | (branch_opt << 16)
            | (cmp_opt << 8)
            | set_opt
    }

    #[test]
    fn test_decode_all_fields() {
        let insn = Instruction::decode(word(5, 2, 6, true, false, 0xB, 0x9, 0x15));
        assert_eq!(insn.op_cnt, 5);
        assert_eq!(insn.grp, 2);
        assert_eq!(insn.sub_grp, 6);
        assert!(insn.imm_op1);
        assert!(!insn.imm_op2);
        assert_eq!(insn.branch_opt, 0xB);
        assert_eq!(insn.cmp_opt, 0x9);
        assert_eq!(insn.set_opt, 0x15);
    }

    #[test]
    fn test_decode_zero_word() {
        let insn = Instruction::decode(0);
        assert_eq!(insn.op_cnt, 0);
        assert_eq!(insn.grp, 0);
        assert_eq!(insn.sub_grp, 0);
        assert!(!insn.imm_op1);
        assert!(!insn.imm_op2);
        assert_eq!(insn.branch_opt, 0);
        assert_eq!(insn.cmp_opt, 0);
        assert_eq!(insn.set_opt, 0);
    }

    #[test]
    fn test_reserved_bits_do_not_leak() {
        // Same fields with and without every reserved bit set (21-20, 15-12, 7-5)
        let base = word(3, 1, 7, false, true, 0xA, 0xF, 0x1F);
        let noisy = base | (0x3 << 20) | (0xF << 12) | (0x7 << 5);
        assert_eq!(Instruction::decode(noisy), Instruction::decode(base));
    }

    #[test]
    fn test_decode_all_ones() {
        let insn = Instruction::decode(0xFFFF_FFFF);
        assert_eq!(insn.op_cnt, 7);
        assert_eq!(insn.grp, 3);
        assert_eq!(insn.sub_grp, 7);
        assert!(insn.imm_op1);
        assert!(insn.imm_op2);
        assert_eq!(insn.branch_opt, 0xF);
        assert_eq!(insn.cmp_opt, 0xF);
        assert_eq!(insn.set_opt, 0x1F);
    }
}
