//! Opcode-to-mnemonic lookup.
//!
//! A pure mapping from reassembled instruction bytes to an 8088 mnemonic.
//! No operands are decoded; the cycle log only needs to name the
//! instruction. Most opcodes map directly; the six "group" opcodes borrow
//! bits 5..3 of their ModR/M byte as an opcode extension and resolve through
//! a second table.

use std::fmt;

/// Disassembly failure. Recoverable: the cycle log marks the instruction
/// `inval` and decoding continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisasmError {
    /// No bytes to disassemble.
    Empty,
    /// A group opcode needs its ModR/M byte to resolve the mnemonic.
    MissingModRM,
}

impl fmt::Display for DisasmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "no instruction bytes"),
            Self::MissingModRM => write!(f, "group opcode without a modrm byte"),
        }
    }
}

impl std::error::Error for DisasmError {}

/// Mnemonic strings and their group id (0 = direct, 1..6 = group table).
const MNEMONICS: [(&str, u8); 112] = [
    ("ADD", 0),
    ("PUSH", 0),
    ("POP", 0),
    ("OR", 0),
    ("ADC", 0),
    ("SBB", 0),
    ("AND", 0),
    ("ES", 0),
    ("DAA", 0),
    ("SUB", 0),
    ("CS", 0),
    ("DAS", 0),
    ("XOR", 0),
    ("SS", 0),
    ("AAA", 0),
    ("CMP", 0),
    ("DS", 0),
    ("AAS", 0),
    ("INC", 0),
    ("DEC", 0),
    ("JO", 0),
    ("JNO", 0),
    ("JB", 0),
    ("JNB", 0),
    ("JZ", 0),
    ("JNZ", 0),
    ("JBE", 0),
    ("JNBE", 0),
    ("JS", 0),
    ("JNS", 0),
    ("JP", 0),
    ("JNP", 0),
    ("JL", 0),
    ("JNL", 0),
    ("JLE", 0),
    ("JNLE", 0),
    ("TEST", 0),
    ("XCHG", 0),
    ("MOV", 0),
    ("LEA", 0),
    ("CBW", 0),
    ("CWD", 0),
    ("CALLF", 0),
    ("PUSHF", 0),
    ("POPF", 0),
    ("SAHF", 0),
    ("LAHF", 0),
    ("MOVSB", 0),
    ("MOVSW", 0),
    ("CMPSB", 0),
    ("CMPSW", 0),
    ("STOSB", 0),
    ("STOSW", 0),
    ("LODSB", 0),
    ("LODSW", 0),
    ("SCASB", 0),
    ("SCASW", 0),
    ("RETN", 0),
    ("LES", 0),
    ("LDS", 0),
    ("RETF", 0),
    ("INT", 0),
    ("INTO", 0),
    ("IRET", 0),
    ("ROL", 0),
    ("ROR", 0),
    ("RCL", 0),
    ("RCR", 0),
    ("SHL", 0),
    ("SHR", 0),
    ("SAR", 0),
    ("AAM", 0),
    ("AMX", 0),
    ("AAD", 0),
    ("ADX", 0),
    ("XLAT", 0),
    ("LOOPNE", 0),
    ("LOOPE", 0),
    ("LOOP", 0),
    ("JCXZ", 0),
    ("IN", 0),
    ("OUT", 0),
    ("CALL", 0),
    ("JMP", 0),
    ("JMPF", 0),
    ("LOCK", 0),
    ("REPNZ", 0),
    ("REP", 0),
    ("REPZ", 0),
    ("HLT", 0),
    ("CMC", 0),
    ("NOT", 0),
    ("NEG", 0),
    ("MUL", 0),
    ("IMUL", 0),
    ("DIV", 0),
    ("IDIV", 0),
    ("CLC", 0),
    ("STC", 0),
    ("CLI", 0),
    ("STI", 0),
    ("CLD", 0),
    ("STD", 0),
    ("WAIT", 0),
    ("INVAL", 0),
    ("GRP1", 1),
    ("GRP2A", 2),
    ("GRP3", 3),
    ("GRP4", 4),
    ("GRP5", 5),
    ("GRP2B", 6),
    ("NOP", 0),
];

/// Group extension tables, indexed by ModR/M bits 5..3.
/// SETMO/SETMOC are the undocumented reg=110 shift encodings.
const GROUP_MNEMONICS: [[&str; 8]; 6] = [
    ["ADD", "OR", "ADC", "SBB", "AND", "SUB", "XOR", "CMP"],
    ["ROL", "ROR", "RCL", "RCR", "SHL", "SHR", "SETMO", "SAR"],
    ["ROL", "ROR", "RCL", "RCR", "SHL", "SHR", "SETMOC", "SAR"],
    ["TEST", "TEST", "NOT", "NEG", "MUL", "IMUL", "DIV", "IDIV"],
    ["INC", "DEC", "INVAL", "INVAL", "INVAL", "INVAL", "INVAL", "INVAL"],
    ["INC", "DEC", "CALL", "CALLF", "JMP", "JMPF", "PUSH", "INVAL"],
];

/// Primary table: one [`MNEMONICS`] index per opcode.
#[rustfmt::skip]
const OP_REF: [u8; 256] = [
    // 0x00
    0, 0, 0, 0, 0, 0, 1, 2, 3, 3, 3, 3, 3, 3, 1, 2,
    // 0x10
    4, 4, 4, 4, 4, 4, 1, 2, 5, 5, 5, 5, 5, 5, 1, 2,
    // 0x20
    6, 6, 6, 6, 6, 6, 7, 8, 9, 9, 9, 9, 9, 9, 10, 11,
    // 0x30
    12, 12, 12, 12, 12, 12, 13, 14, 15, 15, 15, 15, 15, 15, 16, 17,
    // 0x40
    18, 18, 18, 18, 18, 18, 18, 18, 19, 19, 19, 19, 19, 19, 19, 19,
    // 0x50
    1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2,
    // 0x60
    20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35,
    // 0x70
    20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35,
    // 0x80
    105, 105, 105, 105, 36, 36, 37, 37, 38, 38, 38, 38, 38, 39, 38, 2,
    // 0x90
    111, 37, 37, 37, 37, 37, 37, 37, 40, 41, 42, 103, 43, 44, 45, 46,
    // 0xA0
    38, 38, 38, 38, 47, 48, 49, 50, 36, 36, 51, 52, 53, 54, 55, 56,
    // 0xB0
    38, 38, 38, 38, 38, 38, 38, 38, 38, 38, 38, 38, 38, 38, 38, 38,
    // 0xC0
    57, 57, 57, 57, 58, 59, 38, 38, 60, 60, 60, 60, 61, 61, 62, 63,
    // 0xD0
    106, 106, 110, 110, 71, 73, 104, 75, 104, 104, 104, 104, 104, 104, 104, 104,
    // 0xE0
    76, 77, 78, 79, 80, 80, 81, 81, 82, 83, 84, 83, 80, 80, 81, 81,
    // 0xF0
    85, 104, 86, 87, 89, 90, 107, 107, 97, 98, 99, 100, 101, 102, 108, 109,
];

/// Resolve one opcode, with its ModR/M byte if one followed it.
pub fn lookup(opcode: u8, modrm: Option<u8>) -> Result<&'static str, DisasmError> {
    let (name, group) = MNEMONICS[usize::from(OP_REF[usize::from(opcode)])];
    if group == 0 {
        return Ok(name);
    }
    let modrm = modrm.ok_or(DisasmError::MissingModRM)?;
    let reg = usize::from((modrm >> 3) & 0x07);
    Ok(GROUP_MNEMONICS[usize::from(group) - 1][reg])
}

/// Disassemble a complete instruction byte sequence.
///
/// Leading prefix bytes are skipped so the mnemonic names the instruction
/// they modify; a sequence of nothing but prefixes resolves the first byte
/// as an opcode (prefixes have mnemonics of their own).
pub fn disassemble(bytes: &[u8]) -> Result<&'static str, DisasmError> {
    if bytes.is_empty() {
        return Err(DisasmError::Empty);
    }
    let pos = bytes
        .iter()
        .position(|&b| !crate::is_prefix(b))
        .unwrap_or(0);
    lookup(bytes[pos], bytes.get(pos + 1).copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_opcodes() {
        assert_eq!(disassemble(&[0x90]), Ok("NOP"));
        assert_eq!(disassemble(&[0xF4]), Ok("HLT"));
        assert_eq!(disassemble(&[0xCF]), Ok("IRET"));
        assert_eq!(disassemble(&[0xE2, 0xFE]), Ok("LOOP"));
        assert_eq!(disassemble(&[0x9A, 0x00, 0x00, 0x00, 0xF0]), Ok("CALLF"));
    }

    #[test]
    fn group_opcodes_use_modrm_reg() {
        // FF /2 = CALL
        assert_eq!(disassemble(&[0xFF, 0xD0]), Ok("CALL"));
        // FF /6 = PUSH
        assert_eq!(disassemble(&[0xFF, 0x36, 0x00, 0x01]), Ok("PUSH"));
        // F6 /3 = NEG
        assert_eq!(disassemble(&[0xF6, 0xD8]), Ok("NEG"));
        // 80 /7 = CMP
        assert_eq!(disassemble(&[0x80, 0xFC, 0x01]), Ok("CMP"));
        // D0 /4 = SHL
        assert_eq!(disassemble(&[0xD0, 0xE0]), Ok("SHL"));
    }

    #[test]
    fn undocumented_shift_encodings() {
        // reg=110: SETMO for immediate-count shifts, SETMOC for the CL form.
        assert_eq!(disassemble(&[0xD0, 0xF0]), Ok("SETMO"));
        assert_eq!(disassemble(&[0xD2, 0xF0]), Ok("SETMOC"));
    }

    #[test]
    fn prefixes_resolve_the_prefixed_opcode() {
        assert_eq!(disassemble(&[0xF3, 0xA4]), Ok("MOVSB"));
        assert_eq!(disassemble(&[0x2E, 0xF3, 0xA5]), Ok("MOVSW"));
        // Prefixed group opcode: the modrm follows the real opcode.
        assert_eq!(disassemble(&[0xF0, 0xFF, 0xD0]), Ok("CALL"));
        // A lone prefix still names itself.
        assert_eq!(disassemble(&[0xF3]), Ok("REP"));
        assert_eq!(disassemble(&[0x26]), Ok("ES"));
    }

    #[test]
    fn group_without_modrm_fails() {
        assert_eq!(disassemble(&[0xFF]), Err(DisasmError::MissingModRM));
        assert_eq!(disassemble(&[0xF6]), Err(DisasmError::MissingModRM));
        assert_eq!(disassemble(&[]), Err(DisasmError::Empty));
    }

    #[test]
    fn every_opcode_resolves() {
        for op in 0u16..=255 {
            let m = lookup(op as u8, Some(0x00)).expect("lookup is total with a modrm");
            assert!(!m.is_empty());
        }
    }
}
