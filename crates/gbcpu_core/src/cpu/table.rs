//! Opcode descriptor tables.
//!
//! Both tables are decoded once from the regular LR35902 opcode layout
//! (`x = op >> 6`, `y = (op >> 3) & 7`, `z = op & 7`) into tagged
//! descriptors and are never mutated afterwards. The executor only ever
//! matches on `Op`/`CbOp`; it never looks at raw opcode bits.

use lazy_static::lazy_static;

use super::regs::{Reg16, Reg8};

/// Operand selected by a 3-bit `r` field: a register or the byte at (HL).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Reg(Reg8),
    IndHL,
}

impl Target {
    pub fn from_index(index: u8) -> Self {
        match Reg8::from_index(index & 0x07) {
            Some(reg) => Target::Reg(reg),
            None => Target::IndHL,
        }
    }

    fn name(self) -> String {
        match self {
            Target::Reg(reg) => reg.to_string(),
            Target::IndHL => "(HL)".to_string(),
        }
    }
}

/// Address operand for `LD (rr),A` / `LD A,(rr)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indirect {
    BC,
    DE,
    HLInc,
    HLDec,
}

impl Indirect {
    fn from_rp(rp: u8) -> Self {
        match rp & 0x03 {
            0 => Indirect::BC,
            1 => Indirect::DE,
            2 => Indirect::HLInc,
            _ => Indirect::HLDec,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Indirect::BC => "(BC)",
            Indirect::DE => "(DE)",
            Indirect::HLInc => "(HL+)",
            Indirect::HLDec => "(HL-)",
        }
    }
}

/// Branch condition encoded in bits 4..3 of JR/JP/CALL/RET cc.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cond {
    NZ,
    Z,
    NC,
    C,
}

impl Cond {
    fn from_index(cc: u8) -> Self {
        match cc & 0x03 {
            0 => Cond::NZ,
            1 => Cond::Z,
            2 => Cond::NC,
            _ => Cond::C,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Cond::NZ => "NZ",
            Cond::Z => "Z",
            Cond::NC => "NC",
            Cond::C => "C",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    fn from_index(y: u8) -> Self {
        match y & 0x07 {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbc,
            4 => AluOp::And,
            5 => AluOp::Xor,
            6 => AluOp::Or,
            _ => AluOp::Cp,
        }
    }

    /// Mnemonic with `operand` filled in, e.g. "ADD A,B" or "CP d8".
    fn mnemonic(self, operand: &str) -> String {
        match self {
            AluOp::Add => format!("ADD A,{operand}"),
            AluOp::Adc => format!("ADC A,{operand}"),
            AluOp::Sub => format!("SUB {operand}"),
            AluOp::Sbc => format!("SBC A,{operand}"),
            AluOp::And => format!("AND {operand}"),
            AluOp::Xor => format!("XOR {operand}"),
            AluOp::Or => format!("OR {operand}"),
            AluOp::Cp => format!("CP {operand}"),
        }
    }
}

/// Rotate/shift/swap operations of the CB table (x = 0).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl ShiftOp {
    fn from_index(y: u8) -> Self {
        match y & 0x07 {
            0 => ShiftOp::Rlc,
            1 => ShiftOp::Rrc,
            2 => ShiftOp::Rl,
            3 => ShiftOp::Rr,
            4 => ShiftOp::Sla,
            5 => ShiftOp::Sra,
            6 => ShiftOp::Swap,
            _ => ShiftOp::Srl,
        }
    }

    fn name(self) -> &'static str {
        match self {
            ShiftOp::Rlc => "RLC",
            ShiftOp::Rrc => "RRC",
            ShiftOp::Rl => "RL",
            ShiftOp::Rr => "RR",
            ShiftOp::Sla => "SLA",
            ShiftOp::Sra => "SRA",
            ShiftOp::Swap => "SWAP",
            ShiftOp::Srl => "SRL",
        }
    }
}

/// Semantics of one primary opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Nop,
    Stop,
    Halt,
    Di,
    Ei,
    /// LD r, r'
    Ld { dst: Target, src: Target },
    /// LD r, d8
    LdImm8(Target),
    /// LD rr, d16
    LdImm16(Reg16),
    /// LD (a16), SP
    StoreSp,
    /// LD (rr), A
    StoreA(Indirect),
    /// LD A, (rr)
    LoadA(Indirect),
    /// LDH (a8), A
    StoreHighImm,
    /// LDH A, (a8)
    LoadHighImm,
    /// LD (0xFF00+C), A
    StoreHighC,
    /// LD A, (0xFF00+C)
    LoadHighC,
    /// LD (a16), A
    StoreAbs,
    /// LD A, (a16)
    LoadAbs,
    LdSpHl,
    LdHlSpOffset,
    AddSpOffset,
    Inc8(Target),
    Dec8(Target),
    Inc16(Reg16),
    Dec16(Reg16),
    AddHl(Reg16),
    Alu(AluOp, Target),
    AluImm(AluOp),
    /// RLCA/RRCA/RLA/RRA
    RotateA(ShiftOp),
    Daa,
    Cpl,
    Scf,
    Ccf,
    Jr(Option<Cond>),
    Jp(Option<Cond>),
    JpHl,
    Call(Option<Cond>),
    Ret(Option<Cond>),
    Reti,
    Rst(u16),
    Push(Reg16),
    Pop(Reg16),
    PrefixCb,
}

/// Descriptor of one primary opcode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: u8,
    pub mnemonic: String,
    /// Encoded length in bytes, including the opcode itself.
    pub length: u8,
    /// T-cycles when no branch is taken (or for unconditional ops).
    pub cycles: u8,
    /// T-cycles when a conditional branch is taken.
    pub cycles_taken: u8,
    pub op: Op,
}

/// Semantics of one CB-prefixed opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CbOp {
    Shift(ShiftOp),
    Bit(u8),
    Res(u8),
    Set(u8),
}

/// Descriptor of one CB-prefixed opcode. Always two bytes long including
/// the prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CbInstruction {
    pub opcode: u8,
    pub mnemonic: String,
    pub cycles: u8,
    pub op: CbOp,
    pub target: Target,
}

lazy_static! {
    static ref PRIMARY: Vec<Option<Instruction>> = (0..=0xFFu8).map(decode_primary).collect();
    static ref EXTENDED: Vec<CbInstruction> = (0..=0xFFu8).map(decode_cb).collect();
}

/// Descriptor for a primary opcode, or `None` for the eleven opcode holes.
pub fn lookup(opcode: u8) -> Option<&'static Instruction> {
    PRIMARY[opcode as usize].as_ref()
}

/// Descriptor for the byte following the 0xCB prefix.
pub fn lookup_cb(opcode: u8) -> &'static CbInstruction {
    &EXTENDED[opcode as usize]
}

fn instr(opcode: u8, mnemonic: impl Into<String>, length: u8, cycles: u8, op: Op) -> Instruction {
    Instruction {
        opcode,
        mnemonic: mnemonic.into(),
        length,
        cycles,
        cycles_taken: cycles,
        op,
    }
}

fn branch(
    opcode: u8,
    mnemonic: impl Into<String>,
    length: u8,
    cycles: u8,
    cycles_taken: u8,
    op: Op,
) -> Instruction {
    Instruction {
        cycles_taken,
        ..instr(opcode, mnemonic, length, cycles, op)
    }
}

fn decode_primary(opcode: u8) -> Option<Instruction> {
    let x = opcode >> 6;
    let y = (opcode >> 3) & 0x07;
    let z = opcode & 0x07;
    let p = y >> 1;
    let q = y & 0x01;

    let entry = match (x, z) {
        (0, 0) => match y {
            0 => instr(opcode, "NOP", 1, 4, Op::Nop),
            1 => instr(opcode, "LD (a16),SP", 3, 20, Op::StoreSp),
            2 => instr(opcode, "STOP", 2, 4, Op::Stop),
            3 => instr(opcode, "JR e8", 2, 12, Op::Jr(None)),
            _ => {
                let cc = Cond::from_index(y - 4);
                let name = format!("JR {},e8", cc.name());
                branch(opcode, name, 2, 8, 12, Op::Jr(Some(cc)))
            }
        },
        (0, 1) => {
            let rr = Reg16::from_rp(p);
            if q == 0 {
                instr(opcode, format!("LD {rr},d16"), 3, 12, Op::LdImm16(rr))
            } else {
                instr(opcode, format!("ADD HL,{rr}"), 1, 8, Op::AddHl(rr))
            }
        }
        (0, 2) => {
            let ind = Indirect::from_rp(p);
            if q == 0 {
                instr(opcode, format!("LD {},A", ind.name()), 1, 8, Op::StoreA(ind))
            } else {
                instr(opcode, format!("LD A,{}", ind.name()), 1, 8, Op::LoadA(ind))
            }
        }
        (0, 3) => {
            let rr = Reg16::from_rp(p);
            if q == 0 {
                instr(opcode, format!("INC {rr}"), 1, 8, Op::Inc16(rr))
            } else {
                instr(opcode, format!("DEC {rr}"), 1, 8, Op::Dec16(rr))
            }
        }
        (0, 4) | (0, 5) => {
            let target = Target::from_index(y);
            let cycles = if target == Target::IndHL { 12 } else { 4 };
            if z == 4 {
                instr(opcode, format!("INC {}", target.name()), 1, cycles, Op::Inc8(target))
            } else {
                instr(opcode, format!("DEC {}", target.name()), 1, cycles, Op::Dec8(target))
            }
        }
        (0, 6) => {
            let target = Target::from_index(y);
            let cycles = if target == Target::IndHL { 12 } else { 8 };
            let name = format!("LD {},d8", target.name());
            instr(opcode, name, 2, cycles, Op::LdImm8(target))
        }
        (0, 7) => match y {
            0 => instr(opcode, "RLCA", 1, 4, Op::RotateA(ShiftOp::Rlc)),
            1 => instr(opcode, "RRCA", 1, 4, Op::RotateA(ShiftOp::Rrc)),
            2 => instr(opcode, "RLA", 1, 4, Op::RotateA(ShiftOp::Rl)),
            3 => instr(opcode, "RRA", 1, 4, Op::RotateA(ShiftOp::Rr)),
            4 => instr(opcode, "DAA", 1, 4, Op::Daa),
            5 => instr(opcode, "CPL", 1, 4, Op::Cpl),
            6 => instr(opcode, "SCF", 1, 4, Op::Scf),
            _ => instr(opcode, "CCF", 1, 4, Op::Ccf),
        },
        (1, _) => {
            if opcode == 0x76 {
                instr(opcode, "HALT", 1, 4, Op::Halt)
            } else {
                let dst = Target::from_index(y);
                let src = Target::from_index(z);
                let cycles = if dst == Target::IndHL || src == Target::IndHL {
                    8
                } else {
                    4
                };
                let name = format!("LD {},{}", dst.name(), src.name());
                instr(opcode, name, 1, cycles, Op::Ld { dst, src })
            }
        }
        (2, _) => {
            let alu = AluOp::from_index(y);
            let src = Target::from_index(z);
            let cycles = if src == Target::IndHL { 8 } else { 4 };
            let name = alu.mnemonic(&src.name());
            instr(opcode, name, 1, cycles, Op::Alu(alu, src))
        }
        (3, 0) => match y {
            0..=3 => {
                let cc = Cond::from_index(y);
                branch(opcode, format!("RET {}", cc.name()), 1, 8, 20, Op::Ret(Some(cc)))
            }
            4 => instr(opcode, "LDH (a8),A", 2, 12, Op::StoreHighImm),
            5 => instr(opcode, "ADD SP,e8", 2, 16, Op::AddSpOffset),
            6 => instr(opcode, "LDH A,(a8)", 2, 12, Op::LoadHighImm),
            _ => instr(opcode, "LD HL,SP+e8", 2, 12, Op::LdHlSpOffset),
        },
        (3, 1) => {
            if q == 0 {
                let rr = Reg16::from_rp2(p);
                instr(opcode, format!("POP {rr}"), 1, 12, Op::Pop(rr))
            } else {
                match p {
                    0 => instr(opcode, "RET", 1, 16, Op::Ret(None)),
                    1 => instr(opcode, "RETI", 1, 16, Op::Reti),
                    2 => instr(opcode, "JP HL", 1, 4, Op::JpHl),
                    _ => instr(opcode, "LD SP,HL", 1, 8, Op::LdSpHl),
                }
            }
        }
        (3, 2) => match y {
            0..=3 => {
                let cc = Cond::from_index(y);
                let name = format!("JP {},a16", cc.name());
                branch(opcode, name, 3, 12, 16, Op::Jp(Some(cc)))
            }
            4 => instr(opcode, "LD (C),A", 1, 8, Op::StoreHighC),
            5 => instr(opcode, "LD (a16),A", 3, 16, Op::StoreAbs),
            6 => instr(opcode, "LD A,(C)", 1, 8, Op::LoadHighC),
            _ => instr(opcode, "LD A,(a16)", 3, 16, Op::LoadAbs),
        },
        (3, 3) => match y {
            0 => instr(opcode, "JP a16", 3, 16, Op::Jp(None)),
            // The CB entry's own cost is added by the extended table.
            1 => instr(opcode, "PREFIX CB", 2, 0, Op::PrefixCb),
            6 => instr(opcode, "DI", 1, 4, Op::Di),
            7 => instr(opcode, "EI", 1, 4, Op::Ei),
            _ => return None,
        },
        (3, 4) => match y {
            0..=3 => {
                let cc = Cond::from_index(y);
                let name = format!("CALL {},a16", cc.name());
                branch(opcode, name, 3, 12, 24, Op::Call(Some(cc)))
            }
            _ => return None,
        },
        (3, 5) => {
            if q == 0 {
                let rr = Reg16::from_rp2(p);
                instr(opcode, format!("PUSH {rr}"), 1, 16, Op::Push(rr))
            } else if p == 0 {
                instr(opcode, "CALL a16", 3, 24, Op::Call(None))
            } else {
                return None;
            }
        }
        (3, 6) => {
            let alu = AluOp::from_index(y);
            instr(opcode, alu.mnemonic("d8"), 2, 8, Op::AluImm(alu))
        }
        (3, 7) => {
            let vector = (y as u16) * 8;
            instr(opcode, format!("RST {vector:02X}h"), 1, 16, Op::Rst(vector))
        }
        _ => unreachable!("opcode fields out of range"),
    };

    Some(entry)
}

fn decode_cb(opcode: u8) -> CbInstruction {
    let x = opcode >> 6;
    let y = (opcode >> 3) & 0x07;
    let target = Target::from_index(opcode & 0x07);
    let on_hl = target == Target::IndHL;

    let (op, mnemonic, cycles) = match x {
        0 => {
            let shift = ShiftOp::from_index(y);
            let name = format!("{} {}", shift.name(), target.name());
            (CbOp::Shift(shift), name, if on_hl { 16 } else { 8 })
        }
        1 => {
            let name = format!("BIT {y},{}", target.name());
            (CbOp::Bit(y), name, if on_hl { 12 } else { 8 })
        }
        2 => {
            let name = format!("RES {y},{}", target.name());
            (CbOp::Res(y), name, if on_hl { 16 } else { 8 })
        }
        _ => {
            let name = format!("SET {y},{}", target.name());
            (CbOp::Set(y), name, if on_hl { 16 } else { 8 })
        }
    };

    CbInstruction {
        opcode,
        mnemonic,
        cycles,
        op,
        target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_table_has_exactly_the_documented_holes() {
        let holes: Vec<u8> = (0..=0xFFu8).filter(|&op| lookup(op).is_none()).collect();
        assert_eq!(
            holes,
            vec![0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD]
        );
    }

    #[test]
    fn entries_carry_their_own_opcode_and_length() {
        for op in 0..=0xFFu8 {
            if let Some(entry) = lookup(op) {
                assert_eq!(entry.opcode, op);
                assert!((1..=3).contains(&entry.length), "{}", entry.mnemonic);
            }
            assert_eq!(lookup_cb(op).opcode, op);
        }
    }

    #[test]
    fn inc_and_dec_decode_the_same_register() {
        // DEC r sits one opcode above INC r and must name the same register.
        for inc in [0x04u8, 0x0C, 0x14, 0x1C, 0x24, 0x2C, 0x34, 0x3C] {
            let Op::Inc8(inc_target) = lookup(inc).map(|i| i.op).unwrap() else {
                panic!("0x{inc:02X} is not INC");
            };
            let Op::Dec8(dec_target) = lookup(inc + 1).map(|i| i.op).unwrap() else {
                panic!("0x{:02X} is not DEC", inc + 1);
            };
            assert_eq!(inc_target, dec_target);
        }
    }

    #[test]
    fn selected_mnemonics_and_lengths() {
        let check = |op: u8, name: &str, len: u8| {
            let entry = lookup(op).unwrap();
            assert_eq!(entry.mnemonic, name);
            assert_eq!(entry.length, len);
        };
        check(0x01, "LD BC,d16", 3);
        check(0x08, "LD (a16),SP", 3);
        check(0x20, "JR NZ,e8", 2);
        check(0x22, "LD (HL+),A", 1);
        check(0x3E, "LD A,d8", 2);
        check(0x4F, "LD C,A", 1);
        check(0x77, "LD (HL),A", 1);
        check(0x80, "ADD A,B", 1);
        check(0xAF, "XOR A", 1);
        check(0xC5, "PUSH BC", 1);
        check(0xCB, "PREFIX CB", 2);
        check(0xCD, "CALL a16", 3);
        check(0xE0, "LDH (a8),A", 2);
        check(0xE2, "LD (C),A", 1);
        check(0xFF, "RST 38h", 1);
    }

    #[test]
    fn cb_table_decodes_bit_fields() {
        let bit = lookup_cb(0x7C);
        assert_eq!(bit.mnemonic, "BIT 7,H");
        assert_eq!(bit.op, CbOp::Bit(7));
        assert_eq!(bit.target, Target::Reg(Reg8::H));

        let swap = lookup_cb(0x36);
        assert_eq!(swap.op, CbOp::Shift(ShiftOp::Swap));
        assert_eq!(swap.target, Target::IndHL);
        assert_eq!(swap.cycles, 16);

        assert_eq!(lookup_cb(0x46).cycles, 12);
        assert_eq!(lookup_cb(0xFF).mnemonic, "SET 7,A");
    }
}
