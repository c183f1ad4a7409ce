use std::fmt;
use std::str::FromStr;

use crate::error::CpuError;

/// Registers for the Game Boy CPU (LR35902).
///
/// F only ever holds the four condition flags in its upper nibble; the
/// lower nibble reads as zero whichever way it is written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

/// 8-bit register names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reg8 {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
}

/// 16-bit register names: the four pairs plus SP and PC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reg16 {
    AF,
    BC,
    DE,
    HL,
    SP,
    PC,
}

impl Reg8 {
    /// Register selected by the 3-bit `r` field of an opcode, with index 6
    /// (the `(HL)` slot) excluded.
    ///
    /// 0=B, 1=C, 2=D, 3=E, 4=H, 5=L, 7=A.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Reg8::B),
            1 => Some(Reg8::C),
            2 => Some(Reg8::D),
            3 => Some(Reg8::E),
            4 => Some(Reg8::H),
            5 => Some(Reg8::L),
            7 => Some(Reg8::A),
            _ => None,
        }
    }
}

impl Reg16 {
    /// Pair selected by the `rp` field (bits 5..4) used by LD/INC/DEC/ADD.
    pub fn from_rp(rp: u8) -> Self {
        match rp & 0x03 {
            0 => Reg16::BC,
            1 => Reg16::DE,
            2 => Reg16::HL,
            _ => Reg16::SP,
        }
    }

    /// Pair selected by the `rp2` field used by PUSH/POP, where slot 3 is AF.
    pub fn from_rp2(rp: u8) -> Self {
        match rp & 0x03 {
            0 => Reg16::BC,
            1 => Reg16::DE,
            2 => Reg16::HL,
            _ => Reg16::AF,
        }
    }
}

impl FromStr for Reg8 {
    type Err = CpuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(Reg8::A),
            "F" => Ok(Reg8::F),
            "B" => Ok(Reg8::B),
            "C" => Ok(Reg8::C),
            "D" => Ok(Reg8::D),
            "E" => Ok(Reg8::E),
            "H" => Ok(Reg8::H),
            "L" => Ok(Reg8::L),
            _ => Err(CpuError::InvalidRegisterName(s.to_string())),
        }
    }
}

impl FromStr for Reg16 {
    type Err = CpuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AF" => Ok(Reg16::AF),
            "BC" => Ok(Reg16::BC),
            "DE" => Ok(Reg16::DE),
            "HL" => Ok(Reg16::HL),
            "SP" => Ok(Reg16::SP),
            "PC" => Ok(Reg16::PC),
            _ => Err(CpuError::InvalidRegisterName(s.to_string())),
        }
    }
}

impl fmt::Display for Reg8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reg8::A => "A",
            Reg8::F => "F",
            Reg8::B => "B",
            Reg8::C => "C",
            Reg8::D => "D",
            Reg8::E => "E",
            Reg8::H => "H",
            Reg8::L => "L",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Reg16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reg16::AF => "AF",
            Reg16::BC => "BC",
            Reg16::DE => "DE",
            Reg16::HL => "HL",
            Reg16::SP => "SP",
            Reg16::PC => "PC",
        };
        f.write_str(name)
    }
}

impl Registers {
    #[inline]
    pub fn af(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f & 0xF0])
    }

    #[inline]
    pub fn set_af(&mut self, value: u16) {
        let [a, f] = value.to_be_bytes();
        self.a = a;
        // Lower 4 bits of F are always zero.
        self.f = f & 0xF0;
    }

    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        [self.b, self.c] = value.to_be_bytes();
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        [self.d, self.e] = value.to_be_bytes();
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        [self.h, self.l] = value.to_be_bytes();
    }

    pub fn get8(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::A => self.a,
            Reg8::F => self.f & 0xF0,
            Reg8::B => self.b,
            Reg8::C => self.c,
            Reg8::D => self.d,
            Reg8::E => self.e,
            Reg8::H => self.h,
            Reg8::L => self.l,
        }
    }

    pub fn set8(&mut self, reg: Reg8, value: u8) {
        match reg {
            Reg8::A => self.a = value,
            Reg8::F => self.f = value & 0xF0,
            Reg8::B => self.b = value,
            Reg8::C => self.c = value,
            Reg8::D => self.d = value,
            Reg8::E => self.e = value,
            Reg8::H => self.h = value,
            Reg8::L => self.l = value,
        }
    }

    pub fn get16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::AF => self.af(),
            Reg16::BC => self.bc(),
            Reg16::DE => self.de(),
            Reg16::HL => self.hl(),
            Reg16::SP => self.sp,
            Reg16::PC => self.pc,
        }
    }

    pub fn set16(&mut self, reg: Reg16, value: u16) {
        match reg {
            Reg16::AF => self.set_af(value),
            Reg16::BC => self.set_bc(value),
            Reg16::DE => self.set_de(value),
            Reg16::HL => self.set_hl(value),
            Reg16::SP => self.sp = value,
            Reg16::PC => self.pc = value,
        }
    }

    /// Register values the DMG boot ROM leaves behind when it hands
    /// control to cartridge code at 0x0100 (Pan Docs, "Power Up Sequence").
    pub fn dmg_post_boot() -> Self {
        Self {
            a: 0x01,
            f: 0xB0,
            b: 0x00,
            c: 0x13,
            d: 0x00,
            e: 0xD8,
            h: 0x01,
            l: 0x4D,
            sp: 0xFFFE,
            pc: 0x0100,
        }
    }
}

/// Flag bits in the F register.
///
/// Layout (bit index in the byte, from MSB to LSB):
/// - bit 7: Z (zero)
/// - bit 6: N (subtract)
/// - bit 5: H (half carry)
/// - bit 4: C (carry)
/// - bits 0–3 are always zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    Z = 7,
    N = 6,
    H = 5,
    C = 4,
}

/// Values accepted by `Cpu::set_flag`.
///
/// Flags are often derived from a numeric test ("result is zero"), so any
/// integer is accepted and coerced: zero clears the flag, anything else
/// sets it.
pub trait FlagBit {
    fn flag_bit(self) -> bool;
}

impl FlagBit for bool {
    #[inline]
    fn flag_bit(self) -> bool {
        self
    }
}

macro_rules! impl_flag_bit_for_int {
    ($($t:ty),*) => {
        $(
            impl FlagBit for $t {
                #[inline]
                fn flag_bit(self) -> bool {
                    self != 0
                }
            }
        )*
    };
}

impl_flag_bit_for_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
