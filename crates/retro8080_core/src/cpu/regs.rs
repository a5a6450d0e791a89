use bitflags::bitflags;

/// Two 8-bit registers sharing one 16-bit value.
///
/// The pair is stored as a single `u16`; the halves are derived with
/// shift/mask so the two views can never disagree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegisterPair(u16);

impl RegisterPair {
    #[inline]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn get(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn set(&mut self, value: u16) {
        self.0 = value;
    }

    #[inline]
    pub const fn high(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn low(self) -> u8 {
        self.0 as u8
    }

    #[inline]
    pub fn set_high(&mut self, value: u8) {
        self.0 = (self.0 & 0x00ff) | ((value as u16) << 8);
    }

    #[inline]
    pub fn set_low(&mut self, value: u8) {
        self.0 = (self.0 & 0xff00) | value as u16;
    }
}

bitflags! {
    /// Condition bits as laid out in the PSW low byte.
    ///
    /// Bits 1, 3 and 5 have no meaning but are kept when the byte is popped
    /// off the stack, so a PUSH PSW / POP PSW pair is lossless.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Flags: u8 {
        const CARRY = 0x01;
        const PARITY = 0x04;
        /// Auxiliary carry. Stored and restored, never computed.
        const AUX_CARRY = 0x10;
        const ZERO = 0x40;
        const SIGN = 0x80;
    }
}

/// 8-bit operand selector, in opcode encoding order (`M` is memory at HL).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg {
    B,
    C,
    D,
    E,
    H,
    L,
    M,
    A,
}

impl Reg {
    /// Decode the 3-bit register field used by MOV, MVI, INR, DCR and the ALU group.
    pub const fn from_code(code: u8) -> Self {
        match code & 0x07 {
            0 => Reg::B,
            1 => Reg::C,
            2 => Reg::D,
            3 => Reg::E,
            4 => Reg::H,
            5 => Reg::L,
            6 => Reg::M,
            _ => Reg::A,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Reg::B => "B",
            Reg::C => "C",
            Reg::D => "D",
            Reg::E => "E",
            Reg::H => "H",
            Reg::L => "L",
            Reg::M => "M",
            Reg::A => "A",
        }
    }
}

/// 16-bit operand selector. `Sp` and `Psw` share encoding slot 3 depending
/// on the instruction group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pair {
    Bc,
    De,
    Hl,
    Sp,
    Psw,
}

impl Pair {
    /// Register-pair field for LXI, INX, DCX and DAD.
    pub const fn from_code_sp(code: u8) -> Self {
        match code & 0x03 {
            0 => Pair::Bc,
            1 => Pair::De,
            2 => Pair::Hl,
            _ => Pair::Sp,
        }
    }

    /// Register-pair field for PUSH and POP.
    pub const fn from_code_psw(code: u8) -> Self {
        match code & 0x03 {
            0 => Pair::Bc,
            1 => Pair::De,
            2 => Pair::Hl,
            _ => Pair::Psw,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Pair::Bc => "B",
            Pair::De => "D",
            Pair::Hl => "H",
            Pair::Sp => "SP",
            Pair::Psw => "PSW",
        }
    }
}

/// Architectural register file of the 8080.
#[derive(Clone, Copy, Debug, Default)]
pub struct Registers {
    pub a: u8,
    pub bc: RegisterPair,
    pub de: RegisterPair,
    pub hl: RegisterPair,
    pub flags: Flags,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    /// Read an 8-bit register.
    ///
    /// # Panics
    ///
    /// Panics on `Reg::M`, which names memory at HL rather than a register.
    /// The CPU resolves memory operands before reaching the register file.
    pub fn get(&self, reg: Reg) -> u8 {
        match reg {
            Reg::B => self.bc.high(),
            Reg::C => self.bc.low(),
            Reg::D => self.de.high(),
            Reg::E => self.de.low(),
            Reg::H => self.hl.high(),
            Reg::L => self.hl.low(),
            Reg::A => self.a,
            Reg::M => panic!("memory operand is not a register"),
        }
    }

    /// Write an 8-bit register.
    ///
    /// # Panics
    ///
    /// Panics on `Reg::M`, as [`Registers::get`] does.
    pub fn set(&mut self, reg: Reg, value: u8) {
        match reg {
            Reg::B => self.bc.set_high(value),
            Reg::C => self.bc.set_low(value),
            Reg::D => self.de.set_high(value),
            Reg::E => self.de.set_low(value),
            Reg::H => self.hl.set_high(value),
            Reg::L => self.hl.set_low(value),
            Reg::A => self.a = value,
            Reg::M => panic!("memory operand is not a register"),
        }
    }

    /// Read a register pair; PSW packs A above the raw flag byte.
    pub fn pair(&self, pair: Pair) -> u16 {
        match pair {
            Pair::Bc => self.bc.get(),
            Pair::De => self.de.get(),
            Pair::Hl => self.hl.get(),
            Pair::Sp => self.sp,
            Pair::Psw => u16::from_be_bytes([self.a, self.flags.bits()]),
        }
    }

    pub fn set_pair(&mut self, pair: Pair, value: u16) {
        match pair {
            Pair::Bc => self.bc.set(value),
            Pair::De => self.de.set(value),
            Pair::Hl => self.hl.set(value),
            Pair::Sp => self.sp = value,
            Pair::Psw => {
                let [a, f] = value.to_be_bytes();
                self.a = a;
                self.flags = Flags::from_bits_retain(f);
            }
        }
    }

    #[inline]
    pub fn flag(&self, flag: Flags) -> bool {
        self.flags.contains(flag)
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flags, on: bool) {
        self.flags.set(flag, on);
    }
}
