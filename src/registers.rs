/// 8-bit register operands as encoded in the opcode's `ddd`/`sss` fields.
/// `M` is the byte addressed by HL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
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
}

/// Register pairs. `SP` and `PSW` share encoding slot 3 depending on the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pair {
    BC,
    DE,
    HL,
    SP,
    PSW,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub s: bool,
    pub z: bool,
    pub ac: bool,
    pub p: bool,
    pub cy: bool,
}

impl Flags {
    pub fn set_szp(&mut self, value: u8) {
        self.s = value & 0x80 != 0;
        self.z = value == 0;
        self.p = value.count_ones() % 2 == 0;
    }

    // S Z 0 AC 0 P 1 CY
    pub fn to_byte(self) -> u8 {
        (self.s as u8) << 7
            | (self.z as u8) << 6
            | (self.ac as u8) << 4
            | (self.p as u8) << 2
            | 1 << 1
            | self.cy as u8
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            s: byte & 0x80 != 0,
            z: byte & 0x40 != 0,
            ac: byte & 0x10 != 0,
            p: byte & 0x04 != 0,
            cy: byte & 0x01 != 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registers {
    // indexed by `Reg`; the `M` slot is never used
    regs: [u8; 8],
    pub flags: Flags,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    /// Register value; `M` is not a register and reads as 0 here.
    pub fn get(&self, reg: Reg) -> u8 {
        match reg {
            Reg::M => 0,
            _ => self.regs[reg as usize],
        }
    }

    pub fn set(&mut self, reg: Reg, value: u8) {
        if reg != Reg::M {
            self.regs[reg as usize] = value;
        }
    }

    pub fn a(&self) -> u8 {
        self.regs[Reg::A as usize]
    }

    pub fn set_a(&mut self, value: u8) {
        self.regs[Reg::A as usize] = value;
    }

    pub fn pair(&self, pair: Pair) -> u16 {
        let join = |hi: Reg, lo: Reg| u16::from_be_bytes([self.get(hi), self.get(lo)]);
        match pair {
            Pair::BC => join(Reg::B, Reg::C),
            Pair::DE => join(Reg::D, Reg::E),
            Pair::HL => join(Reg::H, Reg::L),
            Pair::SP => self.sp,
            Pair::PSW => u16::from_be_bytes([self.a(), self.flags.to_byte()]),
        }
    }

    pub fn set_pair(&mut self, pair: Pair, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        match pair {
            Pair::BC => {
                self.set(Reg::B, hi);
                self.set(Reg::C, lo);
            }
            Pair::DE => {
                self.set(Reg::D, hi);
                self.set(Reg::E, lo);
            }
            Pair::HL => {
                self.set(Reg::H, hi);
                self.set(Reg::L, lo);
            }
            Pair::SP => self.sp = value,
            Pair::PSW => {
                self.set_a(hi);
                self.flags = Flags::from_byte(lo);
            }
        }
    }

    pub fn hl(&self) -> u16 {
        self.pair(Pair::HL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs() {
        let mut regs = Registers::default();
        regs.set_pair(Pair::DE, 0x1234);
        assert_eq!(regs.get(Reg::D), 0x12);
        assert_eq!(regs.get(Reg::E), 0x34);
        regs.set(Reg::L, 0xff);
        assert_eq!(regs.hl(), 0x00ff);
    }

    #[test]
    fn test_flag_byte_layout() {
        let flags = Flags::from_byte(0xff);
        assert_eq!(flags.to_byte(), 0b1101_0111);
        assert_eq!(Flags::default().to_byte(), 0b0000_0010);
    }

    #[test]
    fn test_psw_round_trips_through_flags() {
        let mut regs = Registers::default();
        regs.set_pair(Pair::PSW, 0x42d7);
        assert_eq!(regs.a(), 0x42);
        assert!(regs.flags.s && regs.flags.z && regs.flags.ac && regs.flags.p && regs.flags.cy);
        assert_eq!(regs.pair(Pair::PSW), 0x42d7);
    }

    #[test]
    fn test_parity() {
        let mut flags = Flags::default();
        flags.set_szp(0b0000_0011);
        assert!(flags.p);
        flags.set_szp(0b0000_0111);
        assert!(!flags.p);
    }
}
