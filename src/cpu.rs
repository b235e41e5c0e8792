use std::time::Duration;

use crate::{
    decode::{AluOp, Cond, OpCodes, CYCLES},
    registers::{Pair, Reg, Registers},
};

/// Memory and port access as seen from the interpreter.
///
/// The interpreter never owns the bus; it is passed in on every call so the
/// machine can keep the memory map and peripherals to itself.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, value: u8);
    fn input(&mut self, port: u8) -> u8;
    fn output(&mut self, port: u8, value: u8);
}

/// The interpreter contract the scheduler drives.
pub trait Processor {
    /// Executes one instruction and returns the cycles it took.
    fn step<B: Bus>(&mut self, bus: &mut B) -> u32;

    /// Delivers an interrupt carrying a single-byte `RST` opcode.
    /// Returns false if interrupts are currently disabled.
    fn interrupt<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> bool;

    /// Human-readable throughput since start, given the wall time elapsed.
    fn debug_speed(&self, elapsed: Duration) -> String;
}

const CALL_RET_TAKEN: u32 = 6;

/// Intel 8080 core.
#[derive(Debug, Default)]
pub struct Intel8080 {
    pub regs: Registers,
    interrupts_enabled: bool,
    halted: bool,
    cycles: u64,
    instructions: u64,
}

impl Intel8080 {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    #[cfg(test)]
    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }

    fn next_byte<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let byte = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        byte
    }

    fn next_word<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.next_byte(bus);
        let hi = self.next_byte(bus);
        u16::from_le_bytes([lo, hi])
    }

    fn read_word<B: Bus>(bus: &mut B, addr: u16) -> u16 {
        u16::from_le_bytes([bus.read(addr), bus.read(addr.wrapping_add(1))])
    }

    fn write_word<B: Bus>(bus: &mut B, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        bus.write(addr, lo);
        bus.write(addr.wrapping_add(1), hi);
    }

    fn push<B: Bus>(&mut self, bus: &mut B, value: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(2);
        Self::write_word(bus, self.regs.sp, value);
    }

    fn pop<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let value = Self::read_word(bus, self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        value
    }

    fn load<B: Bus>(&self, bus: &mut B, reg: Reg) -> u8 {
        match reg {
            Reg::M => bus.read(self.regs.hl()),
            _ => self.regs.get(reg),
        }
    }

    fn store<B: Bus>(&mut self, bus: &mut B, reg: Reg, value: u8) {
        match reg {
            Reg::M => bus.write(self.regs.hl(), value),
            _ => self.regs.set(reg, value),
        }
    }

    fn condition(&self, cond: Option<Cond>) -> bool {
        let f = self.regs.flags;
        match cond {
            None => true,
            Some(Cond::NotZero) => !f.z,
            Some(Cond::Zero) => f.z,
            Some(Cond::NoCarry) => !f.cy,
            Some(Cond::Carry) => f.cy,
            Some(Cond::ParityOdd) => !f.p,
            Some(Cond::ParityEven) => f.p,
            Some(Cond::Plus) => !f.s,
            Some(Cond::Minus) => f.s,
        }
    }

    fn add(&mut self, value: u8, carry: bool) {
        let a = self.regs.a();
        let c = carry as u8;
        let sum = u16::from(a) + u16::from(value) + u16::from(c);
        let result = sum as u8;
        self.regs.flags.ac = (a & 0xf) + (value & 0xf) + c > 0xf;
        self.regs.flags.cy = sum > 0xff;
        self.regs.flags.set_szp(result);
        self.regs.set_a(result);
    }

    // The 8080 subtracts by adding the complement, which is what AC reflects.
    fn sub(&mut self, value: u8, borrow: bool) -> u8 {
        let a = self.regs.a();
        let b = borrow as u8;
        let diff = i16::from(a) - i16::from(value) - i16::from(b);
        let result = diff as u8;
        self.regs.flags.ac = (a & 0xf) + (!value & 0xf) + (1 - b) > 0xf;
        self.regs.flags.cy = diff < 0;
        self.regs.flags.set_szp(result);
        result
    }

    fn logic(&mut self, result: u8, ac: bool) {
        self.regs.flags.ac = ac;
        self.regs.flags.cy = false;
        self.regs.flags.set_szp(result);
        self.regs.set_a(result);
    }

    fn alu(&mut self, op: AluOp, value: u8) {
        let a = self.regs.a();
        let cy = self.regs.flags.cy;
        match op {
            AluOp::Add => self.add(value, false),
            AluOp::Adc => self.add(value, cy),
            AluOp::Sub => {
                let result = self.sub(value, false);
                self.regs.set_a(result);
            }
            AluOp::Sbb => {
                let result = self.sub(value, cy);
                self.regs.set_a(result);
            }
            AluOp::Ana => self.logic(a & value, (a | value) & 0x08 != 0),
            AluOp::Xra => self.logic(a ^ value, false),
            AluOp::Ora => self.logic(a | value, false),
            AluOp::Cmp => {
                self.sub(value, false);
            }
        }
    }

    fn decimal_adjust(&mut self) {
        let a = self.regs.a();
        let lsb = a & 0x0f;
        let msb = a >> 4;
        let mut correction = 0;
        let mut carry = self.regs.flags.cy;
        if self.regs.flags.ac || lsb > 9 {
            correction += 0x06;
        }
        if self.regs.flags.cy || msb > 9 || (msb >= 9 && lsb > 9) {
            correction += 0x60;
            carry = true;
        }
        self.add(correction, false);
        self.regs.flags.cy = carry;
    }

    /// Runs one decoded instruction; returns any cycles beyond the base count.
    fn execute<B: Bus>(&mut self, bus: &mut B, op: OpCodes) -> u32 {
        match op {
            OpCodes::Nop => {}
            OpCodes::LoadPairImmediate(pair) => {
                let value = self.next_word(bus);
                self.regs.set_pair(pair, value);
            }
            OpCodes::StoreAccIndirect(pair) => bus.write(self.regs.pair(pair), self.regs.a()),
            OpCodes::LoadAccIndirect(pair) => {
                let value = bus.read(self.regs.pair(pair));
                self.regs.set_a(value);
            }
            OpCodes::StoreHlDirect => {
                let addr = self.next_word(bus);
                Self::write_word(bus, addr, self.regs.hl());
            }
            OpCodes::LoadHlDirect => {
                let addr = self.next_word(bus);
                let value = Self::read_word(bus, addr);
                self.regs.set_pair(Pair::HL, value);
            }
            OpCodes::StoreAccDirect => {
                let addr = self.next_word(bus);
                bus.write(addr, self.regs.a());
            }
            OpCodes::LoadAccDirect => {
                let addr = self.next_word(bus);
                let value = bus.read(addr);
                self.regs.set_a(value);
            }
            OpCodes::IncrementPair(pair) => {
                self.regs
                    .set_pair(pair, self.regs.pair(pair).wrapping_add(1));
            }
            OpCodes::DecrementPair(pair) => {
                self.regs
                    .set_pair(pair, self.regs.pair(pair).wrapping_sub(1));
            }
            OpCodes::AddPairToHl(pair) => {
                let sum = u32::from(self.regs.hl()) + u32::from(self.regs.pair(pair));
                self.regs.flags.cy = sum > 0xffff;
                self.regs.set_pair(Pair::HL, sum as u16);
            }
            OpCodes::Increment(reg) => {
                let value = self.load(bus, reg).wrapping_add(1);
                self.regs.flags.ac = value & 0x0f == 0;
                self.regs.flags.set_szp(value);
                self.store(bus, reg, value);
            }
            OpCodes::Decrement(reg) => {
                let value = self.load(bus, reg).wrapping_sub(1);
                self.regs.flags.ac = value & 0x0f != 0x0f;
                self.regs.flags.set_szp(value);
                self.store(bus, reg, value);
            }
            OpCodes::MoveImmediate(reg) => {
                let value = self.next_byte(bus);
                self.store(bus, reg, value);
            }
            OpCodes::RotateLeft => {
                let a = self.regs.a();
                self.regs.flags.cy = a & 0x80 != 0;
                self.regs.set_a(a.rotate_left(1));
            }
            OpCodes::RotateRight => {
                let a = self.regs.a();
                self.regs.flags.cy = a & 1 != 0;
                self.regs.set_a(a.rotate_right(1));
            }
            OpCodes::RotateLeftThroughCarry => {
                let a = self.regs.a();
                let carry_in = self.regs.flags.cy as u8;
                self.regs.flags.cy = a & 0x80 != 0;
                self.regs.set_a((a << 1) | carry_in);
            }
            OpCodes::RotateRightThroughCarry => {
                let a = self.regs.a();
                let carry_in = self.regs.flags.cy as u8;
                self.regs.flags.cy = a & 1 != 0;
                self.regs.set_a((a >> 1) | (carry_in << 7));
            }
            OpCodes::DecimalAdjust => self.decimal_adjust(),
            OpCodes::ComplementAcc => self.regs.set_a(!self.regs.a()),
            OpCodes::SetCarry => self.regs.flags.cy = true,
            OpCodes::ComplementCarry => self.regs.flags.cy = !self.regs.flags.cy,
            OpCodes::Move(dst, src) => {
                let value = self.load(bus, src);
                self.store(bus, dst, value);
            }
            OpCodes::Halt => self.halted = true,
            OpCodes::Alu(op, reg) => {
                let value = self.load(bus, reg);
                self.alu(op, value);
            }
            OpCodes::AluImmediate(op) => {
                let value = self.next_byte(bus);
                self.alu(op, value);
            }
            OpCodes::Return(cond) => {
                if self.condition(cond) {
                    self.regs.pc = self.pop(bus);
                    if cond.is_some() {
                        return CALL_RET_TAKEN;
                    }
                }
            }
            OpCodes::Jump(cond) => {
                let addr = self.next_word(bus);
                if self.condition(cond) {
                    self.regs.pc = addr;
                }
            }
            OpCodes::Call(cond) => {
                let addr = self.next_word(bus);
                if self.condition(cond) {
                    self.push(bus, self.regs.pc);
                    self.regs.pc = addr;
                    if cond.is_some() {
                        return CALL_RET_TAKEN;
                    }
                }
            }
            OpCodes::Pop(pair) => {
                let value = self.pop(bus);
                self.regs.set_pair(pair, value);
            }
            OpCodes::Push(pair) => self.push(bus, self.regs.pair(pair)),
            OpCodes::Restart(n) => {
                self.push(bus, self.regs.pc);
                self.regs.pc = u16::from(n) * 8;
            }
            OpCodes::Output => {
                let port = self.next_byte(bus);
                bus.output(port, self.regs.a());
            }
            OpCodes::Input => {
                let port = self.next_byte(bus);
                let value = bus.input(port);
                self.regs.set_a(value);
            }
            OpCodes::ExchangeStackTop => {
                let top = Self::read_word(bus, self.regs.sp);
                Self::write_word(bus, self.regs.sp, self.regs.hl());
                self.regs.set_pair(Pair::HL, top);
            }
            OpCodes::ExchangeDeHl => {
                let de = self.regs.pair(Pair::DE);
                self.regs.set_pair(Pair::DE, self.regs.hl());
                self.regs.set_pair(Pair::HL, de);
            }
            OpCodes::DisableInterrupts => self.interrupts_enabled = false,
            OpCodes::EnableInterrupts => self.interrupts_enabled = true,
            OpCodes::JumpHl => self.regs.pc = self.regs.hl(),
            OpCodes::LoadSpFromHl => self.regs.sp = self.regs.hl(),
        }
        0
    }

    fn run_opcode<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let cycles = u32::from(CYCLES[opcode as usize]) + self.execute(bus, OpCodes::decode(opcode));
        self.cycles += u64::from(cycles);
        self.instructions += 1;
        cycles
    }
}

impl Processor for Intel8080 {
    fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        if self.halted {
            self.cycles += 4;
            return 4;
        }
        let opcode = self.next_byte(bus);
        self.run_opcode(bus, opcode)
    }

    fn interrupt<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> bool {
        if !self.interrupts_enabled {
            return false;
        }
        self.interrupts_enabled = false;
        self.halted = false;
        self.run_opcode(bus, opcode);
        true
    }

    fn debug_speed(&self, elapsed: Duration) -> String {
        let secs = elapsed.as_secs_f64().max(f64::EPSILON);
        format!(
            "{:.3} MHz, {:.0} instructions/s",
            self.cycles as f64 / secs / 1e6,
            self.instructions as f64 / secs
        )
    }
}
