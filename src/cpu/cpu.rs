use log::{error, trace};

use crate::{
    bus::{Bus, INTERRUPT_ENABLE_ADDR, INTERRUPT_FLAG_ADDR},
    cpu::{
        flags::{FLAG_CARRY, FLAG_HALF_CARRY, FLAG_SUBTRACT, FLAG_ZERO},
        interrupts::Interrupt,
        registers::Registers,
    },
};

/// Cycles a halted CPU burns per step while waiting for an interrupt.
pub const HALT_CYCLES: u32 = 4;

/// I/O registers the boot ROM leaves initialised, written by `reset`.
const POST_BOOT_IO: [(u16, u8); 7] = [
    (0xFF40, 0x91), // LCDC
    (0xFF42, 0x00), // SCY
    (0xFF43, 0x00), // SCX
    (0xFF45, 0x00), // LYC
    (0xFF4A, 0x00), // WY
    (0xFF4B, 0x00), // WX
    (INTERRUPT_ENABLE_ADDR, 0x00),
];

/// Operand encoding shared by the 8-bit instruction groups: B C D E H L (HL) A.
const OPERAND_HL: u8 = 6;

pub struct Cpu<B: Bus> {
    pub regs: Registers,
    pub bus: B,
    /// Interrupt master enable.
    pub ime: bool,
    pub halted: bool,
    /// Total cycles executed since `reset`.
    pub cycles: u64,
}

impl<B: Bus> Cpu<B> {
    pub fn new(bus: B) -> Self {
        Self {
            regs: Registers::default(),
            bus,
            ime: false,
            halted: false,
            cycles: 0,
        }
    }

    /// Put the CPU and the I/O registers in the state the boot ROM hands over with.
    pub fn reset(&mut self) {
        self.regs = Registers::power_up();
        self.ime = false;
        self.halted = false;
        self.cycles = 0;

        for (addr, value) in POST_BOOT_IO {
            self.bus.write8(addr, value);
        }
    }

    /// Run one instruction (after any interrupt dispatch) and return the cycles it took.
    /// A return of 0 means the opcode is not a valid instruction.
    pub fn step(&mut self) -> u32 {
        self.service_interrupts();

        if self.halted {
            self.cycles += HALT_CYCLES as u64;
            return HALT_CYCLES;
        }

        let pc = self.regs.pc;
        let opcode = self.fetch_byte();
        trace!("{:04X}  {:02X}  {}", pc, opcode, self.regs);

        let cost = self.execute(opcode);
        if cost == 0 {
            error!("invalid opcode ${:02X} at ${:04X}", opcode, pc);
        }
        self.cycles += cost as u64;
        cost
    }

    /// Any pending and enabled interrupt wakes the CPU; with IME set the highest-priority one is taken.
    fn service_interrupts(&mut self) {
        let flags = self.bus.read8(INTERRUPT_FLAG_ADDR);
        let enabled = self.bus.read8(INTERRUPT_ENABLE_ADDR);
        let Some(interrupt) = Interrupt::highest(flags & enabled & 0x1F) else {
            return;
        };

        self.halted = false;
        if !self.ime {
            return;
        }

        self.ime = false;
        self.bus.write8(INTERRUPT_FLAG_ADDR, flags & !interrupt.mask());
        self.push(self.regs.pc);
        self.regs.pc = interrupt.vector();
        trace!("interrupt {:?} -> ${:04X}", interrupt, self.regs.pc);
    }

    fn fetch_byte(&mut self) -> u8 {
        let byte = self.bus.read8(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        byte
    }

    fn fetch_word(&mut self) -> u16 {
        let lo = self.fetch_byte() as u16;
        let hi = self.fetch_byte() as u16;
        (hi << 8) | lo
    }

    fn push(&mut self, value: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(2);
        self.bus.write16(self.regs.sp, value);
    }

    fn pop(&mut self) -> u16 {
        let value = self.bus.read16(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        value
    }

    fn read_operand(&mut self, index: u8) -> u8 {
        match index {
            0 => self.regs.b,
            1 => self.regs.c,
            2 => self.regs.d,
            3 => self.regs.e,
            4 => self.regs.h,
            5 => self.regs.l,
            OPERAND_HL => self.bus.read8(self.regs.hl()),
            _ => self.regs.a,
        }
    }

    fn write_operand(&mut self, index: u8, value: u8) {
        match index {
            0 => self.regs.b = value,
            1 => self.regs.c = value,
            2 => self.regs.d = value,
            3 => self.regs.e = value,
            4 => self.regs.h = value,
            5 => self.regs.l = value,
            OPERAND_HL => self.bus.write8(self.regs.hl(), value),
            _ => self.regs.a = value,
        }
    }

    /// BC DE HL SP.
    fn read_pair(&self, index: u8) -> u16 {
        match index {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.regs.hl(),
            _ => self.regs.sp,
        }
    }

    fn write_pair(&mut self, index: u8, value: u16) {
        match index {
            0 => self.regs.set_bc(value),
            1 => self.regs.set_de(value),
            2 => self.regs.set_hl(value),
            _ => self.regs.sp = value,
        }
    }

    /// NZ Z NC C.
    fn condition(&self, index: u8) -> bool {
        match index & 3 {
            0 => !self.regs.flag(FLAG_ZERO),
            1 => self.regs.flag(FLAG_ZERO),
            2 => !self.regs.flag(FLAG_CARRY),
            _ => self.regs.flag(FLAG_CARRY),
        }
    }

    fn execute(&mut self, opcode: u8) -> u32 {
        let y = (opcode >> 3) & 7;
        let z = opcode & 7;
        let pair = (opcode >> 4) & 3;

        match opcode {
            0x00 => 4,
            // STOP: the padding byte is skipped, nothing else happens
            0x10 => {
                self.fetch_byte();
                4
            }
            0x76 => {
                self.halt();
                4
            }

            // 8-bit loads
            0x40..=0x7F => {
                let value = self.read_operand(z);
                self.write_operand(y, value);
                if y == OPERAND_HL || z == OPERAND_HL { 8 } else { 4 }
            }
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
                let value = self.fetch_byte();
                self.write_operand(y, value);
                if y == OPERAND_HL { 12 } else { 8 }
            }
            0x02 => {
                self.bus.write8(self.regs.bc(), self.regs.a);
                8
            }
            0x12 => {
                self.bus.write8(self.regs.de(), self.regs.a);
                8
            }
            0x22 => {
                let hl = self.regs.hl();
                self.bus.write8(hl, self.regs.a);
                self.regs.set_hl(hl.wrapping_add(1));
                8
            }
            0x32 => {
                let hl = self.regs.hl();
                self.bus.write8(hl, self.regs.a);
                self.regs.set_hl(hl.wrapping_sub(1));
                8
            }
            0x0A => {
                self.regs.a = self.bus.read8(self.regs.bc());
                8
            }
            0x1A => {
                self.regs.a = self.bus.read8(self.regs.de());
                8
            }
            0x2A => {
                let hl = self.regs.hl();
                self.regs.a = self.bus.read8(hl);
                self.regs.set_hl(hl.wrapping_add(1));
                8
            }
            0x3A => {
                let hl = self.regs.hl();
                self.regs.a = self.bus.read8(hl);
                self.regs.set_hl(hl.wrapping_sub(1));
                8
            }
            0xE0 => {
                let addr = 0xFF00 | self.fetch_byte() as u16;
                self.bus.write8(addr, self.regs.a);
                12
            }
            0xF0 => {
                let addr = 0xFF00 | self.fetch_byte() as u16;
                self.regs.a = self.bus.read8(addr);
                12
            }
            0xE2 => {
                self.bus.write8(0xFF00 | self.regs.c as u16, self.regs.a);
                8
            }
            0xF2 => {
                self.regs.a = self.bus.read8(0xFF00 | self.regs.c as u16);
                8
            }
            0xEA => {
                let addr = self.fetch_word();
                self.bus.write8(addr, self.regs.a);
                16
            }
            0xFA => {
                let addr = self.fetch_word();
                self.regs.a = self.bus.read8(addr);
                16
            }

            // 16-bit loads and stack
            0x01 | 0x11 | 0x21 | 0x31 => {
                let value = self.fetch_word();
                self.write_pair(pair, value);
                12
            }
            0x08 => {
                let addr = self.fetch_word();
                self.bus.write16(addr, self.regs.sp);
                20
            }
            0xF9 => {
                self.regs.sp = self.regs.hl();
                8
            }
            0xF8 => {
                let value = self.add_sp_offset();
                self.regs.set_hl(value);
                12
            }
            0xC5 | 0xD5 | 0xE5 | 0xF5 => {
                let value = if pair == 3 {
                    self.regs.af()
                } else {
                    self.read_pair(pair)
                };
                self.push(value);
                16
            }
            0xC1 | 0xD1 | 0xE1 | 0xF1 => {
                let value = self.pop();
                if pair == 3 {
                    self.regs.set_af(value);
                } else {
                    self.write_pair(pair, value);
                }
                12
            }

            // 8-bit arithmetic and logic
            0x80..=0xBF => {
                let value = self.read_operand(z);
                self.alu(y, value);
                if z == OPERAND_HL { 8 } else { 4 }
            }
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                let value = self.fetch_byte();
                self.alu(y, value);
                8
            }
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
                let value = self.read_operand(y);
                let result = self.inc(value);
                self.write_operand(y, result);
                if y == OPERAND_HL { 12 } else { 4 }
            }
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
                let value = self.read_operand(y);
                let result = self.dec(value);
                self.write_operand(y, result);
                if y == OPERAND_HL { 12 } else { 4 }
            }
            0x27 => {
                self.daa();
                4
            }
            0x2F => {
                self.regs.a = !self.regs.a;
                self.regs.set_flag(FLAG_SUBTRACT, true);
                self.regs.set_flag(FLAG_HALF_CARRY, true);
                4
            }
            0x37 => {
                let zero = self.regs.flag(FLAG_ZERO);
                self.regs.set_flags(zero, false, false, true);
                4
            }
            0x3F => {
                let zero = self.regs.flag(FLAG_ZERO);
                let carry = self.regs.flag(FLAG_CARRY);
                self.regs.set_flags(zero, false, false, !carry);
                4
            }

            // 16-bit arithmetic
            0x03 | 0x13 | 0x23 | 0x33 => {
                let value = self.read_pair(pair).wrapping_add(1);
                self.write_pair(pair, value);
                8
            }
            0x0B | 0x1B | 0x2B | 0x3B => {
                let value = self.read_pair(pair).wrapping_sub(1);
                self.write_pair(pair, value);
                8
            }
            0x09 | 0x19 | 0x29 | 0x39 => {
                let value = self.read_pair(pair);
                self.add_hl(value);
                8
            }
            0xE8 => {
                self.regs.sp = self.add_sp_offset();
                16
            }

            // Accumulator rotates always clear Z
            0x07 | 0x0F | 0x17 | 0x1F => {
                let result = self.rotate_shift(y, self.regs.a);
                self.regs.a = result;
                self.regs.set_flag(FLAG_ZERO, false);
                4
            }

            // Jumps, calls, returns
            0x18 => {
                self.jump_relative(true);
                12
            }
            0x20 | 0x28 | 0x30 | 0x38 => {
                if self.jump_relative(self.condition(y)) { 12 } else { 8 }
            }
            0xC3 => {
                self.regs.pc = self.fetch_word();
                16
            }
            0xC2 | 0xCA | 0xD2 | 0xDA => {
                let target = self.fetch_word();
                if self.condition(y) {
                    self.regs.pc = target;
                    16
                } else {
                    12
                }
            }
            0xE9 => {
                self.regs.pc = self.regs.hl();
                4
            }
            0xCD => {
                let target = self.fetch_word();
                self.call(target);
                24
            }
            0xC4 | 0xCC | 0xD4 | 0xDC => {
                let target = self.fetch_word();
                if self.condition(y) {
                    self.call(target);
                    24
                } else {
                    12
                }
            }
            0xC9 => {
                self.regs.pc = self.pop();
                16
            }
            0xD9 => {
                self.regs.pc = self.pop();
                self.ime = true;
                16
            }
            0xC0 | 0xC8 | 0xD0 | 0xD8 => {
                if self.condition(y) {
                    self.regs.pc = self.pop();
                    20
                } else {
                    8
                }
            }
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                self.call((opcode & 0x38) as u16);
                16
            }

            // Interrupt control takes effect immediately.
            0xF3 => {
                self.ime = false;
                4
            }
            0xFB => {
                self.ime = true;
                4
            }

            0xCB => {
                let opcode = self.fetch_byte();
                self.execute_prefixed(opcode)
            }

            // D3 DB DD E3 E4 EB EC ED F4 FC FD
            _ => 0,
        }
    }

    /// CB page: rotates and shifts, BIT, RES, SET. Costs include the prefix byte.
    fn execute_prefixed(&mut self, opcode: u8) -> u32 {
        let bit = (opcode >> 3) & 7;
        let z = opcode & 7;
        let value = self.read_operand(z);

        match opcode >> 6 {
            0 => {
                let result = self.rotate_shift(bit, value);
                self.write_operand(z, result);
            }
            1 => {
                let carry = self.regs.flag(FLAG_CARRY);
                self.regs
                    .set_flags(value & (1 << bit) == 0, false, true, carry);
                return if z == OPERAND_HL { 12 } else { 8 };
            }
            2 => self.write_operand(z, value & !(1 << bit)),
            _ => self.write_operand(z, value | (1 << bit)),
        }

        if z == OPERAND_HL { 16 } else { 8 }
    }

    fn halt(&mut self) {
        // With IME clear the CPU carries on; the hardware's halt bug is not modelled.
        if self.ime {
            self.halted = true;
        }
    }

    /// Returns whether the branch was taken.
    fn jump_relative(&mut self, condition: bool) -> bool {
        let offset = self.fetch_byte() as i8;
        if condition {
            self.regs.pc = self.regs.pc.wrapping_add(offset as u16);
        }
        condition
    }

    fn call(&mut self, target: u16) {
        self.push(self.regs.pc);
        self.regs.pc = target;
    }

    /// ADD ADC SUB SBC AND XOR OR CP, selected by `op`.
    fn alu(&mut self, op: u8, value: u8) {
        let a = self.regs.a;
        let carry_in = self.regs.flag(FLAG_CARRY) as u8;

        match op {
            0 | 1 => {
                let carry = if op == 1 { carry_in } else { 0 };
                let sum = a as u16 + value as u16 + carry as u16;
                let result = sum as u8;
                let half = (a & 0x0F) + (value & 0x0F) + carry > 0x0F;
                self.regs.set_flags(result == 0, false, half, sum > 0xFF);
                self.regs.a = result;
            }
            2 | 3 | 7 => {
                let carry = if op == 3 { carry_in } else { 0 };
                let result = a.wrapping_sub(value).wrapping_sub(carry);
                let half = (a & 0x0F) < (value & 0x0F) + carry;
                let borrow = (a as u16) < value as u16 + carry as u16;
                self.regs.set_flags(result == 0, true, half, borrow);
                if op != 7 {
                    self.regs.a = result;
                }
            }
            4 => {
                self.regs.a = a & value;
                self.regs.set_flags(self.regs.a == 0, false, true, false);
            }
            5 => {
                self.regs.a = a ^ value;
                self.regs.set_flags(self.regs.a == 0, false, false, false);
            }
            _ => {
                self.regs.a = a | value;
                self.regs.set_flags(self.regs.a == 0, false, false, false);
            }
        }
    }

    /// INC/DEC leave the carry flag alone.
    fn inc(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        let carry = self.regs.flag(FLAG_CARRY);
        self.regs
            .set_flags(result == 0, false, value & 0x0F == 0x0F, carry);
        result
    }

    fn dec(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        let carry = self.regs.flag(FLAG_CARRY);
        self.regs
            .set_flags(result == 0, true, value & 0x0F == 0, carry);
        result
    }

    /// ADD HL,rr: half-carry out of bit 11, carry out of bit 15, Z untouched.
    fn add_hl(&mut self, value: u16) {
        let hl = self.regs.hl();
        let (result, carry) = hl.overflowing_add(value);
        let half = (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF;
        let zero = self.regs.flag(FLAG_ZERO);
        self.regs.set_flags(zero, false, half, carry);
        self.regs.set_hl(result);
    }

    /// SP + signed immediate; flags come from the unsigned low-byte addition.
    fn add_sp_offset(&mut self) -> u16 {
        let offset = self.fetch_byte();
        let sp = self.regs.sp;
        let half = (sp & 0x0F) + (offset as u16 & 0x0F) > 0x0F;
        let carry = (sp & 0xFF) + offset as u16 > 0xFF;
        self.regs.set_flags(false, false, half, carry);
        sp.wrapping_add(offset as i8 as u16)
    }

    /// RLC RRC RL RR SLA SRA SWAP SRL, selected by `op`.
    fn rotate_shift(&mut self, op: u8, value: u8) -> u8 {
        let carry_in = self.regs.flag(FLAG_CARRY) as u8;
        let (result, carry) = match op {
            0 => (value.rotate_left(1), value & 0x80 != 0),
            1 => (value.rotate_right(1), value & 0x01 != 0),
            2 => ((value << 1) | carry_in, value & 0x80 != 0),
            3 => ((value >> 1) | (carry_in << 7), value & 0x01 != 0),
            4 => (value << 1, value & 0x80 != 0),
            5 => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
            6 => (value.rotate_left(4), false),
            _ => (value >> 1, value & 0x01 != 0),
        };
        self.regs.set_flags(result == 0, false, false, carry);
        result
    }

    fn daa(&mut self) {
        let mut a = self.regs.a;
        let mut carry = self.regs.flag(FLAG_CARRY);
        let half = self.regs.flag(FLAG_HALF_CARRY);
        let subtract = self.regs.flag(FLAG_SUBTRACT);

        if subtract {
            if carry {
                a = a.wrapping_sub(0x60);
            }
            if half {
                a = a.wrapping_sub(0x06);
            }
        } else {
            if carry || a > 0x99 {
                a = a.wrapping_add(0x60);
                carry = true;
            }
            if half || a & 0x0F > 0x09 {
                a = a.wrapping_add(0x06);
            }
        }

        self.regs.a = a;
        self.regs.set_flags(a == 0, subtract, false, carry);
    }
}
