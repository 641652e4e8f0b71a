use crate::cpu_z80::opcodes_index::IndexRegister;
use crate::cpu_z80::{opcodes_cb, opcodes_ed, opcodes_index, CpuZ80};

/// Execute one opcode from the unprefixed space and return its T-states.
/// The four prefix bytes hand off to their own dispatchers.
///
/// The opcode byte splits into octal fields (xx yyy zzz), which is why the
/// two big matrices in the middle of the map decode arithmetically instead
/// of as 128 spelled-out cases: yyy picks the destination register or the
/// ALU operation, zzz picks the source register, and field value 6 means
/// memory at HL.
pub fn execute(cpu: &mut CpuZ80, opcode: u8) -> u32 {
  match opcode {
    0xCB => opcodes_cb::execute(cpu),
    0xED => opcodes_ed::execute(cpu),
    0xDD => opcodes_index::execute(cpu, IndexRegister::Ix),
    0xFD => opcodes_index::execute(cpu, IndexRegister::Iy),

    // HALT sits in the middle of the LD matrix where LD (HL),(HL) would
    // be. PC stays parked on the opcode until something wakes the CPU.
    0x76 => {
      cpu.halted = true;
      cpu.pc = cpu.pc.wrapping_sub(1);
      4
    }

    // The LD r,r' matrix.
    0x40..=0x7F => {
      let dst = (opcode >> 3) & 0x07;
      let src = opcode & 0x07;
      let value = cpu.reg8(src);
      cpu.set_reg8(dst, value);
      if src == 6 || dst == 6 {
        7
      } else {
        4
      }
    }

    // The ALU-on-A matrix: ADD ADC SUB SBC AND XOR OR CP against r or (HL).
    0x80..=0xBF => {
      let src = opcode & 0x07;
      let value = cpu.reg8(src);
      alu_on_a(cpu, (opcode >> 3) & 0x07, value);
      if src == 6 {
        7
      } else {
        4
      }
    }

    0x00 => 4, // NOP

    // LD rr,nn
    0x01 | 0x11 | 0x21 | 0x31 => {
      let value = cpu.next_u16();
      set_pair(cpu, (opcode >> 4) & 0x03, value);
      10
    }

    // LD (BC),A and LD (DE),A. MEMPTR picks up A in its high byte, which
    // is one of the odder corners of the latch.
    0x02 | 0x12 => {
      let address = if opcode == 0x02 { cpu.bc() } else { cpu.de() };
      cpu.memory.write_u8(address, cpu.a);
      cpu.memptr = ((cpu.a as u16) << 8) | (address.wrapping_add(1) & 0x00FF);
      7
    }

    // INC rr / DEC rr. No flags.
    0x03 | 0x13 | 0x23 | 0x33 => {
      let index = (opcode >> 4) & 0x03;
      let value = pair(cpu, index).wrapping_add(1);
      set_pair(cpu, index, value);
      6
    }
    0x0B | 0x1B | 0x2B | 0x3B => {
      let index = (opcode >> 4) & 0x03;
      let value = pair(cpu, index).wrapping_sub(1);
      set_pair(cpu, index, value);
      6
    }

    // INC r / DEC r, including the (HL) slot.
    0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
      let index = (opcode >> 3) & 0x07;
      let value = cpu.reg8(index);
      let result = cpu.inc8(value);
      cpu.set_reg8(index, result);
      if index == 6 {
        11
      } else {
        4
      }
    }
    0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
      let index = (opcode >> 3) & 0x07;
      let value = cpu.reg8(index);
      let result = cpu.dec8(value);
      cpu.set_reg8(index, result);
      if index == 6 {
        11
      } else {
        4
      }
    }

    // LD r,n including LD (HL),n.
    0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
      let index = (opcode >> 3) & 0x07;
      let value = cpu.next_u8();
      cpu.set_reg8(index, value);
      if index == 6 {
        10
      } else {
        7
      }
    }

    0x07 => {
      cpu.rlca();
      4
    }
    0x0F => {
      cpu.rrca();
      4
    }
    0x17 => {
      cpu.rla();
      4
    }
    0x1F => {
      cpu.rra();
      4
    }

    // EX AF,AF'
    0x08 => {
      std::mem::swap(&mut cpu.a, &mut cpu.a_alt);
      std::mem::swap(&mut cpu.f, &mut cpu.f_alt);
      4
    }

    // ADD HL,rr
    0x09 | 0x19 | 0x29 | 0x39 => {
      let rhs = pair(cpu, (opcode >> 4) & 0x03);
      let result = cpu.add16(cpu.hl(), rhs);
      cpu.set_hl(result);
      11
    }

    // LD A,(BC) and LD A,(DE)
    0x0A | 0x1A => {
      let address = if opcode == 0x0A { cpu.bc() } else { cpu.de() };
      cpu.a = cpu.memory.read_u8(address);
      cpu.memptr = address.wrapping_add(1);
      7
    }

    // DJNZ d
    0x10 => {
      let offset = cpu.next_u8() as i8;
      cpu.b = cpu.b.wrapping_sub(1);
      if cpu.b != 0 {
        cpu.pc = cpu.pc.wrapping_add(offset as i16 as u16);
        cpu.memptr = cpu.pc;
        13
      } else {
        8
      }
    }

    // JR d
    0x18 => {
      let offset = cpu.next_u8() as i8;
      cpu.pc = cpu.pc.wrapping_add(offset as i16 as u16);
      cpu.memptr = cpu.pc;
      12
    }

    // JR cc,d for NZ Z NC C
    0x20 | 0x28 | 0x30 | 0x38 => {
      let offset = cpu.next_u8() as i8;
      if cpu.condition((opcode >> 3) & 0x03) {
        cpu.pc = cpu.pc.wrapping_add(offset as i16 as u16);
        cpu.memptr = cpu.pc;
        12
      } else {
        7
      }
    }

    // LD (nn),HL
    0x22 => {
      let address = cpu.next_u16();
      cpu.memory.write_u16(address, cpu.hl());
      cpu.memptr = address.wrapping_add(1);
      16
    }

    // LD HL,(nn)
    0x2A => {
      let address = cpu.next_u16();
      let value = cpu.memory.read_u16(address);
      cpu.set_hl(value);
      cpu.memptr = address.wrapping_add(1);
      16
    }

    0x27 => {
      cpu.daa();
      4
    }
    0x2F => {
      cpu.cpl();
      4
    }
    0x37 => {
      cpu.scf();
      4
    }
    0x3F => {
      cpu.ccf();
      4
    }

    // LD (nn),A
    0x32 => {
      let address = cpu.next_u16();
      cpu.memory.write_u8(address, cpu.a);
      cpu.memptr = ((cpu.a as u16) << 8) | (address.wrapping_add(1) & 0x00FF);
      13
    }

    // LD A,(nn)
    0x3A => {
      let address = cpu.next_u16();
      cpu.a = cpu.memory.read_u8(address);
      cpu.memptr = address.wrapping_add(1);
      13
    }

    // RET cc
    0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
      if cpu.condition((opcode >> 3) & 0x07) {
        cpu.pc = cpu.pop();
        cpu.memptr = cpu.pc;
        11
      } else {
        5
      }
    }

    // POP rr, where slot 3 is AF rather than SP.
    0xC1 | 0xD1 | 0xE1 | 0xF1 => {
      let value = cpu.pop();
      let index = (opcode >> 4) & 0x03;
      if index == 3 {
        cpu.set_af(value);
      } else {
        set_pair(cpu, index, value);
      }
      10
    }

    // JP cc,nn. MEMPTR takes the target whether or not the jump lands.
    0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
      let address = cpu.next_u16();
      cpu.memptr = address;
      if cpu.condition((opcode >> 3) & 0x07) {
        cpu.pc = address;
      }
      10
    }

    // JP nn
    0xC3 => {
      let address = cpu.next_u16();
      cpu.pc = address;
      cpu.memptr = address;
      10
    }

    // CALL cc,nn
    0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
      let address = cpu.next_u16();
      cpu.memptr = address;
      if cpu.condition((opcode >> 3) & 0x07) {
        cpu.push(cpu.pc);
        cpu.pc = address;
        17
      } else {
        10
      }
    }

    // PUSH rr, slot 3 again meaning AF.
    0xC5 | 0xD5 | 0xE5 | 0xF5 => {
      let index = (opcode >> 4) & 0x03;
      let value = if index == 3 { cpu.af() } else { pair(cpu, index) };
      cpu.push(value);
      11
    }

    // ALU A,n
    0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
      let value = cpu.next_u8();
      alu_on_a(cpu, (opcode >> 3) & 0x07, value);
      7
    }

    // RST n. The target page-zero address is encoded in bits 3-5.
    0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
      let target = (opcode & 0x38) as u16;
      cpu.push(cpu.pc);
      cpu.pc = target;
      cpu.memptr = target;
      11
    }

    // RET
    0xC9 => {
      cpu.pc = cpu.pop();
      cpu.memptr = cpu.pc;
      10
    }

    // CALL nn
    0xCD => {
      let address = cpu.next_u16();
      cpu.memptr = address;
      cpu.push(cpu.pc);
      cpu.pc = address;
      17
    }

    // OUT (n),A. A rides the high half of the port address.
    0xD3 => {
      let n = cpu.next_u8();
      let port = ((cpu.a as u16) << 8) | n as u16;
      let value = cpu.a;
      cpu.io.write_port(port, value);
      cpu.memptr = ((cpu.a as u16) << 8) | (n.wrapping_add(1) as u16);
      11
    }

    // IN A,(n). No flags change on this form, unlike IN r,(C).
    0xDB => {
      let n = cpu.next_u8();
      let port = ((cpu.a as u16) << 8) | n as u16;
      cpu.a = cpu.io.read_port(port);
      cpu.memptr = port.wrapping_add(1);
      11
    }

    // EXX
    0xD9 => {
      std::mem::swap(&mut cpu.b, &mut cpu.b_alt);
      std::mem::swap(&mut cpu.c, &mut cpu.c_alt);
      std::mem::swap(&mut cpu.d, &mut cpu.d_alt);
      std::mem::swap(&mut cpu.e, &mut cpu.e_alt);
      std::mem::swap(&mut cpu.h, &mut cpu.h_alt);
      std::mem::swap(&mut cpu.l, &mut cpu.l_alt);
      4
    }

    // EX (SP),HL
    0xE3 => {
      let value = cpu.memory.read_u16(cpu.sp);
      let hl = cpu.hl();
      cpu.memory.write_u16(cpu.sp, hl);
      cpu.set_hl(value);
      cpu.memptr = value;
      19
    }

    // JP (HL). Despite the mnemonic there is no memory access.
    0xE9 => {
      cpu.pc = cpu.hl();
      4
    }

    // EX DE,HL
    0xEB => {
      std::mem::swap(&mut cpu.d, &mut cpu.h);
      std::mem::swap(&mut cpu.e, &mut cpu.l);
      4
    }

    // DI
    0xF3 => {
      cpu.iff1 = false;
      cpu.iff2 = false;
      4
    }

    // EI. Acceptance is deferred for one instruction so the classic
    // EI;RETI and EI;HALT idioms behave.
    0xFB => {
      cpu.iff1 = true;
      cpu.iff2 = true;
      cpu.ei_deferred = true;
      4
    }

    // LD SP,HL
    0xF9 => {
      cpu.sp = cpu.hl();
      6
    }
  }
}

/// Apply one of the eight accumulator operations selected by bits 3-5 of
/// the ALU rows. Shared with the immediate forms and the IX/IY dispatcher.
pub(crate) fn alu_on_a(cpu: &mut CpuZ80, operation: u8, value: u8) {
  match operation & 0x07 {
    0 => cpu.add8(value),
    1 => cpu.adc8(value),
    2 => cpu.sub8(value),
    3 => cpu.sbc8(value),
    4 => cpu.and8(value),
    5 => cpu.xor8(value),
    6 => cpu.or8(value),
    _ => cpu.cp8(value),
  }
}

/// Register pair by the opcode's two-bit field: BC DE HL SP.
pub(crate) fn pair(cpu: &CpuZ80, index: u8) -> u16 {
  match index & 0x03 {
    0 => cpu.bc(),
    1 => cpu.de(),
    2 => cpu.hl(),
    _ => cpu.sp,
  }
}

pub(crate) fn set_pair(cpu: &mut CpuZ80, index: u8, value: u16) {
  match index & 0x03 {
    0 => cpu.set_bc(value),
    1 => cpu.set_de(value),
    2 => cpu.set_hl(value),
    _ => cpu.sp = value,
  }
}
