use crate::cpu_z80::{opcodes_cb, opcodes_main, CpuZ80};

/// Which index register a DD or FD prefix routes HL references to.
#[derive(Clone, Copy, PartialEq)]
pub enum IndexRegister {
  Ix,
  Iy,
}

/// Execute the instruction after a DD or FD prefix.
///
/// The prefix rebinds HL to IX or IY, H and L to the register halves, and
/// (HL) to (IX+d)/(IY+d) with a signed displacement. A payload with no HL
/// meaning is not consumed at all: the prefix then stands alone as a
/// 4 T-state NOP and the payload begins the next instruction, which is
/// also how chained prefixes end up honoring only the last one.
pub fn execute(cpu: &mut CpuZ80, index: IndexRegister) -> u32 {
  let payload = cpu.peek_u8();
  if !replaces_hl(payload) {
    return 4;
  }

  let opcode = cpu.fetch_opcode();
  match opcode {
    // ADD IX,rr with the HL slot meaning the index register itself.
    0x09 | 0x19 | 0x29 | 0x39 => {
      let rhs = match (opcode >> 4) & 0x03 {
        0 => cpu.bc(),
        1 => cpu.de(),
        2 => index_value(cpu, index),
        _ => cpu.sp,
      };
      let result = cpu.add16(index_value(cpu, index), rhs);
      set_index_value(cpu, index, result);
      15
    }

    // LD IX,nn
    0x21 => {
      let value = cpu.next_u16();
      set_index_value(cpu, index, value);
      14
    }

    // LD (nn),IX
    0x22 => {
      let address = cpu.next_u16();
      cpu.memory.write_u16(address, index_value(cpu, index));
      cpu.memptr = address.wrapping_add(1);
      20
    }

    // LD IX,(nn)
    0x2A => {
      let address = cpu.next_u16();
      let value = cpu.memory.read_u16(address);
      set_index_value(cpu, index, value);
      cpu.memptr = address.wrapping_add(1);
      20
    }

    // INC IX / DEC IX
    0x23 => {
      let value = index_value(cpu, index).wrapping_add(1);
      set_index_value(cpu, index, value);
      10
    }
    0x2B => {
      let value = index_value(cpu, index).wrapping_sub(1);
      set_index_value(cpu, index, value);
      10
    }

    // INC/DEC/LD n on the undocumented register halves.
    0x24 | 0x25 | 0x2C | 0x2D => {
      let field = (opcode >> 3) & 0x07;
      let value = half_reg8(cpu, index, field);
      let result = if opcode & 0x01 == 0 {
        cpu.inc8(value)
      } else {
        cpu.dec8(value)
      };
      set_half_reg8(cpu, index, field, result);
      8
    }
    0x26 | 0x2E => {
      let field = (opcode >> 3) & 0x07;
      let value = cpu.next_u8();
      set_half_reg8(cpu, index, field, value);
      11
    }

    // INC (IX+d) / DEC (IX+d)
    0x34 | 0x35 => {
      let address = effective_address(cpu, index);
      let value = cpu.memory.read_u8(address);
      let result = if opcode == 0x34 {
        cpu.inc8(value)
      } else {
        cpu.dec8(value)
      };
      cpu.memory.write_u8(address, result);
      23
    }

    // LD (IX+d),n. The displacement comes before the immediate.
    0x36 => {
      let address = effective_address(cpu, index);
      let value = cpu.next_u8();
      cpu.memory.write_u8(address, value);
      19
    }

    // LD r,(IX+d). The destination is the real register even for H and L.
    0x46 | 0x4E | 0x56 | 0x5E | 0x66 | 0x6E | 0x7E => {
      let address = effective_address(cpu, index);
      let value = cpu.memory.read_u8(address);
      cpu.set_reg8((opcode >> 3) & 0x07, value);
      19
    }

    // LD (IX+d),r, again with the real H and L as sources.
    0x70..=0x75 | 0x77 => {
      let value = cpu.reg8(opcode & 0x07);
      let address = effective_address(cpu, index);
      cpu.memory.write_u8(address, value);
      19
    }

    // The rest of the LD matrix under the prefix moves the register
    // halves: H means IXH and L means IXL on both sides.
    0x44 | 0x45 | 0x4C | 0x4D | 0x54 | 0x55 | 0x5C | 0x5D | 0x60..=0x65 | 0x67..=0x6D
    | 0x6F | 0x7C | 0x7D => {
      let value = half_reg8(cpu, index, opcode & 0x07);
      set_half_reg8(cpu, index, (opcode >> 3) & 0x07, value);
      8
    }

    // ALU A,(IX+d)
    0x86 | 0x8E | 0x96 | 0x9E | 0xA6 | 0xAE | 0xB6 | 0xBE => {
      let address = effective_address(cpu, index);
      let value = cpu.memory.read_u8(address);
      opcodes_main::alu_on_a(cpu, (opcode >> 3) & 0x07, value);
      19
    }

    // ALU A,IXH and ALU A,IXL.
    0x84 | 0x85 | 0x8C | 0x8D | 0x94 | 0x95 | 0x9C | 0x9D | 0xA4 | 0xA5 | 0xAC | 0xAD
    | 0xB4 | 0xB5 | 0xBC | 0xBD => {
      let value = half_reg8(cpu, index, opcode & 0x07);
      opcodes_main::alu_on_a(cpu, (opcode >> 3) & 0x07, value);
      8
    }

    0xCB => indexed_cb(cpu, index),

    // POP IX
    0xE1 => {
      let value = cpu.pop();
      set_index_value(cpu, index, value);
      14
    }

    // EX (SP),IX
    0xE3 => {
      let value = cpu.memory.read_u16(cpu.sp);
      let old = index_value(cpu, index);
      cpu.memory.write_u16(cpu.sp, old);
      set_index_value(cpu, index, value);
      cpu.memptr = value;
      23
    }

    // PUSH IX
    0xE5 => {
      let value = index_value(cpu, index);
      cpu.push(value);
      15
    }

    // JP (IX)
    0xE9 => {
      cpu.pc = index_value(cpu, index);
      8
    }

    // LD SP,IX
    0xF9 => {
      cpu.sp = index_value(cpu, index);
      10
    }

    // Unreachable: replaces_hl filtered everything else out already.
    _ => 4,
  }
}

/// The payload bytes a DD/FD prefix actually modifies. Everything else
/// leaves the prefix to act as a NOP.
fn replaces_hl(opcode: u8) -> bool {
  matches!(
    opcode,
    0x09 | 0x19
      | 0x21..=0x26
      | 0x29
      | 0x2A..=0x2E
      | 0x34..=0x36
      | 0x39
      | 0x44..=0x46
      | 0x4C..=0x4E
      | 0x54..=0x56
      | 0x5C..=0x5E
      | 0x60..=0x6F
      | 0x70..=0x75
      | 0x77
      | 0x7C..=0x7E
      | 0x84..=0x86
      | 0x8C..=0x8E
      | 0x94..=0x96
      | 0x9C..=0x9E
      | 0xA4..=0xA6
      | 0xAC..=0xAE
      | 0xB4..=0xB6
      | 0xBC..=0xBE
      | 0xCB
      | 0xE1
      | 0xE3
      | 0xE5
      | 0xE9
      | 0xF9
  )
}

/// The DDCB/FDCB space. Byte order on the wire is prefix, CB,
/// displacement, operation; the displacement read is not an M1 cycle but
/// the final operation byte is, so R moves three times in total for these.
fn indexed_cb(cpu: &mut CpuZ80, index: IndexRegister) -> u32 {
  let displacement = cpu.next_u8() as i8;
  let opcode = cpu.fetch_opcode();

  let address = index_value(cpu, index).wrapping_add(displacement as i16 as u16);
  cpu.memptr = address;
  let value = cpu.memory.read_u8(address);

  let register = opcode & 0x07;
  let selector = (opcode >> 3) & 0x07;

  match opcode >> 6 {
    // Rotate/shift on memory. The undocumented variants also drop the
    // result into the register named by the low bits.
    0 => {
      let result = opcodes_cb::rotate_shift(cpu, selector, value);
      cpu.memory.write_u8(address, result);
      if register != 6 {
        cpu.set_reg8(register, result);
      }
      23
    }

    // BIT n,(IX+d). No write-back, and X/Y leak the effective address's
    // high byte through MEMPTR.
    1 => {
      cpu.bit_test(selector, value, (address >> 8) as u8);
      20
    }

    // RES / SET with the same register side channel as the shifts.
    2 => {
      let result = value & !(1 << selector);
      cpu.memory.write_u8(address, result);
      if register != 6 {
        cpu.set_reg8(register, result);
      }
      23
    }
    _ => {
      let result = value | (1 << selector);
      cpu.memory.write_u8(address, result);
      if register != 6 {
        cpu.set_reg8(register, result);
      }
      23
    }
  }
}

fn index_value(cpu: &CpuZ80, index: IndexRegister) -> u16 {
  match index {
    IndexRegister::Ix => cpu.ix,
    IndexRegister::Iy => cpu.iy,
  }
}

fn set_index_value(cpu: &mut CpuZ80, index: IndexRegister, value: u16) {
  match index {
    IndexRegister::Ix => cpu.ix = value,
    IndexRegister::Iy => cpu.iy = value,
  }
}

/// Consume the displacement byte and form the effective address, which
/// MEMPTR latches for every displaced access.
fn effective_address(cpu: &mut CpuZ80, index: IndexRegister) -> u16 {
  let displacement = cpu.next_u8() as i8;
  let address = index_value(cpu, index).wrapping_add(displacement as i16 as u16);
  cpu.memptr = address;
  address
}

/// Register field access with H and L rebound to the index halves, which
/// is what the undocumented DD/FD register forms see.
fn half_reg8(cpu: &CpuZ80, index: IndexRegister, field: u8) -> u8 {
  match field & 0x07 {
    4 => (index_value(cpu, index) >> 8) as u8,
    5 => index_value(cpu, index) as u8,
    other => cpu.reg8(other),
  }
}

fn set_half_reg8(cpu: &mut CpuZ80, index: IndexRegister, field: u8, value: u8) {
  match field & 0x07 {
    4 => {
      let current = index_value(cpu, index);
      set_index_value(cpu, index, (current & 0x00FF) | ((value as u16) << 8));
    }
    5 => {
      let current = index_value(cpu, index);
      set_index_value(cpu, index, (current & 0xFF00) | value as u16);
    }
    other => cpu.set_reg8(other, value),
  }
}
