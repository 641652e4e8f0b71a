use crate::{
  alu_mnemonic, byte_at, plain, relative_text, simple, with_address, word_at, DecodeError,
  Instruction, CONDITIONS, PAIRS, REGISTERS, STACK_PAIRS,
};

/// Decode an instruction with no prefix byte.
pub(crate) fn decode(data: &[u8]) -> Result<Instruction, DecodeError> {
  let opcode = byte_at(data, 0)?;

  let instruction = match opcode {
    0x76 => simple("HALT", 1),

    // LD r,r'
    0x40..=0x7F => {
      let dst = REGISTERS[((opcode >> 3) & 0x07) as usize];
      let src = REGISTERS[(opcode & 0x07) as usize];
      plain(format!("LD {}, {}", dst, src), 1)
    }

    // ALU A,r
    0x80..=0xBF => {
      let operand = REGISTERS[(opcode & 0x07) as usize];
      plain(alu_mnemonic(opcode >> 3, operand), 1)
    }

    0x00 => simple("NOP", 1),

    0x01 | 0x11 | 0x21 | 0x31 => {
      let value = word_at(data, 1)?;
      let pair = PAIRS[((opcode >> 4) & 0x03) as usize];
      with_address(format!("LD {}, ${:04X}", pair, value), 3, value)
    }

    0x02 => simple("LD (BC), A", 1),
    0x12 => simple("LD (DE), A", 1),
    0x0A => simple("LD A, (BC)", 1),
    0x1A => simple("LD A, (DE)", 1),

    0x03 | 0x13 | 0x23 | 0x33 => {
      plain(format!("INC {}", PAIRS[((opcode >> 4) & 0x03) as usize]), 1)
    }
    0x0B | 0x1B | 0x2B | 0x3B => {
      plain(format!("DEC {}", PAIRS[((opcode >> 4) & 0x03) as usize]), 1)
    }

    0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
      plain(
        format!("INC {}", REGISTERS[((opcode >> 3) & 0x07) as usize]),
        1,
      )
    }
    0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
      plain(
        format!("DEC {}", REGISTERS[((opcode >> 3) & 0x07) as usize]),
        1,
      )
    }

    0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
      let value = byte_at(data, 1)?;
      let target = REGISTERS[((opcode >> 3) & 0x07) as usize];
      plain(format!("LD {}, ${:02X}", target, value), 2)
    }

    0x07 => simple("RLCA", 1),
    0x0F => simple("RRCA", 1),
    0x17 => simple("RLA", 1),
    0x1F => simple("RRA", 1),

    0x08 => simple("EX AF, AF'", 1),
    0xD9 => simple("EXX", 1),
    0xEB => simple("EX DE, HL", 1),
    0xE3 => simple("EX (SP), HL", 1),

    0x09 | 0x19 | 0x29 | 0x39 => {
      plain(
        format!("ADD HL, {}", PAIRS[((opcode >> 4) & 0x03) as usize]),
        1,
      )
    }

    0x10 => {
      let displacement = byte_at(data, 1)? as i8;
      plain(format!("DJNZ {}", relative_text(displacement)), 2)
    }
    0x18 => {
      let displacement = byte_at(data, 1)? as i8;
      plain(format!("JR {}", relative_text(displacement)), 2)
    }
    0x20 | 0x28 | 0x30 | 0x38 => {
      let displacement = byte_at(data, 1)? as i8;
      let condition = CONDITIONS[((opcode >> 3) & 0x03) as usize];
      plain(
        format!("JR {}, {}", condition, relative_text(displacement)),
        2,
      )
    }

    0x22 => {
      let address = word_at(data, 1)?;
      with_address(format!("LD (${:04X}), HL", address), 3, address)
    }
    0x2A => {
      let address = word_at(data, 1)?;
      with_address(format!("LD HL, (${:04X})", address), 3, address)
    }
    0x32 => {
      let address = word_at(data, 1)?;
      with_address(format!("LD (${:04X}), A", address), 3, address)
    }
    0x3A => {
      let address = word_at(data, 1)?;
      with_address(format!("LD A, (${:04X})", address), 3, address)
    }

    0x27 => simple("DAA", 1),
    0x2F => simple("CPL", 1),
    0x37 => simple("SCF", 1),
    0x3F => simple("CCF", 1),

    0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
      plain(
        format!("RET {}", CONDITIONS[((opcode >> 3) & 0x07) as usize]),
        1,
      )
    }
    0xC9 => simple("RET", 1),

    0xC1 | 0xD1 | 0xE1 | 0xF1 => {
      plain(
        format!("POP {}", STACK_PAIRS[((opcode >> 4) & 0x03) as usize]),
        1,
      )
    }
    0xC5 | 0xD5 | 0xE5 | 0xF5 => {
      plain(
        format!("PUSH {}", STACK_PAIRS[((opcode >> 4) & 0x03) as usize]),
        1,
      )
    }

    0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
      let address = word_at(data, 1)?;
      let condition = CONDITIONS[((opcode >> 3) & 0x07) as usize];
      with_address(format!("JP {}, ${:04X}", condition, address), 3, address)
    }
    0xC3 => {
      let address = word_at(data, 1)?;
      with_address(format!("JP ${:04X}", address), 3, address)
    }
    0xE9 => simple("JP (HL)", 1),

    0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
      let address = word_at(data, 1)?;
      let condition = CONDITIONS[((opcode >> 3) & 0x07) as usize];
      with_address(format!("CALL {}, ${:04X}", condition, address), 3, address)
    }
    0xCD => {
      let address = word_at(data, 1)?;
      with_address(format!("CALL ${:04X}", address), 3, address)
    }

    0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
      let value = byte_at(data, 1)?;
      plain(alu_mnemonic(opcode >> 3, &format!("${:02X}", value)), 2)
    }

    0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
      let target = (opcode & 0x38) as u16;
      with_address(format!("RST ${:02X}", target), 1, target)
    }

    0xD3 => {
      let port = byte_at(data, 1)?;
      plain(format!("OUT (${:02X}), A", port), 2)
    }
    0xDB => {
      let port = byte_at(data, 1)?;
      plain(format!("IN A, (${:02X})", port), 2)
    }

    0xF3 => simple("DI", 1),
    0xFB => simple("EI", 1),
    0xF9 => simple("LD SP, HL", 1),

    // The prefixes are handled a level up; seeing one here cannot happen
    // through the public entry point.
    0xCB | 0xDD | 0xED | 0xFD => simple("NOP", 1),
  };

  Ok(instruction)
}

#[cfg(test)]
mod test {
  use super::super::{decode, DecodeError, NO_ADDRESS};

  fn assert_decodes(data: &[u8], mnemonic: &str, length: usize, address: u16) {
    let instruction = decode(data).unwrap();
    assert_eq!(instruction.mnemonic, mnemonic);
    assert_eq!(instruction.length, length, "length of {}", mnemonic);
    assert_eq!(instruction.address, address, "address of {}", mnemonic);
  }

  #[test]
  fn simple_one_byte_forms() {
    assert_decodes(&[0x00], "NOP", 1, NO_ADDRESS);
    assert_decodes(&[0x76], "HALT", 1, NO_ADDRESS);
    assert_decodes(&[0x07], "RLCA", 1, NO_ADDRESS);
    assert_decodes(&[0x27], "DAA", 1, NO_ADDRESS);
    assert_decodes(&[0xC9], "RET", 1, NO_ADDRESS);
    assert_decodes(&[0xD9], "EXX", 1, NO_ADDRESS);
    assert_decodes(&[0x08], "EX AF, AF'", 1, NO_ADDRESS);
    assert_decodes(&[0xE3], "EX (SP), HL", 1, NO_ADDRESS);
    assert_decodes(&[0xE9], "JP (HL)", 1, NO_ADDRESS);
  }

  #[test]
  fn register_matrix() {
    assert_decodes(&[0x41], "LD B, C", 1, NO_ADDRESS);
    assert_decodes(&[0x7E], "LD A, (HL)", 1, NO_ADDRESS);
    assert_decodes(&[0x70], "LD (HL), B", 1, NO_ADDRESS);
    assert_decodes(&[0x80], "ADD A, B", 1, NO_ADDRESS);
    assert_decodes(&[0x96], "SUB (HL)", 1, NO_ADDRESS);
    assert_decodes(&[0xBF], "CP A", 1, NO_ADDRESS);
  }

  #[test]
  fn immediates_and_addresses() {
    assert_decodes(&[0x01, 0x34, 0x12], "LD BC, $1234", 3, 0x1234);
    assert_decodes(&[0x06, 0x42], "LD B, $42", 2, NO_ADDRESS);
    assert_decodes(&[0x36, 0x99], "LD (HL), $99", 2, NO_ADDRESS);
    assert_decodes(&[0x22, 0x00, 0x40], "LD ($4000), HL", 3, 0x4000);
    assert_decodes(&[0x3A, 0xCD, 0xAB], "LD A, ($ABCD)", 3, 0xABCD);
    assert_decodes(&[0xC3, 0x00, 0x80], "JP $8000", 3, 0x8000);
    assert_decodes(&[0xCD, 0x06, 0x00], "CALL $0006", 3, 0x0006);
    assert_decodes(&[0xDC, 0x34, 0x12], "CALL C, $1234", 3, 0x1234);
    assert_decodes(&[0xFE, 0x10], "CP $10", 2, NO_ADDRESS);
  }

  #[test]
  fn relative_jumps_render_signed() {
    assert_decodes(&[0x18, 0x05], "JR $05", 2, NO_ADDRESS);
    assert_decodes(&[0x18, 0xFB], "JR -$05", 2, NO_ADDRESS);
    assert_decodes(&[0x20, 0x02], "JR NZ, $02", 2, NO_ADDRESS);
    assert_decodes(&[0x10, 0xFE], "DJNZ -$02", 2, NO_ADDRESS);
  }

  #[test]
  fn rst_reports_its_target() {
    assert_decodes(&[0xC7], "RST $00", 1, 0x0000);
    assert_decodes(&[0xEF], "RST $28", 1, 0x0028);
    assert_decodes(&[0xFF], "RST $38", 1, 0x0038);
  }

  #[test]
  fn ports_and_stack() {
    assert_decodes(&[0xD3, 0xFE], "OUT ($FE), A", 2, NO_ADDRESS);
    assert_decodes(&[0xDB, 0xFE], "IN A, ($FE)", 2, NO_ADDRESS);
    assert_decodes(&[0xF5], "PUSH AF", 1, NO_ADDRESS);
    assert_decodes(&[0xC1], "POP BC", 1, NO_ADDRESS);
    assert_decodes(&[0xF9], "LD SP, HL", 1, NO_ADDRESS);
  }

  #[test]
  fn truncated_operands_error() {
    assert_eq!(decode(&[]), Err(DecodeError::InsufficientData));
    assert_eq!(decode(&[0x01]), Err(DecodeError::InsufficientData));
    assert_eq!(decode(&[0x01, 0x34]), Err(DecodeError::InsufficientData));
    assert_eq!(decode(&[0x06]), Err(DecodeError::InsufficientData));
    assert_eq!(decode(&[0x18]), Err(DecodeError::InsufficientData));
  }
}
