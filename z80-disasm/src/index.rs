use crate::{
  alu_mnemonic, byte_at, displacement_text, plain, simple, with_address, word_at, DecodeError,
  Instruction, REGISTERS, SHIFTS,
};

/// Decode a DD- or FD-prefixed instruction, with `name` being "IX" or
/// "IY". A payload the prefix does not modify decodes as a one-byte NOP:
/// the interpreter treats the prefix that way and restarts on the payload,
/// so the disassembler has to agree about instruction boundaries.
pub(crate) fn decode(data: &[u8], name: &str) -> Result<Instruction, DecodeError> {
  let opcode = byte_at(data, 1)?;
  if !replaces_hl(opcode) {
    return Ok(simple("NOP", 1));
  }

  let instruction = match opcode {
    0x09 | 0x19 | 0x39 => {
      let pair = match (opcode >> 4) & 0x03 {
        0 => "BC",
        1 => "DE",
        _ => "SP",
      };
      plain(format!("ADD {}, {}", name, pair), 2)
    }
    0x29 => plain(format!("ADD {}, {}", name, name), 2),

    0x21 => {
      let value = word_at(data, 2)?;
      with_address(format!("LD {}, ${:04X}", name, value), 4, value)
    }
    0x22 => {
      let address = word_at(data, 2)?;
      with_address(format!("LD (${:04X}), {}", address, name), 4, address)
    }
    0x2A => {
      let address = word_at(data, 2)?;
      with_address(format!("LD {}, (${:04X})", name, address), 4, address)
    }

    0x23 => plain(format!("INC {}", name), 2),
    0x2B => plain(format!("DEC {}", name), 2),

    0x24 | 0x25 | 0x2C | 0x2D => {
      let operation = if opcode & 0x01 == 0 { "INC" } else { "DEC" };
      let half = half_name((opcode >> 3) & 0x07, name);
      plain(format!("{} {}", operation, half), 2)
    }
    0x26 | 0x2E => {
      let value = byte_at(data, 2)?;
      let half = half_name((opcode >> 3) & 0x07, name);
      plain(format!("LD {}, ${:02X}", half, value), 3)
    }

    0x34 | 0x35 => {
      let operation = if opcode == 0x34 { "INC" } else { "DEC" };
      let displacement = byte_at(data, 2)? as i8;
      plain(
        format!("{} {}", operation, indexed_operand(name, displacement)),
        3,
      )
    }
    0x36 => {
      let displacement = byte_at(data, 2)? as i8;
      let value = byte_at(data, 3)?;
      plain(
        format!(
          "LD {}, ${:02X}",
          indexed_operand(name, displacement),
          value
        ),
        4,
      )
    }

    // LD r,(IX+d) and LD (IX+d),r keep the real register names.
    0x46 | 0x4E | 0x56 | 0x5E | 0x66 | 0x6E | 0x7E => {
      let displacement = byte_at(data, 2)? as i8;
      let register = REGISTERS[((opcode >> 3) & 0x07) as usize];
      plain(
        format!("LD {}, {}", register, indexed_operand(name, displacement)),
        3,
      )
    }
    0x70..=0x75 | 0x77 => {
      let displacement = byte_at(data, 2)? as i8;
      let register = REGISTERS[(opcode & 0x07) as usize];
      plain(
        format!("LD {}, {}", indexed_operand(name, displacement), register),
        3,
      )
    }

    // The undocumented half-register moves.
    0x44 | 0x45 | 0x4C | 0x4D | 0x54 | 0x55 | 0x5C | 0x5D | 0x60..=0x65 | 0x67..=0x6D
    | 0x6F | 0x7C | 0x7D => {
      let dst = half_name((opcode >> 3) & 0x07, name);
      let src = half_name(opcode & 0x07, name);
      plain(format!("LD {}, {}", dst, src), 2)
    }

    0x86 | 0x8E | 0x96 | 0x9E | 0xA6 | 0xAE | 0xB6 | 0xBE => {
      let displacement = byte_at(data, 2)? as i8;
      plain(
        alu_mnemonic(opcode >> 3, &indexed_operand(name, displacement)),
        3,
      )
    }
    0x84 | 0x85 | 0x8C | 0x8D | 0x94 | 0x95 | 0x9C | 0x9D | 0xA4 | 0xA5 | 0xAC | 0xAD
    | 0xB4 | 0xB5 | 0xBC | 0xBD => {
      let half = half_name(opcode & 0x07, name);
      plain(alu_mnemonic(opcode >> 3, &half), 2)
    }

    0xCB => return decode_indexed_cb(data, name),

    0xE1 => plain(format!("POP {}", name), 2),
    0xE3 => plain(format!("EX (SP), {}", name), 2),
    0xE5 => plain(format!("PUSH {}", name), 2),
    0xE9 => plain(format!("JP ({})", name), 2),
    0xF9 => plain(format!("LD SP, {}", name), 2),

    // replaces_hl filtered the rest out already.
    _ => simple("NOP", 1),
  };

  Ok(instruction)
}

/// Kept in sync with the interpreter's prefix dispatch.
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

/// DDCB/FDCB: prefix, CB, displacement, operation. Always four bytes. The
/// undocumented register-targeting variants list the register after the
/// memory operand.
fn decode_indexed_cb(data: &[u8], name: &str) -> Result<Instruction, DecodeError> {
  let displacement = byte_at(data, 2)? as i8;
  let opcode = byte_at(data, 3)?;

  let operand = indexed_operand(name, displacement);
  let register = opcode & 0x07;
  let selector = (opcode >> 3) & 0x07;

  let mnemonic = match opcode >> 6 {
    0 => {
      let shift = SHIFTS[selector as usize];
      if register == 6 {
        format!("{} {}", shift, operand)
      } else {
        format!("{} {}, {}", shift, operand, REGISTERS[register as usize])
      }
    }
    1 => format!("BIT {}, {}", selector, operand),
    2 => {
      if register == 6 {
        format!("RES {}, {}", selector, operand)
      } else {
        format!(
          "RES {}, {}, {}",
          selector, operand, REGISTERS[register as usize]
        )
      }
    }
    _ => {
      if register == 6 {
        format!("SET {}, {}", selector, operand)
      } else {
        format!(
          "SET {}, {}, {}",
          selector, operand, REGISTERS[register as usize]
        )
      }
    }
  };

  Ok(plain(mnemonic, 4))
}

fn indexed_operand(name: &str, displacement: i8) -> String {
  format!("({}{})", name, displacement_text(displacement))
}

/// Register field names with H and L rebound to the index halves.
fn half_name(field: u8, name: &str) -> String {
  match field & 0x07 {
    4 => format!("{}H", name),
    5 => format!("{}L", name),
    other => REGISTERS[other as usize].to_string(),
  }
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
  fn word_forms_for_both_index_registers() {
    assert_decodes(&[0xDD, 0x21, 0x34, 0x12], "LD IX, $1234", 4, 0x1234);
    assert_decodes(&[0xFD, 0x21, 0x34, 0x12], "LD IY, $1234", 4, 0x1234);
    assert_decodes(&[0xDD, 0x22, 0x00, 0x40], "LD ($4000), IX", 4, 0x4000);
    assert_decodes(&[0xFD, 0x2A, 0x00, 0x40], "LD IY, ($4000)", 4, 0x4000);
    assert_decodes(&[0xDD, 0x09], "ADD IX, BC", 2, NO_ADDRESS);
    assert_decodes(&[0xFD, 0x29], "ADD IY, IY", 2, NO_ADDRESS);
    assert_decodes(&[0xDD, 0xE5], "PUSH IX", 2, NO_ADDRESS);
    assert_decodes(&[0xFD, 0xE1], "POP IY", 2, NO_ADDRESS);
    assert_decodes(&[0xDD, 0xE9], "JP (IX)", 2, NO_ADDRESS);
    assert_decodes(&[0xFD, 0xE3], "EX (SP), IY", 2, NO_ADDRESS);
  }

  #[test]
  fn displaced_memory_forms() {
    assert_decodes(&[0xDD, 0x46, 0x05], "LD B, (IX+$05)", 3, NO_ADDRESS);
    assert_decodes(&[0xFD, 0x7E, 0xFE], "LD A, (IY-$02)", 3, NO_ADDRESS);
    assert_decodes(&[0xDD, 0x70, 0x01], "LD (IX+$01), B", 3, NO_ADDRESS);
    assert_decodes(&[0xDD, 0x36, 0x02, 0x99], "LD (IX+$02), $99", 4, NO_ADDRESS);
    assert_decodes(&[0xDD, 0x34, 0x7F], "INC (IX+$7F)", 3, NO_ADDRESS);
    assert_decodes(&[0xFD, 0x35, 0x80], "DEC (IY-$80)", 3, NO_ADDRESS);
    assert_decodes(&[0xDD, 0x86, 0x03], "ADD A, (IX+$03)", 3, NO_ADDRESS);
    assert_decodes(&[0xFD, 0xBE, 0x00], "CP (IY+$00)", 3, NO_ADDRESS);
  }

  #[test]
  fn half_register_forms() {
    assert_decodes(&[0xDD, 0x26, 0x12], "LD IXH, $12", 3, NO_ADDRESS);
    assert_decodes(&[0xFD, 0x2E, 0x34], "LD IYL, $34", 3, NO_ADDRESS);
    assert_decodes(&[0xDD, 0x24], "INC IXH", 2, NO_ADDRESS);
    assert_decodes(&[0xFD, 0x2D], "DEC IYL", 2, NO_ADDRESS);
    assert_decodes(&[0xDD, 0x60], "LD IXH, B", 2, NO_ADDRESS);
    assert_decodes(&[0xDD, 0x6C], "LD IXL, IXH", 2, NO_ADDRESS);
    assert_decodes(&[0xFD, 0x7D], "LD A, IYL", 2, NO_ADDRESS);
    assert_decodes(&[0xDD, 0x84], "ADD A, IXH", 2, NO_ADDRESS);
    assert_decodes(&[0xFD, 0xA5], "AND IYL", 2, NO_ADDRESS);
  }

  #[test]
  fn displaced_loads_use_real_h_and_l() {
    assert_decodes(&[0xDD, 0x66, 0x01], "LD H, (IX+$01)", 3, NO_ADDRESS);
    assert_decodes(&[0xDD, 0x74, 0x01], "LD (IX+$01), H", 3, NO_ADDRESS);
  }

  #[test]
  fn indexed_cb_space() {
    assert_decodes(&[0xDD, 0xCB, 0x05, 0x7E], "BIT 7, (IX+$05)", 4, NO_ADDRESS);
    assert_decodes(&[0xFD, 0xCB, 0x02, 0x46], "BIT 0, (IY+$02)", 4, NO_ADDRESS);
    assert_decodes(&[0xDD, 0xCB, 0x05, 0x06], "RLC (IX+$05)", 4, NO_ADDRESS);
    assert_decodes(&[0xDD, 0xCB, 0x05, 0x00], "RLC (IX+$05), B", 4, NO_ADDRESS);
    assert_decodes(&[0xDD, 0xCB, 0x05, 0xC6], "SET 0, (IX+$05)", 4, NO_ADDRESS);
    assert_decodes(&[0xFD, 0xCB, 0xFF, 0x87], "RES 0, (IY-$01), A", 4, NO_ADDRESS);
  }

  #[test]
  fn unmodified_payload_leaves_the_prefix_as_a_nop() {
    // The interpreter executes the payload as a fresh instruction, so the
    // prefix byte alone is the whole "instruction" here.
    assert_decodes(&[0xDD, 0x47], "NOP", 1, NO_ADDRESS);
    assert_decodes(&[0xDD, 0xDD], "NOP", 1, NO_ADDRESS);
    assert_decodes(&[0xFD, 0x00], "NOP", 1, NO_ADDRESS);
  }

  #[test]
  fn truncated_forms_error() {
    assert_eq!(decode(&[0xDD]), Err(DecodeError::InsufficientData));
    assert_eq!(decode(&[0xDD, 0x21]), Err(DecodeError::InsufficientData));
    assert_eq!(
      decode(&[0xDD, 0xCB, 0x05]),
      Err(DecodeError::InsufficientData)
    );
    assert_eq!(
      decode(&[0xDD, 0x36, 0x02]),
      Err(DecodeError::InsufficientData)
    );
  }
}
