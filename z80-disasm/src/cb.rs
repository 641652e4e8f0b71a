use crate::{byte_at, plain, DecodeError, Instruction, REGISTERS, SHIFTS};

/// Decode a CB-prefixed instruction. Every form is two bytes.
pub(crate) fn decode(data: &[u8]) -> Result<Instruction, DecodeError> {
  let opcode = byte_at(data, 1)?;
  let register = REGISTERS[(opcode & 0x07) as usize];
  let selector = (opcode >> 3) & 0x07;

  let mnemonic = match opcode >> 6 {
    0 => format!("{} {}", SHIFTS[selector as usize], register),
    1 => format!("BIT {}, {}", selector, register),
    2 => format!("RES {}, {}", selector, register),
    _ => format!("SET {}, {}", selector, register),
  };

  Ok(plain(mnemonic, 2))
}

#[cfg(test)]
mod test {
  use super::super::{decode, DecodeError, NO_ADDRESS};

  fn assert_decodes(data: &[u8], mnemonic: &str) {
    let instruction = decode(data).unwrap();
    assert_eq!(instruction.mnemonic, mnemonic);
    assert_eq!(instruction.length, 2);
    assert_eq!(instruction.address, NO_ADDRESS);
  }

  #[test]
  fn shifts_and_rotates() {
    assert_decodes(&[0xCB, 0x00], "RLC B");
    assert_decodes(&[0xCB, 0x0E], "RRC (HL)");
    assert_decodes(&[0xCB, 0x17], "RL A");
    assert_decodes(&[0xCB, 0x1A], "RR D");
    assert_decodes(&[0xCB, 0x25], "SLA L");
    assert_decodes(&[0xCB, 0x2C], "SRA H");
    assert_decodes(&[0xCB, 0x33], "SLL E");
    assert_decodes(&[0xCB, 0x3E], "SRL (HL)");
  }

  #[test]
  fn bit_res_set() {
    assert_decodes(&[0xCB, 0x40], "BIT 0, B");
    assert_decodes(&[0xCB, 0x7E], "BIT 7, (HL)");
    assert_decodes(&[0xCB, 0x87], "RES 0, A");
    assert_decodes(&[0xCB, 0xFE], "SET 7, (HL)");
  }

  #[test]
  fn truncated_prefix_errors() {
    assert_eq!(decode(&[0xCB]), Err(DecodeError::InsufficientData));
  }
}
