use crate::{
  byte_at, plain, simple, with_address, word_at, DecodeError, Instruction, PAIRS, REGISTERS,
};

/// Decode an ED-prefixed instruction. The assigned rows are 0x40-0x7F and
/// the block operations; everything else disassembles as a two-byte NOP,
/// matching what the interpreter executes.
pub(crate) fn decode(data: &[u8]) -> Result<Instruction, DecodeError> {
  let opcode = byte_at(data, 1)?;

  let instruction = match opcode {
    0x40 | 0x48 | 0x50 | 0x58 | 0x60 | 0x68 | 0x78 => {
      let register = REGISTERS[((opcode >> 3) & 0x07) as usize];
      plain(format!("IN {}, (C)", register), 2)
    }
    0x70 => simple("IN (C)", 2),

    0x41 | 0x49 | 0x51 | 0x59 | 0x61 | 0x69 | 0x79 => {
      let register = REGISTERS[((opcode >> 3) & 0x07) as usize];
      plain(format!("OUT (C), {}", register), 2)
    }
    0x71 => simple("OUT (C), 0", 2),

    0x42 | 0x52 | 0x62 | 0x72 => {
      plain(
        format!("SBC HL, {}", PAIRS[((opcode >> 4) & 0x03) as usize]),
        2,
      )
    }
    0x4A | 0x5A | 0x6A | 0x7A => {
      plain(
        format!("ADC HL, {}", PAIRS[((opcode >> 4) & 0x03) as usize]),
        2,
      )
    }

    0x43 | 0x53 | 0x63 | 0x73 => {
      let address = word_at(data, 2)?;
      let pair = PAIRS[((opcode >> 4) & 0x03) as usize];
      with_address(format!("LD (${:04X}), {}", address, pair), 4, address)
    }
    0x4B | 0x5B | 0x6B | 0x7B => {
      let address = word_at(data, 2)?;
      let pair = PAIRS[((opcode >> 4) & 0x03) as usize];
      with_address(format!("LD {}, (${:04X})", pair, address), 4, address)
    }

    0x44 | 0x4C | 0x54 | 0x5C | 0x64 | 0x6C | 0x74 | 0x7C => simple("NEG", 2),
    0x45 | 0x55 | 0x5D | 0x65 | 0x6D | 0x75 | 0x7D => simple("RETN", 2),
    0x4D => simple("RETI", 2),

    0x46 | 0x4E | 0x66 | 0x6E => simple("IM 0", 2),
    0x56 | 0x76 => simple("IM 1", 2),
    0x5E | 0x7E => simple("IM 2", 2),

    0x47 => simple("LD I, A", 2),
    0x4F => simple("LD R, A", 2),
    0x57 => simple("LD A, I", 2),
    0x5F => simple("LD A, R", 2),

    0x67 => simple("RRD", 2),
    0x6F => simple("RLD", 2),

    0xA0 => simple("LDI", 2),
    0xA1 => simple("CPI", 2),
    0xA2 => simple("INI", 2),
    0xA3 => simple("OUTI", 2),
    0xA8 => simple("LDD", 2),
    0xA9 => simple("CPD", 2),
    0xAA => simple("IND", 2),
    0xAB => simple("OUTD", 2),
    0xB0 => simple("LDIR", 2),
    0xB1 => simple("CPIR", 2),
    0xB2 => simple("INIR", 2),
    0xB3 => simple("OTIR", 2),
    0xB8 => simple("LDDR", 2),
    0xB9 => simple("CPDR", 2),
    0xBA => simple("INDR", 2),
    0xBB => simple("OTDR", 2),

    _ => simple("NOP", 2),
  };

  Ok(instruction)
}
