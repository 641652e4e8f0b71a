use crate::bus::{Io, Memory, Ram};
use crate::cpu_z80::{CpuZ80, StatusFlag};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

// Single-letter flag masks so expected F values read like the datasheet:
// S | Z | H, etc.
pub const C: u8 = StatusFlag::Carry as u8;
pub const N: u8 = StatusFlag::Subtract as u8;
pub const P: u8 = StatusFlag::Parity as u8;
pub const X: u8 = StatusFlag::X as u8;
pub const H: u8 = StatusFlag::HalfCarry as u8;
pub const Y: u8 = StatusFlag::Y as u8;
pub const Z: u8 = StatusFlag::Zero as u8;
pub const S: u8 = StatusFlag::Sign as u8;

/// Everything the test port device remembers, shared with the test body
/// through an Rc so assertions can see writes after the CPU owns the Io.
pub struct TestIoState {
  pub input: HashMap<u16, u8>,
  pub output: HashMap<u16, u8>,
  pub interrupt: bool,
}

pub type IoHandle = Rc<RefCell<TestIoState>>;

pub struct TestIo {
  state: IoHandle,
}

impl Io for TestIo {
  fn read_port(&mut self, port: u16) -> u8 {
    self.state.borrow().input.get(&port).copied().unwrap_or(0xFF)
  }

  fn write_port(&mut self, port: u16, value: u8) {
    self.state.borrow_mut().output.insert(port, value);
  }

  fn interrupt_asserted(&self) -> bool {
    self.state.borrow().interrupt
  }
}

/// A CPU over empty RAM with PC=0 and SP=0xFFFF, plus a handle into its
/// port device for arming interrupts and inspecting OUTs.
pub fn test_cpu() -> (CpuZ80, IoHandle) {
  let state = Rc::new(RefCell::new(TestIoState {
    input: HashMap::new(),
    output: HashMap::new(),
    interrupt: false,
  }));
  let io = TestIo {
    state: Rc::clone(&state),
  };
  let cpu = CpuZ80::new(Box::new(Ram::new()), Box::new(io));
  (cpu, state)
}

/// Write a program at the given address and point PC at it.
pub fn load_program(cpu: &mut CpuZ80, address: u16, bytes: &[u8]) {
  for (offset, byte) in bytes.iter().enumerate() {
    cpu.memory.write_u8(address.wrapping_add(offset as u16), *byte);
  }
  cpu.pc = address;
}

/// Step once and hand back the T-states, failing on a zero count since no
/// instruction is free.
pub fn step(cpu: &mut CpuZ80) -> u32 {
  let cycles = cpu.step();
  assert!(cycles > 0, "an instruction consumed no T-states");
  cycles
}

/// Step `count` instructions, summing their T-states.
pub fn step_n(cpu: &mut CpuZ80, count: usize) -> u32 {
  let mut total = 0;
  for _ in 0..count {
    total += step(cpu);
  }
  total
}

/// Compare the full F register against an expected mask and name exactly
/// which flags disagree.
pub fn assert_flags(cpu: &CpuZ80, expected: u8) {
  if cpu.f == expected {
    return;
  }

  let names = [
    ("Sign", S),
    ("Zero", Z),
    ("Y", Y),
    ("HalfCarry", H),
    ("X", X),
    ("Parity", P),
    ("Subtract", N),
    ("Carry", C),
  ];

  let mut result = String::new();
  for (name, mask) in names {
    let expected_bit = expected & mask != 0;
    let actual_bit = cpu.f & mask != 0;
    if expected_bit != actual_bit {
      result.push_str(&format!(
        "Expected StatusFlag::{} to be {} but received {}\n",
        name, expected_bit, actual_bit
      ));
    }
  }

  panic!(
    "\nExpected cpu flags 0b{:08b} to match 0b{:08b}\n{}",
    cpu.f, expected, result
  );
}

/// Check one flag in isolation.
pub fn assert_flag(cpu: &CpuZ80, flag: StatusFlag, expected: bool, message: &str) {
  let actual = cpu.is_status_flag_set(flag);
  assert_eq!(
    actual, expected,
    "{}: expected flag to be {} (F={:08b})",
    message, expected, cpu.f
  );
}
