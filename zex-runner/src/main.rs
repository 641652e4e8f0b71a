//! Boots CP/M `.com` images, aimed at the ZEXDOC/ZEXALL instruction
//! exercisers. The image loads at 0x0100 in a fresh 64K RAM; the two BDOS
//! console calls the exercisers use (function 2, print character, and
//! function 9, print string) are serviced in host code at 0x0005, and a
//! jump to 0x0000 ends the run.

use colored::Colorize;
use cpu_z80::bus::{Memory, NullIo, Ram};
use cpu_z80::cpu_z80::CpuZ80;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(
  name = "zex-runner",
  about = "Run CP/M Z80 exerciser images such as zexdoc.com and zexall.com."
)]
struct Options {
  /// Narrate every instruction before it executes (very verbose)
  #[structopt(short, long)]
  trace: bool,

  /// Stop after this many instructions instead of running to warm boot
  #[structopt(long)]
  max_instructions: Option<u64>,

  /// One or more .com images, each run in its own fresh machine
  #[structopt(parse(from_os_str), required = true)]
  images: Vec<PathBuf>,
}

fn main() {
  let options = Options::from_args();

  for image in &options.images {
    if let Err(message) = run_image(image, &options) {
      eprintln!("{} {}", "error:".red().bold(), message);
      std::process::exit(1);
    }
  }
}

fn run_image(path: &Path, options: &Options) -> Result<(), String> {
  let data =
    fs::read(path).map_err(|error| format!("could not read {}: {}", path.display(), error))?;

  println!("{} {}", "running".green().bold(), path.display());

  let mut ram = Ram::new();
  ram.load(0x0100, &data);

  // No devices: port reads see a floating bus and nothing ever raises
  // the interrupt line.
  let mut cpu = CpuZ80::new(Box::new(ram), Box::new(NullIo));
  cpu.sp = 0xFFFF;
  cpu.pc = 0x0100;

  let mut executed: u64 = 0;
  loop {
    if cpu.pc == 0x0000 {
      // CP/M warm boot: the exerciser jumps here when it is done.
      println!();
      println!("{}", "image finished".green());
      break;
    }

    if cpu.pc == 0x0005 {
      bdos_call(&mut cpu);
      continue;
    }

    if options.trace {
      trace_instruction(&cpu);
    }

    cpu.step();
    executed += 1;

    if let Some(limit) = options.max_instructions {
      if executed >= limit {
        return Err(format!("instruction limit of {} reached", limit));
      }
    }
  }

  Ok(())
}

/// The two console BDOS calls, then a manual RET: pop the return address
/// the caller pushed and resume there.
fn bdos_call(cpu: &mut CpuZ80) {
  match cpu.c {
    2 => {
      print!("{}", cpu.e as char);
    }
    9 => {
      let mut address = cpu.de();
      loop {
        let byte = cpu.memory.read_u8(address);
        if byte == b'$' {
          break;
        }
        print!("{}", byte as char);
        address = address.wrapping_add(1);
      }
    }
    _ => {}
  }
  let _ = std::io::stdout().flush();

  cpu.pc = cpu.memory.read_u16(cpu.sp);
  cpu.sp = cpu.sp.wrapping_add(2);
}

fn trace_instruction(cpu: &CpuZ80) {
  let mut buffer = [0u8; 4];
  for (offset, slot) in buffer.iter_mut().enumerate() {
    *slot = cpu.memory.read_u8(cpu.pc.wrapping_add(offset as u16));
  }

  match z80_disasm::decode(&buffer) {
    Ok(instruction) => {
      println!(
        "{} {}",
        format!("{:04X}", cpu.pc).dimmed(),
        instruction.mnemonic
      );
    }
    Err(error) => {
      println!("{} {}", format!("{:04X}", cpu.pc).dimmed(), error);
    }
  }
}
