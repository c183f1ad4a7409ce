use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use crate::cpu::Cpu;
use crate::error::{CpuError, Result};
use crate::machine::Machine;
use crate::memory::{Memory, ADDRESS_SPACE};

pub const SNAPSHOT_MAGIC: &[u8; 8] = b"GBCPUSNP";
pub const SNAPSHOT_VERSION: u8 = 1;

const REGISTER_BYTES: usize = 8 + 2 + 2 + 1;
/// Total size of a version 1 snapshot.
pub const SNAPSHOT_LEN: usize = SNAPSHOT_MAGIC.len() + 1 + REGISTER_BYTES + ADDRESS_SPACE;

const FLAG_IME: u8 = 1 << 0;
const FLAG_HALTED: u8 = 1 << 1;
const FLAG_STOPPED: u8 = 1 << 2;
const FLAG_EI_PENDING: u8 = 1 << 3;
const FLAG_EI_DELAY: u8 = 1 << 4;

fn control_flags(cpu: &Cpu) -> u8 {
    [
        (cpu.ime, FLAG_IME),
        (cpu.halted, FLAG_HALTED),
        (cpu.stopped, FLAG_STOPPED),
        (cpu.ime_enable_pending, FLAG_EI_PENDING),
        (cpu.ime_enable_delay, FLAG_EI_DELAY),
    ]
    .into_iter()
    .filter(|&(set, _)| set)
    .fold(0, |flags, (_, bit)| flags | bit)
}

fn pack_registers(cpu: &Cpu) -> [u8; REGISTER_BYTES] {
    let regs = &cpu.regs;
    let [sp_lo, sp_hi] = regs.sp.to_le_bytes();
    let [pc_lo, pc_hi] = regs.pc.to_le_bytes();
    [
        regs.a, regs.f, regs.b, regs.c, regs.d, regs.e, regs.h, regs.l, sp_lo, sp_hi, pc_lo,
        pc_hi, control_flags(cpu),
    ]
}

fn unpack_registers(payload: &[u8; REGISTER_BYTES]) -> Cpu {
    let mut cpu = Cpu::new();
    let regs = &mut cpu.regs;
    regs.a = payload[0];
    regs.f = payload[1] & 0xF0;
    regs.b = payload[2];
    regs.c = payload[3];
    regs.d = payload[4];
    regs.e = payload[5];
    regs.h = payload[6];
    regs.l = payload[7];
    regs.sp = u16::from_le_bytes([payload[8], payload[9]]);
    regs.pc = u16::from_le_bytes([payload[10], payload[11]]);
    let flags = payload[12];
    cpu.ime = flags & FLAG_IME != 0;
    cpu.halted = flags & FLAG_HALTED != 0;
    cpu.stopped = flags & FLAG_STOPPED != 0;
    cpu.ime_enable_pending = flags & FLAG_EI_PENDING != 0;
    cpu.ime_enable_delay = flags & FLAG_EI_DELAY != 0;
    cpu
}

fn read_section(reader: &mut impl Read, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|err| match err.kind() {
        ErrorKind::UnexpectedEof => CpuError::InvalidSnapshot(format!("truncated {what}")),
        _ => CpuError::Io(err),
    })
}

/// Serialize `machine` into `writer`.
pub fn write(writer: &mut impl Write, machine: &Machine) -> Result<()> {
    writer.write_all(SNAPSHOT_MAGIC)?;
    writer.write_all(&[SNAPSHOT_VERSION])?;
    writer.write_all(&pack_registers(&machine.cpu))?;
    writer.write_all(machine.memory.as_slice())?;
    writer.flush()?;
    Ok(())
}

/// Deserialize a machine from `reader`. Trailing bytes are an error.
pub fn read(reader: &mut impl Read) -> Result<Machine> {
    let mut magic = [0u8; 8];
    read_section(reader, &mut magic, "header")?;
    if &magic != SNAPSHOT_MAGIC {
        return Err(CpuError::InvalidSnapshot(format!(
            "bad magic {:02X?}",
            magic
        )));
    }

    let mut version = [0u8; 1];
    read_section(reader, &mut version, "header")?;
    if version[0] != SNAPSHOT_VERSION {
        return Err(CpuError::InvalidSnapshot(format!(
            "unsupported version {} (expected {SNAPSHOT_VERSION})",
            version[0]
        )));
    }

    let mut registers = [0u8; REGISTER_BYTES];
    read_section(reader, &mut registers, "registers")?;
    let cpu = unpack_registers(&registers);

    let mut image = vec![0u8; ADDRESS_SPACE];
    read_section(reader, &mut image, "memory image")?;
    let memory = Memory::with_image(&image)?;

    let mut probe = [0u8; 1];
    if reader.read(&mut probe)? != 0 {
        return Err(CpuError::InvalidSnapshot(format!(
            "trailing data after {SNAPSHOT_LEN} bytes"
        )));
    }

    Ok(Machine::new(cpu, memory))
}

pub fn save(path: &Path, machine: &Machine) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write(&mut writer, machine)?;
    log::info!("saved snapshot to {}", path.display());
    Ok(())
}

pub fn load(path: &Path) -> Result<Machine> {
    let mut reader = BufReader::new(File::open(path)?);
    let machine = read(&mut reader)?;
    log::info!(
        "loaded snapshot from {} (PC 0x{:04X})",
        path.display(),
        machine.cpu.regs.pc
    );
    Ok(machine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_machine() -> Machine {
        let mut machine = Machine::default();
        machine.cpu.regs.set_af(0x12F0);
        machine.cpu.regs.set_bc(0x3456);
        machine.cpu.regs.set_de(0x789A);
        machine.cpu.regs.set_hl(0xBCDE);
        machine.cpu.regs.sp = 0xFFFE;
        machine.cpu.regs.pc = 0x0150;
        machine.cpu.ime = true;
        machine.memory.write_byte(0x0000, 0x31);
        machine.memory.write_byte(0xC123, 0x99);
        machine.memory.write_byte(0xFFFF, 0x1F);
        machine
    }

    fn encode(machine: &Machine) -> Vec<u8> {
        let mut buf = Vec::new();
        write(&mut buf, machine).unwrap();
        buf
    }

    #[test]
    fn layout_matches_header_registers_then_memory() {
        let buf = encode(&sample_machine());
        assert_eq!(buf.len(), SNAPSHOT_LEN);
        assert_eq!(&buf[..8], b"GBCPUSNP");
        assert_eq!(buf[8], 1);
        // A F B C D E H L
        assert_eq!(&buf[9..17], &[0x12, 0xF0, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE]);
        // SP, PC little-endian, then flags
        assert_eq!(&buf[17..21], &[0xFE, 0xFF, 0x50, 0x01]);
        assert_eq!(buf[21], FLAG_IME);
        assert_eq!(buf[22], 0x31);
        assert_eq!(buf[22 + 0xC123], 0x99);
    }

    #[test]
    fn read_restores_written_machine() {
        let mut machine = sample_machine();
        machine.cpu.halted = true;
        let restored = read(&mut Cursor::new(encode(&machine))).unwrap();
        assert_eq!(restored, machine);
    }

    fn running(program: &[u8]) -> Machine {
        Machine::new(Cpu::new(), Memory::with_image(program).unwrap())
    }

    fn reload(machine: &Machine) -> Machine {
        read(&mut Cursor::new(encode(machine))).unwrap()
    }

    #[test]
    fn stopped_cpu_stays_stopped_after_reload() {
        // STOP 0x00; NOP
        let mut machine = running(&[0x10, 0x00, 0x00]);
        machine.step().unwrap();
        assert!(machine.cpu.stopped);
        assert_eq!(encode(&machine)[21], FLAG_STOPPED);

        let mut restored = reload(&machine);
        assert_eq!(restored, machine);

        machine.step().unwrap();
        restored.step().unwrap();
        assert_eq!(restored.cpu.regs.pc, 0x0002);
        assert_eq!(restored, machine);
    }

    #[test]
    fn delayed_ei_survives_reload() {
        // EI; NOP; NOP
        let mut machine = running(&[0xFB, 0x00, 0x00]);
        machine.step().unwrap();
        assert!(!machine.cpu.ime);
        assert_eq!(encode(&machine)[21], FLAG_EI_DELAY);

        let mut restored = reload(&machine);
        assert_eq!(restored, machine);

        machine.step().unwrap();
        restored.step().unwrap();
        assert!(machine.cpu.ime);
        assert!(restored.cpu.ime);
        assert_eq!(restored, machine);
    }

    #[test]
    fn every_control_bit_roundtrips() {
        let mut machine = sample_machine();
        machine.cpu.halted = true;
        machine.cpu.stopped = true;
        machine.cpu.ime_enable_pending = true;
        machine.cpu.ime_enable_delay = true;
        assert_eq!(encode(&machine)[21], 0x1F);
        assert_eq!(reload(&machine), machine);
    }

    #[test]
    fn read_rejects_bad_magic_and_version() {
        let mut buf = encode(&sample_machine());
        buf[0] = b'X';
        assert!(matches!(
            read(&mut Cursor::new(&buf)),
            Err(CpuError::InvalidSnapshot(_))
        ));

        let mut buf = encode(&sample_machine());
        buf[8] = 2;
        let err = read(&mut Cursor::new(&buf)).unwrap_err();
        assert!(err.to_string().contains("unsupported version 2"));
    }

    #[test]
    fn read_rejects_truncated_and_oversized_input() {
        let buf = encode(&sample_machine());
        assert!(matches!(
            read(&mut Cursor::new(&buf[..100])),
            Err(CpuError::InvalidSnapshot(msg)) if msg.contains("memory image")
        ));
        assert!(matches!(
            read(&mut Cursor::new(&buf[..5])),
            Err(CpuError::InvalidSnapshot(msg)) if msg.contains("header")
        ));

        let mut long = buf.clone();
        long.push(0);
        assert!(matches!(
            read(&mut Cursor::new(&long)),
            Err(CpuError::InvalidSnapshot(msg)) if msg.contains("trailing")
        ));
    }

    #[test]
    fn save_and_load_through_a_file() {
        let path = std::env::temp_dir().join(format!(
            "gbcpu-snapshot-test-{}.snapshot",
            std::process::id()
        ));
        let machine = sample_machine();
        save(&path, &machine).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, machine);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("gbcpu-snapshot-does-not-exist.snapshot");
        assert!(matches!(load(&path), Err(CpuError::Io(_))));
    }
}
