use std::path::Path;

use anyhow::{Context, Result};
use gbcpu_core::{snapshot, Machine};

/// Read a ROM image from disk and build a machine ready to run it.
pub fn load_rom(path: &Path) -> Result<Machine> {
    let rom = std::fs::read(path)
        .with_context(|| format!("failed to read ROM file '{}'", path.display()))?;
    log::info!("Loaded ROM '{}' ({} bytes)", path.display(), rom.len());
    Machine::from_rom(&rom)
        .with_context(|| format!("ROM '{}' does not fit in memory", path.display()))
}

/// Restore a machine from a snapshot written by `gbcpu_core::snapshot`.
pub fn load_snapshot(path: &Path) -> Result<Machine> {
    snapshot::load(path).with_context(|| format!("failed to load snapshot '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gbcpu-loader-{}-{name}", std::process::id()))
    }

    #[test]
    fn loads_boot_rom_at_zero() {
        let path = temp_path("boot.bin");
        std::fs::write(&path, [0x31, 0xFE, 0xFF]).unwrap();

        let machine = load_rom(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(machine.cpu.regs.pc, 0x0000);
        assert_eq!(&machine.memory.as_slice()[..3], &[0x31, 0xFE, 0xFF]);
    }

    #[test]
    fn oversized_rom_is_rejected() {
        let path = temp_path("huge.gb");
        std::fs::write(&path, vec![0u8; 0x1_0001]).unwrap();

        let err = load_rom(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(format!("{err:#}").contains("does not fit"));
    }

    #[test]
    fn missing_rom_names_the_path() {
        let err = load_rom(Path::new("/nonexistent/gbcpu/rom.gb")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/gbcpu/rom.gb"));
    }

    #[test]
    fn snapshot_roundtrips_through_loader() {
        let path = temp_path("state.snapshot");
        let mut machine = Machine::from_rom(&[0x00; 0x200]).unwrap();
        machine.cpu.regs.a = 0x77;
        snapshot::save(&path, &machine).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, machine);
    }
}
