pub mod input;
pub mod loader;

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use gbcpu_core::{snapshot, Machine, RunReport, RunSignal, Scheduler, SchedulerConfig};
use typed_builder::TypedBuilder;

/// ROM used when no path is given on the command line.
pub const DEFAULT_ROM: &str = "roms/DMG_ROM.bin";
/// Directory for crash snapshots; unset means none are written.
pub const CRASH_DIR_ENV: &str = "GBCPU_CRASH_DIR";

#[derive(Clone, Debug, TypedBuilder)]
pub struct HostConfig {
    #[builder(default = PathBuf::from(DEFAULT_ROM), setter(into))]
    pub rom_path: PathBuf,
    /// Start from this snapshot instead of the ROM.
    #[builder(default, setter(strip_option, into))]
    pub snapshot: Option<PathBuf>,
    #[builder(default, setter(strip_option, into))]
    pub crash_snapshot_dir: Option<PathBuf>,
    #[builder(default)]
    pub scheduler: SchedulerConfig,
    /// Read q/p/s commands from stdin.
    #[builder(default = true)]
    pub interactive: bool,
}

impl HostConfig {
    /// `gbcpu [ROM] [SNAPSHOT]`
    pub fn from_args<I>(args: I, crash_snapshot_dir: Option<PathBuf>) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let rom_path = args
            .next()
            .filter(|arg| !arg.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROM));
        let snapshot = args.next().filter(|arg| !arg.is_empty()).map(PathBuf::from);

        Self {
            rom_path,
            snapshot,
            crash_snapshot_dir,
            scheduler: SchedulerConfig::default(),
            interactive: true,
        }
    }
}

/// Load, run until stopped, and report.
///
/// On a CPU fault the scheduler has already logged the state dump; this
/// writes the optional crash snapshot and returns the error.
pub fn run(config: &HostConfig) -> Result<RunReport> {
    let machine = match &config.snapshot {
        Some(path) => loader::load_snapshot(path)?,
        None => loader::load_rom(&config.rom_path)?,
    };

    let signal = RunSignal::new();
    if config.interactive {
        input::spawn_stdin_listener(signal.clone()).context("failed to start input thread")?;
    }

    let mut scheduler = Scheduler::new(machine, signal.clone(), config.scheduler.clone());
    let result = scheduler.run();
    signal.stop();

    match result {
        Ok(report) => {
            log::info!(
                "{:?} after {} instructions, {} cycles",
                report.outcome,
                report.instructions,
                report.cycles
            );
            Ok(report)
        }
        Err(err) => {
            if let Some(dir) = &config.crash_snapshot_dir {
                match write_crash_snapshot(dir, scheduler.machine()) {
                    Ok(path) => log::error!("crash snapshot written to {}", path.display()),
                    Err(save_err) => log::error!("failed to write crash snapshot: {save_err:#}"),
                }
            }
            Err(anyhow::Error::new(err).context("emulation crashed"))
        }
    }
}

/// Save `machine` as `<dir>/<unix_millis>.snapshot`.
pub fn write_crash_snapshot(dir: &Path, machine: &Machine) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create '{}'", dir.display()))?;
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the unix epoch")?
        .as_millis();
    let path = dir.join(format!("{millis}.snapshot"));
    snapshot::save(&path, machine)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbcpu_core::RunOutcome;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gbcpu-host-{}-{name}", std::process::id()))
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn from_args_defaults_to_boot_rom() {
        let config = HostConfig::from_args(args(&[]), None);
        assert_eq!(config.rom_path, PathBuf::from(DEFAULT_ROM));
        assert_eq!(config.snapshot, None);
        assert!(config.scheduler.throttle);
    }

    #[test]
    fn from_args_takes_rom_then_snapshot() {
        let config = HostConfig::from_args(
            args(&["game.gb", "saved.snapshot"]),
            Some(PathBuf::from("crashes")),
        );
        assert_eq!(config.rom_path, PathBuf::from("game.gb"));
        assert_eq!(config.snapshot, Some(PathBuf::from("saved.snapshot")));
        assert_eq!(config.crash_snapshot_dir, Some(PathBuf::from("crashes")));
    }

    #[test]
    fn run_stops_at_instruction_limit() {
        let dir = temp_dir("limit");
        std::fs::create_dir_all(&dir).unwrap();
        let rom = dir.join("loop.bin");
        // LD A,5; INC A; INC A; JR -2
        std::fs::write(&rom, [0x3E, 0x05, 0x3C, 0x3C, 0x18, 0xFE]).unwrap();

        let config = HostConfig::builder()
            .rom_path(&rom)
            .interactive(false)
            .scheduler(
                SchedulerConfig::builder()
                    .throttle(false)
                    .instruction_limit(10)
                    .build(),
            )
            .build();
        let report = run(&config).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(report.outcome, RunOutcome::BudgetExhausted);
        assert_eq!(report.instructions, 10);
    }

    #[test]
    fn crash_writes_snapshot_when_configured() {
        let dir = temp_dir("crash");
        let crash_dir = dir.join("crashes");
        std::fs::create_dir_all(&dir).unwrap();
        let rom = dir.join("bad.bin");
        // NOP; <0xDD>
        std::fs::write(&rom, [0x00, 0xDD]).unwrap();

        let config = HostConfig::builder()
            .rom_path(&rom)
            .crash_snapshot_dir(&crash_dir)
            .interactive(false)
            .scheduler(SchedulerConfig::builder().throttle(false).build())
            .build();
        let err = run(&config).unwrap_err();
        assert!(format!("{err:#}").contains("unimplemented opcode 0xDD at PC=0x0001"));

        let snapshots: Vec<_> = std::fs::read_dir(&crash_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(snapshots.len(), 1);
        let machine = snapshot::load(&snapshots[0]).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(machine.cpu.regs.pc, 0x0001);
    }
}
