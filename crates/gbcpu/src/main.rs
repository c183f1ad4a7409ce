use std::path::PathBuf;

use gbcpu::{HostConfig, CRASH_DIR_ENV};

fn main() {
    env_logger::init();

    let crash_dir = std::env::var_os(CRASH_DIR_ENV).map(PathBuf::from);
    let config = HostConfig::from_args(std::env::args().skip(1), crash_dir);

    match &config.snapshot {
        Some(snapshot) => log::info!("Resuming snapshot: '{}'", snapshot.display()),
        None => log::info!("Playing ROM path: '{}'", config.rom_path.display()),
    }
    log::info!("Commands: q = quit, p = pause/resume, s or Enter = step while paused");

    if let Err(err) = gbcpu::run(&config) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}
