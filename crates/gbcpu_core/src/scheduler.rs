use std::thread;
use std::time::{Duration, Instant};

use typed_builder::TypedBuilder;

use crate::error::Result;
use crate::machine::Machine;
use crate::signal::{Gate, RunSignal};

/// DMG master clock in T-cycles per second.
pub const CPU_FREQUENCY_HZ: u64 = 4_194_304;

#[derive(Clone, Debug, TypedBuilder)]
pub struct SchedulerConfig {
    /// Target clock rate in T-cycles per second.
    #[builder(default = CPU_FREQUENCY_HZ)]
    pub frequency_hz: u64,
    /// Number of throttle checkpoints per emulated second.
    #[builder(default = 1000)]
    pub batches_per_second: u32,
    /// When false the loop runs at host speed.
    #[builder(default = true)]
    pub throttle: bool,
    /// Stop after this many steps.
    #[builder(default, setter(strip_option))]
    pub instruction_limit: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SchedulerConfig {
    /// T-cycles executed between two throttle checkpoints.
    pub fn batch_cycles(&self) -> u64 {
        (self.frequency_hz / self.batches_per_second.max(1) as u64).max(1)
    }

    /// Wall-clock time one batch is supposed to take.
    pub fn batch_period(&self) -> Duration {
        Duration::from_secs(1) / self.batches_per_second.max(1)
    }
}

/// Batch-level pacing against the target clock.
///
/// Cycles are accumulated per instruction; once a batch is full the time
/// left in its budget (if any) is handed back as a sleep duration.
#[derive(Debug)]
pub struct Throttle {
    batch_cycles: u64,
    period: Duration,
    cycles_in_batch: u64,
    batch_start: Instant,
}

impl Throttle {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            batch_cycles: config.batch_cycles(),
            period: config.batch_period(),
            cycles_in_batch: 0,
            batch_start: Instant::now(),
        }
    }

    /// Account for `cycles` and return how long to sleep if this closed a
    /// batch.
    pub fn account(&mut self, cycles: u32) -> Option<Duration> {
        self.cycles_in_batch += cycles as u64;
        if self.cycles_in_batch < self.batch_cycles {
            return None;
        }

        let now = Instant::now();
        let elapsed = now.duration_since(self.batch_start);
        self.cycles_in_batch -= self.batch_cycles;
        self.batch_start = now;

        let pause = remaining_budget(self.period, elapsed);
        log::debug!("batch done in {elapsed:?}, pause {pause:?}");
        pause
    }
}

/// Sleep time left in a batch of length `period` after `elapsed`.
/// `None` when the batch already overran its budget.
pub fn remaining_budget(period: Duration, elapsed: Duration) -> Option<Duration> {
    period.checked_sub(elapsed).filter(|pause| !pause.is_zero())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run signal was cleared.
    Stopped,
    /// `instruction_limit` steps were executed.
    BudgetExhausted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub instructions: u64,
    pub cycles: u64,
}

/// Fetch-execute loop.
///
/// Owns the machine for the duration of a run. The run signal is consulted
/// only between instructions, so an instruction always runs to completion.
pub struct Scheduler {
    machine: Machine,
    signal: RunSignal,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(machine: Machine, signal: RunSignal, config: SchedulerConfig) -> Self {
        Self {
            machine,
            signal,
            config,
        }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn into_machine(self) -> Machine {
        self.machine
    }

    /// Run until the signal stops us, the instruction limit is reached, or
    /// the CPU faults.
    ///
    /// On a fault the full state dump is logged and the error returned; the
    /// machine is left as it was at the faulting fetch.
    pub fn run(&mut self) -> Result<RunReport> {
        let mut throttle = Throttle::new(&self.config);
        let mut instructions = 0u64;
        let mut cycles = 0u64;

        let outcome = loop {
            if self
                .config
                .instruction_limit
                .is_some_and(|limit| instructions >= limit)
            {
                break RunOutcome::BudgetExhausted;
            }
            if self.signal.wait_gate() == Gate::Stop {
                break RunOutcome::Stopped;
            }

            let taken = match self.machine.step() {
                Ok(taken) => taken,
                Err(err) => {
                    log::error!("### Crashed ##");
                    log::error!("{err}");
                    log::error!("STATE DUMP:\n{}", self.machine.cpu);
                    return Err(err);
                }
            };
            instructions += 1;
            cycles += taken as u64;

            if self.config.throttle {
                if let Some(pause) = throttle.account(taken) {
                    thread::sleep(pause);
                }
            }
        };

        log::info!(
            "Halted after {instructions} instructions ({cycles} cycles):\n{}",
            self.machine.cpu
        );

        Ok(RunReport {
            outcome,
            instructions,
            cycles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::Cpu;
    use crate::error::CpuError;
    use crate::memory::Memory;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn machine_with(program: &[u8]) -> Machine {
        Machine::new(Cpu::new(), Memory::with_image(program).unwrap())
    }

    fn unthrottled(limit: u64) -> SchedulerConfig {
        SchedulerConfig::builder()
            .throttle(false)
            .instruction_limit(limit)
            .build()
    }

    #[test]
    fn default_config_uses_millisecond_batches() {
        let config = SchedulerConfig::default();
        assert_eq!(config.frequency_hz, CPU_FREQUENCY_HZ);
        assert_eq!(config.batch_cycles(), 4194);
        assert_eq!(config.batch_period(), Duration::from_millis(1));
        assert!(config.throttle);
        assert_eq!(config.instruction_limit, None);
    }

    #[test]
    fn remaining_budget_skips_overrun_batches() {
        let period = Duration::from_millis(1);
        assert_eq!(
            remaining_budget(period, Duration::from_micros(250)),
            Some(Duration::from_micros(750))
        );
        assert_eq!(remaining_budget(period, period), None);
        assert_eq!(remaining_budget(period, Duration::from_millis(5)), None);
    }

    #[test]
    fn throttle_only_reports_at_batch_boundaries() {
        let config = SchedulerConfig::builder()
            .frequency_hz(1_000)
            .batches_per_second(10)
            .build();
        let mut throttle = Throttle::new(&config);
        assert_eq!(config.batch_cycles(), 100);

        for _ in 0..24 {
            assert_eq!(throttle.account(4), None);
        }
        // 100th cycle closes the batch; it finished far inside its 100 ms.
        let pause = throttle.account(4).expect("batch should close");
        assert!(pause <= Duration::from_millis(100));
        assert_eq!(throttle.account(4), None);
    }

    #[test]
    fn run_executes_until_instruction_limit() {
        init_logger();
        // LD A,5; INC A; INC A; JR -2 (spin)
        let mut scheduler = Scheduler::new(
            machine_with(&[0x3E, 0x05, 0x3C, 0x3C, 0x18, 0xFE]),
            RunSignal::new(),
            unthrottled(3),
        );

        let report = scheduler.run().unwrap();
        assert_eq!(report.outcome, RunOutcome::BudgetExhausted);
        assert_eq!(report.instructions, 3);
        assert_eq!(report.cycles, 8 + 4 + 4);
        assert_eq!(scheduler.machine().cpu.regs.a, 0x07);
        assert_eq!(scheduler.machine().cpu.regs.pc, 0x0004);
    }

    #[test]
    fn run_returns_immediately_when_signal_already_stopped() {
        let signal = RunSignal::new();
        signal.stop();
        let mut scheduler = Scheduler::new(machine_with(&[0x00]), signal, unthrottled(10));

        let report = scheduler.run().unwrap();
        assert_eq!(report.outcome, RunOutcome::Stopped);
        assert_eq!(report.instructions, 0);
        assert_eq!(scheduler.machine().cpu.regs.pc, 0x0000);
    }

    #[test]
    fn run_stops_on_unimplemented_opcode_without_touching_memory() {
        init_logger();
        // LD HL,0xC000; LD (HL),0x5A; <0xD3>
        let program = [0x21, 0x00, 0xC0, 0x36, 0x5A, 0xD3];
        let mut scheduler = Scheduler::new(
            machine_with(&program),
            RunSignal::new(),
            unthrottled(100),
        );

        let err = scheduler.run().unwrap_err();
        assert!(matches!(
            err,
            CpuError::UnimplementedOpcode {
                opcode: 0xD3,
                pc: 0x0005
            }
        ));
        let machine = scheduler.into_machine();
        assert_eq!(machine.cpu.regs.pc, 0x0005);
        assert_eq!(machine.memory.read_byte(0xC000), 0x5A);
        assert_eq!(&machine.memory.as_slice()[..6], &program);
    }

    #[test]
    fn paused_run_executes_one_step_then_parks_until_stopped() {
        let signal = RunSignal::new();
        signal.set_paused(true);
        signal.request_step();

        let host = signal.clone();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            host.stop();
        });

        // INC A; INC A
        let mut scheduler = Scheduler::new(machine_with(&[0x3C, 0x3C]), signal, unthrottled(10));
        let report = scheduler.run().unwrap();
        stopper.join().unwrap();

        assert_eq!(report.outcome, RunOutcome::Stopped);
        assert_eq!(report.instructions, 1);
        assert_eq!(scheduler.machine().cpu.regs.a, 0x01);
    }

    #[test]
    fn throttled_run_still_completes() {
        // A few batches worth of NOPs at a tiny clock so every batch sleeps.
        let config = SchedulerConfig::builder()
            .frequency_hz(40_000)
            .batches_per_second(1_000)
            .instruction_limit(30)
            .build();
        let mut scheduler = Scheduler::new(machine_with(&[]), RunSignal::new(), config);

        let started = Instant::now();
        let report = scheduler.run().unwrap();
        assert_eq!(report.instructions, 30);
        assert_eq!(report.cycles, 120);
        // 120 cycles at 40 cycles per 1 ms batch: three closed batches.
        assert!(started.elapsed() >= Duration::from_millis(2));
    }
}
