use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
struct SignalState {
    running: bool,
    paused: bool,
    step_requested: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<SignalState>,
    wake: Condvar,
}

/// Run/pause/step control shared between the host input handler and the
/// run loop.
///
/// The host writes; the loop reads between instructions and only ever
/// clears an acknowledged step request. Every write notifies so a loop
/// parked in step mode wakes up at once.
#[derive(Clone, Debug)]
pub struct RunSignal {
    shared: Arc<Shared>,
}

/// What the loop should do before the next instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    Run,
    Stop,
}

impl Default for RunSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl RunSignal {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SignalState {
                    running: true,
                    paused: false,
                    step_requested: false,
                }),
                wake: Condvar::new(),
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.state.lock().running
    }

    pub fn is_paused(&self) -> bool {
        self.shared.state.lock().paused
    }

    pub fn stop(&self) {
        self.update(|state| state.running = false);
    }

    pub fn set_paused(&self, paused: bool) {
        self.update(|state| state.paused = paused);
    }

    pub fn toggle_pause(&self) -> bool {
        let mut paused = false;
        self.update(|state| {
            state.paused = !state.paused;
            paused = state.paused;
        });
        paused
    }

    /// Let one instruction through while paused.
    pub fn request_step(&self) {
        self.update(|state| state.step_requested = true);
    }

    fn update(&self, f: impl FnOnce(&mut SignalState)) {
        let mut state = self.shared.state.lock();
        f(&mut *state);
        self.shared.wake.notify_all();
    }

    /// Block until the loop may execute one instruction or must stop.
    ///
    /// When not paused this returns immediately. When paused it parks until
    /// a step is requested (and acknowledges it) or the run is stopped.
    pub fn wait_gate(&self) -> Gate {
        let mut state = self.shared.state.lock();
        loop {
            if !state.running {
                return Gate::Stop;
            }
            if !state.paused {
                return Gate::Run;
            }
            if state.step_requested {
                state.step_requested = false;
                return Gate::Run;
            }
            self.shared.wake.wait(&mut state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn defaults_to_running_and_unpaused() {
        let signal = RunSignal::new();
        assert!(signal.is_running());
        assert!(!signal.is_paused());
        assert_eq!(signal.wait_gate(), Gate::Run);
    }

    #[test]
    fn stop_is_seen_by_clones() {
        let signal = RunSignal::new();
        let host = signal.clone();
        host.stop();
        assert!(!signal.is_running());
        assert_eq!(signal.wait_gate(), Gate::Stop);
    }

    #[test]
    fn paused_gate_consumes_one_step_request() {
        let signal = RunSignal::new();
        signal.set_paused(true);
        signal.request_step();

        assert_eq!(signal.wait_gate(), Gate::Run);
        assert!(!signal.shared.state.lock().step_requested);
        assert!(signal.is_paused());
    }

    #[test]
    fn paused_gate_wakes_on_step_from_other_thread() {
        let signal = RunSignal::new();
        signal.set_paused(true);

        let host = signal.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            host.request_step();
        });

        assert_eq!(signal.wait_gate(), Gate::Run);
        handle.join().unwrap();
    }

    #[test]
    fn toggle_pause_flips_state() {
        let signal = RunSignal::new();
        assert!(signal.toggle_pause());
        assert!(signal.is_paused());
        assert!(!signal.toggle_pause());
        assert!(!signal.is_paused());
    }
}
