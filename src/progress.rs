//! Cosmetic spinner for long-running network calls.
//!
//! Scoped task: started on entering a long operation, signalled and joined
//! on leaving. `stop` blocks until the spinner thread has cleared its line,
//! so later output never interleaves with the animation.

use std::io::{IsTerminal, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const TICK: Duration = Duration::from_millis(120);

pub struct Spinner {
    stop_tx: mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

impl Spinner {
    /// Begin animating `label` on stderr. Returns `None` when stderr is not
    /// a terminal or progress output is suppressed.
    pub fn start(label: &str, quiet: bool) -> Option<Self> {
        if quiet || !std::io::stderr().is_terminal() {
            return None;
        }

        let label = label.to_string();
        let (stop_tx, stop_rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let mut frame = 0usize;
            loop {
                eprint!("\x1b[2K\r{label} {}", FRAMES[frame % FRAMES.len()]);
                let _ = std::io::stderr().flush();
                frame += 1;

                match stop_rx.recv_timeout(TICK) {
                    Err(mpsc::RecvTimeoutError::Timeout) => continue,
                    // Stop requested, or the Spinner was leaked and dropped.
                    _ => break,
                }
            }
            eprint!("\x1b[2K\r");
            let _ = std::io::stderr().flush();
        });

        Some(Self { stop_tx, handle })
    }

    /// Stop the animation. Blocks until the spinner thread has cleared the
    /// line and exited.
    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.handle.join();
    }
}

/// Run `op` with a spinner scoped around it.
pub fn with_spinner<T>(label: &str, quiet: bool, op: impl FnOnce() -> T) -> T {
    let spinner = Spinner::start(label, quiet);
    let result = op();
    if let Some(spinner) = spinner {
        spinner.stop();
    }
    result
}
