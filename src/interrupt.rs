//! Ctrl-C handling.
//!
//! A blocking terminal read resumes after SIGINT, so until interrupts are
//! deferred the handler restores the terminal and exits on its own. Once
//! deferred, an interrupt only raises the cancel flag that the TOTP live
//! loop polls.

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::err::Error;

#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    cancel: Arc<AtomicBool>,
    deferred: Arc<AtomicBool>,
}

impl Interrupt {
    /// Install the process-wide handler.
    pub fn install() -> Result<Interrupt, ctrlc::Error> {
        let interrupt = Interrupt::default();
        let handler = interrupt.clone();
        let saved = tty::Saved::capture();

        ctrlc::set_handler(move || {
            if handler.raise() {
                return;
            }
            if let Some(saved) = &saved {
                saved.restore();
            }
            eprintln!();
            eprintln!("Error: {}", Error::Interrupted);
            process::exit(1);
        })?;
        Ok(interrupt)
    }

    /// From now on an interrupt only sets the cancel flag.
    pub fn defer(&self) {
        self.deferred.store(true, Ordering::SeqCst);
    }

    pub fn cancel_flag(&self) -> &AtomicBool {
        &self.cancel
    }

    /// Record an interrupt. `false` means the process has to abort now.
    fn raise(&self) -> bool {
        if !self.deferred.load(Ordering::SeqCst) {
            return false;
        }
        self.cancel.store(true, Ordering::SeqCst);
        true
    }
}

#[cfg(unix)]
mod tty {
    use std::fs::File;

    use nix::sys::termios::{self, SetArg, Termios};

    /// Terminal attributes from before any prompt touched them.
    pub struct Saved {
        tty: File,
        attrs: Termios,
    }

    impl Saved {
        pub fn capture() -> Option<Saved> {
            let tty = File::open("/dev/tty").ok()?;
            let attrs = termios::tcgetattr(&tty).ok()?;
            Some(Saved { tty, attrs })
        }

        pub fn restore(&self) {
            if let Err(e) = termios::tcsetattr(&self.tty, SetArg::TCSANOW, &self.attrs) {
                tracing::debug!("restoring terminal attributes: {}", e);
            }
        }
    }
}

#[cfg(not(unix))]
mod tty {
    pub struct Saved;

    impl Saved {
        pub fn capture() -> Option<Saved> {
            None
        }

        pub fn restore(&self) {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aborts_until_deferred() {
        let interrupt = Interrupt::default();
        assert!(!interrupt.raise());
        assert!(!interrupt.cancel_flag().load(Ordering::SeqCst));

        interrupt.defer();
        assert!(interrupt.raise());
        assert!(interrupt.cancel_flag().load(Ordering::SeqCst));
    }

    #[test]
    fn test_clones_share_state() {
        let interrupt = Interrupt::default();
        let handler = interrupt.clone();
        interrupt.defer();
        assert!(handler.raise());
        assert!(interrupt.cancel_flag().load(Ordering::SeqCst));
    }
}
