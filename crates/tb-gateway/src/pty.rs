//! Per-connection PTY sessions
//!
//! Each WebSocket connection gets its own pseudo-terminal running the
//! configured shell, via the portable-pty crate.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};

const INITIAL_ROWS: u16 = 24;
const INITIAL_COLS: u16 = 80;

/// A live PTY with the shell process attached
pub struct PtySession {
    master: Box<dyn MasterPty + Send>,
    child: Box<dyn Child + Send + Sync>,
    writer: Box<dyn Write + Send>,
}

impl PtySession {
    /// Spawn `command` on a fresh PTY. Returns the session and the
    /// blocking output reader (handed to a dedicated reader task).
    pub fn spawn(command: &str, args: &[String]) -> Result<(Self, Box<dyn Read + Send>)> {
        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows: INITIAL_ROWS,
                cols: INITIAL_COLS,
                pixel_width: 0,
                pixel_height: 0,
            })
            .context("Failed to open PTY")?;

        let mut cmd = CommandBuilder::new(command);
        cmd.args(args);
        cmd.env("TERM", "xterm-256color");

        let child = pair
            .slave
            .spawn_command(cmd)
            .with_context(|| format!("Failed to spawn {}", command))?;
        // The master keeps the PTY alive; the slave side belongs to the child.
        drop(pair.slave);

        let reader = pair
            .master
            .try_clone_reader()
            .context("Failed to clone PTY reader")?;
        let writer = pair
            .master
            .take_writer()
            .context("Failed to take PTY writer")?;

        Ok((
            Self {
                master: pair.master,
                child,
                writer,
            },
            reader,
        ))
    }

    /// Write client input to the terminal
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data).context("PTY write failed")?;
        self.writer.flush().context("PTY flush failed")?;
        Ok(())
    }

    /// Resize the terminal
    pub fn resize(&self, rows: u16, cols: u16) -> Result<()> {
        self.master
            .resize(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .context("PTY resize failed")
    }

    /// Non-blocking check for shell exit
    pub fn try_wait(&mut self) -> Option<u32> {
        match self.child.try_wait() {
            Ok(Some(status)) => Some(status.exit_code()),
            _ => None,
        }
    }

    /// Terminate the shell process. Errors are ignored: the process may
    /// already be gone.
    pub fn kill(&mut self) {
        let _ = self.child.kill();
    }
}
