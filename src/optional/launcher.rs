//! Module to launch a command when a block is clicked.
//!
//!

use std::{
    io,
    os::unix::process::CommandExt,
    process::{Child, Command, Stdio},
};
use tracing::{debug, info, warn};

pub struct Launcher {
    command: String,
    args: Vec<String>,
    list: Vec<Child>,
}

impl Launcher {
    pub fn new(cmd: &str) -> Self {
        let mut command = String::new();
        let mut args = Vec::new();
        for (i, s) in cmd
            .split_whitespace()
            .enumerate()
            .map(|(i, s)| (i, s.to_owned()))
        {
            if i == 0 {
                command = s;
            } else {
                args.push(s);
            }
        }
        Self {
            command,
            args,
            list: Vec::new(),
        }
    }

    /// `<terminal> -e <cmd>`, the usual way to get a tui program its own window.
    pub fn in_terminal(terminal: &str, cmd: &str) -> Self {
        Self::new(&format!("{} -e {}", terminal, cmd))
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Start the command and forget about it. Children get their own session so a ctrl-c
    /// aimed at us doesn't take the terminal down too.
    pub fn spawn(&mut self) {
        if self.command.is_empty() {
            return;
        }
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        unsafe {
            cmd.pre_exec(|| {
                if libc::setsid() == -1 {
                    return Err(io::Error::last_os_error());
                }
                Ok(())
            });
        }
        match cmd.spawn() {
            Ok(child) => {
                info!(command = %self.command, pid = child.id(), "launched");
                self.list.push(child);
            }
            Err(e) => warn!(command = %self.command, "could not launch: {}", e),
        }
    }

    /// Collect children that have exited so they don't hang around as zombies.
    pub fn reap(&mut self) {
        // try_wait wants &mut, so no retain here.
        let mut i = 0;
        while i < self.list.len() {
            match self.list[i].try_wait() {
                Ok(Some(status)) => {
                    debug!(pid = self.list[i].id(), %status, "child exited");
                    self.list.swap_remove(i);
                }
                Ok(None) => i += 1,
                Err(e) => {
                    warn!(pid = self.list[i].id(), "could not wait on child: {}", e);
                    self.list.swap_remove(i);
                }
            }
        }
    }

    pub fn running(&self) -> usize {
        self.list.len()
    }
}
