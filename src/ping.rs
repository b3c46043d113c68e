//! Reachability applet.
//!
//! Runs the system ping once with all of its standard streams bound to the
//! null device and shows green or red depending on how it exited.

use std::io::{ErrorKind, Write};
use std::process::{Command, ExitStatus, Stdio};

use log::debug;

use crate::config::PingConfig;
use crate::error::{AppletError, Result};
use crate::gradient::Gradient;
use crate::status::StatusLine;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable,
}

impl Reachability {
    fn from_status(status: ExitStatus) -> Self {
        if status.code() == Some(0) {
            Reachability::Reachable
        } else {
            Reachability::Unreachable
        }
    }
}

/// One ping invocation against one host.
#[derive(Clone, Debug)]
pub struct Pinger {
    program: String,
    count: u32,
    timeout_secs: u32,
}

impl Pinger {
    pub fn new(config: &PingConfig) -> Self {
        Self {
            program: config.program.clone(),
            count: config.count,
            timeout_secs: config.timeout_secs,
        }
    }

    fn command(&self, host: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-c")
            .arg(self.count.to_string())
            .arg("-w")
            .arg(self.timeout_secs.to_string())
            .arg(host)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }

    /// Block until the child exits.
    ///
    /// A missing or non-executable program counts as an unreachable host;
    /// only other spawn failures are errors.
    pub fn probe(&self, host: &str) -> Result<Reachability> {
        match self.command(host).status() {
            Ok(status) => {
                debug!("{} {} exited with {}", self.program, host, status);
                Ok(Reachability::from_status(status))
            }
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
                debug!("{} could not be executed: {}", self.program, e);
                Ok(Reachability::Unreachable)
            }
            Err(source) => Err(AppletError::Spawn {
                program: self.program.clone(),
                source,
            }),
        }
    }
}

/// In gradient mode the two ends of the hue range stand in for the
/// configured okay and error colours.
pub fn render(
    result: Reachability,
    config: &PingConfig,
    gradient: Option<&Gradient>,
) -> StatusLine {
    let color = match (result, gradient) {
        (Reachability::Reachable, Some(g)) => g.color(0.0),
        (Reachability::Unreachable, Some(g)) => g.color(1.0),
        (Reachability::Reachable, None) => config.okay_color.clone(),
        (Reachability::Unreachable, None) => config.error_color.clone(),
    };
    let mut line = StatusLine::new();
    line.block(&color).reset();
    line
}

/// Probe `host` (or the configured default) and write one line.
pub fn run<W: Write>(
    config: &PingConfig,
    host: Option<&str>,
    gradient: Option<&Gradient>,
    out: &mut W,
) -> anyhow::Result<()> {
    let host = host.unwrap_or(&config.host);
    let result = Pinger::new(config).probe(host)?;
    render(result, config, gradient).write_to(out)?;
    Ok(())
}
