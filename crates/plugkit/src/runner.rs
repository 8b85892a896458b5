//! Command runner - spawns one external command and captures its output
//!
//! Every probe, apply and undo command goes through a [`CommandRunner`].
//! The production implementation is [`ShellRunner`]; tests substitute a
//! recording double.

use crate::types::ExecutionResult;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc;

/// Which interpreter a command string is handed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellKind {
    /// Plain command interpreter (`cmd /C`, `sh -c`)
    Plain,
    /// Script-capable interpreter (`powershell -Command`)
    Script,
}

/// Pick an interpreter by sniffing the command text.
///
/// Best effort: a command that starts with a PowerShell executable name or
/// mentions a `Get-`/`Set-` verb goes to the script interpreter. Anything
/// else, including a plain command that happens to contain those tokens,
/// goes to the plain interpreter or is misclassified.
pub fn classify(command: &str) -> ShellKind {
    let lowered = command.trim_start().to_ascii_lowercase();
    if lowered.starts_with("powershell") || lowered.starts_with("pwsh") {
        return ShellKind::Script;
    }

    if command.contains("Get-") || command.contains("Set-") {
        return ShellKind::Script;
    }

    ShellKind::Plain
}

/// Executes external commands on behalf of the engine.
///
/// Implementations must never panic or return early on a failed spawn:
/// faults are reported through [`ExecutionResult::succeeded`].
pub trait CommandRunner: Send + Sync {
    /// Run a command string through the given interpreter and wait for it
    fn run(&self, command: &str, shell: ShellKind) -> ExecutionResult;

    /// Run a script file through the script interpreter and wait for it
    fn run_script(&self, script: &Path) -> ExecutionResult;

    /// Run a command with the interpreter picked by [`classify`]
    fn run_auto(&self, command: &str) -> ExecutionResult {
        self.run(command, classify(command))
    }
}

/// Interpreter programs used by [`ShellRunner`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellPrograms {
    /// Program for [`ShellKind::Plain`]
    pub plain: String,
    /// Program for [`ShellKind::Script`] and script files
    pub script: String,
}

impl Default for ShellPrograms {
    fn default() -> Self {
        if cfg!(windows) {
            Self {
                plain: "cmd.exe".to_string(),
                script: "powershell.exe".to_string(),
            }
        } else {
            Self {
                plain: "sh".to_string(),
                script: "pwsh".to_string(),
            }
        }
    }
}

/// Runner that spawns real child processes.
///
/// Each call blocks until the child exits. There is no timeout: a hung
/// command hangs the call.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    programs: ShellPrograms,
}

impl ShellRunner {
    /// Create a runner with the platform default interpreters
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner with explicit interpreter programs
    pub fn with_programs(programs: ShellPrograms) -> Self {
        Self { programs }
    }

    /// Interpreter programs in use
    pub fn programs(&self) -> &ShellPrograms {
        &self.programs
    }

    fn command_for(&self, command: &str, shell: ShellKind) -> Command {
        match shell {
            ShellKind::Plain => {
                let mut cmd = Command::new(&self.programs.plain);
                plain_args(&mut cmd, command);
                cmd
            }
            ShellKind::Script => {
                let mut cmd = Command::new(&self.programs.script);
                cmd.args(["-NoProfile", "-NonInteractive", "-Command", command]);
                cmd
            }
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str, shell: ShellKind) -> ExecutionResult {
        log::debug!("Running ({:?}): {}", shell, command);
        execute(self.command_for(command, shell), command)
    }

    fn run_script(&self, script: &Path) -> ExecutionResult {
        let mut cmd = Command::new(&self.programs.script);
        cmd.args(["-NoProfile", "-NonInteractive", "-ExecutionPolicy", "Bypass", "-File"])
            .arg(script);

        let label = script.display().to_string();
        log::debug!("Running script: {}", label);
        execute(cmd, &label)
    }
}

/// `cmd.exe` parses its own command line, so the text must reach it
/// without the `\"` escaping `Command::arg` applies.
#[cfg(windows)]
fn plain_args(cmd: &mut Command, command: &str) {
    use std::os::windows::process::CommandExt;

    cmd.arg("/C").raw_arg(format!("\"{command}\""));
}

#[cfg(not(windows))]
fn plain_args(cmd: &mut Command, command: &str) {
    cmd.arg("-c").arg(command);
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Spawn `cmd`, forward both streams line by line, and wait for exit.
///
/// The reader threads are scoped to this call, so the process handle and
/// its pipes are released before returning on every path.
fn execute(mut cmd: Command, label: &str) -> ExecutionResult {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            log::error!("Failed to execute: {} ({})", label, e);
            return ExecutionResult::transport_failure();
        }
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (tx, rx) = mpsc::channel::<(Stream, String)>();

    let status = std::thread::scope(|scope| {
        if let Some(out) = stdout {
            let tx = tx.clone();
            scope.spawn(move || forward_lines(out, Stream::Stdout, label, &tx));
        }
        if let Some(err) = stderr {
            let tx = tx.clone();
            scope.spawn(move || forward_lines(err, Stream::Stderr, label, &tx));
        }
        child.wait()
    });
    drop(tx);

    let lines: Vec<(Stream, String)> = rx.into_iter().collect();
    let stdout = lines
        .iter()
        .filter(|(stream, _)| *stream == Stream::Stdout)
        .map(|(_, line)| line.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let combined_output = lines
        .iter()
        .map(|(_, line)| line.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    match status {
        Ok(status) => {
            log::info!("Executed command: {} ({})", label, status);
            ExecutionResult::exited(status.code(), stdout).with_combined_output(combined_output)
        }
        Err(e) => {
            log::error!("Failed to wait for: {} ({})", label, e);
            ExecutionResult {
                stdout,
                combined_output,
                ..ExecutionResult::transport_failure()
            }
        }
    }
}

fn forward_lines(
    reader: impl Read,
    stream: Stream,
    label: &str,
    tx: &mpsc::Sender<(Stream, String)>,
) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                if line.is_empty() {
                    continue;
                }
                match stream {
                    Stream::Stdout => log::info!("[{}] {}", label, line),
                    Stream::Stderr => log::warn!("[{}] {}", label, line),
                }
                // Receiver outlives the scoped readers
                let _ = tx.send((stream, line));
            }
            Err(e) => {
                log::warn!("Lost output stream of {}: {}", label, e);
                break;
            }
        }
    }
}
