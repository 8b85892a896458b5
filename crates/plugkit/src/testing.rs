//! Recording runner used by unit tests across the crate

use crate::runner::{CommandRunner, ShellKind};
use crate::types::ExecutionResult;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Scripted runner: each command maps to a canned result, every call is
/// recorded in order.
#[derive(Default)]
pub struct RecordingRunner {
    responses: HashMap<String, ExecutionResult>,
    calls: Mutex<Vec<String>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `command` with a clean exit and the given output
    pub fn respond(mut self, command: &str, output: &str) -> Self {
        self.responses
            .insert(command.to_string(), ExecutionResult::exited(Some(0), output));
        self
    }

    /// Answer `command` with an arbitrary result
    pub fn respond_with(mut self, command: &str, result: ExecutionResult) -> Self {
        self.responses.insert(command.to_string(), result);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    fn record(&self, call: String) {
        match self.calls.lock() {
            Ok(mut calls) => calls.push(call),
            Err(poisoned) => poisoned.into_inner().push(call),
        }
    }

    fn lookup(&self, key: &str) -> ExecutionResult {
        self.responses
            .get(key)
            .cloned()
            .unwrap_or_else(|| ExecutionResult::exited(Some(0), ""))
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &str, _shell: ShellKind) -> ExecutionResult {
        self.record(command.to_string());
        self.lookup(command)
    }

    fn run_script(&self, script: &Path) -> ExecutionResult {
        let key = script_key(script);
        self.record(key.clone());
        self.lookup(&key)
    }
}

/// Call label recorded for a script invocation
pub fn script_key(script: &Path) -> String {
    format!("script:{}", PathBuf::from(script).display())
}
