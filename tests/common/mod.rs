// Shared helpers for integration tests.
//
// Provides an isolated provisioning root and home, a scripted executor that
// answers commands from a table instead of touching the host, and a helper
// for invoking the compiled binary with its log directory redirected.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

use workstation_setup::config::{CONFIG_FILE, Config};
use workstation_setup::environment::RunEnvironment;
use workstation_setup::exec::{ExecResult, Executor};
use workstation_setup::logging::{Log, Logger};
use workstation_setup::platform::Platform;
use workstation_setup::prompt::{Answer, Prompter};
use workstation_setup::scratch::ScratchRegistry;
use workstation_setup::tasks::Context;

/// Configuration that keeps the pre-flight checks off the network.
pub const OFFLINE: &str = "[preflight]\nnetwork_check_url = \"\"\n";

/// Executor that answers from a table keyed by the full command line.
///
/// Commands not in the table fail. Every command is recorded.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    responses: HashMap<String, (bool, String)>,
    on_path: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    /// Answers for an unprivileged user with passwordless sudo.
    pub fn regular_user() -> Self {
        Self::default()
            .respond("id -u", true, "1000\n")
            .respond("sudo -n true", true, "")
            .on_path("sudo")
    }

    /// Answer `command` with `stdout` and the given exit status.
    pub fn respond(mut self, command: &str, success: bool, stdout: &str) -> Self {
        self.responses
            .insert(command.to_string(), (success, stdout.to_string()));
        self
    }

    /// Report `program` as available on `PATH`.
    pub fn on_path(mut self, program: &str) -> Self {
        self.on_path.insert(program.to_string());
        self
    }

    /// Every command line executed so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn answer(&self, program: &str, args: &[&str]) -> ExecResult {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().expect("calls lock").push(line.clone());
        let (success, stdout) = self
            .responses
            .get(&line)
            .cloned()
            .unwrap_or((false, String::new()));
        ExecResult {
            stdout,
            stderr: String::new(),
            success,
            code: Some(i32::from(!success)),
        }
    }

    fn checked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let result = self.answer(program, args);
        if result.success {
            Ok(result)
        } else {
            anyhow::bail!("{program} failed")
        }
    }
}

impl Executor for ScriptedExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.checked(program, args)
    }

    fn run_in(&self, _dir: &Path, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.checked(program, args)
    }

    fn run_with_input(
        &self,
        program: &str,
        args: &[&str],
        _input: &str,
    ) -> anyhow::Result<ExecResult> {
        self.checked(program, args)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Ok(self.answer(program, args))
    }

    fn run_interactive(
        &self,
        _dir: Option<&Path>,
        program: &str,
        args: &[&str],
    ) -> anyhow::Result<()> {
        self.checked(program, args).map(|_| ())
    }

    fn which(&self, program: &str) -> bool {
        self.on_path.contains(program)
    }
}

/// Prompter that hands out a fixed sequence of answers, then aborts.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[Answer]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            asked: Mutex::default(),
        }
    }

    /// Every question asked so far.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().expect("asked lock").clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, question: &str) -> anyhow::Result<Answer> {
        self.asked
            .lock()
            .expect("asked lock")
            .push(question.to_string());
        Ok(self
            .answers
            .lock()
            .expect("answers lock")
            .pop_front()
            .unwrap_or(Answer::Abort))
    }
}

/// An isolated home and provisioning root.
pub struct Workstation {
    pub home: tempfile::TempDir,
    pub root: tempfile::TempDir,
}

impl Workstation {
    /// Create a workstation whose root holds `setup.toml` with `config`.
    pub fn new(config: &str) -> Self {
        let home = tempfile::tempdir().expect("create home");
        let root = tempfile::tempdir().expect("create root");
        std::fs::write(root.path().join(CONFIG_FILE), config).expect("write setup.toml");
        Self { home, root }
    }

    /// Create `relative` (and its parents) as a directory under home.
    pub fn with_home_dir(self, relative: &str) -> Self {
        std::fs::create_dir_all(self.home.path().join(relative)).expect("create home dir");
        self
    }

    /// Load the configuration and build a context on an Arch host with
    /// systemd. Returns the logger too so tests can inspect the summary.
    pub fn context(&self, executor: Arc<ScriptedExecutor>) -> (Context, Arc<Logger>) {
        let config = Config::load(self.root.path()).expect("load setup.toml");
        let env = RunEnvironment {
            user: "tester".to_string(),
            home: self.home.path().to_path_buf(),
            root: self.root.path().to_path_buf(),
        };
        let log = Arc::new(Logger::new(None));
        let ctx = Context::new(
            config,
            env,
            Platform::new(true, true),
            Arc::clone(&log) as Arc<dyn Log>,
            executor,
            ScratchRegistry::new(),
        );
        (ctx, log)
    }
}

/// Build a command for the compiled `setup` binary with its log directory
/// pointed at `log_dir` and the provisioning root at `root`.
pub fn setup_binary(log_dir: &Path, root: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_setup"));
    cmd.env("SETUP_LOG_DIR", log_dir)
        .env("SETUP_ROOT", root);
    cmd
}

/// Files currently in `dir` (empty when it does not exist).
pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(Result::ok).map(|e| e.path()).collect())
        .unwrap_or_default()
}
