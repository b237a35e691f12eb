//! Runtime runners: execute candidate code as an inline script.

use std::collections::HashMap;
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::analysis::ErrorKind;
use super::ValidationError;
use crate::types::Language;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Exit status and captured output of one execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Capability to execute code of one language
pub trait CodeRunner: Send + Sync {
    /// Language this runner executes
    fn language(&self) -> Language;

    /// Execute `code` and capture its result
    fn run(&self, code: &str) -> Result<ExecutionOutput, ValidationError>;

    /// Error classes searched for in stderr
    fn error_classes(&self) -> &'static [ErrorKind] {
        ErrorKind::classes_for(&self.language())
    }

    /// Whether the runtime can be launched on this machine
    fn is_available(&self) -> bool {
        true
    }
}

/// Runs code through an interpreter binary: `<program> <inline_flag> <code>`
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    language: Language,
    program: String,
    inline_flag: String,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(language: Language, program: &str, inline_flag: &str) -> Self {
        Self {
            language,
            program: program.to_string(),
            inline_flag: inline_flag.to_string(),
            timeout: None,
        }
    }

    /// `python -c <code>`
    pub fn python() -> Self {
        Self::new(Language::Python, "python", "-c")
    }

    /// `node -e <code>`
    pub fn node() -> Self {
        Self::new(Language::JavaScript, "node", "-e")
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl CodeRunner for ProcessRunner {
    fn language(&self) -> Language {
        self.language.clone()
    }

    fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    fn run(&self, code: &str) -> Result<ExecutionOutput, ValidationError> {
        let program = which::which(&self.program).map_err(|_| ValidationError::RuntimeNotFound {
            language: self.language.clone(),
            program: self.program.clone(),
        })?;

        debug!(
            "Running {} code with {} {}",
            self.language,
            program.display(),
            self.inline_flag
        );

        let mut child = Command::new(&program)
            .arg(&self.inline_flag)
            .arg(code)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ValidationError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let io_err = |source: std::io::Error| ValidationError::Io {
            program: self.program.clone(),
            source,
        };

        let output = match self.timeout {
            None => child.wait_with_output().map_err(io_err)?,
            Some(timeout) => {
                let stdout = spawn_reader(child.stdout.take());
                let stderr = spawn_reader(child.stderr.take());
                let deadline = Instant::now() + timeout;

                let status = loop {
                    if let Some(status) = child.try_wait().map_err(io_err)? {
                        break status;
                    }
                    if Instant::now() >= deadline {
                        warn!("{} exceeded {:?}, killing it", self.program, timeout);
                        // The process may exit between try_wait and kill
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(ValidationError::Timeout {
                            program: self.program.clone(),
                            timeout,
                        });
                    }
                    std::thread::sleep(POLL_INTERVAL);
                };

                // A background grandchild can keep the pipes open after exit
                let (Some(stdout), Some(stderr)) = (
                    collect_reader(stdout, deadline),
                    collect_reader(stderr, deadline),
                ) else {
                    warn!("{} left its output open past {:?}", self.program, timeout);
                    return Err(ValidationError::Timeout {
                        program: self.program.clone(),
                        timeout,
                    });
                };

                std::process::Output {
                    status,
                    stdout,
                    stderr,
                }
            }
        };

        Ok(ExecutionOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

type Reader = Option<Receiver<Vec<u8>>>;

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Reader {
    pipe.map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(buf);
        });
        rx
    })
}

/// Wait for a reader until `deadline`. `None` means it is still blocked.
fn collect_reader(reader: Reader, deadline: Instant) -> Option<Vec<u8>> {
    let Some(rx) = reader else {
        return Some(Vec::new());
    };
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(buf) => Some(buf),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => Some(Vec::new()),
    }
}

/// Maps language tags to the runner able to execute them
#[derive(Default)]
pub struct RunnerRegistry {
    runners: HashMap<Language, Box<dyn CodeRunner>>,
}

impl RunnerRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// `python -c` and `node -e`, both bounded by `timeout`
    pub fn with_defaults(timeout: Option<Duration>) -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(ProcessRunner::python().with_timeout(timeout)));
        registry.register(Box::new(ProcessRunner::node().with_timeout(timeout)));
        registry
    }

    /// Register a runner, replacing any runner for the same language
    pub fn register(&mut self, runner: Box<dyn CodeRunner>) {
        self.runners.insert(runner.language(), runner);
    }

    pub fn get(&self, language: &Language) -> Result<&dyn CodeRunner, ValidationError> {
        self.runners
            .get(language)
            .map(|runner| runner.as_ref())
            .ok_or_else(|| ValidationError::UnsupportedLanguage(language.clone()))
    }

    pub fn supports(&self, language: &Language) -> bool {
        self.runners.contains_key(language)
    }

    pub fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<_> = self.runners.keys().cloned().collect();
        languages.sort_by(|a, b| a.tag().cmp(b.tag()));
        languages
    }

    /// Each registered language with whether its runtime is launchable
    pub fn available_runtimes(&self) -> Vec<(Language, bool)> {
        self.languages()
            .into_iter()
            .map(|lang| {
                let available = self.runners[&lang].is_available();
                (lang, available)
            })
            .collect()
    }
}

impl std::fmt::Debug for RunnerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnerRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_output_success() {
        let ok = ExecutionOutput {
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        };
        let signalled = ExecutionOutput {
            exit_code: None,
            ..ok.clone()
        };
        assert!(ok.success());
        assert!(!signalled.success());
    }

    #[test]
    fn test_default_registry_languages() {
        let registry = RunnerRegistry::with_defaults(None);
        assert_eq!(
            registry.languages(),
            vec![Language::JavaScript, Language::Python]
        );
        assert!(registry.supports(&Language::Python));
        assert!(!registry.supports(&Language::Java));
    }

    #[test]
    fn test_unsupported_language_is_typed_error() {
        let registry = RunnerRegistry::with_defaults(None);
        let err = registry.get(&Language::from_tag("cobol")).err().unwrap();
        assert!(matches!(err, ValidationError::UnsupportedLanguage(ref l) if l.tag() == "cobol"));
    }

    #[test]
    fn test_default_runners_programs() {
        assert_eq!(ProcessRunner::python().program(), "python");
        assert_eq!(ProcessRunner::node().program(), "node");
        let runner = ProcessRunner::node().with_timeout(Some(Duration::from_secs(2)));
        assert_eq!(runner.timeout(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_missing_runtime() {
        let runner = ProcessRunner::new(
            Language::from_tag("ghost"),
            "codeshift-no-such-runtime-xyz",
            "-e",
        );
        assert!(!runner.is_available());
        let err = runner.run("1").unwrap_err();
        assert!(matches!(err, ValidationError::RuntimeNotFound { .. }));
    }

    #[cfg(unix)]
    fn shell() -> ProcessRunner {
        ProcessRunner::new(Language::from_tag("shell"), "sh", "-c")
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_captures_output() {
        let out = shell()
            .run("echo out; echo 'NameError: x' >&2; exit 3")
            .unwrap();
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "NameError: x\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_with_timeout_completes() {
        let out = shell()
            .with_timeout(Some(Duration::from_secs(10)))
            .run("echo done")
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "done\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_times_out() {
        let started = Instant::now();
        let err = shell()
            .with_timeout(Some(Duration::from_millis(100)))
            .run("sleep 5")
            .unwrap_err();
        assert!(matches!(err, ValidationError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_bounds_output_held_by_background_child() {
        let started = Instant::now();
        let err = shell()
            .with_timeout(Some(Duration::from_millis(300)))
            .run("sleep 5 & echo started")
            .unwrap_err();
        assert!(matches!(err, ValidationError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
