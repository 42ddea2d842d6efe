//! Process-level effects of manifest evaluation.
//!
//! `cd`, `set-env`, `disp` and `shell` act on a [`ProcessContext`] owned by
//! the environment instead of on the real process, so two manifests can be
//! evaluated side by side without seeing each other's directory or
//! environment changes.

use crate::error::ManifestError;
use crate::output;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Clone)]
pub struct ProcessContext {
    cwd: PathBuf,
    env: BTreeMap<String, String>,
    transcript: Vec<String>,
    echo: bool,
}

impl ProcessContext {
    /// Start in `cwd` with no environment overrides.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            env: BTreeMap::new(),
            transcript: Vec::new(),
            echo: true,
        }
    }

    /// Start in the process's current working directory.
    pub fn from_current_dir() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    /// Record `disp` output without printing it.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Change the working directory. Relative paths resolve against the
    /// current one.
    pub fn change_dir(&mut self, path: &str) -> Result<&Path, ManifestError> {
        let target = self.cwd.join(path);
        let fail = |message: String| ManifestError::Execution {
            command: format!("cd {}", path),
            message,
        };

        let metadata = std::fs::metadata(&target).map_err(|e| fail(e.to_string()))?;
        if !metadata.is_dir() {
            return Err(fail("not a directory".to_string()));
        }

        self.cwd = target.canonicalize().map_err(|e| fail(e.to_string()))?;
        Ok(&self.cwd)
    }

    pub fn set_var(&mut self, name: &str, value: &str) {
        self.env.insert(name.to_string(), value.to_string());
    }

    /// Look up a variable, preferring overrides made with `set-env`.
    pub fn var(&self, name: &str) -> Option<String> {
        self.env
            .get(name)
            .cloned()
            .or_else(|| std::env::var(name).ok())
    }

    /// Expand `$NAME` and `${NAME}` references. Unset variables expand to
    /// the empty string; a `$` not followed by a name is kept as is.
    pub fn expand(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                out.push(c);
                continue;
            }

            if chars.peek() == Some(&'{') {
                chars.next();
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if closed {
                    out.push_str(&self.var(&name).unwrap_or_default());
                } else {
                    out.push_str("${");
                    out.push_str(&name);
                }
                continue;
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            if name.is_empty() {
                out.push('$');
            } else {
                out.push_str(&self.var(&name).unwrap_or_default());
            }
        }

        out
    }

    /// Show a line to the user and keep it in the transcript.
    pub fn display(&mut self, line: String) {
        if self.echo {
            output::info(&line);
        }
        self.transcript.push(line);
    }

    /// Everything shown through `disp`, oldest first.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Run `program` with `args` in the context's directory and
    /// environment, returning captured stdout.
    pub fn run(&self, program: &str, args: &[String]) -> Result<String, ManifestError> {
        let command = std::iter::once(program)
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");

        let result = Command::new(program)
            .args(args)
            .current_dir(&self.cwd)
            .envs(&self.env)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ManifestError::Execution {
                command: command.clone(),
                message: format!("failed to start: {}", e),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ManifestError::Execution {
                command,
                message: format!(
                    "exit code {:?}: {}",
                    result.status.code(),
                    stderr.trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&result.stdout).into_owned())
    }
}
