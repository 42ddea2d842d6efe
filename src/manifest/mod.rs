//! Tunefile evaluation environment
//!
//! An [`Env`] holds the root scope a tunefile is evaluated against and the
//! [`ProcessContext`] its side-effecting forms act on.
//!
//! # Example
//!
//! ```
//! use gig::manifest::{Env, ProcessContext};
//!
//! let mut env = Env::bootstrapped(ProcessContext::new(".").quiet());
//! env.evaluate(r#"
//!     (name "zlib")
//!     (url "https://zlib.net/zlib-1.3.1.tar.gz")
//!     (depends-on "make")
//! "#).unwrap();
//!
//! let descriptor = env.descriptor().unwrap();
//! assert_eq!(descriptor.name, "zlib");
//! assert_eq!(descriptor.dependencies, vec!["make"]);
//! ```

pub mod bootstrap;
pub mod descriptor;
mod eval;
mod process;
mod scope;
mod value;

pub use descriptor::Descriptor;
pub use process::ProcessContext;
pub use scope::Scope;
pub use value::{Builtin, BuiltinFn, Callable, Lambda, Value};

use crate::error::ManifestError;
use crate::parser;
use std::path::Path;

/// Evaluation environment for one tunefile.
pub struct Env {
    scope: Scope,
    process: ProcessContext,
    depth: usize,
}

impl Env {
    /// An environment with no bindings at all.
    pub fn new(process: ProcessContext) -> Self {
        Self {
            scope: Scope::new(),
            process,
            depth: 0,
        }
    }

    /// An environment with the builtin vocabulary installed.
    pub fn bootstrapped(process: ProcessContext) -> Self {
        let mut env = Self::new(process);
        bootstrap::install(&mut env);
        env
    }

    /// A bootstrapped environment that has also evaluated `files`, in
    /// order, before any manifest.
    pub fn with_bootstrap_files<P: AsRef<Path>>(
        process: ProcessContext,
        files: &[P],
    ) -> Result<Self, ManifestError> {
        let mut env = Self::bootstrapped(process);
        for file in files {
            env.evaluate_file(file.as_ref())?;
        }
        Ok(env)
    }

    /// Bind `name` in the root scope. Existing bindings are replaced.
    pub fn create(&mut self, name: &str, value: impl Into<Value>) {
        self.scope.create(name, value.into());
    }

    /// Register a native form under `name`.
    pub fn define_builtin<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&mut Env, Vec<Value>) -> Result<Value, ManifestError> + 'static,
    {
        self.create(name, Callable::builtin(name, func));
    }

    /// Parse and evaluate `source`, returning the value of its last form.
    pub fn evaluate(&mut self, source: &str) -> Result<Value, ManifestError> {
        let forms = parser::parse(source)?;
        let scope = self.scope.clone();
        eval::eval_body(self, &forms, &scope)
    }

    /// Read and evaluate a `.tune` file.
    pub fn evaluate_file(&mut self, path: &Path) -> Result<Value, ManifestError> {
        let source = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.evaluate(&source)
    }

    pub fn get(&self, name: &str) -> Result<Value, ManifestError> {
        self.scope
            .get(name)
            .ok_or_else(|| ManifestError::UnboundSymbol(name.to_string()))
    }

    pub fn get_string(&self, name: &str) -> Result<String, ManifestError> {
        let value = self.get(name)?;
        value.expect_str(name).map(str::to_string)
    }

    /// Read a list of strings. A bare string is treated as a one-element
    /// list.
    pub fn get_list(&self, name: &str) -> Result<Vec<String>, ManifestError> {
        match self.get(name)? {
            Value::String(s) => Ok(vec![s]),
            Value::List(items) => items
                .iter()
                .map(|item| item.expect_str(name).map(str::to_string))
                .collect(),
            other => Err(other.mismatch(name, "list")),
        }
    }

    /// Call the callable bound to `name`.
    pub fn invoke(&mut self, name: &str, args: Vec<Value>) -> Result<Value, ManifestError> {
        match self.get(name)? {
            Value::Callable(callable) => self.call(&callable, args),
            _ => Err(ManifestError::NotCallable(name.to_string())),
        }
    }

    pub fn call(&mut self, callable: &Callable, args: Vec<Value>) -> Result<Value, ManifestError> {
        eval::apply(self, callable, args)
    }

    /// Collect the package metadata set so far.
    pub fn descriptor(&self) -> Result<Descriptor, ManifestError> {
        Descriptor::from_env(self)
    }

    pub fn process(&self) -> &ProcessContext {
        &self.process
    }

    pub fn process_mut(&mut self) -> &mut ProcessContext {
        &mut self.process
    }
}

/// Lambdas hold the scope they were defined in, so a `func` bound at the
/// root keeps the root alive. Callables taken out of an `Env` are only
/// usable while it lives.
impl Drop for Env {
    fn drop(&mut self) {
        self.scope.clear_reachable();
    }
}
