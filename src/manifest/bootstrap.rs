//! Builtin vocabulary installed into every bootstrapped environment.
//!
//! ## Descriptor setters
//!
//! - `(name x)`, `(version x)`, `(description x)`, `(license x)`,
//!   `(homepage x)`, `(url x)`, `(checksum x)` - store `x` in `pkg-<field>`
//! - `(sha1 x)` - same as `checksum`
//! - `(depends-on a b ...)` - replace the dependency list
//! - `(install (fn () ...))` - set the install action
//!
//! ## Utilities
//!
//! - `(disp a ...)`, `(list a ...)`, `(str a ...)`
//! - `(cd dir)`, `(set-env name value)`, `(shell program args...)`
//! - `(get-platform)`
//! - `(== a b)`, `(!= a b)`, `(not x)`, `(error msg ...)`

use super::Env;
use super::descriptor::{DEPENDENCIES_FIELD, INSTALL_FIELD, STRING_FIELDS, storage_name};
use super::value::{Callable, Value};
use crate::error::ManifestError;

/// Install builtins and initial `pkg-` bindings into `env`.
pub fn install(env: &mut Env) {
    install_fields(env);
    install_utilities(env);
}

fn install_fields(env: &mut Env) {
    for field in STRING_FIELDS {
        env.create(&storage_name(field), "");
        env.define_builtin(field, setter(field));
    }
    env.define_builtin("sha1", setter("checksum"));

    let dependencies = storage_name(DEPENDENCIES_FIELD);
    env.create(&dependencies, Value::List(Vec::new()));
    env.define_builtin("depends-on", move |env, args| {
        at_least("depends-on", &args, 1)?;
        let mut deps = Vec::new();
        for arg in args {
            match arg {
                Value::List(items) => deps.extend(items),
                other => deps.push(other),
            }
        }
        for dep in &deps {
            dep.expect_str("depends-on")?;
        }
        env.create(&dependencies, Value::List(deps));
        Ok(Value::Nil)
    });

    let install = storage_name(INSTALL_FIELD);
    env.create(&install, Callable::noop(INSTALL_FIELD));
    env.define_builtin(INSTALL_FIELD, move |env, args| {
        exactly(INSTALL_FIELD, &args, 1)?;
        let action = args.into_iter().next().unwrap_or(Value::Nil);
        if action.as_callable().is_none() {
            return Err(action.mismatch(INSTALL_FIELD, "callable"));
        }
        env.create(&install, action);
        Ok(Value::Nil)
    });
}

fn setter(
    field: &'static str,
) -> impl Fn(&mut Env, Vec<Value>) -> Result<Value, ManifestError> + 'static {
    let storage = storage_name(field);
    move |env, args| {
        exactly(field, &args, 1)?;
        let value = args.into_iter().next().unwrap_or(Value::Nil);
        env.create(&storage, value);
        Ok(Value::Nil)
    }
}

fn install_utilities(env: &mut Env) {
    env.define_builtin("list", |_, args| {
        at_least("list", &args, 1)?;
        Ok(Value::List(args))
    });

    env.define_builtin("disp", |env, args| {
        at_least("disp", &args, 1)?;
        let line = args
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        env.process_mut().display(line);
        Ok(Value::Nil)
    });

    env.define_builtin("str", |env, args| {
        at_least("str", &args, 1)?;
        // A single list argument is joined element-wise.
        let parts = match args.as_slice() {
            [Value::List(items)] => items.clone(),
            _ => args,
        };
        let mut joined = String::new();
        for part in &parts {
            let text = part.expect_text("str")?;
            joined.push_str(&env.process().expand(&text));
        }
        Ok(Value::String(joined))
    });

    env.define_builtin("cd", |env, args| {
        exactly("cd", &args, 1)?;
        let dir = args[0].expect_str("cd")?;
        env.process_mut().change_dir(dir)?;
        Ok(Value::Nil)
    });

    env.define_builtin("get-platform", |_, args| {
        exactly("get-platform", &args, 0)?;
        Ok(Value::from(std::env::consts::OS))
    });

    env.define_builtin("shell", |env, args| {
        at_least("shell", &args, 1)?;
        let mut words = args
            .iter()
            .map(|arg| arg.expect_text("shell"))
            .collect::<Result<Vec<_>, _>>()?;
        let program = words.remove(0);
        let stdout = env.process().run(&program, &words)?;
        Ok(Value::String(stdout))
    });

    env.define_builtin("set-env", |env, args| {
        exactly("set-env", &args, 2)?;
        let name = args[0].expect_str("set-env")?;
        let value = args[1].expect_text("set-env")?;
        env.process_mut().set_var(name, &value);
        Ok(Value::Nil)
    });

    env.define_builtin("==", |_, args| {
        exactly("==", &args, 2)?;
        Ok(Value::Bool(args[0] == args[1]))
    });

    env.define_builtin("!=", |_, args| {
        exactly("!=", &args, 2)?;
        Ok(Value::Bool(args[0] != args[1]))
    });

    env.define_builtin("not", |_, args| {
        exactly("not", &args, 1)?;
        Ok(Value::Bool(!args[0].is_truthy()))
    });

    env.define_builtin("error", |_, args| {
        at_least("error", &args, 1)?;
        let message = args
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        Err(ManifestError::User(message))
    });
}

fn at_least(form: &str, args: &[Value], min: usize) -> Result<(), ManifestError> {
    if args.len() < min {
        return Err(ManifestError::MissingArgument {
            form: form.to_string(),
            min,
        });
    }
    Ok(())
}

/// Zero arguments where some are required is reported as a missing
/// argument; any other count as an arity mismatch.
fn exactly(form: &str, args: &[Value], expected: usize) -> Result<(), ManifestError> {
    if args.is_empty() && expected > 0 {
        at_least(form, args, expected)?;
    }
    if args.len() != expected {
        return Err(ManifestError::ArityMismatch {
            form: form.to_string(),
            expected,
            actual: args.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ProcessContext;

    fn env() -> Env {
        Env::bootstrapped(ProcessContext::new(".").quiet())
    }

    #[test]
    fn test_setters_store_under_pkg_prefix() {
        let mut env = env();
        env.evaluate(
            r#"
            (name "zlib")
            (version "1.3.1")
            (description "compression library")
            (license "Zlib")
            (homepage "https://zlib.net")
            (url "https://zlib.net/zlib-1.3.1.tar.gz")
            (checksum "ABCDEF")
            "#,
        )
        .unwrap();

        assert_eq!(env.get_string("pkg-name").unwrap(), "zlib");
        assert_eq!(env.get_string("pkg-version").unwrap(), "1.3.1");
        assert_eq!(env.get_string("pkg-description").unwrap(), "compression library");
        assert_eq!(env.get_string("pkg-license").unwrap(), "Zlib");
        assert_eq!(env.get_string("pkg-homepage").unwrap(), "https://zlib.net");
        assert_eq!(
            env.get_string("pkg-url").unwrap(),
            "https://zlib.net/zlib-1.3.1.tar.gz"
        );
        assert_eq!(env.get_string("pkg-checksum").unwrap(), "ABCDEF");
        // The setter itself is still a callable, distinct from the field.
        assert!(env.get("name").unwrap().as_callable().is_some());
    }

    #[test]
    fn test_last_write_wins() {
        let mut env = env();
        env.evaluate(r#"(name "a") (name "b")"#).unwrap();
        assert_eq!(env.get_string("pkg-name").unwrap(), "b");
    }

    #[test]
    fn test_sha1_alias() {
        let mut env = env();
        env.evaluate(r#"(sha1 "deadbeef")"#).unwrap();
        assert_eq!(env.descriptor().unwrap().checksum, "deadbeef");
    }

    #[test]
    fn test_setter_without_argument() {
        for form in ["name", "url", "checksum", "homepage", "depends-on", "install"] {
            let err = env().evaluate(&format!("({})", form)).unwrap_err();
            assert!(
                matches!(err, ManifestError::MissingArgument { ref form, min: 1 } if !form.is_empty()),
                "{}: {:?}",
                form,
                err
            );
        }
    }

    #[test]
    fn test_setter_with_extra_arguments() {
        let err = env().evaluate(r#"(name "a" "b")"#).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::ArityMismatch { expected: 1, actual: 2, .. }
        ));
    }

    #[test]
    fn test_depends_on_order_and_replacement() {
        let mut env = env();
        env.evaluate(r#"(depends-on "a" "b" "c")"#).unwrap();
        assert_eq!(env.get_list("pkg-dependencies").unwrap(), vec!["a", "b", "c"]);

        env.evaluate(r#"(depends-on "d")"#).unwrap();
        assert_eq!(env.get_list("pkg-dependencies").unwrap(), vec!["d"]);
    }

    #[test]
    fn test_depends_on_accepts_a_list() {
        let mut env = env();
        env.evaluate(r#"(depends-on (list "x" "y") "z")"#).unwrap();
        assert_eq!(env.descriptor().unwrap().dependencies, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_depends_on_rejects_non_strings() {
        let err = env().evaluate(r#"(depends-on "a" 2)"#).unwrap_err();
        assert!(matches!(err, ManifestError::TypeMismatch { actual: "number", .. }));
    }

    #[test]
    fn test_install_action_is_invocable() {
        let mut env = env();
        env.evaluate(r#"(install (fn () (disp "installing") "done"))"#)
            .unwrap();
        let result = env.invoke("pkg-install", vec![]).unwrap();
        assert_eq!(result, Value::from("done"));
        assert_eq!(env.process().transcript(), ["installing"]);
    }

    #[test]
    fn test_install_requires_callable() {
        let err = env().evaluate(r#"(install "make install")"#).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::TypeMismatch { expected: "callable", actual: "string", .. }
        ));
    }

    #[test]
    fn test_default_install_is_noop() {
        let mut env = env();
        assert_eq!(env.invoke("pkg-install", vec![]).unwrap(), Value::Nil);
    }

    #[test]
    fn test_list() {
        let mut env = env();
        assert_eq!(
            env.evaluate(r#"(list "a" "b")"#).unwrap(),
            Value::List(vec!["a".into(), "b".into()])
        );
        assert!(matches!(
            env.evaluate("(list)"),
            Err(ManifestError::MissingArgument { min: 1, .. })
        ));
    }

    #[test]
    fn test_str_concatenates_and_expands() {
        let mut env = env();
        env.evaluate(r#"(set-env "GIG_BOOT_PREFIX" "/opt")"#).unwrap();
        assert_eq!(
            env.evaluate(r#"(str "$GIG_BOOT_PREFIX" "/zlib-" 1.3)"#).unwrap(),
            Value::from("/opt/zlib-1.3")
        );
        assert_eq!(
            env.evaluate(r#"(str (list "a" "b" "c"))"#).unwrap(),
            Value::from("abc")
        );
        assert!(matches!(
            env.evaluate("(str)"),
            Err(ManifestError::MissingArgument { .. })
        ));
        assert!(matches!(
            env.evaluate("(str true)"),
            Err(ManifestError::TypeMismatch { actual: "bool", .. })
        ));
    }

    #[test]
    fn test_disp() {
        let mut env = env();
        env.evaluate(r#"(disp "fetching" 3 "files")"#).unwrap();
        assert_eq!(env.process().transcript(), ["fetching 3 files"]);
        assert!(matches!(
            env.evaluate("(disp)"),
            Err(ManifestError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_get_platform() {
        let mut env = env();
        assert_eq!(
            env.evaluate("(get-platform)").unwrap(),
            Value::from(std::env::consts::OS)
        );
        assert!(env.evaluate(r#"(get-platform "x")"#).is_err());
    }

    #[test]
    fn test_cd_is_scoped_to_env() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("build")).unwrap();
        let before = std::env::current_dir().unwrap();

        let mut env = Env::bootstrapped(ProcessContext::new(dir.path()).quiet());
        env.evaluate(r#"(cd "build")"#).unwrap();

        assert_eq!(
            env.process().cwd(),
            dir.path().join("build").canonicalize().unwrap().as_path()
        );
        assert_eq!(std::env::current_dir().unwrap(), before);
        assert!(env.evaluate(r#"(cd "missing")"#).is_err());
    }

    #[test]
    fn test_set_env_is_scoped_to_env() {
        let mut first = env();
        let second = env();
        first
            .evaluate(r#"(set-env "GIG_BOOT_ISOLATED" "yes")"#)
            .unwrap();
        assert_eq!(first.process().var("GIG_BOOT_ISOLATED").as_deref(), Some("yes"));
        assert_eq!(second.process().var("GIG_BOOT_ISOLATED"), None);
        assert!(std::env::var("GIG_BOOT_ISOLATED").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_captures_stdout() {
        let mut env = env();
        assert_eq!(
            env.evaluate(r#"(shell "echo" "hello" "world")"#).unwrap(),
            Value::from("hello world\n")
        );
        let err = env.evaluate(r#"(shell "false")"#).unwrap_err();
        assert!(matches!(err, ManifestError::Execution { .. }));
        assert!(matches!(
            env.evaluate("(shell)"),
            Err(ManifestError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_equality_and_not() {
        let mut env = env();
        assert_eq!(env.evaluate(r#"(== "a" "a")"#).unwrap(), Value::Bool(true));
        assert_eq!(env.evaluate(r#"(!= 1 2)"#).unwrap(), Value::Bool(true));
        assert_eq!(env.evaluate("(not nil)").unwrap(), Value::Bool(true));
        assert_eq!(
            env.evaluate(r#"(if (== (get-platform) "plan9") "odd" "usual")"#)
                .unwrap(),
            Value::from("usual")
        );
    }

    #[test]
    fn test_error_form() {
        let err = env().evaluate(r#"(error "unsupported platform" 42)"#).unwrap_err();
        assert!(matches!(err, ManifestError::User(ref msg) if msg == "unsupported platform 42"));
    }
}
