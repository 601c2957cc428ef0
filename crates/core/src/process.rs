//! Child process execution
//!
//! Plugins hand their configuration to other tools through environment
//! variables, so the runner takes a hook to adjust the [`Command`] before it
//! is spawned.

use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::process::{Command, Stdio};

/// Run a command with inherited stdio and return its exit code
pub fn run_streaming<F>(program: &str, args: &[String], configure: F) -> Result<i32>
where
    F: FnOnce(&mut Command),
{
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    configure(&mut cmd);

    tracing::debug!(program, ?args, "spawning");
    let status = cmd.status().map_err(|e| spawn_error(program, e))?;
    Ok(status.code().unwrap_or(-1))
}

fn spawn_error(program: &str, err: std::io::Error) -> Error {
    if err.kind() == ErrorKind::NotFound {
        Error::command_not_found(program).with_source(err)
    } else {
        Error::process(format!("Failed to execute {}: {}", program, err)).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;

    #[cfg(unix)]
    #[test]
    fn test_run_streaming_applies_hook() {
        let args = vec!["-c".to_string(), "test \"$GREETING\" = hello".to_string()];
        let code = run_streaming("sh", &args, |cmd| {
            cmd.env("GREETING", "hello");
        })
        .unwrap();
        assert_eq!(code, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_streaming_exit_code() {
        let args = vec!["-c".to_string(), "exit 3".to_string()];
        let code = run_streaming("sh", &args, |_| {}).unwrap();
        assert_eq!(code, 3);
    }

    #[test]
    fn test_missing_program() {
        let err = run_streaming("nonexistent_command_12345", &[], |_| {}).unwrap_err();
        assert_eq!(err.code, ErrorCode::CommandNotFound);
    }
}
