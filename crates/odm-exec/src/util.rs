use std::{path::Path, process::Stdio};

use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::error::ExecError;

pub fn cmd_program(program: &str, args: &[String]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args.iter().map(|s| s.as_str()));
    cmd
}

/// Captured output of a finished command.
#[derive(Debug, Clone, Default)]
pub struct CmdOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `program` to completion, capturing its output.
///
/// A non-zero exit is an error carrying the captured stderr; both streams are logged.
pub async fn run_cmd(
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
) -> Result<CmdOutput, ExecError> {
    if program.is_empty() {
        return Err(ExecError::MissingProgram);
    }
    info!(target: "odm.exec", program, args = %args.join(" "), "running command");

    let mut cmd = cmd_program(program, args);
    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = cmd.output().await.map_err(|e| ExecError::Spawn {
        program: program.to_string(),
        reason: e.to_string(),
    })?;
    let out = CmdOutput {
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    };

    if !output.status.success() {
        error!(target: "odm.exec", program, stdout = %out.stdout, stderr = %out.stderr, "command failed");
        return match output.status.code() {
            Some(code) => Err(ExecError::NonZeroExit {
                program: program.to_string(),
                code,
                stderr: out.stderr,
            }),
            None => Err(ExecError::KilledBySignal {
                program: program.to_string(),
            }),
        };
    }

    if !out.stdout.is_empty() {
        debug!(target: "odm.exec", program, stdout = %out.stdout, "command output");
    }
    if !out.stderr.is_empty() {
        warn!(target: "odm.exec", program, stderr = %out.stderr, "command wrote to stderr");
    }
    Ok(out)
}
