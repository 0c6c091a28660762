//! Write/edit hook for agent tool calls.
//!
//! Reads a JSON tool invocation from stdin. Writes of gated source files
//! without a proper header are refused with exit code 2; edits only produce
//! advisory warnings. Anything unexpected lets the call through.

#[cfg(not(test))]
use crate::CliResult;
use aigcap_core::{GateVerdict, check_edited, check_write, is_gated_path};
use log::debug;
use serde::Deserialize;
use std::path::Path;

/// Exit code that tells the calling agent to refuse the tool call.
pub const BLOCK_EXIT_CODE: i32 = 2;

/// Tool invocation delivered on stdin.
#[derive(Debug, Default, Deserialize)]
struct HookPayload {
    #[serde(default)]
    tool_name: String,
    #[serde(default)]
    tool_input: ToolInput,
}

#[derive(Debug, Default, Deserialize)]
struct ToolInput {
    file_path: Option<String>,
    path: Option<String>,
    #[serde(default)]
    content: String,
}

impl ToolInput {
    fn target(&self) -> Option<&str> {
        let non_empty = |path: &&str| !path.is_empty();
        self.file_path
            .as_deref()
            .filter(non_empty)
            .or(self.path.as_deref().filter(non_empty))
    }
}

/// What the hook prints and how it exits.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct HookResponse {
    /// Exit status of the process.
    pub exit_code: i32,
    /// Advisory text for stdout.
    pub stdout: Option<String>,
    /// Refusal text for stderr.
    pub stderr: Option<String>,
}

impl HookResponse {
    fn allow() -> Self {
        Self::default()
    }

    fn block(message: String) -> Self {
        Self {
            exit_code: BLOCK_EXIT_CODE,
            stdout: None,
            stderr: Some(message),
        }
    }

    fn warn(message: String) -> Self {
        Self {
            exit_code: 0,
            stdout: Some(message),
            stderr: None,
        }
    }
}

/// Read a payload from stdin, print the response, and return the exit code.
#[cfg(not(test))]
pub async fn run_hook() -> CliResult<i32> {
    use tokio::io::AsyncReadExt;

    let mut raw = String::new();
    if let Err(err) = tokio::io::stdin().read_to_string(&mut raw).await {
        debug!("hook input unreadable: {err}");
        return Ok(0);
    }
    let response = evaluate_hook(&raw).await;
    if let Some(message) = &response.stdout {
        println!("{message}");
    }
    if let Some(message) = &response.stderr {
        eprintln!("{message}");
    }
    Ok(response.exit_code)
}

/// Decide on a raw hook payload.
pub async fn evaluate_hook(raw: &str) -> HookResponse {
    let payload: HookPayload = match serde_json::from_str(raw) {
        Ok(payload) => payload,
        Err(err) => {
            debug!("ignoring malformed hook payload: {err}");
            return HookResponse::allow();
        }
    };
    let Some(target) = payload.tool_input.target() else {
        return HookResponse::allow();
    };
    if !is_gated_path(Path::new(target)) {
        return HookResponse::allow();
    }

    match payload.tool_name.as_str() {
        "Write" => match check_write(&payload.tool_input.content) {
            GateVerdict::Allow => HookResponse::allow(),
            GateVerdict::Block(reason) => HookResponse::block(reason.message(target)),
        },
        "Edit" | "MultiEdit" => {
            let content = match tokio::fs::read(target).await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(err) => {
                    debug!("skipping edit check for {target}: {err}");
                    return HookResponse::allow();
                }
            };
            match check_edited(&content) {
                Some(warning) => HookResponse::warn(warning.message(target)),
                None => HookResponse::allow(),
            }
        }
        _ => HookResponse::allow(),
    }
}
