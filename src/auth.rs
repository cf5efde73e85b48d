use crate::error::{Result, TriageError};

const TOKEN_ENV: &str = "GITHUB_TOKEN";
const TOKEN_COMMAND: &str = "gh auth token";

/// Try to run a CLI command and capture stdout as a token
fn try_cli_token(command: &str) -> Option<String> {
    let output = std::process::Command::new("sh")
        .args(["-c", command])
        .output()
        .ok()?;

    if output.status.success() {
        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !token.is_empty() {
            return Some(token);
        }
    }
    None
}

fn env_token() -> Option<String> {
    std::env::var(TOKEN_ENV)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Find a GitHub token, trying in order:
/// 1. `GITHUB_TOKEN`
/// 2. `gh auth token`
pub fn load_token() -> Result<String> {
    if let Some(token) = env_token() {
        tracing::debug!("using token from {}", TOKEN_ENV);
        return Ok(token);
    }

    if let Some(token) = try_cli_token(TOKEN_COMMAND) {
        tracing::debug!("using token from `{}`", TOKEN_COMMAND);
        return Ok(token);
    }

    Err(TriageError::Auth(format!(
        "no GitHub token found. Set {} or log in with `gh auth login`.",
        TOKEN_ENV
    )))
}
