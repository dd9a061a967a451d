use crate::errors::ToolError;
use std::sync::Arc;
use std::time::Duration;

/// Source of OAuth bearer tokens used when a call carries no explicit token.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, ToolError>;
}

/// Always hands out the same token.
#[derive(Clone, Debug)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, ToolError> {
        Ok(self.token.clone())
    }
}

/// Reads the token from an environment variable at call time.
#[derive(Clone, Debug)]
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait::async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn access_token(&self) -> Result<String, ToolError> {
        std::env::var(&self.var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ToolError::transport(format!("{} is not set", self.var))
                    .with_hint(format!("Export an OAuth access token as {}.", self.var))
            })
    }
}

/// Runs a command (for example `gcloud auth print-access-token`) and uses
/// its trimmed stdout as the token.
#[derive(Clone, Debug)]
pub struct CommandTokenProvider {
    program: String,
    args: Vec<String>,
    timeout_ms: Option<u64>,
}

impl CommandTokenProvider {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout_ms: None,
        }
    }

    /// Splits a command line on whitespace. Returns `None` for a blank line.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(|s| s.to_string());
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

#[async_trait::async_trait]
impl TokenProvider for CommandTokenProvider {
    async fn access_token(&self) -> Result<String, ToolError> {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args).kill_on_drop(true);
        let output = match self.timeout_ms {
            Some(timeout_ms) => {
                tokio::time::timeout(Duration::from_millis(timeout_ms), cmd.output())
                    .await
                    .map_err(|_| ToolError::timeout("Token command timed out"))?
            }
            None => cmd.output().await,
        }
        .map_err(|err| {
            ToolError::transport(format!("Token command '{}' failed: {}", self.program, err))
        })?;
        if !output.status.success() {
            return Err(ToolError::transport(format!(
                "Token command '{}' exited with {}",
                self.program, output.status
            )));
        }
        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(ToolError::transport(format!(
                "Token command '{}' did not print a token",
                self.program
            )));
        }
        Ok(token)
    }
}

/// Tries each provider in order and returns the first token obtained.
#[derive(Clone, Default)]
pub struct ChainTokenProvider {
    providers: Vec<Arc<dyn TokenProvider>>,
}

impl ChainTokenProvider {
    pub fn new(providers: Vec<Arc<dyn TokenProvider>>) -> Self {
        Self { providers }
    }
}

#[async_trait::async_trait]
impl TokenProvider for ChainTokenProvider {
    async fn access_token(&self) -> Result<String, ToolError> {
        let mut errors: Vec<ToolError> = Vec::new();
        for provider in &self.providers {
            match provider.access_token().await {
                Ok(token) => return Ok(token),
                Err(err) => errors.push(err),
            }
        }
        Err(combine_errors(errors))
    }
}

/// First failure's kind, every failure's message, first available hint.
fn combine_errors(errors: Vec<ToolError>) -> ToolError {
    let Some(first) = errors.first() else {
        return ToolError::transport("No token provider configured");
    };
    let message = errors
        .iter()
        .map(|err| err.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    let mut combined = ToolError::new(first.kind, first.code.clone(), message);
    if let Some(hint) = errors.iter().find_map(|err| err.hint.clone()) {
        combined = combined.with_hint(hint);
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chain_falls_through_to_next_provider() {
        let chain = ChainTokenProvider::new(vec![
            Arc::new(EnvTokenProvider::new("GAPI_TEST_TOKEN_THAT_IS_NEVER_SET")),
            Arc::new(StaticTokenProvider::new("fallback")),
        ]);
        assert_eq!(chain.access_token().await.unwrap(), "fallback");
    }

    #[tokio::test]
    async fn empty_chain_fails() {
        let err = ChainTokenProvider::default()
            .access_token()
            .await
            .unwrap_err();
        assert_eq!(err.code, "TRANSPORT");
    }

    #[test]
    fn from_command_line_splits_args() {
        let provider =
            CommandTokenProvider::from_command_line("gcloud auth print-access-token").unwrap();
        assert_eq!(provider.program, "gcloud");
        assert_eq!(provider.args, vec!["auth", "print-access-token"]);
        assert!(CommandTokenProvider::from_command_line("   ").is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_provider_trims_stdout() {
        let provider = CommandTokenProvider::new("echo", vec!["  tok-123  ".to_string()])
            .with_timeout_ms(5_000);
        assert_eq!(provider.access_token().await.unwrap(), "tok-123");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_provider_times_out() {
        let err = CommandTokenProvider::new("sleep", vec!["5".to_string()])
            .with_timeout_ms(50)
            .access_token()
            .await
            .unwrap_err();
        assert_eq!(err.code, "TIMEOUT");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn chain_keeps_env_hint_when_command_fails() {
        let chain = ChainTokenProvider::new(vec![
            Arc::new(EnvTokenProvider::new("GAPI_TEST_TOKEN_THAT_IS_NEVER_SET")),
            Arc::new(CommandTokenProvider::new("false", Vec::new())),
        ]);
        let err = chain.access_token().await.unwrap_err();
        assert_eq!(err.code, "TRANSPORT");
        assert!(err.message.contains("GAPI_TEST_TOKEN_THAT_IS_NEVER_SET is not set"));
        assert!(err.message.contains("Token command 'false' exited with"));
        assert_eq!(
            err.hint.as_deref(),
            Some("Export an OAuth access token as GAPI_TEST_TOKEN_THAT_IS_NEVER_SET.")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_provider_rejects_failed_exit() {
        let err = CommandTokenProvider::new("false", Vec::new())
            .access_token()
            .await
            .unwrap_err();
        assert_eq!(err.code, "TRANSPORT");
    }
}
