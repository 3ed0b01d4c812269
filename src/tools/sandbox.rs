//! Sandboxed tool execution environment.
//!
//! NOTE: For WASM-based sandboxing with full security, use the `wasm` module instead.
//! This module provides a simpler process-based sandbox for scripts.

use std::time::Duration;

use crate::tools::tool::ToolError;

/// Configuration for the sandbox.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Maximum execution time.
    pub max_execution_time: Duration,
    /// Maximum memory in bytes.
    pub max_memory_bytes: u64,
    /// Allowed network hosts (empty = no network).
    pub allowed_hosts: Vec<String>,
    /// Allowed filesystem paths (empty = no filesystem).
    pub allowed_paths: Vec<String>,
    /// Environment variables to pass.
    pub env_vars: Vec<(String, String)>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            max_execution_time: Duration::from_secs(30),
            max_memory_bytes: 128 * 1024 * 1024, // 128 MB
            allowed_hosts: vec![],
            allowed_paths: vec![],
            env_vars: vec![],
        }
    }
}

/// Result of a sandboxed execution.
#[derive(Debug)]
pub struct SandboxResult {
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Exit code.
    pub exit_code: i32,
    /// Execution time.
    pub duration: Duration,
    /// Memory used (if available).
    pub memory_used: Option<u64>,
}

/// Sandbox for executing untrusted code.
pub struct ToolSandbox {
    #[allow(dead_code)] // Will be used when sandbox execution is implemented
    config: SandboxConfig,
}

impl ToolSandbox {
    /// Create a new sandbox with the given configuration.
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }

    /// Execute code in the sandbox.
    ///
    /// Currently supports:
    /// - Python scripts
    /// - JavaScript/Node.js scripts
    /// - Shell scripts (limited)
    ///
    /// TODO: Implement WASM-based sandboxing for better isolation.
    pub async fn execute(
        &self,
        code: &str,
        language: &str,
        input: &str,
    ) -> Result<SandboxResult, ToolError> {
        // TODO: Implement actual sandboxed execution
        // Options:
        // 1. WASM (wasmtime) - Best isolation but limited language support
        // 2. Docker containers - Good isolation but slower startup
        // 3. Process isolation with seccomp/AppArmor - Linux-specific
        // 4. Firecracker microVMs - Best isolation but complex

        match language {
            "python" => self.execute_python(code, input).await,
            "javascript" | "js" => self.execute_javascript(code, input).await,
            _ => Err(ToolError::Sandbox(format!(
                "Unsupported language: {}",
                language
            ))),
        }
    }

    async fn execute_python(&self, _code: &str, _input: &str) -> Result<SandboxResult, ToolError> {
        // TODO: Execute Python in sandbox
        Err(ToolError::Sandbox(
            "Python sandbox execution not yet implemented".to_string(),
        ))
    }

    async fn execute_javascript(
        &self,
        _code: &str,
        _input: &str,
    ) -> Result<SandboxResult, ToolError> {
        // TODO: Execute JavaScript in sandbox (could use Deno or isolated V8)
        Err(ToolError::Sandbox(
            "JavaScript sandbox execution not yet implemented".to_string(),
        ))
    }

    /// Check if the sandbox is available.
    pub fn is_available() -> bool {
        // TODO: Check for required runtime components
        false
    }
}

impl Default for ToolSandbox {
    fn default() -> Self {
        Self::new(SandboxConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_config_default() {
        let config = SandboxConfig::default();
        assert_eq!(config.max_execution_time, Duration::from_secs(30));
        assert!(config.allowed_hosts.is_empty());
    }
}
