//! External obfuscator collaborator
//!
//! The transformation itself is done by the `javascript-obfuscator` npm
//! package. [`NodeObfuscator`] drives it through a short bridge script fed
//! over stdin, so the CPU-heavy work runs in a child process and never ties up
//! an executor thread.

use crate::errors::ObfuscatorError;
use crate::options::ObfuscationConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Transformed source as returned by the obfuscator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObfuscatedOutput {
    pub code: String,
    pub source_map: Option<String>,
}

impl ObfuscatedOutput {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            source_map: None,
        }
    }
}

/// Given source text and an option bag, either return transformed text or
/// an error describing why the input could not be transformed.
#[async_trait]
pub trait Obfuscator: Send + Sync {
    async fn obfuscate(
        &self,
        source: &str,
        config: &ObfuscationConfig,
    ) -> Result<ObfuscatedOutput, ObfuscatorError>;
}

const BRIDGE_SCRIPT: &str = r#"
const JavaScriptObfuscator = require('javascript-obfuscator');
let input = '';
process.stdin.setEncoding('utf8');
process.stdin.on('data', (chunk) => { input += chunk; });
process.stdin.on('end', () => {
  let reply;
  try {
    const { code, options } = JSON.parse(input);
    const result = JavaScriptObfuscator.obfuscate(code, options);
    reply = { ok: true, obfuscatedCode: result.getObfuscatedCode(), sourceMap: result.getSourceMap() || null };
  } catch (err) {
    reply = { ok: false, message: err && err.message ? err.message : String(err) };
  }
  process.stdout.write(JSON.stringify(reply));
});
"#;

#[derive(Serialize)]
struct BridgeRequest<'a> {
    code: &'a str,
    options: &'a ObfuscationConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BridgeReply {
    ok: bool,
    #[serde(default)]
    obfuscated_code: Option<String>,
    #[serde(default)]
    source_map: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Configuration for the Node.js bridge
#[derive(Debug, Clone)]
pub struct NodeObfuscatorConfig {
    /// Node.js executable
    pub node_binary: PathBuf,
    /// Directory holding `node_modules/javascript-obfuscator`, exported as
    /// `NODE_PATH`. When unset the child resolves modules from its cwd.
    pub node_path: Option<PathBuf>,
}

impl Default for NodeObfuscatorConfig {
    fn default() -> Self {
        Self {
            node_binary: PathBuf::from("node"),
            node_path: None,
        }
    }
}

/// Runs `javascript-obfuscator` in a Node.js child process per call.
#[derive(Debug, Clone, Default)]
pub struct NodeObfuscator {
    config: NodeObfuscatorConfig,
}

impl NodeObfuscator {
    pub fn new(config: NodeObfuscatorConfig) -> Self {
        Self { config }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.config.node_binary);
        command
            .arg("-e")
            .arg(BRIDGE_SCRIPT)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(node_path) = &self.config.node_path {
            command.env("NODE_PATH", node_path);
        }
        command
    }
}

#[async_trait]
impl Obfuscator for NodeObfuscator {
    async fn obfuscate(
        &self,
        source: &str,
        config: &ObfuscationConfig,
    ) -> Result<ObfuscatedOutput, ObfuscatorError> {
        let payload = serde_json::to_vec(&BridgeRequest {
            code: source,
            options: config,
        })?;

        let mut child = self.command().spawn().map_err(ObfuscatorError::Spawn)?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ObfuscatorError::Protocol("child stdin unavailable".to_string()))?;

        // Feed stdin while the child runs so a large payload cannot deadlock
        // against a full stdout pipe.
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&payload).await;
            drop(stdin);
            result
        });

        let output = child.wait_with_output().await?;
        let written = writer.await?;

        if !output.status.success() {
            return Err(ObfuscatorError::Exited {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        debug!(bytes = output.stdout.len(), "obfuscator bridge replied");

        let reply: BridgeReply = serde_json::from_slice(&output.stdout)?;
        if !reply.ok {
            return Err(ObfuscatorError::Rejected(
                reply
                    .message
                    .unwrap_or_else(|| "obfuscation failed".to_string()),
            ));
        }

        let code = reply.obfuscated_code.ok_or_else(|| {
            ObfuscatorError::Protocol("reply is missing obfuscatedCode".to_string())
        })?;

        Ok(ObfuscatedOutput {
            code,
            source_map: reply.source_map.filter(|map| !map.is_empty()),
        })
    }
}
