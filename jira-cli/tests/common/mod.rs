/// Common utilities for the Jira CLI integration tests
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Live tests need a Jira instance; they are skipped when none is configured
#[allow(dead_code)]
pub fn jira_configured() -> bool {
    dotenv::from_filename(".env").ok();
    let configured = std::env::var("JIRA_URL").is_ok_and(|url| !url.trim().is_empty());
    if !configured {
        eprintln!("skipping: JIRA_URL is not set");
    }
    configured
}

/// MCP test client speaking JSON-RPC to a spawned `jira-mcp`
#[allow(dead_code)]
pub struct McpTestClient {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

#[allow(dead_code)]
impl McpTestClient {
    /// Spawn the server; credentials are inherited from the environment
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let mut child = Command::new(env!("CARGO_BIN_EXE_jira-mcp"))
            .env("RUST_LOG", "error")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child.stdin.take().ok_or("Failed to open stdin")?;
        let stdout = child.stdout.take().ok_or("Failed to open stdout")?;

        let mut client = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        };
        client.initialize()?;
        Ok(client)
    }

    fn initialize(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 0,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {
                    "name": "rust-test-client",
                    "version": "1.0.0"
                }
            }
        });

        self.send_request(&request)?;
        let response = self.read_response()?;
        if response.get("error").is_some() {
            return Err(format!("Initialization failed: {:?}", response["error"]).into());
        }
        Ok(())
    }

    /// List the tools the server exposes
    pub fn list_tools(&mut self) -> Result<Value, Box<dyn std::error::Error>> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": REQUEST_ID.fetch_add(1, Ordering::SeqCst),
            "method": "tools/list",
            "params": {}
        });
        self.send_request(&request)?;
        self.read_response()
    }

    /// Call an MCP tool
    pub fn call_tool(
        &mut self,
        tool_name: &str,
        arguments: Value,
    ) -> Result<Value, Box<dyn std::error::Error>> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": REQUEST_ID.fetch_add(1, Ordering::SeqCst),
            "method": "tools/call",
            "params": {
                "name": tool_name,
                "arguments": arguments
            }
        });

        self.send_request(&request)?;
        self.read_response()
    }

    fn send_request(&mut self, request: &Value) -> Result<(), Box<dyn std::error::Error>> {
        writeln!(self.stdin, "{}", serde_json::to_string(request)?)?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_response(&mut self) -> Result<Value, Box<dyn std::error::Error>> {
        let mut line = String::new();
        self.stdout.read_line(&mut line)?;
        if line.is_empty() {
            return Err("Server closed connection".into());
        }
        Ok(serde_json::from_str(&line)?)
    }

    /// Text content of a tool response
    pub fn extract_tool_text(response: &Value) -> Result<String, String> {
        if std::env::var("RUST_TEST_DEBUG").is_ok() {
            eprintln!("Full response: {}", response);
        }
        if let Some(error) = response.get("error") {
            return Err(format!("Tool call failed: {:?}", error));
        }

        let content = response
            .pointer("/result/content")
            .and_then(Value::as_array)
            .ok_or("No content array in result")?;
        let text = content
            .iter()
            .find(|item| item.get("type").and_then(Value::as_str) == Some("text"))
            .and_then(|item| item.get("text"))
            .and_then(Value::as_str)
            .ok_or("No text content found")?;
        Ok(text.to_string())
    }

    /// Tool output requested with `"format": "json"`, parsed
    pub fn extract_tool_json(response: &Value) -> Result<Value, String> {
        let text = Self::extract_tool_text(response)?;
        let parsed: Value = serde_json::from_str(&text)
            .map_err(|e| format!("Failed to parse tool JSON: {}. Text was: {}", e, text))?;
        // String results may arrive JSON-encoded a second time
        match parsed {
            Value::String(inner) => serde_json::from_str(&inner)
                .map_err(|e| format!("Failed to parse inner JSON: {}", e)),
            other => Ok(other),
        }
    }
}

impl Drop for McpTestClient {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Project used by live tests
#[allow(dead_code)]
pub fn test_project_key() -> String {
    std::env::var("TEST_PROJECT_KEY").unwrap_or_else(|_| "SCRUM".to_string())
}

/// Issue used by live tests
#[allow(dead_code)]
pub fn test_issue_key() -> String {
    std::env::var("TEST_ISSUE_KEY").unwrap_or_else(|_| format!("{}-1", test_project_key()))
}
