//! Test helpers for the Claude provider

use once_cell::sync::Lazy;
use std::env;
use std::path::Path;

// Global mutex to serialize environment variable modifications in tests
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// RAII guard restoring environment variables on drop
pub struct EnvVarGuard {
    vars: Vec<(String, Option<String>)>,
}

impl EnvVarGuard {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.push((key.to_string(), env::var(key).ok()));
        unsafe {
            env::set_var(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.vars.push((key.to_string(), env::var(key).ok()));
        unsafe {
            env::remove_var(key);
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.vars.iter().rev() {
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

impl Default for EnvVarGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// An assistant line with `input` input tokens
pub fn assistant_line(timestamp: &str, msg_id: &str, request_id: &str, input: u64) -> String {
    format!(
        r#"{{"timestamp":"{timestamp}","type":"assistant","requestId":"{request_id}","message":{{"id":"{msg_id}","model":"claude-sonnet-4-20250514","usage":{{"input_tokens":{input},"output_tokens":0}}}}}}"#
    )
}

/// Write `lines` as a JSONL file, creating parent directories
pub fn write_jsonl(path: &Path, lines: &[String]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, lines.join("\n")).unwrap();
}
