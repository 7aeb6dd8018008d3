//! Output helpers shared by every command
//!
//! JSON mode wraps payloads in a [`RobotResponse`] envelope on stdout;
//! human mode prints colored text built with [`HumanLayout`].

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use crate::error::{DirError, Result};

#[derive(Serialize)]
pub struct RobotResponse<T> {
    pub status: RobotStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: T,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Ok,
    Error { code: String, message: String },
}

pub fn robot_ok<T: Serialize>(data: T) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Ok,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
    }
}

/// Error envelope. Only the generic public message is exposed.
pub fn robot_error(err: &DirError) -> RobotResponse<serde_json::Value> {
    RobotResponse {
        status: RobotStatus::Error {
            code: error_code(err).to_string(),
            message: err.public_message().to_string(),
        },
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data: serde_json::Value::Null,
    }
}

pub const fn error_code(err: &DirError) -> &'static str {
    match err {
        DirError::InvalidArgument(_) => "invalid_argument",
        DirError::NotFound(_) => "not_found",
        DirError::Conflict(_) => "conflict",
        DirError::Config(_) | DirError::MissingConfig(_) => "config",
        _ => "internal",
    }
}

pub fn emit_robot<T: Serialize>(response: &RobotResponse<T>) -> Result<()> {
    emit_json(response)
}

pub fn emit_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| DirError::Serialization(format!("serialize output: {err}")))?;
    println!("{payload}");
    Ok(())
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanLayout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 18,
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.lines.push(text.bold().to_string());
        self.lines.push(String::new());
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        self.lines.push(format!(
            "{:width$} {value}",
            key.dimmed(),
            width = self.key_width
        ));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("- {text}"));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}
