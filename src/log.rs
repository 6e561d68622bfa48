// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Validation log entries attached to grid elements, and their per-element
//! summaries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::element::ElementId;

/// Severity of a log entry.
///
/// Severities are numeric levels on the wire: 10 debug, 20 info, 30 warning,
/// 40 error and 50 critical.  Levels in between round down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn level(self) -> i64 {
        match self {
            Severity::Debug => 10,
            Severity::Info => 20,
            Severity::Warning => 30,
            Severity::Error => 40,
            Severity::Critical => 50,
        }
    }
}

impl From<i64> for Severity {
    fn from(level: i64) -> Self {
        match level {
            i64::MIN..=19 => Severity::Debug,
            20..=29 => Severity::Info,
            30..=39 => Severity::Warning,
            40..=49 => Severity::Error,
            _ => Severity::Critical,
        }
    }
}

impl From<Severity> for i64 {
    fn from(severity: Severity) -> Self {
        severity.level()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Debug => write!(f, "debug"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// A log entry, optionally attached to an element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default, alias = "item_id")]
    pub element_id: Option<ElementId>,
    pub level: Severity,
    pub message: String,
}

impl LogEntry {
    pub fn new(element_id: Option<ElementId>, level: Severity, message: impl Into<String>) -> Self {
        Self {
            element_id,
            level,
            message: message.into(),
        }
    }

    pub fn error(element_id: &ElementId, message: impl Into<String>) -> Self {
        Self::new(Some(element_id.clone()), Severity::Error, message)
    }

    pub fn warning(element_id: &ElementId, message: impl Into<String>) -> Self {
        Self::new(Some(element_id.clone()), Severity::Warning, message)
    }
}

/// Summarizes the log of one element into a single entry.
///
/// The summary carries the highest severity in the log, and a message
/// counting the entries of each severity, most severe first, e.g.
/// `"2 errors, 1 warnings"`.  Returns `None` for an empty log.
pub fn summarize(element_id: &ElementId, log: &[LogEntry]) -> Option<LogEntry> {
    let mut by_level: BTreeMap<Severity, usize> = BTreeMap::new();
    for entry in log {
        *by_level.entry(entry.level).or_default() += 1;
    }
    let (&max_level, _) = by_level.last_key_value()?;
    let message = by_level
        .iter()
        .rev()
        .map(|(level, count)| format!("{count} {level}s"))
        .collect::<Vec<_>>()
        .join(", ");
    Some(LogEntry::new(Some(element_id.clone()), max_level, message))
}
