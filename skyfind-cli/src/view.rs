use serde_json::json;
use skyfind_core::{RenderPayload, SearchView};
use std::{
    io::{IsTerminal, Write},
    sync::atomic::{AtomicBool, Ordering},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Renders search results to stdout and errors to stderr.
#[derive(Debug)]
pub struct TerminalView {
    format: OutputFormat,
    spinner: bool,
    loading: AtomicBool,
}

impl TerminalView {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            // Only draw the loading line when a human is watching stderr.
            spinner: format == OutputFormat::Human && std::io::stderr().is_terminal(),
            loading: AtomicBool::new(false),
        }
    }
}

impl SearchView for TerminalView {
    fn clear(&self) {}

    fn show_loading(&self) {
        if self.spinner {
            let mut err = std::io::stderr();
            let _ = write!(err, "Looking up weather...");
            let _ = err.flush();
            self.loading.store(true, Ordering::SeqCst);
        }
    }

    fn hide_loading(&self) {
        if self.loading.swap(false, Ordering::SeqCst) {
            let mut err = std::io::stderr();
            let _ = write!(err, "\r\x1b[2K");
            let _ = err.flush();
        }
    }

    fn show_error(&self, message: &str) {
        self.hide_loading();
        match self.format {
            OutputFormat::Human => eprintln!("{message}"),
            OutputFormat::Json => println!("{}", json!({ "error": message })),
        }
    }

    fn show_result(&self, payload: &RenderPayload) {
        self.hide_loading();
        match self.format {
            OutputFormat::Human => println!("{}", format_card(payload)),
            OutputFormat::Json => println!("{}", payload_json(payload)),
        }
    }
}

pub fn format_card(payload: &RenderPayload) -> String {
    let labels = payload.labels();
    let mut out = String::new();

    out.push_str(&labels.city);
    out.push('\n');
    out.push_str(&format!("  {}  {}\n", labels.temperature, labels.description));
    out.push_str(&format!("  Humidity  {}\n", labels.humidity));
    out.push_str(&format!("  Wind      {}\n", labels.wind));
    out.push_str(&format!("  Icon      {}", labels.icon));

    if let Some(at) = payload.conditions.observed_at {
        out.push_str(&format!("\n  Observed  {} (local)", at.format("%Y-%m-%d %H:%M")));
    }

    out
}

pub fn payload_json(payload: &RenderPayload) -> String {
    let value = json!({
        "payload": payload,
        "labels": payload.labels(),
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}
