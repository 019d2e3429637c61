//! Output rendering and formatting

use serde::Serialize;
use std::io;
use std::path::PathBuf;

/// Summary of a finished `isolate`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsolateReport {
    pub component: String,
    pub sandbox: PathBuf,
    pub written_path: Option<PathBuf>,
    pub dependencies: Vec<String>,
    pub packages_installed: bool,
    pub destroyed: bool,
}

/// Result of a CLI command
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationResult {
    Isolated(IsolateReport),
    Destroyed { path: PathBuf },
    Config { toml: String },
}

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match result {
            OperationResult::Isolated(report) => Self::render_isolate_report(report),
            OperationResult::Destroyed { path } => println!("Destroyed {}", path.display()),
            OperationResult::Config { toml } => print!("{toml}"),
        }
        Ok(())
    }

    fn render_isolate_report(report: &IsolateReport) {
        let location = report.written_path.as_ref().unwrap_or(&report.sandbox);
        println!("{} -> {}", report.component, location.display());
        for dependency in &report.dependencies {
            println!("  {dependency}");
        }
        if report.packages_installed {
            println!("Packages installed.");
        }
        if report.destroyed {
            println!("Sandbox {} removed.", report.sandbox.display());
        } else {
            println!("Sandbox: {}", report.sandbox.display());
        }
    }
}
