//! Viewer lookup on Windows through `assoc` and `ftype`

use std::process::Command;

use super::{find_program, first_token, resolution_error, ViewerResolver};
use crate::error::Result;
use crate::viewer::ViewerCommand;

/// Resolves the executable registered for an extension.
///
/// `assoc .pdf` prints `.pdf=AcroExch.Document.11`; `ftype AcroExch.Document.11`
/// prints the open command, whose first token is the executable.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsAssocViewer;

impl WindowsAssocViewer {
    fn run_cmd(builtin: &str, arg: &str) -> std::io::Result<String> {
        let output = Command::new("cmd").args(["/C", builtin, arg]).output()?;
        if !output.status.success() {
            return Err(std::io::Error::other(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl ViewerResolver for WindowsAssocViewer {
    fn resolve(&self, extension: &str) -> Result<ViewerCommand> {
        let assoc = Self::run_cmd("assoc", &format!(".{extension}"))
            .map_err(|e| resolution_error(extension, format!("assoc failed: {e}")))?;
        let file_type = assignment_value(&assoc)
            .ok_or_else(|| resolution_error(extension, "no file type association"))?;

        let ftype = Self::run_cmd("ftype", &file_type)
            .map_err(|e| resolution_error(extension, format!("ftype {file_type} failed: {e}")))?;
        let command_line = assignment_value(&ftype)
            .ok_or_else(|| resolution_error(extension, format!("no open command for {file_type}")))?;

        let executable = first_token(&command_line).ok_or_else(|| {
            resolution_error(extension, format!("empty open command for {file_type}"))
        })?;
        let program = find_program(&executable).ok_or_else(|| {
            resolution_error(extension, format!("registered viewer {executable} not found"))
        })?;

        Ok(ViewerCommand::new(program))
    }

    fn name(&self) -> &'static str {
        "assoc"
    }
}

/// Right-hand side of a `name=value` line as printed by `assoc` / `ftype`
pub fn assignment_value(output: &str) -> Option<String> {
    let (_, value) = output.trim().split_once('=')?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
