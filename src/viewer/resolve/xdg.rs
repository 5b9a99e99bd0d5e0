//! Viewer lookup on freedesktop systems (Linux, BSD)

use std::path::PathBuf;
use std::process::Command;

use super::{find_program, first_token, resolution_error, ViewerResolver};
use crate::error::Result;
use crate::viewer::ViewerCommand;

/// Viewers tried in order when no association is registered
const KNOWN_PDF_VIEWERS: &[&str] = &[
    "evince", "okular", "zathura", "atril", "xreader", "qpdfview", "mupdf", "xpdf",
];

/// Looks up the desktop's default application for a MIME type.
///
/// Order:
/// 1. `xdg-mime query default <mime>` and the `Exec=` line of that desktop entry
/// 2. Common standalone viewers on `PATH` (PDF-like types only)
/// 3. `xdg-open`
#[derive(Debug, Clone)]
pub struct XdgViewer {
    data_dirs: Vec<PathBuf>,
}

impl XdgViewer {
    /// Search desktop entries in `$XDG_DATA_HOME` and `$XDG_DATA_DIRS`
    pub fn from_env() -> Self {
        let mut data_dirs = Vec::new();

        match std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
            Some(home) => data_dirs.push(PathBuf::from(home)),
            None => {
                if let Some(home) = dirs::home_dir() {
                    data_dirs.push(home.join(".local/share"));
                }
            }
        }

        let system = std::env::var("XDG_DATA_DIRS")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "/usr/local/share:/usr/share".to_string());
        data_dirs.extend(system.split(':').filter(|d| !d.is_empty()).map(PathBuf::from));

        Self { data_dirs }
    }

    pub fn with_data_dirs(data_dirs: Vec<PathBuf>) -> Self {
        Self { data_dirs }
    }

    /// Program named by the desktop entry `desktop_id` (e.g. `org.gnome.Evince.desktop`)
    pub fn program_for_desktop_id(&self, desktop_id: &str) -> Option<PathBuf> {
        self.data_dirs.iter().find_map(|dir| {
            let entry = dir.join("applications").join(desktop_id);
            let content = std::fs::read_to_string(entry).ok()?;
            let exec = parse_desktop_exec(&content)?;
            find_program(&first_token(&exec)?)
        })
    }

    fn associated_program(&self, mime: &str) -> Option<PathBuf> {
        let output = Command::new("xdg-mime")
            .args(["query", "default", mime])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }

        let desktop_id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if desktop_id.is_empty() {
            return None;
        }
        tracing::debug!(mime, desktop_id = %desktop_id, "xdg-mime association");
        self.program_for_desktop_id(&desktop_id)
    }
}

impl ViewerResolver for XdgViewer {
    fn resolve(&self, extension: &str) -> Result<ViewerCommand> {
        let mime = mime_for_extension(extension);

        if let Some(program) = mime.and_then(|m| self.associated_program(m)) {
            return Ok(ViewerCommand::new(program));
        }

        if is_pdf_like(extension) {
            if let Some(program) = KNOWN_PDF_VIEWERS.iter().find_map(|v| find_program(v)) {
                return Ok(ViewerCommand::new(program));
            }
        }

        if let Ok(program) = which::which("xdg-open") {
            tracing::warn!(
                "falling back to xdg-open; it may hand off to a viewer pdfdog cannot close, \
                 set --viewer or PDFDOG_VIEWER to avoid this"
            );
            return Ok(ViewerCommand::new(program));
        }

        Err(resolution_error(
            extension,
            format!(
                "no desktop association, none of {} on PATH, and xdg-open is missing",
                KNOWN_PDF_VIEWERS.join(", ")
            ),
        ))
    }

    fn name(&self) -> &'static str {
        "xdg"
    }
}

/// MIME type for the document formats a viewer is typically used for
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "ps" | "eps" => "application/postscript",
        "djvu" | "djv" => "image/vnd.djvu",
        "epub" => "application/epub+zip",
        "xps" => "application/oxps",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(mime)
}

fn is_pdf_like(extension: &str) -> bool {
    matches!(
        extension.to_ascii_lowercase().as_str(),
        "pdf" | "ps" | "eps" | "djvu" | "djv" | "xps"
    )
}

/// `Exec=` value from the `[Desktop Entry]` group of a desktop file
pub fn parse_desktop_exec(content: &str) -> Option<String> {
    let mut in_entry = false;
    for line in content.lines().map(str::trim) {
        if line.starts_with('[') {
            in_entry = line == "[Desktop Entry]";
            continue;
        }
        if in_entry {
            if let Some(value) = line.strip_prefix("Exec=") {
                let value = value.trim();
                return (!value.is_empty()).then(|| value.to_string());
            }
        }
    }
    None
}
