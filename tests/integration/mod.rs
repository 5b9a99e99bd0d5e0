//! Integration tests for the pdfdog watch loop
//!
//! These drive the real loop against files in a temp directory, with `sh`
//! standing in for the viewer.

#![cfg(unix)]

pub mod lifecycle;
