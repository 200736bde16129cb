//! Common test utilities for integration tests

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

pub const PLAN_TEMPLATE: &str = "---\n\
description: Create an implementation plan\n\
scripts:\n  \
sh: scripts/bash/setup-plan.sh --json\n  \
ps: scripts/powershell/setup-plan.ps1 -Json\n\
agent_scripts:\n  \
sh: scripts/bash/update-agent-context.sh __AGENT__\n\
---\n\
Run {SCRIPT} and then {AGENT_SCRIPT}.\n\
Read memory/constitution.md before planning.\n\
User input: {ARGS}\n";

/// A temporary workspace holding packages, overlays, and output
pub struct TestWorkspace {
    #[allow(dead_code)]
    pub temp: TempDir,
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    pub fn join(&self, path: &str) -> PathBuf {
        self.path.join(path)
    }

    /// Lay out an official release package under `release/`
    pub fn create_official_package(&self) -> PathBuf {
        self.write_file("release/templates/commands/plan.md", PLAN_TEMPLATE);
        self.write_file("release/templates/plan-template.md", "# Plan template\n");
        self.write_file("release/templates/vscode-settings.json", "{\"chat.promptFiles\": true}\n");
        self.write_file("release/memory/constitution.md", "# Constitution\n");
        self.write_file("release/scripts/bash/setup-plan.sh", "#!/usr/bin/env bash\n");
        self.join("release")
    }

    /// Write a ZIP archive at `path` holding `entries`
    pub fn create_zip(&self, path: &str, entries: &[(&str, &str)]) -> PathBuf {
        let zip_path = self.path.join(path);
        if let Some(parent) = zip_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        write_zip(&zip_path, entries);
        zip_path
    }

    /// `specify` binary running in this workspace, isolated from the caller's environment
    pub fn specify(&self) -> Command {
        self.isolated(Command::cargo_bin("specify").expect("specify binary"))
    }

    /// `package-templates` binary running in this workspace
    pub fn package_templates(&self) -> Command {
        self.isolated(Command::cargo_bin("package-templates").expect("package-templates binary"))
    }

    fn isolated(&self, mut cmd: Command) -> Command {
        cmd.current_dir(&self.path)
            .env_remove("SPECIFY_TEMPLATE_REPO")
            .env_remove("SPECIFY_TEMPLATE_OVERLAY_REPO")
            .env_remove("SPECIFY_TEMPLATE_OVERLAY_PATH")
            .env_remove("SPECIFY_BASE_PACKAGE")
            .env_remove("SPECIFY_RELEASES_DIR")
            .env_remove("RUST_LOG");
        cmd
    }
}

fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = File::create(path).expect("Failed to create zip");
    let mut zip = zip::ZipWriter::new(file);
    for (name, content) in entries {
        zip.start_file(*name, zip::write::SimpleFileOptions::default())
            .expect("Failed to start zip entry");
        zip.write_all(content.as_bytes())
            .expect("Failed to write zip entry");
    }
    zip.finish().expect("Failed to finish zip");
}
