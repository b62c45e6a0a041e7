#![allow(dead_code)]

use std::path::Path;

use mergebench::config::{ConfigFile, RawConfigFile, ToolSection};
use mergebench::dataset::Scenario;
use mergebench::errors::Result;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_workspace(mut self, dir: &str) -> Self {
        self.config.harness.workspace = dir.to_string();
        self
    }

    pub fn with_java(mut self, java: &str) -> Self {
        self.config.harness.java = java.to_string();
        self
    }

    pub fn with_stale_after(mut self, dur: &str) -> Self {
        self.config.harness.stale_after = dur.to_string();
        self
    }

    pub fn with_resolve_timeout(mut self, dur: &str) -> Self {
        self.config.timeouts.resolve = dur.to_string();
        self
    }

    pub fn with_tool(mut self, name: &str, section: ToolSection) -> Self {
        self.config.tool.insert(name.to_string(), section);
        self
    }

    pub fn with_tool_timeout(self, name: &str, dur: &str) -> Self {
        self.with_tool(
            name,
            ToolSection {
                timeout: Some(dur.to_string()),
                ..ToolSection::default()
            },
        )
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `Scenario`.
pub struct ScenarioBuilder {
    repo_name: String,
    merge: String,
    left: String,
    right: String,
    base: String,
    file: String,
}

impl ScenarioBuilder {
    pub fn new(repo_name: &str) -> Self {
        Self {
            repo_name: repo_name.to_string(),
            merge: "m000".to_string(),
            left: "l000".to_string(),
            right: "r000".to_string(),
            base: "b000".to_string(),
            file: "src/Main.java".to_string(),
        }
    }

    pub fn file(mut self, path: &str) -> Self {
        self.file = path.to_string();
        self
    }

    pub fn commits(mut self, merge: &str, left: &str, right: &str, base: &str) -> Self {
        self.merge = merge.to_string();
        self.left = left.to_string();
        self.right = right.to_string();
        self.base = base.to_string();
        self
    }

    pub fn build(self) -> Scenario {
        Scenario::new(
            format!("https://example.org/{}.git", self.repo_name),
            self.repo_name,
            self.merge,
            self.left,
            self.right,
            self.base,
            self.file,
        )
    }

    /// Dataset line for this scenario.
    pub fn tsv_line(&self) -> String {
        format!(
            "https://example.org/{0}.git\t{0}\t{1}\t{2}\t{3}\t{4}\t{5}",
            self.repo_name, self.merge, self.left, self.right, self.base, self.file
        )
    }
}

/// Create `<workspace>/<repo>-{base,left,right,child}` with `file` in the
/// first three.
pub fn make_worktrees(workspace: &Path, repo: &str, file: &str) -> std::io::Result<()> {
    for side in ["base", "left", "right", "child"] {
        let dir = workspace.join(format!("{repo}-{side}"));
        std::fs::create_dir_all(&dir)?;
        if side != "child" {
            let path = dir.join(file);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, format!("// {side}\n"))?;
        }
    }
    Ok(())
}
