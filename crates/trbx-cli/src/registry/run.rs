use std::fs::{create_dir_all, OpenOptions};
use std::path::PathBuf;
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{write_json_atomic, RegistryResult};

/// Effective options of a run, recorded in `config.json`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum RunOptions {
    Generate {
        input: PathBuf,
        target_column: Option<String>,
        n_samples: usize,
        discrete_columns: Option<Vec<String>>,
        seed: u64,
        smoothing: f64,
        evaluate_quality: bool,
    },
    Evaluate {
        real: PathBuf,
        synthetic: PathBuf,
        discrete_columns: Option<Vec<String>>,
        divergence_threshold: f64,
    },
    Explain {
        data: PathBuf,
        attributions: PathBuf,
        class_name: String,
        top_n: usize,
    },
}

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub run_dir: PathBuf,
    pub options: RunOptions,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub run_id: String,
    pub started_at: String,
    pub cli_version: String,
    pub options: RunOptions,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub logs_path: PathBuf,
}

impl RunPaths {
    pub fn artifact(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

/// Create `<run_dir>/<timestamp>__run_<id>` with `config.json` and an empty log.
pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx
        .run_dir
        .join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&root)?;

    let config_path = root.join("config.json");
    let logs_path = root.join("logs.ndjson");

    let config = RunConfig {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        cli_version: env!("CARGO_PKG_VERSION").to_string(),
        options: ctx.options.clone(),
        git: collect_git_info(),
    };

    write_json_atomic(&config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)?;

    Ok(RunPaths {
        root,
        config_path,
        logs_path,
    })
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_run_writes_config_and_log() {
        let run_dir = std::env::temp_dir().join(format!("trbx_runs_{}", uuid::Uuid::new_v4()));
        let ctx = RunContext {
            run_id: "abc".to_string(),
            started_at: Utc::now(),
            run_dir: run_dir.clone(),
            options: RunOptions::Explain {
                data: PathBuf::from("x.csv"),
                attributions: PathBuf::from("shap.json"),
                class_name: "a fall".to_string(),
                top_n: 5,
            },
        };

        let paths = start_run(&ctx).expect("start run");
        let name = paths
            .root
            .file_name()
            .expect("run dir name")
            .to_string_lossy()
            .to_string();
        assert!(name.ends_with("__run_abc"), "unexpected run dir {name}");
        assert!(paths.logs_path.exists());

        let config: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&paths.config_path).expect("read config"))
                .expect("parse config");
        assert_eq!(config["run_id"], "abc");
        assert_eq!(config["options"]["command"], "explain");
        assert_eq!(config["options"]["top_n"], 5);

        let _ = std::fs::remove_dir_all(&run_dir);
    }
}
