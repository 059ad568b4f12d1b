use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = "questline.toml";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LogConfig {
    pub level: Option<String>,
    pub color: Option<bool>, // None = auto-detect (semantic)
}

impl LogConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("info")
    }

    pub fn color(&self) -> Option<bool> {
        self.color
    }

    pub fn to_effective(&self) -> Self {
        Self {
            level: Some(self.level().to_string()),
            color: self.color,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct WorkspaceConfig {
    pub root: Option<String>,
    pub branch: Option<String>, // None = ask git
}

impl WorkspaceConfig {
    pub fn root(&self) -> &str {
        self.root.as_deref().unwrap_or(".")
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn to_effective(&self) -> Self {
        Self {
            root: Some(self.root().to_string()),
            branch: self.branch.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ReportsConfig {
    pub dependency: Option<String>,
    pub mutation: Option<String>,
}

impl ReportsConfig {
    pub fn dependency(&self) -> &str {
        self.dependency
            .as_deref()
            .unwrap_or("target/jdepend-report.html")
    }

    pub fn mutation(&self) -> &str {
        self.mutation.as_deref().unwrap_or("target/moco.json")
    }

    pub fn to_effective(&self) -> Self {
        Self {
            dependency: Some(self.dependency().to_string()),
            mutation: Some(self.mutation().to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GenerateConfig {
    pub seed: Option<u64>, // None = fresh entropy per run
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    pub db: Option<String>,

    pub log: Option<LogConfig>,
    pub workspace: Option<WorkspaceConfig>,
    pub reports: Option<ReportsConfig>,
    pub generate: Option<GenerateConfig>,
}

impl Config {
    pub fn db(&self) -> &str {
        self.db.as_deref().unwrap_or("questline.sqlite")
    }

    pub fn log(&self) -> LogConfig {
        self.log.clone().unwrap_or_default()
    }

    pub fn workspace(&self) -> WorkspaceConfig {
        self.workspace.clone().unwrap_or_default()
    }

    pub fn reports(&self) -> ReportsConfig {
        self.reports.clone().unwrap_or_default()
    }

    pub fn seed(&self) -> Option<u64> {
        self.generate.as_ref().and_then(|g| g.seed)
    }

    pub fn workspace_root(&self) -> PathBuf {
        PathBuf::from(self.workspace().root())
    }

    /// Report paths are configured relative to the workspace root.
    pub fn dependency_report_path(&self) -> PathBuf {
        self.workspace_root().join(self.reports().dependency())
    }

    pub fn mutation_report_path(&self) -> PathBuf {
        self.workspace_root().join(self.reports().mutation())
    }

    pub fn to_effective(&self) -> Self {
        Self {
            db: Some(self.db().to_string()),
            log: Some(self.log().to_effective()),
            workspace: Some(self.workspace().to_effective()),
            reports: Some(self.reports().to_effective()),
            generate: Some(GenerateConfig { seed: self.seed() }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<String>,
    pub log_level: Option<String>,
    pub log_color: Option<String>, // "on" | "off"
    pub workspace: Option<String>,
    pub branch: Option<String>,
    pub seed: Option<u64>,
}

static CONFIG: OnceCell<Config> = OnceCell::new();

pub fn config() -> &'static Config {
    CONFIG.get_or_init(|| {
        let mut cfg = Config::default();
        if let Some(path) = find_nearest_config_file()
            && let Some(file_cfg) = read_config_file(&path)
        {
            apply_file_config(&mut cfg, &file_cfg);
        }
        cfg
    })
}

pub fn init_with_overrides(overrides: &CliOverrides) {
    let mut cfg = Config::default();

    // 1) Config file: walk up from cwd and use the first config file found
    if let Some(path) = find_nearest_config_file()
        && let Some(file_cfg) = read_config_file(&path)
    {
        apply_file_config(&mut cfg, &file_cfg);
    }

    // 2) CLI arguments (highest priority). Only override if user specified.
    apply_cli_overrides(&mut cfg, overrides);

    let _ = CONFIG.set(cfg);
}

fn read_config_file(path: &Path) -> Option<Config> {
    match fs::read_to_string(path) {
        Ok(contents) => toml::from_str::<Config>(&contents).ok(),
        Err(_) => None,
    }
}

fn apply_file_config(cfg: &mut Config, file: &Config) {
    if file.db.is_some() {
        cfg.db = file.db.clone();
    }

    if let Some(file_log) = &file.log {
        let mut log = cfg.log.clone().unwrap_or_default();
        if file_log.level.is_some() {
            log.level = file_log.level.clone();
        }
        if file_log.color.is_some() {
            log.color = file_log.color;
        }
        cfg.log = Some(log);
    }

    if let Some(file_ws) = &file.workspace {
        let mut ws = cfg.workspace.clone().unwrap_or_default();
        if file_ws.root.is_some() {
            ws.root = file_ws.root.clone();
        }
        if file_ws.branch.is_some() {
            ws.branch = file_ws.branch.clone();
        }
        cfg.workspace = Some(ws);
    }

    if let Some(file_reports) = &file.reports {
        let mut reports = cfg.reports.clone().unwrap_or_default();
        if file_reports.dependency.is_some() {
            reports.dependency = file_reports.dependency.clone();
        }
        if file_reports.mutation.is_some() {
            reports.mutation = file_reports.mutation.clone();
        }
        cfg.reports = Some(reports);
    }

    if let Some(file_generate) = &file.generate
        && file_generate.seed.is_some()
    {
        cfg.generate = Some(file_generate.clone());
    }
}

fn apply_cli_overrides(cfg: &mut Config, overrides: &CliOverrides) {
    if overrides.db.is_some() {
        cfg.db = overrides.db.clone();
    }

    let mut log = cfg.log.clone().unwrap_or_default();
    if let Some(level) = &overrides.log_level
        && !level.trim().is_empty()
    {
        log.level = Some(level.trim().to_string());
    }
    if let Some(color_str) = &overrides.log_color {
        match color_str.to_lowercase().as_str() {
            "on" => log.color = Some(true),
            "off" => log.color = Some(false),
            _ => {}
        }
    }
    if overrides.log_level.is_some() || overrides.log_color.is_some() {
        cfg.log = Some(log);
    }

    let mut ws = cfg.workspace.clone().unwrap_or_default();
    if let Some(root) = &overrides.workspace
        && !root.trim().is_empty()
    {
        ws.root = Some(root.clone());
    }
    if let Some(branch) = &overrides.branch
        && !branch.trim().is_empty()
    {
        ws.branch = Some(branch.trim().to_string());
    }
    if overrides.workspace.is_some() || overrides.branch.is_some() {
        cfg.workspace = Some(ws);
    }

    if overrides.seed.is_some() {
        cfg.generate = Some(GenerateConfig {
            seed: overrides.seed,
        });
    }
}

fn find_nearest_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    for dir in cwd.ancestors() {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

pub fn colors_enabled() -> bool {
    match config().log().color() {
        Some(force) => force,
        None => console::colors_enabled(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const FILE: &str = r#"
db = "pool.sqlite"

[log]
level = "debug"

[workspace]
root = "project"
branch = "develop"

[reports]
mutation = "build/moco.json"

[generate]
seed = 7
"#;

    fn from_file() -> Config {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, FILE).unwrap();
        let file = read_config_file(&path).unwrap();
        let mut cfg = Config::default();
        apply_file_config(&mut cfg, &file);
        cfg
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let cfg = Config::default();
        assert_eq!(cfg.db(), "questline.sqlite");
        assert_eq!(cfg.log().level(), "info");
        assert_eq!(cfg.workspace_root(), PathBuf::from("."));
        assert_eq!(
            cfg.dependency_report_path(),
            PathBuf::from("./target/jdepend-report.html")
        );
        assert_eq!(cfg.mutation_report_path(), PathBuf::from("./target/moco.json"));
        assert_eq!(cfg.seed(), None);
    }

    #[test]
    fn file_replaces_defaults_it_names() {
        let cfg = from_file();
        assert_eq!(cfg.db(), "pool.sqlite");
        assert_eq!(cfg.log().level(), "debug");
        assert_eq!(cfg.workspace().branch(), Some("develop"));
        assert_eq!(
            cfg.mutation_report_path(),
            PathBuf::from("project/build/moco.json")
        );
        // Not named in the file.
        assert_eq!(
            cfg.dependency_report_path(),
            PathBuf::from("project/target/jdepend-report.html")
        );
        assert_eq!(cfg.seed(), Some(7));
    }

    #[test]
    fn cli_overrides_win_over_file() {
        let mut cfg = from_file();
        apply_cli_overrides(
            &mut cfg,
            &CliOverrides {
                db: Some("cli.sqlite".to_string()),
                log_level: Some(" warn ".to_string()),
                log_color: Some("OFF".to_string()),
                workspace: None,
                branch: Some("feature/x".to_string()),
                seed: Some(99),
            },
        );
        assert_eq!(cfg.db(), "cli.sqlite");
        assert_eq!(cfg.log().level(), "warn");
        assert_eq!(cfg.log().color(), Some(false));
        assert_eq!(cfg.workspace().root(), "project");
        assert_eq!(cfg.workspace().branch(), Some("feature/x"));
        assert_eq!(cfg.seed(), Some(99));
    }

    #[test]
    fn empty_overrides_change_nothing() {
        let mut cfg = from_file();
        apply_cli_overrides(&mut cfg, &CliOverrides::default());
        assert_eq!(cfg.db(), "pool.sqlite");
        assert_eq!(cfg.workspace().branch(), Some("develop"));
        assert_eq!(cfg.seed(), Some(7));
    }

    #[test]
    fn unreadable_file_is_ignored() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        assert!(read_config_file(&path).is_none());
        fs::write(&path, "db = [not toml").unwrap();
        assert!(read_config_file(&path).is_none());
    }
}
