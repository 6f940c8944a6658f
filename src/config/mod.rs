use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::export::PdfOptions;
use crate::store::Category;

pub mod themes;

pub use themes::{ThemeName, ThemePalette};

const APP_DOMAIN: &str = "io";
const APP_ORG: &str = "Notewell";
const APP_NAME: &str = "notewell";

pub struct ConfigLoader {
    paths: ConfigPaths,
}

impl ConfigLoader {
    pub fn discover() -> Result<Self> {
        let paths = ConfigPaths::discover()?;
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        self.paths.ensure_directories()?;
        if !self.paths.config_file.exists() {
            let default_cfg = AppConfig::default();
            self.write_default_config(&default_cfg)?;
            return Ok(default_cfg);
        }
        self.load()
    }

    pub fn load(&self) -> Result<AppConfig> {
        let raw = fs::read_to_string(&self.paths.config_file)
            .with_context(|| format!("reading config {}", self.paths.config_file.display()))?;
        let cfg: AppConfig = toml::from_str(&raw).context("parsing config toml")?;
        Ok(cfg)
    }

    fn write_default_config(&self, cfg: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(cfg).context("serializing default config")?;
        if let Some(parent) = self.paths.config_file.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = fs::File::create(&self.paths.config_file)
            .with_context(|| format!("creating config {}", self.paths.config_file.display()))?;
        file.write_all(toml.as_bytes())
            .context("writing default config")?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub data_dir: PathBuf,
    pub notes_dir: PathBuf,
    pub export_dir: PathBuf,
    pub log_dir: PathBuf,
    pub state_dir: PathBuf,
}

impl ConfigPaths {
    pub fn discover() -> Result<Self> {
        let override_config = env::var("NOTEWELL_CONFIG").ok().map(PathBuf::from);
        let override_data = env::var("NOTEWELL_DATA").ok().map(PathBuf::from);

        let project_dirs = ProjectDirs::from(APP_DOMAIN, APP_ORG, APP_NAME)
            .context("resolving XDG project directories")?;

        let config_dir = override_config
            .clone()
            .map(|p| {
                if p.is_dir() {
                    p
                } else {
                    p.parent().map(Path::to_path_buf).unwrap_or(p)
                }
            })
            .unwrap_or_else(|| project_dirs.config_dir().to_path_buf());

        let config_file = override_config
            .filter(|p| p.is_file() || p.extension().is_some())
            .unwrap_or_else(|| config_dir.join("config.toml"));

        let data_root = override_data.unwrap_or_else(|| project_dirs.data_dir().to_path_buf());
        let notes_dir = data_root.join("notes");
        let export_dir = data_root.join("exports");
        let state_dir = project_dirs
            .state_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| data_root.join("state"));
        let log_dir = state_dir.join("logs");

        Ok(Self {
            config_dir,
            config_file,
            data_dir: data_root,
            notes_dir,
            export_dir,
            log_dir,
            state_dir,
        })
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [
            &self.config_dir,
            &self.data_dir,
            &self.notes_dir,
            &self.export_dir,
            &self.log_dir,
            &self.state_dir,
        ] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating application directory {}", dir.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub theme: ThemeName,
    pub preview_lines: u16,
    pub default_category: Category,
    pub auto_save: AutoSaveConfig,
    pub export: ExportOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: ThemeName::Dark,
            preview_lines: 3,
            default_category: Category::General,
            auto_save: AutoSaveConfig::default(),
            export: ExportOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub pdf_font_pt: f32,
    pub pdf_margin_pt: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            pdf_font_pt: 12.0,
            pdf_margin_pt: 40.0,
        }
    }
}

impl ExportOptions {
    pub fn pdf_options(&self) -> PdfOptions {
        PdfOptions {
            font_pt: self.pdf_font_pt,
            margin_pt: self.pdf_margin_pt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() -> Result<()> {
        let cfg = AppConfig::default();
        let raw = toml::to_string_pretty(&cfg)?;
        let parsed: AppConfig = toml::from_str(&raw)?;
        assert_eq!(parsed.auto_save.interval_secs, 60);
        assert_eq!(parsed.theme, ThemeName::Dark);
        assert_eq!(parsed.default_category, Category::General);
        Ok(())
    }

    #[test]
    fn partial_config_fills_defaults() -> Result<()> {
        let parsed: AppConfig = toml::from_str("theme = \"light\"\n")?;
        assert_eq!(parsed.theme, ThemeName::Light);
        assert!(parsed.auto_save.enabled);
        Ok(())
    }
}
