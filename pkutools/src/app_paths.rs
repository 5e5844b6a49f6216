use std::path::{Path, PathBuf};
use std::str::FromStr;

use pkuport::PortSettings;

pub struct AppPaths {
    config_dir: PathBuf,
}

impl AppPaths {
    pub fn from_dir(dir: PathBuf) -> Self {
        AppPaths { config_dir: dir }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn get_settings_path(&self) -> PathBuf {
        let mut settings_path = self.config_dir.clone();
        settings_path.push("settings.json");
        settings_path
    }

    /// The saved port settings, or the defaults when none have been saved.
    pub fn load_settings(&self) -> anyhow::Result<PortSettings> {
        let settings_path = self.get_settings_path();
        if !settings_path.exists() {
            log::debug!("No settings at {}, using the defaults", settings_path.display());
            return Ok(PortSettings::default());
        }
        Ok(PortSettings::from_file(&settings_path)?)
    }
}

pub fn get_app_paths(config_dir: Option<&Path>) -> anyhow::Result<AppPaths> {
    let config_dir = get_config_dir(config_dir)?;
    let _ = std::fs::create_dir_all(&config_dir);
    Ok(AppPaths::from_dir(config_dir))
}

fn get_config_dir(config_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(config_dir) = config_dir {
        Ok(config_dir.to_path_buf())
    } else if let Ok(Ok(env_config_dir)) =
        std::env::var("PKUPORT_CONFIG_DIR").map(|path_str| PathBuf::from_str(&path_str))
    {
        Ok(env_config_dir)
    } else if let Some(base_dirs) = directories::BaseDirs::new() {
        let mut config_dir = base_dirs.data_local_dir().to_path_buf();
        config_dir.push("pkuport");
        Ok(config_dir)
    } else {
        Err(anyhow::anyhow!("No suitable configuration directory found"))
    }
}
