use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use visionbot_core::config::ClientConfig;

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> anyhow::Result<ClientConfig> {
        let bytes = fs::read(&self.path)
            .with_context(|| format!("read config: {}", self.path.display()))?;
        let cfg: ClientConfig = serde_json::from_slice(&bytes).context("decode config JSON")?;
        cfg.validate()
            .with_context(|| format!("invalid config: {}", self.path.display()))?;
        Ok(cfg)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(&self) -> anyhow::Result<ClientConfig> {
        if !self.path.exists() {
            log::debug!("no config at {}; using defaults", self.path.display());
            return Ok(ClientConfig::default());
        }
        self.load()
    }

    pub fn save(&self, cfg: &ClientConfig) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(cfg).context("encode config JSON")?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config directory: {}", parent.display()))?;
        }

        // Write a sibling temp file, then rename over the target.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("write temp: {}", tmp.display()))?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(anyhow::Error::new(e)
                .context(format!("replace file: {}", self.path.display())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visionbot_core::types::RecognitionMode;

    #[test]
    fn round_trips_config() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at_path(dir.path().join("nested").join("visionbot.json"));

        let mut cfg = ClientConfig::default();
        cfg.polling.tries = 15;
        cfg.polling.deadline_ms = Some(60_000);
        cfg.options.mode = RecognitionMode::Text;
        cfg.options.translate = true;

        store.save(&cfg).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, cfg);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at_path(dir.path().join("absent.json"));
        assert!(store.load().is_err());
        assert_eq!(store.load_or_default().unwrap(), ClientConfig::default());
    }

    #[test]
    fn invalid_endpoint_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"endpoints":{"ingest_url":"visionbot"}}"#).unwrap();

        let err = ConfigStore::at_path(path.clone()).load().unwrap_err();
        assert!(format!("{err:#}").contains("ingest_url"));
    }
}
