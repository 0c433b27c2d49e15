//! Shared settings object.
//!
//! One `SettingsStore` is constructed at startup and handed to everything
//! that reads settings. Subscribers get a `watch` receiver; a change
//! notification carries no payload beyond "re-read the config".

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use super::config::Config;
use crate::error::Result;
use crate::timer::Counters;

#[derive(Debug, Clone)]
pub struct SettingsStore {
    tx: Arc<watch::Sender<Config>>,
    /// Backing file; `None` for in-memory stores.
    path: Option<PathBuf>,
}

impl SettingsStore {
    /// Store without a backing file.
    pub fn in_memory(config: Config) -> Self {
        let (tx, _rx) = watch::channel(config);
        Self {
            tx: Arc::new(tx),
            path: None,
        }
    }

    /// Load (or create) the config at the default location.
    pub fn open() -> Result<Self> {
        Self::open_at(&Config::path()?)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let config = Config::load_from(path)?;
        let (tx, _rx) = watch::channel(config);
        Ok(Self {
            tx: Arc::new(tx),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn current(&self) -> Config {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Config> {
        self.tx.subscribe()
    }

    /// Apply `f`, validate, persist, then notify subscribers.
    ///
    /// Nothing changes if `f` fails or the result does not validate.
    pub fn update<T>(&self, f: impl FnOnce(&mut Config) -> Result<T>) -> Result<T> {
        let mut next = self.current();
        let out = f(&mut next)?;
        next.validate()?;
        self.persist(&next)?;
        self.tx.send_replace(next);
        Ok(out)
    }

    /// Persist counters without notifying subscribers.
    pub fn record_counters(&self, counters: Counters) -> Result<()> {
        let mut next = self.current();
        if next.counters == counters {
            return Ok(());
        }
        next.counters = counters;
        self.persist(&next)?;
        self.tx.send_if_modified(|current| {
            current.counters = counters;
            false
        });
        Ok(())
    }

    pub fn reset_to_defaults(&self) -> Result<()> {
        self.update(|config| {
            *config = Config::default();
            Ok(())
        })
    }

    /// Re-read the backing file. Subscribers are only notified when the
    /// content differs from what the store holds. Returns whether it did.
    pub fn reload(&self) -> Result<bool> {
        let Some(path) = &self.path else {
            return Ok(false);
        };
        let loaded = Config::load_from(path)?;
        let changed = self.tx.send_if_modified(|current| {
            if *current == loaded {
                false
            } else {
                *current = loaded;
                true
            }
        });
        if changed {
            debug!(path = %path.display(), "settings reloaded from disk");
        }
        Ok(changed)
    }

    fn persist(&self, config: &Config) -> Result<()> {
        match &self.path {
            Some(path) => config.save_to(path),
            None => Ok(()),
        }
    }
}
