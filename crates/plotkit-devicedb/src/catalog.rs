//! Device and media catalog.
//!
//! The host's printer enumeration service is reached through [`DeviceCatalog`].
//! [`StaticCatalog`] is a plain in-memory catalog that can be loaded from and
//! saved to JSON, used for PDF-only setups, tests and the headless host.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{CatalogError, CatalogResult};
use crate::model::{DeviceProfile, MediaCandidate};

/// Source of device names and per-device capability lists.
pub trait DeviceCatalog {
    /// The system's default device, if any.
    fn default_device(&self) -> Option<String>;

    /// Canonical media names the device supports, in catalog order.
    fn media_names(&self, device: &str) -> CatalogResult<Vec<String>>;

    /// Page size and margins of one media.
    fn media(&self, device: &str, media: &str) -> CatalogResult<MediaCandidate>;

    /// Whether the device accepts the named style sheet.
    fn supports_style_sheet(&self, device: &str, sheet: &str) -> CatalogResult<bool>;

    /// Full media list of the device, in catalog order.
    fn candidates(&self, device: &str) -> CatalogResult<Vec<MediaCandidate>> {
        self.media_names(device)?
            .iter()
            .map(|name| self.media(device, name))
            .collect()
    }
}

/// In-memory catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticCatalog {
    pub default_device: Option<String>,
    pub devices: Vec<DeviceProfile>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a device after validating its media. The first device added
    /// becomes the default unless one is already set.
    pub fn add_device(&mut self, profile: DeviceProfile) -> CatalogResult<()> {
        if self.device(&profile.name).is_some() {
            return Err(CatalogError::DeviceAlreadyExists(profile.name));
        }
        for media in &profile.media {
            media.validate()?;
        }
        if self.default_device.is_none() {
            self.default_device = Some(profile.name.clone());
        }
        debug!(device = %profile.name, media = profile.media.len(), "added plot device");
        self.devices.push(profile);
        Ok(())
    }

    pub fn with_device(mut self, profile: DeviceProfile) -> CatalogResult<Self> {
        self.add_device(profile)?;
        Ok(self)
    }

    pub fn set_default_device(&mut self, name: &str) -> CatalogResult<()> {
        if self.device(name).is_none() {
            return Err(CatalogError::DeviceNotFound(name.to_string()));
        }
        self.default_device = Some(name.to_string());
        Ok(())
    }

    pub fn device(&self, name: &str) -> Option<&DeviceProfile> {
        self.devices.iter().find(|d| d.name == name)
    }

    fn require(&self, name: &str) -> CatalogResult<&DeviceProfile> {
        self.device(name)
            .ok_or_else(|| CatalogError::DeviceNotFound(name.to_string()))
    }

    /// Load a catalog from a JSON file and validate every media entry.
    pub fn load_from_file(path: &Path) -> CatalogResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog: Self = serde_json::from_str(&content)?;
        catalog.validate()?;
        info!(path = %path.display(), devices = catalog.devices.len(), "loaded device catalog");
        Ok(catalog)
    }

    /// Save the catalog to a JSON file.
    pub fn save_to_file(&self, path: &Path) -> CatalogResult<()> {
        self.validate()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> CatalogResult<()> {
        for device in &self.devices {
            for media in &device.media {
                media.validate()?;
            }
        }
        if let Some(name) = &self.default_device {
            self.require(name)?;
        }
        Ok(())
    }
}

impl DeviceCatalog for StaticCatalog {
    fn default_device(&self) -> Option<String> {
        self.default_device.clone()
    }

    fn media_names(&self, device: &str) -> CatalogResult<Vec<String>> {
        Ok(self
            .require(device)?
            .media
            .iter()
            .map(|m| m.name.clone())
            .collect())
    }

    fn media(&self, device: &str, media: &str) -> CatalogResult<MediaCandidate> {
        self.require(device)?
            .find_media(media)
            .cloned()
            .ok_or_else(|| CatalogError::MediaNotFound {
                device: device.to_string(),
                media: media.to_string(),
            })
    }

    fn supports_style_sheet(&self, device: &str, sheet: &str) -> CatalogResult<bool> {
        Ok(self.require(device)?.supports_style_sheet(sheet))
    }
}
