use serde::{Deserialize, Serialize};

use crate::error::{MediaError, MediaResult};

/// A page size in drawing units (inches for the stock catalogs).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const LETTER: PageSize = PageSize {
        width: 8.5,
        height: 11.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// The same page turned a quarter.
    pub fn swapped(&self) -> Self {
        Self::new(self.height, self.width)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::LETTER
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x {}", self.width, self.height)
    }
}

/// Unprintable border of a media, per side.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Margins {
    pub fn uniform(m: f64) -> Self {
        Self {
            left: m,
            right: m,
            top: m,
            bottom: m,
        }
    }
}

/// A named page size offered by a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaCandidate {
    pub name: String,
    pub page_width: f64,
    pub page_height: f64,
    #[serde(default)]
    pub margins: Margins,
}

impl MediaCandidate {
    pub fn new(name: impl Into<String>, page_width: f64, page_height: f64) -> Self {
        Self {
            name: name.into(),
            page_width,
            page_height,
            margins: Margins::default(),
        }
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Raw page size.
    pub fn page_size(&self) -> PageSize {
        PageSize::new(self.page_width, self.page_height)
    }

    /// Usable size: the raw page, or the page minus margins when only the
    /// printable area counts.
    pub fn usable_size(&self, printable_area: bool) -> PageSize {
        if printable_area {
            PageSize::new(
                self.page_width - (self.margins.left + self.margins.right),
                self.page_height - (self.margins.top + self.margins.bottom),
            )
        } else {
            self.page_size()
        }
    }

    pub fn validate(&self) -> MediaResult<()> {
        if self.name.trim().is_empty() {
            return Err(MediaError::EmptyName);
        }
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(self.page_width) || !valid(self.page_height) {
            return Err(MediaError::InvalidSize {
                name: self.name.clone(),
                width: self.page_width,
                height: self.page_height,
            });
        }
        let m = &self.margins;
        if [m.left, m.right, m.top, m.bottom]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(MediaError::InvalidMargins {
                name: self.name.clone(),
                reason: "margins must be non-negative".to_string(),
            });
        }
        let printable = self.usable_size(true);
        if printable.width <= 0.0 || printable.height <= 0.0 {
            return Err(MediaError::InvalidMargins {
                name: self.name.clone(),
                reason: "margins leave no printable area".to_string(),
            });
        }
        Ok(())
    }
}

/// A plot device and the media and style sheets it supports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    pub name: String,
    pub description: String,
    pub media: Vec<MediaCandidate>,
    /// Style sheets the device accepts. Empty means any.
    pub style_sheets: Vec<String>,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            name: "New Device".to_string(),
            description: "".to_string(),
            media: Vec::new(),
            style_sheets: Vec::new(),
        }
    }
}

impl DeviceProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_media(mut self, media: MediaCandidate) -> Self {
        self.media.push(media);
        self
    }

    pub fn with_style_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.style_sheets.push(sheet.into());
        self
    }

    pub fn supports_style_sheet(&self, sheet: &str) -> bool {
        self.style_sheets.is_empty() || self.style_sheets.iter().any(|s| s == sheet)
    }

    pub fn find_media(&self, name: &str) -> Option<&MediaCandidate> {
        self.media.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_size_subtracts_margins() {
        let m = MediaCandidate::new("Letter", 8.5, 11.0).with_margins(Margins {
            left: 0.25,
            right: 0.25,
            top: 0.5,
            bottom: 0.5,
        });
        assert_eq!(m.usable_size(false), PageSize::new(8.5, 11.0));
        assert_eq!(m.usable_size(true), PageSize::new(8.0, 10.0));
    }

    #[test]
    fn test_validate_rejects_bad_media() {
        assert!(MediaCandidate::new("", 1.0, 1.0).validate().is_err());
        assert!(MediaCandidate::new("Zero", 0.0, 1.0).validate().is_err());
        assert!(MediaCandidate::new("Eaten", 1.0, 1.0)
            .with_margins(Margins::uniform(0.5))
            .validate()
            .is_err());
        assert!(MediaCandidate::new("Letter", 8.5, 11.0)
            .with_margins(Margins::uniform(0.25))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_style_sheet_support() {
        let open = DeviceProfile::new("Any");
        assert!(open.supports_style_sheet("monochrome.ctb"));

        let strict = DeviceProfile::new("Strict").with_style_sheet("acad.ctb");
        assert!(strict.supports_style_sheet("acad.ctb"));
        assert!(!strict.supports_style_sheet("monochrome.ctb"));
    }
}
