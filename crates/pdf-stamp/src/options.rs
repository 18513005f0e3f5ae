use crate::constants::*;
use crate::types::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Complete configuration for one batch run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct StampingOptions {
    // Input
    pub input_paths: Vec<PathBuf>,
    pub recursive: bool,

    // Output
    /// Directory for stamped copies; `None` replaces each input in place
    pub output_dir: Option<PathBuf>,
    pub overwrite: bool,
    pub output_suffix: String,

    // Stamp image
    pub stamp_image: Option<PathBuf>,
    pub transparent: bool,
    pub opacity_percent: u8,
    pub rotation_degrees: f32,
    pub keep_bounds: bool,
    pub stamp_width_mm: f32,

    // Passwords
    pub input_password: Option<String>,
    pub output_password: Option<String>,

    pub seam: SeamStampOptions,
    pub page: PageStampOptions,
    pub signature: SignatureOptions,
}

impl Default for StampingOptions {
    fn default() -> Self {
        Self {
            input_paths: Vec::new(),
            recursive: false,
            output_dir: None,
            overwrite: false,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            stamp_image: None,
            transparent: false,
            opacity_percent: 100,
            rotation_degrees: 0.0,
            keep_bounds: false,
            stamp_width_mm: DEFAULT_STAMP_WIDTH_MM,
            input_password: None,
            output_password: None,
            seam: SeamStampOptions::default(),
            page: PageStampOptions::default(),
            signature: SignatureOptions::default(),
        }
    }
}

/// Seam stamp configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct SeamStampOptions {
    pub scope: SeamScope,
    /// 1-based page numbers, used with [`SeamScope::Custom`]
    pub custom_pages: Vec<u32>,
    pub side: SeamSide,
    /// Position along the edge, 0 = start, 100 = end
    pub offset_percent: f32,
    /// Upper bound on slices held in memory at once
    pub max_batch_size: usize,
}

impl Default for SeamStampOptions {
    fn default() -> Self {
        Self {
            scope: SeamScope::None,
            custom_pages: Vec::new(),
            side: SeamSide::Right,
            offset_percent: DEFAULT_SEAM_OFFSET_PERCENT,
            max_batch_size: DEFAULT_SEAM_BATCH_SIZE,
        }
    }
}

impl SeamStampOptions {
    pub fn is_enabled(&self) -> bool {
        self.scope != SeamScope::None
    }

    /// Edge offset as a ratio in [0, 1]
    pub fn offset_ratio(&self) -> f32 {
        (self.offset_percent / 100.0).clamp(0.0, 1.0)
    }
}

/// Position of a page stamp as ratios of the free page area
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PagePosition {
    pub x: f32,
    pub y: f32,
}

impl PagePosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Both ratios lie in [0, 1]
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

impl Default for PagePosition {
    fn default() -> Self {
        Self::new(0.5, 0.5)
    }
}

/// Page stamp configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct PageStampOptions {
    pub scope: PageScope,
    /// 1-based page numbers, used with [`PageScope::Custom`]
    pub custom_pages: Vec<u32>,
    pub position: PagePosition,
    /// Per-page positions that replace `position`
    pub overrides: BTreeMap<u32, PagePosition>,
    /// Nudge each stamp slightly so a batch looks hand-applied
    pub randomize: bool,
    /// Fixed seed for the jitter source
    pub jitter_seed: Option<u64>,
}

impl PageStampOptions {
    pub fn is_enabled(&self) -> bool {
        self.scope != PageScope::None
    }

    /// Position for a page, honoring overrides
    pub fn position_for(&self, page: u32) -> PagePosition {
        self.overrides.get(&page).copied().unwrap_or(self.position)
    }
}

/// Signature configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct SignatureOptions {
    pub mode: SignatureMode,
    /// PEM container holding the certificate chain and private key
    pub certificate_path: Option<PathBuf>,
    pub certificate_password: Option<String>,
    /// Subject for self-signed issuance, which is not supported
    pub subject: Option<String>,
    pub reason: Option<String>,
    pub location: Option<String>,
}

impl SignatureOptions {
    pub fn is_enabled(&self) -> bool {
        self.mode != SignatureMode::None
    }
}

impl StampingOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| StampError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| StampError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Without an output directory every input is replaced in place
    pub fn is_in_place(&self) -> bool {
        self.output_dir.is_none()
    }

    pub fn is_encrypting(&self) -> bool {
        self.output_password.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Validate the options
    ///
    /// Only checks option combinations; files are not touched here.
    pub fn validate(&self) -> Result<()> {
        if self.input_paths.is_empty() {
            return Err(StampError::NoInputs);
        }

        if self
            .output_dir
            .as_ref()
            .is_some_and(|dir| dir.as_os_str().is_empty())
        {
            return Err(StampError::Config(
                "Output directory must not be empty; omit it to stamp in place".to_string(),
            ));
        }

        if self.stamp_image.is_none() {
            return Err(StampError::Config("Stamp image path is required".to_string()));
        }

        if self.opacity_percent > 100 {
            return Err(StampError::Config(format!(
                "Opacity must be between 0 and 100, got {}",
                self.opacity_percent
            )));
        }

        if !self.stamp_width_mm.is_finite() || self.stamp_width_mm <= 0.0 {
            return Err(StampError::Config(format!(
                "Stamp width must be positive, got {}mm",
                self.stamp_width_mm
            )));
        }

        if !self.rotation_degrees.is_finite() {
            return Err(StampError::Config("Rotation must be a finite angle".to_string()));
        }

        self.validate_seam()?;
        self.validate_page()?;
        self.validate_signature()?;

        Ok(())
    }

    fn validate_seam(&self) -> Result<()> {
        let seam = &self.seam;
        if seam.scope == SeamScope::Custom && seam.custom_pages.is_empty() {
            return Err(StampError::Config(
                "Custom seam scope requires at least one page".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&seam.offset_percent) {
            return Err(StampError::Config(format!(
                "Seam offset must be between 0 and 100, got {}",
                seam.offset_percent
            )));
        }
        if seam.max_batch_size == 0 {
            return Err(StampError::Config(
                "Seam batch size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_page(&self) -> Result<()> {
        let page = &self.page;
        if page.scope == PageScope::Custom && page.custom_pages.is_empty() {
            return Err(StampError::Config(
                "Custom page stamp scope requires at least one page".to_string(),
            ));
        }
        if !page.position.is_valid() {
            return Err(StampError::Config(format!(
                "Page stamp position must be between 0 and 1, got ({}, {})",
                page.position.x, page.position.y
            )));
        }
        if let Some((number, position)) = page.overrides.iter().find(|(_, p)| !p.is_valid()) {
            return Err(StampError::Config(format!(
                "Position for page {} must be between 0 and 1, got ({}, {})",
                number, position.x, position.y
            )));
        }
        Ok(())
    }

    fn validate_signature(&self) -> Result<()> {
        let signature = &self.signature;
        match signature.mode {
            SignatureMode::None => return Ok(()),
            SignatureMode::SelfSigned => {
                return Err(StampError::Unsupported(
                    "Self-signed certificate issuance is not supported; supply a certificate"
                        .to_string(),
                ));
            }
            SignatureMode::CustomCertificate => {
                if signature.certificate_path.is_none() {
                    return Err(StampError::Config(
                        "Certificate signing requires a certificate path".to_string(),
                    ));
                }
            }
        }

        if self.is_encrypting() {
            return Err(StampError::Config(
                "Signing and output encryption are mutually exclusive".to_string(),
            ));
        }

        Ok(())
    }
}
