use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StampError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("No input files specified")]
    NoInputs,
    #[error("Unsupported seam side: {0}")]
    UnsupportedSide(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("Document {} is password protected", .0.display())]
    PasswordRequired(PathBuf),
    #[error("Incorrect password for {}", .0.display())]
    InvalidPassword(PathBuf),
    #[error("Encryption error: {0}")]
    Encryption(String),
    #[error("Certificate error: {0}")]
    Certificate(String),
    #[error("Signing error: {0}")]
    Signing(String),
    #[error("Signature of {actual} bytes does not fit the {reserved} byte placeholder")]
    SignatureTooLarge { actual: usize, reserved: usize },
    #[error("Stamping cancelled")]
    Cancelled,
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, StampError>;

/// Broad classification of a [`StampError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid option combination, detected before any file is touched
    Configuration,
    /// Missing or unreadable stamp image, certificate or input set
    Resource,
    /// Failure while processing one document
    Document,
    /// Cooperative cancellation
    Cancelled,
    /// Runtime plumbing failure
    Internal,
}

impl StampError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StampError::Config(_) | StampError::UnsupportedSide(_) | StampError::Unsupported(_) => {
                ErrorKind::Configuration
            }
            StampError::NotFound(_)
            | StampError::NoInputs
            | StampError::Image(_)
            | StampError::Certificate(_) => ErrorKind::Resource,
            StampError::Pdf(_)
            | StampError::Io(_)
            | StampError::PasswordRequired(_)
            | StampError::InvalidPassword(_)
            | StampError::Encryption(_)
            | StampError::Signing(_)
            | StampError::SignatureTooLarge { .. } => ErrorKind::Document,
            StampError::Cancelled => ErrorKind::Cancelled,
            StampError::TaskJoin(_) => ErrorKind::Internal,
        }
    }
}

/// Which pages receive a slice of the seam stamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum SeamScope {
    #[default]
    None,
    All,
    Odd,
    Even,
    /// Pages listed in `SeamStampOptions::custom_pages`
    Custom,
}

/// Which pages receive a full page stamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum PageScope {
    #[default]
    None,
    All,
    SkipFirst,
    SkipLast,
    /// Pages listed in `PageStampOptions::custom_pages`
    Custom,
}

/// Page edge the seam stamp runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum SeamSide {
    Left,
    #[default]
    Right,
    Top,
    Bottom,
}

impl SeamSide {
    pub fn as_str(self) -> &'static str {
        match self {
            SeamSide::Left => "left",
            SeamSide::Right => "right",
            SeamSide::Top => "top",
            SeamSide::Bottom => "bottom",
        }
    }

    /// Seams on horizontal edges need their slices turned on their side
    pub fn is_horizontal(self) -> bool {
        matches!(self, SeamSide::Top | SeamSide::Bottom)
    }
}

impl TryFrom<&str> for SeamSide {
    type Error = StampError;

    fn try_from(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(SeamSide::Left),
            "right" => Ok(SeamSide::Right),
            "top" => Ok(SeamSide::Top),
            "bottom" => Ok(SeamSide::Bottom),
            _ => Err(StampError::UnsupportedSide(value.to_string())),
        }
    }
}

impl TryFrom<String> for SeamSide {
    type Error = StampError;

    fn try_from(value: String) -> Result<Self> {
        SeamSide::try_from(value.as_str())
    }
}

impl From<SeamSide> for String {
    fn from(side: SeamSide) -> Self {
        side.as_str().to_string()
    }
}

/// How the document gets signed after stamping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum SignatureMode {
    #[default]
    None,
    /// Accepted by the configuration surface but never implemented
    SelfSigned,
    /// Sign with a certificate container supplied by the user
    CustomCertificate,
}

/// Outcome counters for one batch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    /// Files written, in processing order
    pub outputs: Vec<PathBuf>,
    /// Inputs left untouched, with the reason
    pub skipped: Vec<(PathBuf, String)>,
    /// Pages that received a seam slice
    pub seam_pages_stamped: usize,
    /// Page stamps drawn
    pub page_stamps_applied: usize,
    /// Documents that received a signature
    pub documents_signed: usize,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.outputs.len()
    }
}
