//! PDF stamping - batch orchestration
//!
//! This module drives the whole run:
//! 1. Prepare the stamp bitmap and signing credentials once
//! 2. Discover input documents
//! 3. Apply seam stamps, then page stamps, to each document
//! 4. Encrypt or sign, then write the result

mod document;
mod inputs;
mod io;

pub use inputs::{InputFile, collect_inputs};
pub use io::{encrypt_document, open_document, serialize_document};

use crate::bitmap::{BitmapSettings, StampBitmap};
use crate::cancel::CancelFlag;
use crate::jitter::{StampRng, stamp_rng};
use crate::options::StampingOptions;
use crate::render::PageStamper;
use crate::replace::replace_file;
use crate::signing::{SigningContext, sign_document};
use crate::types::*;
use document::{StampContext, apply_page_stamps, apply_seam_stamp};
use rand::RngCore;
use std::path::Path;

/// Counters for one stamped document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileReport {
    pub seam_pages: usize,
    pub page_stamps: usize,
    pub signed: bool,
}

/// Batch stamping engine.
///
/// Owns the prepared bitmap, the signing credentials and the jitter source
/// for the lifetime of one run.
pub struct Stamper {
    options: StampingOptions,
    bitmap: StampBitmap,
    signing: Option<SigningContext>,
    rng: StampRng,
    cancel: CancelFlag,
}

impl std::fmt::Debug for Stamper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stamper")
            .field("options", &self.options)
            .field("signing", &self.signing)
            .finish_non_exhaustive()
    }
}

impl Stamper {
    /// Validate `options` and load the stamp image and certificate
    pub fn new(options: StampingOptions) -> Result<Self> {
        options.validate()?;

        let image_path = options
            .stamp_image
            .as_deref()
            .ok_or_else(|| StampError::Config("Stamp image path is required".to_string()))?;
        let bitmap = StampBitmap::load(image_path, &BitmapSettings::from(&options))?;

        let signing = match (options.signature.is_enabled(), &options.signature.certificate_path) {
            (true, Some(path)) => Some(SigningContext::load(
                path,
                options.signature.certificate_password.as_deref(),
            )?),
            _ => None,
        };

        let rng = stamp_rng(options.page.jitter_seed);

        Ok(Self {
            options,
            bitmap,
            signing,
            rng,
            cancel: CancelFlag::new(),
        })
    }

    /// Replace the jitter source
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Share an externally controlled cancellation flag
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn options(&self) -> &StampingOptions {
        &self.options
    }

    pub fn bitmap(&self) -> &StampBitmap {
        &self.bitmap
    }

    /// Stamp every input. The first failing document stops the batch.
    pub fn run(&mut self) -> Result<BatchSummary> {
        let inputs = collect_inputs(&self.options.input_paths, self.options.recursive)?;
        let mut summary = BatchSummary::default();

        if inputs.is_empty() {
            log::info!("No PDF files matched the input paths");
            return Ok(summary);
        }
        if self.options.is_in_place() {
            log::info!("No output directory set, replacing {} input(s) in place", inputs.len());
        }

        for input in &inputs {
            self.cancel.check()?;

            let target = match &self.options.output_dir {
                Some(dir) => input.output_path(dir, &self.options.output_suffix),
                None => input.path.clone(),
            };

            if !self.options.is_in_place() && target.exists() && !self.options.overwrite {
                log::warn!(
                    "Skipping {}: {} already exists",
                    input.path.display(),
                    target.display()
                );
                summary
                    .skipped
                    .push((input.path.clone(), "output already exists".to_string()));
                continue;
            }

            let report = self.stamp_file(&input.path, &target)?;
            log::info!(
                "Stamped {} -> {} ({} seam pages, {} page stamps{})",
                input.path.display(),
                target.display(),
                report.seam_pages,
                report.page_stamps,
                if report.signed { ", signed" } else { "" }
            );

            summary.outputs.push(target);
            summary.seam_pages_stamped += report.seam_pages;
            summary.page_stamps_applied += report.page_stamps;
            if report.signed {
                summary.documents_signed += 1;
            }
        }

        log::info!(
            "Batch complete: {} written, {} skipped",
            summary.processed(),
            summary.skipped.len()
        );
        Ok(summary)
    }

    /// Stamp one document from `input` and write it to `target`.
    ///
    /// Nothing is written unless every step succeeds.
    pub fn stamp_file(&mut self, input: &Path, target: &Path) -> Result<FileReport> {
        self.cancel.check()?;

        let bytes = std::fs::read(input)?;
        let mut doc = open_document(&bytes, input, self.options.input_password.as_deref())?;
        drop(bytes);

        let mut pages = PageStamper::new(&doc);
        let ctx = StampContext {
            bitmap: &self.bitmap,
            stamp_width_mm: self.options.stamp_width_mm,
            cancel: &self.cancel,
        };
        let mut report = FileReport::default();

        if self.options.seam.is_enabled() {
            report.seam_pages = apply_seam_stamp(&mut doc, &mut pages, &ctx, &self.options.seam)?;
        }

        if self.options.page.is_enabled() {
            report.page_stamps = apply_page_stamps(
                &mut doc,
                &mut pages,
                &ctx,
                &self.options.page,
                self.rng.as_mut(),
            )?;
        }

        self.cancel.check()?;

        let output = match &self.signing {
            Some(context) => {
                let first_page = pages.page_id(1).map_err(|_| {
                    StampError::Signing("Document has no page to hold the signature".to_string())
                })?;
                report.signed = true;
                sign_document(
                    &mut doc,
                    first_page,
                    context,
                    self.options.signature.reason.as_deref(),
                    self.options.signature.location.as_deref(),
                )?
            }
            None => {
                if let Some(password) = self.options.output_password.as_deref().filter(|p| !p.is_empty()) {
                    encrypt_document(&mut doc, password)?;
                }
                serialize_document(&mut doc)?
            }
        };

        write_output(target, &output, self.options.is_in_place())?;
        Ok(report)
    }
}

fn write_output(target: &Path, bytes: &[u8], in_place: bool) -> Result<()> {
    if in_place {
        return replace_file(target, bytes);
    }
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(target, bytes)?;
    Ok(())
}

/// Run a whole batch on a blocking task
pub async fn stamp_batch(options: StampingOptions, cancel: CancelFlag) -> Result<BatchSummary> {
    tokio::task::spawn_blocking(move || Stamper::new(options)?.with_cancel(cancel).run()).await?
}
