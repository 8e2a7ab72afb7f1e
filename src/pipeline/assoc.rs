//! Image Associator: filters decorative images and assigns the rest to steps.
//!
//! Dimensions come from the source dictionary, so filtering is free; pixel
//! decode happens only for images that are actually persisted. A decode
//! failure skips that one image and never aborts the page or document.

use std::fs;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Document, ImageEncoding, PageImage, Step, StepImage};

use super::ConversionLog;

/// Decorative-image filter configuration.
///
/// These are tuned heuristics, not ground truth: the fixed size and the
/// portrait band were observed on known exports and will misclassify images
/// on other documents. They are kept as configuration for exactly that
/// reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageFilterConfig {
    /// Exact dimensions always treated as decorative.
    pub known_logo_sizes: Vec<(u32, u32)>,

    /// Both dimensions must be below this for the aspect-band rule to apply.
    pub logo_max_dimension: u32,

    /// Width/height band treated as a portrait logo (exclusive bounds).
    pub portrait_ratio_band: (f64, f64),

    /// Images smaller than this in either dimension are always excluded
    /// (UI icons and noise).
    pub min_dimension: u32,
}

impl Default for ImageFilterConfig {
    fn default() -> Self {
        Self {
            known_logo_sizes: vec![(258, 395)],
            logo_max_dimension: 400,
            portrait_ratio_band: (0.4, 0.8),
            min_dimension: 100,
        }
    }
}

impl ImageFilterConfig {
    /// Whether an image is classified as a decorative logo.
    pub fn is_logo(&self, image: &PageImage) -> bool {
        if self
            .known_logo_sizes
            .contains(&(image.width, image.height))
        {
            return true;
        }
        if image.width < self.logo_max_dimension && image.height < self.logo_max_dimension {
            let ratio = image.aspect_ratio();
            let (lo, hi) = self.portrait_ratio_band;
            if ratio > lo && ratio < hi {
                return true;
            }
        }
        false
    }

    /// Whether an image clears the hard minimum size.
    pub fn meets_minimum(&self, image: &PageImage) -> bool {
        image.width > self.min_dimension && image.height > self.min_dimension
    }

    /// Combined filter: true when the image should be kept.
    pub fn keeps(&self, image: &PageImage) -> bool {
        self.meets_minimum(image) && !self.is_logo(image)
    }
}

/// Assign surviving page images to the steps found on that page and persist
/// them under `images_dir`.
///
/// When a page hosts one step, it receives every surviving image. When a
/// page hosts several, images are split evenly with the remainder going to
/// the earliest steps; page-level extraction cannot recover a truer mapping.
pub fn attach_images(
    doc: &Document,
    steps: &mut [Step],
    images_dir: &Path,
    config: &ImageFilterConfig,
    log: &mut ConversionLog,
) -> Result<()> {
    use std::collections::BTreeMap;

    let mut steps_by_page: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (idx, step) in steps.iter().enumerate() {
        steps_by_page.entry(step.page).or_default().push(idx);
    }
    if steps_by_page.is_empty() {
        return Ok(());
    }

    fs::create_dir_all(images_dir)?;

    for page in &doc.pages {
        let Some(step_indices) = steps_by_page.get(&page.number) else {
            continue;
        };

        let survivors: Vec<&PageImage> = page
            .images
            .iter()
            .filter(|img| {
                if !config.meets_minimum(img) {
                    return false;
                }
                if config.is_logo(img) {
                    log.info(format!(
                        "Filtered logo on page {} ({}x{})",
                        page.number, img.width, img.height
                    ));
                    return false;
                }
                true
            })
            .collect();

        if survivors.is_empty() {
            continue;
        }

        for (slot, image) in distribute(survivors.len(), step_indices.len()) {
            let step = &mut steps[step_indices[slot]];
            match persist_image(survivors[image], step.step_number, page.number, images_dir) {
                Ok(step_image) => step.images.push(step_image),
                Err(e) => {
                    log.warn(format!(
                        "Failed to decode image {} on page {}: {}",
                        survivors[image].index, page.number, e
                    ));
                }
            }
        }
    }

    Ok(())
}

/// Even split of `images` across `slots`: returns `(slot, image)` pairs with
/// the remainder handed to the earliest slots.
fn distribute(images: usize, slots: usize) -> Vec<(usize, usize)> {
    if slots == 0 {
        return Vec::new();
    }
    let per_slot = images / slots;
    let remainder = images % slots;

    let mut out = Vec::with_capacity(images);
    let mut next = 0;
    for slot in 0..slots {
        let take = per_slot + usize::from(slot < remainder);
        for _ in 0..take {
            out.push((slot, next));
            next += 1;
        }
    }
    out
}

/// Decode one image and write it as a PNG with a deterministic filename.
fn persist_image(
    image: &PageImage,
    step_number: u32,
    page_number: u32,
    images_dir: &Path,
) -> Result<StepImage> {
    let decoded = decode_pixels(image)?;

    let filename = format!(
        "step_{}_page_{}_img_{}.png",
        step_number, page_number, image.index
    );
    let path = images_dir.join(&filename);
    decoded
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|e| Error::ImageExtract(format!("PNG write failed: {}", e)))?;

    Ok(StepImage {
        filename,
        path: path.to_string_lossy().to_string(),
        width: image.width,
        height: image.height,
    })
}

/// Decode the stored bytes into pixels.
fn decode_pixels(image: &PageImage) -> Result<DynamicImage> {
    match &image.encoding {
        ImageEncoding::Jpeg => image::load_from_memory_with_format(&image.data, ImageFormat::Jpeg)
            .map_err(|e| Error::ImageExtract(format!("JPEG decode failed: {}", e))),
        ImageEncoding::Raw {
            color_space,
            bits_per_component,
        } => {
            if *bits_per_component != 8 {
                return Err(Error::ImageExtract(format!(
                    "unsupported bits per component: {}",
                    bits_per_component
                )));
            }
            let (w, h) = (image.width, image.height);
            match color_space.as_str() {
                "DeviceRGB" | "CalRGB" => RgbImage::from_raw(w, h, image.data.clone())
                    .map(DynamicImage::ImageRgb8)
                    .ok_or_else(|| Error::ImageExtract("RGB sample size mismatch".into())),
                "DeviceGray" | "CalGray" => GrayImage::from_raw(w, h, image.data.clone())
                    .map(DynamicImage::ImageLuma8)
                    .ok_or_else(|| Error::ImageExtract("gray sample size mismatch".into())),
                other => Err(Error::ImageExtract(format!(
                    "unsupported color space: {}",
                    other
                ))),
            }
        }
    }
}
