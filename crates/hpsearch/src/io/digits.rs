//! Handwritten-digit image sources.
//!
//! `SyntheticDigits` is the built-in dataset: 8x8 glyphs with integer
//! intensities in `0..=16`, jittered and noised from a seed. `OptDigitsCsv`
//! reads the UCI optdigits CSV layout (pixels then label, no header).
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use ndarray::{Array1, Array3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data_handling::ImageDataset;

/// A read-only provider of labeled images.
pub trait DatasetSource {
    /// Load every sample. Any failure is fatal; nothing is partially loaded.
    fn load(&self) -> Result<ImageDataset>;

    fn describe(&self) -> String;
}

/// Reader configuration for optdigits-style CSV files.
#[derive(Debug, Clone)]
pub struct OptDigitsCsv {
    pub path: PathBuf,
    pub height: usize,
    pub width: usize,
}

impl OptDigitsCsv {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            height: 8,
            width: 8,
        }
    }
}

impl DatasetSource for OptDigitsCsv {
    fn load(&self) -> Result<ImageDataset> {
        read_optdigits_csv(&self.path, self.height, self.width)
    }

    fn describe(&self) -> String {
        format!("optdigits CSV {}", self.path.display())
    }
}

/// Read a CSV where each row holds `height * width` pixel values followed by
/// the integer class label.
pub fn read_optdigits_csv<P: AsRef<Path>>(path: P, height: usize, width: usize) -> Result<ImageDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b',')
        .trim(csv::Trim::All)
        .from_path(&path)
        .with_context(|| format!("Failed to open digits file: {}", path.as_ref().display()))?;

    let n_pixels = height * width;
    let mut pixels = Vec::new();
    let mut labels = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        if record.len() != n_pixels + 1 {
            return Err(anyhow!(
                "Row {} has {} fields, expected {} pixels and a label",
                row_idx + 1,
                record.len(),
                n_pixels
            ));
        }

        for (col, value) in record.iter().take(n_pixels).enumerate() {
            let parsed = value.parse::<f64>().with_context(|| {
                format!("Invalid pixel '{}' at row {}, column {}", value, row_idx + 1, col + 1)
            })?;
            pixels.push(parsed);
        }

        let label = record
            .get(n_pixels)
            .ok_or_else(|| anyhow!("Missing label value at row {}", row_idx + 1))?
            .parse::<usize>()
            .with_context(|| format!("Invalid label at row {}", row_idx + 1))?;
        labels.push(label);
    }

    if labels.is_empty() {
        return Err(anyhow!(
            "Digits file {} contains no samples",
            path.as_ref().display()
        ));
    }

    let images = Array3::from_shape_vec((labels.len(), height, width), pixels)
        .context("Failed to build image array")?;
    let dataset = ImageDataset::new(images, Array1::from_vec(labels))?;
    Ok(dataset)
}

const GLYPHS: [[&str; 8]; 10] = [
    [
        "..####..", ".##..##.", ".##..##.", ".##..##.", ".##..##.", ".##..##.", ".##..##.",
        "..####..",
    ],
    [
        "...##...", "..###...", ".####...", "...##...", "...##...", "...##...", "...##...",
        ".######.",
    ],
    [
        "..####..", ".##..##.", ".....##.", "....##..", "...##...", "..##....", ".##.....",
        ".######.",
    ],
    [
        "..####..", ".##..##.", ".....##.", "...###..", ".....##.", ".....##.", ".##..##.",
        "..####..",
    ],
    [
        "....##..", "...###..", "..####..", ".##.##..", ".######.", "....##..", "....##..",
        "....##..",
    ],
    [
        ".######.", ".##.....", ".#####..", ".....##.", ".....##.", ".....##.", ".##..##.",
        "..####..",
    ],
    [
        "..####..", ".##.....", ".##.....", ".#####..", ".##..##.", ".##..##.", ".##..##.",
        "..####..",
    ],
    [
        ".######.", ".....##.", "....##..", "....##..", "...##...", "...##...", "..##....",
        "..##....",
    ],
    [
        "..####..", ".##..##.", ".##..##.", "..####..", ".##..##.", ".##..##.", ".##..##.",
        "..####..",
    ],
    [
        "..####..", ".##..##.", ".##..##.", "..#####.", ".....##.", ".....##.", "....##..",
        "..###...",
    ],
];

/// Built-in 8x8 handwritten-digit look-alike with ten balanced classes.
#[derive(Debug, Clone)]
pub struct SyntheticDigits {
    pub n_per_class: usize,
    /// Maximum absolute pixel noise, in intensity units (0..16 scale)
    pub noise: f64,
    pub seed: u64,
}

impl Default for SyntheticDigits {
    fn default() -> Self {
        Self {
            n_per_class: 180,
            noise: 4.0,
            seed: 0,
        }
    }
}

impl SyntheticDigits {
    /// Render one glyph with a horizontal shift of -1, 0 or 1 pixels.
    fn render(&self, digit: usize, rng: &mut StdRng, out: &mut Vec<f64>) {
        let shift: i64 = rng.gen_range(-1..=1);
        for row in GLYPHS[digit].iter() {
            let cells = row.as_bytes();
            for col in 0..8i64 {
                let src = col - shift;
                let ink = (0..8).contains(&src) && cells[src as usize] == b'#';
                let base = if ink { rng.gen_range(10.0..=16.0) } else { 0.0 };
                let noise = if self.noise > 0.0 {
                    rng.gen_range(-self.noise..=self.noise)
                } else {
                    0.0
                };
                out.push((base + noise).round().clamp(0.0, 16.0));
            }
        }
    }
}

impl DatasetSource for SyntheticDigits {
    fn load(&self) -> Result<ImageDataset> {
        if self.n_per_class == 0 {
            return Err(anyhow!("SyntheticDigits needs at least one sample per class"));
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        let n = self.n_per_class * GLYPHS.len();
        let mut pixels = Vec::with_capacity(n * 64);
        let mut labels = Vec::with_capacity(n);
        // interleave the classes so any prefix stays balanced
        for _ in 0..self.n_per_class {
            for digit in 0..GLYPHS.len() {
                self.render(digit, &mut rng, &mut pixels);
                labels.push(digit);
            }
        }
        let images = Array3::from_shape_vec((n, 8, 8), pixels)
            .context("Failed to build synthetic image array")?;
        Ok(ImageDataset::new(images, Array1::from_vec(labels))?)
    }

    fn describe(&self) -> String {
        format!(
            "synthetic digits ({} per class, noise {}, seed {})",
            self.n_per_class, self.noise, self.seed
        )
    }
}
