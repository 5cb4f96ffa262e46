use image::ImageFormat;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use super::evaluator::Evaluator;
use crate::config::RenderingConfig;
use crate::engines::expression::ExprTree;
use crate::error::{PicEvolveError, Result};
use crate::raster::Image;

pub trait ProgressCallback {
    fn on_render_start(&mut self, total: usize);
    fn on_image_written(&mut self, index: usize, total: usize, path: &Path);
    fn on_render_complete(&mut self, total: usize);
}

/// Renders whole populations, one independent evaluation per expression
pub struct Renderer {
    evaluator: Evaluator,
    format: ImageFormat,
    extension: String,
}

impl Renderer {
    pub fn new(evaluator: Evaluator, extension: &str) -> Result<Self> {
        let format = ImageFormat::from_extension(extension).ok_or_else(|| {
            PicEvolveError::Configuration(format!("Unsupported image format: {}", extension))
        })?;
        Ok(Self {
            evaluator,
            format,
            extension: extension.to_lowercase(),
        })
    }

    pub fn from_config(evaluator: Evaluator, config: &RenderingConfig) -> Result<Self> {
        Self::new(evaluator, &config.image_format)
    }

    /// Evaluate every expression in parallel; results keep population order
    pub fn render_all(&self, population: &[ExprTree], width: usize, height: usize) -> Vec<Result<Image>> {
        population
            .par_iter()
            .map(|tree| self.evaluator.evaluate(tree, width, height))
            .collect()
    }

    pub fn render_to_file<P: AsRef<Path>>(
        &self,
        tree: &ExprTree,
        width: usize,
        height: usize,
        path: P,
    ) -> Result<()> {
        self.evaluator.evaluate(tree, width, height)?.save(path, self.format)
    }

    /// Write `<dir>/<index>.<ext>` for every expression of the population
    pub fn write_previews<C: ProgressCallback>(
        &self,
        population: &[ExprTree],
        width: usize,
        height: usize,
        dir: &Path,
        callback: &mut C,
    ) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let total = population.len();
        callback.on_render_start(total);

        let written: Vec<Result<PathBuf>> = population
            .par_iter()
            .enumerate()
            .map(|(i, tree)| -> Result<PathBuf> {
                let path = dir.join(format!("{}.{}", i, self.extension));
                self.render_to_file(tree, width, height, &path)?;
                Ok(path)
            })
            .collect();

        let mut paths = Vec::with_capacity(total);
        for (i, result) in written.into_iter().enumerate() {
            let path = result?;
            callback.on_image_written(i, total, &path);
            paths.push(path);
        }
        callback.on_render_complete(total);
        Ok(paths)
    }
}

pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_render_start(&mut self, total: usize) {
        log::info!("Rendering {} images...", total);
    }

    fn on_image_written(&mut self, index: usize, total: usize, path: &Path) {
        log::debug!("[{}/{}] wrote {}", index + 1, total, path.display());
    }

    fn on_render_complete(&mut self, total: usize) {
        log::info!("Rendered {} images", total);
    }
}
