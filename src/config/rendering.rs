use super::traits::ConfigSection;
use crate::error::PicEvolveError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    pub preview_width: usize,
    pub preview_height: usize,
    /// File extension of written images ("png", "jpg", "bmp")
    pub image_format: String,
    pub images_dir: PathBuf,
    pub library_file: PathBuf,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            preview_width: 200,
            preview_height: 200,
            image_format: "png".to_string(),
            images_dir: PathBuf::from("images"),
            library_file: PathBuf::from(".library.txt"),
        }
    }
}

impl ConfigSection for RenderingConfig {
    fn section_name() -> &'static str {
        "rendering"
    }

    fn validate(&self) -> Result<(), PicEvolveError> {
        if self.preview_width == 0 || self.preview_height == 0 {
            return Err(PicEvolveError::Configuration(
                "Preview dimensions must be positive".to_string(),
            ));
        }
        if image::ImageFormat::from_extension(&self.image_format).is_none() {
            return Err(PicEvolveError::Configuration(format!(
                "Unsupported image format: {}",
                self.image_format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RenderingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let config = RenderingConfig {
            image_format: "xyz".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
