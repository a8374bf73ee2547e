//! Han script conversion for finished article content

use crate::config::TranslateConfig;
use thiserror::Error;
use zhconv::Variant;

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("unknown script variant '{0}' (expected zh-Hans, zh-Hant, zh-CN, zh-TW, zh-HK or none)")]
    UnknownVariant(String),
}

/// Converts text between Han script variants
pub trait ScriptConverter: Send + Sync {
    fn convert(&self, text: &str) -> Result<String, TranslateError>;
}

/// Dictionary-based conversion to a fixed target variant
#[derive(Debug, Clone, Copy)]
pub struct HanConverter {
    target: Variant,
}

impl HanConverter {
    pub fn new(target: Variant) -> Self {
        Self { target }
    }
}

impl ScriptConverter for HanConverter {
    fn convert(&self, text: &str) -> Result<String, TranslateError> {
        Ok(zhconv::zhconv(text, self.target))
    }
}

/// Leaves content untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl ScriptConverter for Passthrough {
    fn convert(&self, text: &str) -> Result<String, TranslateError> {
        Ok(text.to_string())
    }
}

/// Builds the converter named by `translate.target`
pub fn converter_for(config: &TranslateConfig) -> Result<Box<dyn ScriptConverter>, TranslateError> {
    let variant = match config.target.trim().to_ascii_lowercase().as_str() {
        "none" => return Ok(Box::new(Passthrough)),
        "zh-hans" => Variant::ZhHans,
        "zh-hant" => Variant::ZhHant,
        "zh-cn" => Variant::ZhCN,
        "zh-tw" => Variant::ZhTW,
        "zh-hk" => Variant::ZhHK,
        _ => return Err(TranslateError::UnknownVariant(config.target.clone())),
    };

    Ok(Box::new(HanConverter::new(variant)))
}
