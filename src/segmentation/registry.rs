/*!
 * Sentence detector registry.
 *
 * Holds the configured segmentation models, loads them lazily by name and
 * caches the loaded detectors. Selection for a language goes through these
 * steps, first hit wins:
 *
 * 1. a configured model for that exact language
 * 2. a configured multilingual (`xx`) model
 * 3. the first configured model that loads (flagged as fallback)
 * 4. a rule sentencizer for the language (flagged as fallback)
 */

use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use log::{debug, info, warn};

use crate::language_utils;
use super::{LanguageProfile, RuleSentencizer, SentenceDetector};

const MULTILINGUAL_CODE: &str = "xx";

// @const: Models shipped with the crate, by name and profile language
const BUILTIN_MODELS: &[(&str, &str)] = &[
    ("en_rules", "en"),
    ("de_rules", "de"),
    ("fr_rules", "fr"),
    ("es_rules", "es"),
    ("it_rules", "it"),
    ("tr_rules", "tr"),
    ("xx_rules", "xx"),
];

/// A configured segmentation model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationModel {
    /// Language the model is meant for, `xx` for multilingual
    pub lang_code: String,
    /// Model name, resolved against the built-in catalog
    pub model_name: String,
}

impl SegmentationModel {
    pub fn new(lang_code: &str, model_name: &str) -> Self {
        Self { lang_code: lang_code.to_string(), model_name: model_name.to_string() }
    }

    fn is_multilingual(&self) -> bool {
        self.lang_code == MULTILINGUAL_CODE || self.model_name.contains("xx_")
    }
}

/// Detector chosen for a language, with its provenance
#[derive(Debug, Clone)]
pub struct DetectorSelection {
    pub detector: Arc<dyn SentenceDetector>,
    pub model_name: String,
    /// True when the detector was not meant for the requested language
    pub is_fallback: bool,
    /// Human readable note about a fallback choice
    pub warning: Option<String>,
}

/// Registry of segmentation models with a lazily filled detector cache
pub struct DetectorRegistry {
    models: RwLock<Vec<SegmentationModel>>,
    loaded: RwLock<HashMap<String, Arc<dyn SentenceDetector>>>,
}

impl DetectorRegistry {
    pub fn new(models: Vec<SegmentationModel>) -> Self {
        Self {
            models: RwLock::new(models),
            loaded: RwLock::new(HashMap::new()),
        }
    }

    /// Names of the models the crate can load
    pub fn builtin_models() -> Vec<&'static str> {
        BUILTIN_MODELS.iter().map(|(name, _)| *name).collect()
    }

    /// Default model list: every built-in model under its own language
    pub fn default_models() -> Vec<SegmentationModel> {
        BUILTIN_MODELS
            .iter()
            .map(|(name, lang)| SegmentationModel::new(lang, name))
            .collect()
    }

    pub fn models(&self) -> Vec<SegmentationModel> {
        self.models.read().clone()
    }

    /// Register a model, replacing any entry for the same language
    pub fn add_model(&self, model: SegmentationModel) {
        let mut models = self.models.write();
        models.retain(|m| m.lang_code != model.lang_code);
        info!("Registered segmentation model {} for {}", model.model_name, model.lang_code);
        models.push(model);
    }

    /// Remove the model configured for a language. Returns whether one was removed.
    pub fn remove_model(&self, lang_code: &str) -> bool {
        let mut models = self.models.write();
        let before = models.len();
        models.retain(|m| m.lang_code != lang_code);
        let removed = models.len() != before;
        drop(models);
        if removed {
            self.reload();
        }
        removed
    }

    /// Drop every cached detector so the next selection loads afresh
    pub fn reload(&self) {
        let mut loaded = self.loaded.write();
        let count = loaded.len();
        loaded.clear();
        debug!("Detector cache cleared ({} entries)", count);
    }

    /// Drop one cached detector
    pub fn invalidate(&self, model_name: &str) -> bool {
        self.loaded.write().remove(model_name).is_some()
    }

    pub fn cached_count(&self) -> usize {
        self.loaded.read().len()
    }

    /// Load a model by name, from cache when possible
    pub fn load(&self, model_name: &str) -> Option<Arc<dyn SentenceDetector>> {
        if let Some(detector) = self.loaded.read().get(model_name) {
            return Some(detector.clone());
        }

        let Some((_, lang)) = BUILTIN_MODELS.iter().find(|(name, _)| *name == model_name) else {
            warn!("Unknown segmentation model: {}", model_name);
            return None;
        };

        let detector: Arc<dyn SentenceDetector> =
            Arc::new(RuleSentencizer::new(model_name, LanguageProfile::for_language(lang)));

        // Another caller may have loaded it meanwhile; keep whichever landed first
        let mut loaded = self.loaded.write();
        let detector = loaded.entry(model_name.to_string()).or_insert(detector).clone();
        debug!("Loaded segmentation model: {}", model_name);
        Some(detector)
    }

    /// Pick the detector for a source language
    pub fn select(&self, lang_code: &str) -> DetectorSelection {
        let lang_code = lang_code.trim().to_lowercase();
        let models = self.models();

        let direct = models
            .iter()
            .filter(|m| m.lang_code == lang_code || language_utils::language_codes_match(&m.lang_code, &lang_code));
        for model in direct {
            if let Some(detector) = self.load(&model.model_name) {
                return DetectorSelection {
                    detector,
                    model_name: model.model_name.clone(),
                    is_fallback: false,
                    warning: None,
                };
            }
        }

        for model in models.iter().filter(|m| m.is_multilingual()) {
            if let Some(detector) = self.load(&model.model_name) {
                return DetectorSelection {
                    detector,
                    model_name: model.model_name.clone(),
                    is_fallback: false,
                    warning: None,
                };
            }
        }

        if let Some(first) = models.first() {
            if let Some(detector) = self.load(&first.model_name) {
                let warning = format!(
                    "No segmentation model for '{}', using '{}' ({}) instead",
                    lang_code, first.model_name, first.lang_code
                );
                warn!("{}", warning);
                return DetectorSelection {
                    detector,
                    model_name: first.model_name.clone(),
                    is_fallback: true,
                    warning: Some(warning),
                };
            }
        }

        let sentencizer = RuleSentencizer::for_language(&lang_code);
        let model_name = sentencizer.name().to_string();
        let warning = format!("No segmentation model available, using rule-based {}", model_name);
        warn!("{}", warning);
        DetectorSelection {
            detector: Arc::new(sentencizer),
            model_name,
            is_fallback: true,
            warning: Some(warning),
        }
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new(Self::default_models())
    }
}

impl std::fmt::Debug for DetectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorRegistry")
            .field("models", &self.models())
            .field("loaded", &self.cached_count())
            .finish()
    }
}
