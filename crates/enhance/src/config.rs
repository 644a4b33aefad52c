//! Enhancement settings.
//!
//! Every field has a default matching MkDocs Material markup, so an empty TOML document is a
//! valid configuration. Unknown keys are rejected to catch typos early.
use crate::error::{EnhanceError, Result};
use html::Selector;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnhanceConfig {
    /// Region holding the rendered page body.
    pub content_selector: String,
    pub toc: TocConfig,
    pub external_links: ExternalLinksConfig,
    pub copy_feedback: CopyFeedbackConfig,
    pub smooth_scroll: SmoothScrollConfig,
    pub version_badge: VersionBadgeConfig,
    pub code_labels: CodeLabelsConfig,
    pub reading_time: ReadingTimeConfig,
    pub shortcuts: ShortcutsConfig,
    pub back_to_top: BackToTopConfig,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            content_selector: ".md-content__inner".to_string(),
            toc: TocConfig::default(),
            external_links: ExternalLinksConfig::default(),
            copy_feedback: CopyFeedbackConfig::default(),
            smooth_scroll: SmoothScrollConfig::default(),
            version_badge: VersionBadgeConfig::default(),
            code_labels: CodeLabelsConfig::default(),
            reading_time: ReadingTimeConfig::default(),
            shortcuts: ShortcutsConfig::default(),
            back_to_top: BackToTopConfig::default(),
        }
    }
}

/// Central slice of the viewport in which a heading counts as being read.
///
/// Margins are fractions of the viewport height cut from the top and bottom.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActivationBand {
    pub top_margin: f32,
    pub bottom_margin: f32,
}

impl Default for ActivationBand {
    fn default() -> Self {
        Self {
            top_margin: 0.45,
            bottom_margin: 0.45,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TocConfig {
    pub enabled: bool,
    pub heading_levels: Vec<u8>,
    pub nav_link_selector: String,
    pub active_class: String,
    pub band: ActivationBand,
    /// Minimum visible fraction of a heading inside the band.
    pub threshold: f32,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            heading_levels: vec![2, 3],
            nav_link_selector: ".md-nav__link".to_string(),
            active_class: "md-nav__link--active".to_string(),
            band: ActivationBand::default(),
            threshold: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalLinksConfig {
    pub enabled: bool,
    pub selector: String,
    pub icon_class: String,
    pub icon_text: String,
}

impl Default for ExternalLinksConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            selector: r#"a[href^="http"]"#.to_string(),
            icon_class: "external-icon".to_string(),
            icon_text: " ↗".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CopyFeedbackConfig {
    pub enabled: bool,
    pub button_selector: String,
    pub color: String,
    pub revert_after_ms: u64,
}

impl Default for CopyFeedbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            button_selector: ".md-clipboard".to_string(),
            color: "#10b981".to_string(),
            revert_after_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmoothScrollConfig {
    pub enabled: bool,
    pub anchor_selector: String,
}

impl Default for SmoothScrollConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            anchor_selector: r##"a[href^="#"]"##.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionBadgeConfig {
    /// Badge text; `None` disables the badge.
    pub label: Option<String>,
    pub target_selector: String,
}

impl Default for VersionBadgeConfig {
    fn default() -> Self {
        Self {
            label: Some("v1.0.0".to_string()),
            target_selector: ".md-header__title".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodeLabelsConfig {
    pub enabled: bool,
    pub selector: String,
}

impl Default for CodeLabelsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            selector: "pre code".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadingTimeConfig {
    pub enabled: bool,
    pub words_per_minute: u32,
}

impl Default for ReadingTimeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            words_per_minute: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShortcutsConfig {
    pub enabled: bool,
    pub search_selector: String,
    pub home_url: String,
}

impl Default for ShortcutsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            search_selector: ".md-search__input".to_string(),
            home_url: "/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackToTopConfig {
    pub enabled: bool,
    /// Scroll offset (px) past which the button fades in.
    pub show_after_px: f32,
}

impl Default for BackToTopConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_after_px: 300.0,
        }
    }
}

impl EnhanceConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EnhanceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges and that every selector parses.
    pub fn validate(&self) -> Result<()> {
        let band = self.toc.band;
        let in_unit = |v: f32| (0.0..1.0).contains(&v);
        if !in_unit(band.top_margin)
            || !in_unit(band.bottom_margin)
            || band.top_margin + band.bottom_margin >= 1.0
        {
            return Err(EnhanceError::Config(format!(
                "activation band margins must be in [0, 1) and leave a non-empty band, got top={} bottom={}",
                band.top_margin, band.bottom_margin
            )));
        }
        if !(0.0..=1.0).contains(&self.toc.threshold) {
            return Err(EnhanceError::Config(format!(
                "toc.threshold must be within [0, 1], got {}",
                self.toc.threshold
            )));
        }
        if let Some(level) = self
            .toc
            .heading_levels
            .iter()
            .find(|l| !(1..=6).contains(*l))
        {
            return Err(EnhanceError::Config(format!(
                "toc.heading_levels entries must be 1-6, got {level}"
            )));
        }
        if self.reading_time.words_per_minute == 0 {
            return Err(EnhanceError::Config(
                "reading_time.words_per_minute must be positive".to_string(),
            ));
        }
        for selector in [
            &self.content_selector,
            &self.toc.nav_link_selector,
            &self.external_links.selector,
            &self.copy_feedback.button_selector,
            &self.smooth_scroll.anchor_selector,
            &self.version_badge.target_selector,
            &self.code_labels.selector,
            &self.shortcuts.search_selector,
        ] {
            Selector::parse(selector)?;
        }
        Ok(())
    }
}
