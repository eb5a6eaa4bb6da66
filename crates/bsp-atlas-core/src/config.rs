use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::packer::PADDING;

/// Order in which images are offered to the tree on every page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Descending by `width + height`; ties keep input order.
    #[default]
    SumDesc,
    /// Keep input order.
    None,
}

impl FromStr for SortOrder {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sum_desc" | "sum" => Ok(Self::SumDesc),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Page file stem. Page `n` is written as `{name}{n}.png`.
    #[serde(default = "default_name")]
    pub name: String,
    /// Gap in pixels reserved on the remainder side of every split.
    #[serde(default = "default_padding")]
    pub padding: u32,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            padding: default_padding(),
            sort_order: SortOrder::default(),
        }
    }
}

impl AtlasConfig {
    /// Validates the configuration parameters.
    ///
    /// The page name must be non-empty and must not contain path separators, since it is
    /// joined onto the output directory.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::AtlasError;

        if self.name.trim().is_empty() {
            return Err(AtlasError::InvalidConfig("name must not be empty".into()));
        }
        if self.name.contains(['/', '\\']) {
            return Err(AtlasError::InvalidConfig(format!(
                "name ({}) must not contain path separators",
                self.name
            )));
        }
        Ok(())
    }

    /// File name of page `n` (1-based).
    pub fn page_file_name(&self, n: usize) -> String {
        format!("{}{}.png", self.name, n)
    }
}

fn default_name() -> String {
    "atlas".into()
}
fn default_padding() -> u32 {
    PADDING
}

/// Builder for `AtlasConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct AtlasConfigBuilder {
    cfg: AtlasConfig,
}

impl AtlasConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: AtlasConfig::default(),
        }
    }
    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.cfg.name = v.into();
        self
    }
    pub fn padding(mut self, v: u32) -> Self {
        self.cfg.padding = v;
        self
    }
    pub fn sort_order(mut self, v: SortOrder) -> Self {
        self.cfg.sort_order = v;
        self
    }
    pub fn build(self) -> AtlasConfig {
        self.cfg
    }
}

impl AtlasConfig {
    /// Create a fluent builder for `AtlasConfig`.
    pub fn builder() -> AtlasConfigBuilder {
        AtlasConfigBuilder::new()
    }
}
