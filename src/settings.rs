use serde::Deserialize;

use crate::error::BlogError;

const EMBEDDED_SETTINGS: &str = include_str!("../config/blog.json");

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// One image tag per line, everything else shown as text.
    #[default]
    Lines,
    /// Full markdown through pulldown-cmark, raw HTML escaped.
    Markdown,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Theme {
    pub accent_color: String,
    pub accent_secondary: String,
    pub bg_primary: String,
    pub bg_secondary: String,
    pub text_primary: String,
    pub text_muted: String,
    pub border_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent_color: "#9333ea".to_string(),
            accent_secondary: "#db2777".to_string(),
            bg_primary: "#111827".to_string(),
            bg_secondary: "#1f2937".to_string(),
            text_primary: "#f9fafb".to_string(),
            text_muted: "#9ca3af".to_string(),
            border_color: "#374151".to_string(),
        }
    }
}

impl Theme {
    pub fn css_variables(&self) -> String {
        format!(
            "--accent-color: {}; --accent-secondary: {}; --bg-primary: {}; --bg-secondary: {}; --text-primary: {}; --text-muted: {}; --border-color: {};",
            self.accent_color,
            self.accent_secondary,
            self.bg_primary,
            self.bg_secondary,
            self.text_primary,
            self.text_muted,
            self.border_color,
        )
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BlogSettings {
    pub site_title: String,
    pub journal_title: String,
    pub tagline: String,
    pub footer_text: String,
    /// Compared in the browser. It only unlocks the admin controls.
    pub admin_password: String,
    pub fallback_category: String,
    pub recent_posts_limit: usize,
    pub render_mode: RenderMode,
    pub log_level: String,
    pub theme: Theme,
}

impl Default for BlogSettings {
    fn default() -> Self {
        Self {
            site_title: "Chorem Blog".to_string(),
            journal_title: "Self Development Journal".to_string(),
            tagline: "Thoughts, insights, and strategies for personal growth".to_string(),
            footer_text: "© 2025 Chorem. All rights reserved.".to_string(),
            admin_password: "admin0321".to_string(),
            fallback_category: "Uncategorized".to_string(),
            recent_posts_limit: 5,
            render_mode: RenderMode::Lines,
            log_level: "info".to_string(),
            theme: Theme::default(),
        }
    }
}

impl BlogSettings {
    pub fn from_json(raw: &str) -> Result<Self, BlogError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Settings bundled at build time. Runs before the logger exists, so a
    /// broken file is handed back to the caller instead of logged here.
    pub fn load() -> Result<Self, BlogError> {
        Ok(Self::from_json(EMBEDDED_SETTINGS)?.with_env_overrides())
    }

    /// Applies `CHOREM_ADMIN_PASSWORD` when it was set at build time.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(password) = option_env!("CHOREM_ADMIN_PASSWORD") {
            self.admin_password = password.to_string();
        }
        self
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}
