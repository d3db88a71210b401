//! REST and CDN endpoint builders

use crate::value_objects::Snowflake;

/// Public website
pub const WEB: &str = "https://discordapp.com";

/// REST API, version 7
pub const API: &str = "https://discordapp.com/api/v7";

/// Content delivery network
pub const CDN: &str = "https://cdn.discordapp.com";

/// Builds REST API URLs against a base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Api {
    base: String,
}

impl Api {
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Authenticated endpoint returning the gateway URL for bots
    #[must_use]
    pub fn gateway_bot(&self) -> String {
        format!("{}/gateway/bot", self.base)
    }
}

impl Default for Api {
    fn default() -> Self {
        Self::new(API)
    }
}

/// Builds CDN asset URLs against a base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cdn {
    base: String,
}

impl Cdn {
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    /// User avatar; animated hashes (`a_` prefix) resolve to a gif
    #[must_use]
    pub fn avatar(&self, user_id: Snowflake, hash: &str) -> String {
        format!("{}/avatars/{user_id}/{hash}.{}", self.base, image_extension(hash))
    }

    /// Guild icon
    #[must_use]
    pub fn icon(&self, guild_id: Snowflake, hash: &str) -> String {
        format!("{}/icons/{guild_id}/{hash}.{}", self.base, image_extension(hash))
    }

    /// Custom emoji image
    #[must_use]
    pub fn emoji(&self, emoji_id: Snowflake, animated: bool) -> String {
        let ext = if animated { "gif" } else { "png" };
        format!("{}/emojis/{emoji_id}.{ext}", self.base)
    }
}

impl Default for Cdn {
    fn default() -> Self {
        Self::new(CDN)
    }
}

fn image_extension(hash: &str) -> &'static str {
    if hash.starts_with("a_") {
        "gif"
    } else {
        "png"
    }
}
