//! Permission bit flags
//!
//! Mirrors the gateway API v7 permission bitfield.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Guild and channel permission flags
    ///
    /// Serialized as a decimal string in JSON, accepted as string or number.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        const CREATE_INSTANT_INVITE = 0x1;
        const KICK_MEMBERS          = 0x2;
        const BAN_MEMBERS           = 0x4;
        /// Bypasses every other permission check
        const ADMINISTRATOR         = 0x8;
        const MANAGE_CHANNELS       = 0x10;
        const MANAGE_GUILD          = 0x20;
        const ADD_REACTIONS         = 0x40;
        const VIEW_AUDIT_LOG        = 0x80;
        const PRIORITY_SPEAKER      = 0x100;
        const STREAM                = 0x200;
        const VIEW_CHANNEL          = 0x400;
        const SEND_MESSAGES         = 0x800;
        const SEND_TTS_MESSAGES     = 0x1000;
        const MANAGE_MESSAGES       = 0x2000;
        const EMBED_LINKS           = 0x4000;
        const ATTACH_FILES          = 0x8000;
        const READ_MESSAGE_HISTORY  = 0x10000;
        const MENTION_EVERYONE      = 0x20000;
        const USE_EXTERNAL_EMOJIS   = 0x40000;
        // 0x80000 is unassigned in v7
        const CONNECT               = 0x100000;
        const SPEAK                 = 0x200000;
        const MUTE_MEMBERS          = 0x400000;
        const DEAFEN_MEMBERS        = 0x800000;
        const MOVE_MEMBERS          = 0x1000000;
        /// Voice activity detection
        const USE_VAD               = 0x2000000;
        const CHANGE_NICKNAME       = 0x4000000;
        const MANAGE_NICKNAMES      = 0x8000000;
        const MANAGE_ROLES          = 0x10000000;
        const MANAGE_WEBHOOKS       = 0x20000000;
        const MANAGE_EMOJIS         = 0x40000000;
    }
}

impl Permissions {
    /// Check if the permission set contains a required permission
    ///
    /// Administrators bypass all permission checks.
    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        self.contains(Permissions::ADMINISTRATOR) || self.contains(permission)
    }

    /// Check if the permission set has any of the given permissions
    #[inline]
    pub fn has_any(&self, permissions: Permissions) -> bool {
        self.contains(Permissions::ADMINISTRATOR) || self.intersects(permissions)
    }

    /// Combine permissions from multiple roles
    pub fn combine<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = Permissions>,
    {
        roles.into_iter().fold(Permissions::empty(), |acc, p| acc | p)
    }

    /// Parse from a decimal string, dropping unknown bits
    pub fn parse(s: &str) -> Result<Self, std::num::ParseIntError> {
        s.parse::<u64>().map(Permissions::from_bits_truncate)
    }

    /// Names of all flags that are set, in bit order
    pub fn list(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::empty()
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.bits().to_string())
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct PermissionsVisitor;

        impl Visitor<'_> for PermissionsVisitor {
            type Value = Permissions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing permission bits")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Ok(Permissions::from_bits_truncate(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(Permissions::from_bits_truncate)
                    .map_err(|_| de::Error::custom("negative permission bits"))
            }

            fn visit_str<E>(self, value: &str) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Permissions::parse(value).map_err(|_| de::Error::custom("invalid permissions string"))
            }
        }

        deserializer.deserialize_any(PermissionsVisitor)
    }
}

impl From<u64> for Permissions {
    fn from(bits: u64) -> Self {
        Permissions::from_bits_truncate(bits)
    }
}

impl From<Permissions> for u64 {
    fn from(perms: Permissions) -> Self {
        perms.bits()
    }
}
