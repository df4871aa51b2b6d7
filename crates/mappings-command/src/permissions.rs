//! Permission requirements for privileged command flags.

use serenity::model::permissions::Permissions;

/// Capabilities a caller must hold.
///
/// Matches when the caller holds every permission in `all_of` and, if
/// `any_of` is non-empty, at least one permission from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirements {
    pub all_of: Permissions,
    pub any_of: Permissions,
}

impl Requirements {
    pub const fn all_of(permissions: Permissions) -> Self {
        Self {
            all_of: permissions,
            any_of: Permissions::empty(),
        }
    }

    pub fn matches(&self, actual: Permissions) -> bool {
        if actual.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        actual.contains(self.all_of) && (self.any_of.is_empty() || actual.intersects(self.any_of))
    }
}

/// Required to change a guild's default lookup version.
pub const DEFAULT_VERSION_PERMS: Requirements = Requirements::all_of(Permissions::MANAGE_GUILD);
