//! Per-entity deletion policy.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionPolicy {
    /// Row is kept and flagged inactive.
    Soft,
    /// Row is removed and its attachment rows go with it.
    HardCascade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    HairCut,
    HairCutImage,
    User,
    PhotoUser,
}

impl EntityKind {
    pub fn deletion_policy(self) -> DeletionPolicy {
        match self {
            EntityKind::User => DeletionPolicy::Soft,
            EntityKind::HairCut | EntityKind::HairCutImage | EntityKind::PhotoUser => DeletionPolicy::HardCascade,
        }
    }

    pub fn table_name(self) -> &'static str {
        match self {
            EntityKind::HairCut => "haircut",
            EntityKind::HairCutImage => "haircut_image",
            EntityKind::User => "user",
            EntityKind::PhotoUser => "photo_user",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_are_soft_deleted() {
        assert_eq!(EntityKind::User.deletion_policy(), DeletionPolicy::Soft);
    }

    #[test]
    fn haircuts_and_attachments_cascade() {
        for kind in [EntityKind::HairCut, EntityKind::HairCutImage, EntityKind::PhotoUser] {
            assert_eq!(kind.deletion_policy(), DeletionPolicy::HardCascade);
        }
    }
}
