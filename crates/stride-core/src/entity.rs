//! The catalog of entity types that migrate from the legacy document
//! store to the relational store.
//!
//! Each entity carries its namespace (identity derivation + logging),
//! its legacy collection name, its target-key strategy, and its
//! on-existing write policy. Append-only, point-in-time facts use
//! `Skip`; mutable per-user documents use `Overwrite`.

use std::fmt;

/// What a backfill pass does when the target row already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnExisting {
    /// Leave the existing row untouched and count it as skipped.
    Skip,
    /// Re-translate the legacy document and overwrite the row.
    Overwrite,
}

/// How an entity's target primary key is formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    /// `derive_target_id(namespace, legacy_id)` — append-only entities.
    Derived,
    /// Natural composite key `(user_id, pillar_id)`.
    UserPillar,
    /// Natural key `user_id` — one row per user.
    User,
}

/// One migrating entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    CheckIn,
    ActionPlan,
    CoachMessage,
    PillarScore,
    OnboardingProfile,
    UserCoreState,
}

impl EntityKind {
    /// All migrating entity types, in backfill order.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::CheckIn,
        EntityKind::ActionPlan,
        EntityKind::CoachMessage,
        EntityKind::PillarScore,
        EntityKind::OnboardingProfile,
        EntityKind::UserCoreState,
    ];

    /// Namespace used for identity derivation and log tagging.
    /// Stable forever — changing one would re-key every derived row.
    pub fn namespace(self) -> &'static str {
        match self {
            EntityKind::CheckIn => "pillar_check_in",
            EntityKind::ActionPlan => "action_plan",
            EntityKind::CoachMessage => "coach_message",
            EntityKind::PillarScore => "pillar_score",
            EntityKind::OnboardingProfile => "onboarding_profile",
            EntityKind::UserCoreState => "user_core_state",
        }
    }

    /// Collection name in the legacy document store.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::CheckIn => "pillar_check_ins",
            EntityKind::ActionPlan => "action_plans",
            EntityKind::CoachMessage => "coach_messages",
            EntityKind::PillarScore => "pillar_scores",
            EntityKind::OnboardingProfile => "onboarding_profiles",
            EntityKind::UserCoreState => "user_core_state",
        }
    }

    pub fn key_strategy(self) -> KeyStrategy {
        match self {
            EntityKind::CheckIn | EntityKind::ActionPlan | EntityKind::CoachMessage => {
                KeyStrategy::Derived
            }
            EntityKind::PillarScore => KeyStrategy::UserPillar,
            EntityKind::OnboardingProfile | EntityKind::UserCoreState => KeyStrategy::User,
        }
    }

    pub fn policy(self) -> OnExisting {
        match self.key_strategy() {
            KeyStrategy::Derived => OnExisting::Skip,
            KeyStrategy::UserPillar | KeyStrategy::User => OnExisting::Overwrite,
        }
    }

    /// Whether this entity can be scoped by a pillar identifier.
    pub fn has_pillar_scope(self) -> bool {
        matches!(
            self,
            EntityKind::CheckIn | EntityKind::ActionPlan | EntityKind::PillarScore
        )
    }

    /// Which timestamp orders and dates this entity for recency checks:
    /// `created_at` for append-only facts, `updated_at` for mutable rows.
    pub fn recency_column(self) -> &'static str {
        match self.policy() {
            OnExisting::Skip => "created_at",
            OnExisting::Overwrite => "updated_at",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policies_follow_key_strategy() {
        for kind in EntityKind::ALL {
            match kind.key_strategy() {
                KeyStrategy::Derived => assert_eq!(kind.policy(), OnExisting::Skip),
                _ => assert_eq!(kind.policy(), OnExisting::Overwrite),
            }
        }
    }

    #[test]
    fn namespaces_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for kind in EntityKind::ALL {
            assert!(seen.insert(kind.namespace()), "duplicate namespace: {}", kind);
        }
    }
}
