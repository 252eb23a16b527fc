//! Shared CLI plumbing for the two tool binaries: scope and store
//! flags, entity-subset selection, and tracing init.

use clap::Args;
use tracing_subscriber::EnvFilter;

use stride_core::config::MigrateConfig;
use stride_core::entity::EntityKind;

/// Scope filters shared by both tools.
#[derive(Debug, Args)]
pub struct ScopeFlags {
    /// Restrict the pass to one owner.
    #[arg(long = "user-id", value_name = "ID")]
    pub user_id: Option<String>,
    /// Restrict the pass to one pillar (pillar-scoped entities only).
    #[arg(long = "pillar", value_name = "ID")]
    pub pillar: Option<String>,
}

/// Entity-subset flags. Any combination unions; none selects all.
#[derive(Debug, Args)]
pub struct EntityFlags {
    /// Pillar check-ins only.
    #[arg(long)]
    pub checkins_only: bool,
    /// Action plans only.
    #[arg(long)]
    pub plans_only: bool,
    /// Coach messages only.
    #[arg(long)]
    pub messages_only: bool,
    /// Pillar scores only.
    #[arg(long)]
    pub scores_only: bool,
    /// Onboarding profiles only.
    #[arg(long)]
    pub profiles_only: bool,
    /// User core state only.
    #[arg(long)]
    pub core_state_only: bool,
}

impl EntityFlags {
    /// The entity types this invocation operates on, in backfill order.
    pub fn selected(&self) -> Vec<EntityKind> {
        let flagged: Vec<EntityKind> = [
            (self.checkins_only, EntityKind::CheckIn),
            (self.plans_only, EntityKind::ActionPlan),
            (self.messages_only, EntityKind::CoachMessage),
            (self.scores_only, EntityKind::PillarScore),
            (self.profiles_only, EntityKind::OnboardingProfile),
            (self.core_state_only, EntityKind::UserCoreState),
        ]
        .into_iter()
        .filter_map(|(on, kind)| on.then_some(kind))
        .collect();

        if flagged.is_empty() {
            EntityKind::ALL.to_vec()
        } else {
            flagged
        }
    }
}

/// Store path overrides. Environment values apply when absent.
#[derive(Debug, Args)]
pub struct StoreFlags {
    /// Legacy document-store database path.
    #[arg(long, value_name = "PATH")]
    pub legacy_db: Option<String>,
    /// Target relational database path.
    #[arg(long, value_name = "PATH")]
    pub target_db: Option<String>,
}

impl StoreFlags {
    pub fn build_config(&self) -> MigrateConfig {
        let mut config = MigrateConfig::from_env();
        if let Some(path) = &self.legacy_db {
            config.legacy_db_path = Some(path.clone());
        }
        if let Some(path) = &self.target_db {
            config.target_db_path = Some(path.clone());
        }
        config
    }
}

/// Structured logging for the tool binaries. `RUST_LOG` overrides the
/// default info level.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_selects_every_entity() {
        let flags = EntityFlags {
            checkins_only: false,
            plans_only: false,
            messages_only: false,
            scores_only: false,
            profiles_only: false,
            core_state_only: false,
        };
        assert_eq!(flags.selected(), EntityKind::ALL.to_vec());
    }

    #[test]
    fn subset_flags_union() {
        let flags = EntityFlags {
            checkins_only: true,
            plans_only: false,
            messages_only: false,
            scores_only: true,
            profiles_only: false,
            core_state_only: false,
        };
        assert_eq!(
            flags.selected(),
            vec![EntityKind::CheckIn, EntityKind::PillarScore]
        );
    }
}
