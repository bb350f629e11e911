//! The closed permission catalog and role-level ordinals.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An atomic capability in `<domain>:<action>` form.
///
/// The catalog is closed: call sites match on variants rather than parsing
/// arbitrary strings, and unknown strings fail to deserialize. Resolution is
/// purely additive; there is no deny variant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum Permission {
    /// View support tickets
    #[strum(serialize = "ticket:view")]
    #[serde(rename = "ticket:view")]
    TicketView,
    /// Create, close, and reassign support tickets
    #[strum(serialize = "ticket:manage")]
    #[serde(rename = "ticket:manage")]
    TicketManage,
    /// View votes and poll results
    #[strum(serialize = "vote:view")]
    #[serde(rename = "vote:view")]
    VoteView,
    /// Create and close votes
    #[strum(serialize = "vote:manage")]
    #[serde(rename = "vote:manage")]
    VoteManage,
    /// Run and cancel giveaways
    #[strum(serialize = "giveaway:manage")]
    #[serde(rename = "giveaway:manage")]
    GiveawayManage,
    /// View guild analytics
    #[strum(serialize = "analytics:view")]
    #[serde(rename = "analytics:view")]
    AnalyticsView,
    /// Trigger and restore backups
    #[strum(serialize = "backup:manage")]
    #[serde(rename = "backup:manage")]
    BackupManage,
    /// Kick members
    #[strum(serialize = "member:kick")]
    #[serde(rename = "member:kick")]
    MemberKick,
    /// Ban members
    #[strum(serialize = "member:ban")]
    #[serde(rename = "member:ban")]
    MemberBan,
    /// Edit member profiles and nicknames
    #[strum(serialize = "member:manage")]
    #[serde(rename = "member:manage")]
    MemberManage,
    /// View role definitions and assignments
    #[strum(serialize = "role:view")]
    #[serde(rename = "role:view")]
    RoleView,
    /// Create roles and manage assignments
    #[strum(serialize = "role:manage")]
    #[serde(rename = "role:manage")]
    RoleManage,
    /// Read the security audit log
    #[strum(serialize = "audit:view")]
    #[serde(rename = "audit:view")]
    AuditView,
    /// Export audit data and compliance reports
    #[strum(serialize = "audit:export")]
    #[serde(rename = "audit:export")]
    AuditExport,
    /// Call programmatic API endpoints
    #[strum(serialize = "api:access")]
    #[serde(rename = "api:access")]
    ApiAccess,
    /// Manage API keys
    #[strum(serialize = "api:admin")]
    #[serde(rename = "api:admin")]
    ApiAdmin,
    /// Change guild configuration
    #[strum(serialize = "config:manage")]
    #[serde(rename = "config:manage")]
    ConfigManage,
    /// Unrestricted administrative access
    #[strum(serialize = "system:admin")]
    #[serde(rename = "system:admin")]
    SystemAdmin,
}

/// Standard role-level ordinals. Higher means more privileged.
///
/// Levels are plain ordinals on `Role`; these named tiers exist so the
/// built-in system roles agree on their relative ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum RoleLevel {
    /// Ordinary guild member
    Member,
    /// Support staff handling tickets
    Support,
    /// Moderator with member and content powers
    Moderator,
    /// Administrator
    Admin,
    /// Guild owner
    Owner,
}

impl RoleLevel {
    /// Numeric ordinal for comparison against `Role::level`.
    pub fn ordinal(&self) -> i32 {
        match self {
            RoleLevel::Member => 10,
            RoleLevel::Support => 40,
            RoleLevel::Moderator => 60,
            RoleLevel::Admin => 90,
            RoleLevel::Owner => 100,
        }
    }

    /// Default permission bundle granted to system roles at this level.
    pub fn default_permissions(&self) -> HashSet<Permission> {
        let perms: &[Permission] = match self {
            RoleLevel::Member => &[Permission::TicketView, Permission::VoteView],
            RoleLevel::Support => &[
                Permission::TicketView,
                Permission::TicketManage,
                Permission::VoteView,
            ],
            RoleLevel::Moderator => &[
                Permission::TicketView,
                Permission::TicketManage,
                Permission::VoteView,
                Permission::VoteManage,
                Permission::GiveawayManage,
                Permission::MemberKick,
                Permission::MemberManage,
                Permission::RoleView,
            ],
            RoleLevel::Admin => &[
                Permission::TicketView,
                Permission::TicketManage,
                Permission::VoteView,
                Permission::VoteManage,
                Permission::GiveawayManage,
                Permission::AnalyticsView,
                Permission::BackupManage,
                Permission::MemberKick,
                Permission::MemberBan,
                Permission::MemberManage,
                Permission::RoleView,
                Permission::RoleManage,
                Permission::AuditView,
                Permission::AuditExport,
                Permission::ApiAccess,
                Permission::ApiAdmin,
                Permission::ConfigManage,
            ],
            RoleLevel::Owner => &[Permission::SystemAdmin],
        };
        perms.iter().copied().collect()
    }
}
