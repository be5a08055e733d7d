#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Role and scope validation
//!
//! A pure function of `(intent, role, user_id, partner_id)`. Runs before
//! any engine is consulted, so a denial costs nothing but the
//! classification that preceded it. The permission table is code, not
//! configuration: a new intent fails to compile until it gets a row here
//! and a route in the router.

use wayfinder_core::{AccessDecision, AccessScope, Intent, RefusalReason, Role};

/// Evaluate the permission table for one query
///
/// Partner-scoped intents require `partner_id` to be present and equal to
/// `user_id`; a mismatch is reported as `scope_mismatch`, distinct from
/// `role_forbidden`, so callers can tell a wrong account from a wrong
/// role.
pub fn validate(
    intent: Intent,
    role: Role,
    user_id: &str,
    partner_id: Option<&str>,
) -> AccessDecision {
    match (intent, role) {
        // Open to everyone
        (Intent::Recommendation | Intent::Policy | Intent::Navigation | Intent::Troubleshooting, _) => {
            AccessDecision::Allowed {
                scope: AccessScope::Unrestricted,
            }
        }

        // Travelers only, constrained to their own records
        (Intent::SavedItems, Role::Traveler) => AccessDecision::Allowed {
            scope: AccessScope::User(user_id.to_owned()),
        },
        (Intent::SavedItems, Role::Partner | Role::Admin) => AccessDecision::Denied {
            reason: RefusalReason::RoleForbidden,
        },

        // Partner-scoped reads: partners see exactly themselves, admins
        // see the whole system
        (Intent::Analytics | Intent::Revenue, Role::Partner) => match partner_id {
            Some(partner_id) if partner_id == user_id => AccessDecision::Allowed {
                scope: AccessScope::Partner(partner_id.to_owned()),
            },
            _ => AccessDecision::Denied {
                reason: RefusalReason::ScopeMismatch,
            },
        },
        (Intent::Analytics | Intent::Revenue, Role::Admin) => AccessDecision::Allowed {
            scope: AccessScope::Unrestricted,
        },
        (Intent::Analytics | Intent::Revenue, Role::Traveler) => AccessDecision::Denied {
            reason: RefusalReason::RoleForbidden,
        },

        // Admins only
        (Intent::Moderation, Role::Admin) => AccessDecision::Allowed {
            scope: AccessScope::Unrestricted,
        },
        (Intent::Moderation, Role::Traveler | Role::Partner) => AccessDecision::Denied {
            reason: RefusalReason::RoleForbidden,
        },
    }
}
