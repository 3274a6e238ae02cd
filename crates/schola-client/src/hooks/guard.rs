//! Admin page gate.
//!
//! Decides whether an admin-only view may render for the current account.
//! This gating is advisory UI protection only — the ledger enforces
//! authorization on every admin transaction regardless.

use crate::hooks::account::AccountView;

/// Outcome of an admin gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAccess {
    /// The view may render.
    Allow,
    /// Navigate away to this target.
    Redirect(String),
}

/// Gate for admin-only views.
#[derive(Debug, Clone)]
pub struct AdminGate {
    redirect_to: String,
}

impl AdminGate {
    pub fn new(redirect_to: impl Into<String>) -> Self {
        Self {
            redirect_to: redirect_to.into(),
        }
    }

    /// Evaluate the gate. Redirects when the wallet needs installing, when
    /// the account has responded and is not an admin, or when the account
    /// came back empty. While the account is still loading, access stays
    /// open so the page can show its own loading state.
    pub fn evaluate(&self, require_install: bool, account: &AccountView) -> AdminAccess {
        let not_admin = account.cache.has_initial_response && !account.is_admin;
        if require_install || not_admin || account.cache.is_empty {
            AdminAccess::Redirect(self.redirect_to.clone())
        } else {
            AdminAccess::Allow
        }
    }
}
