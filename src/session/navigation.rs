// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Routes the session can send the user to, and the re-entrancy guard that
//! keeps role selection from navigating twice.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use crate::identity::Role;

/// Destinations the session layer navigates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Anonymous landing page
    Landing,
    /// Connect/login entry point
    Connect,
    /// First-time registration and role selection
    RoleSelection,
    BuyerDashboard,
    SellerDashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Connect => "/connect",
            Route::RoleSelection => "/select-role",
            Route::BuyerDashboard => "/dashboard/buyer",
            Route::SellerDashboard => "/dashboard/seller",
        }
    }

    /// Home route for a user; role selection while the role is unset.
    pub fn dashboard_for(role: Option<Role>) -> Route {
        match role {
            Some(Role::Buyer) => Route::BuyerDashboard,
            Some(Role::Seller) => Route::SellerDashboard,
            None => Route::RoleSelection,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Sink for navigation requests, implemented by the view layer's router.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Time-boxed re-entrancy flag.
///
/// Cooperative only: it blocks a second claim inside the window, it does
/// not serialize the work done under the first claim.
pub struct NavigationCooldown {
    window: Duration,
    started_at: Mutex<Option<Instant>>,
}

impl NavigationCooldown {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            started_at: Mutex::new(None),
        }
    }

    /// Claim the slot. Returns `false` while an earlier claim is still live.
    pub fn try_begin(&self) -> bool {
        let mut started_at = match self.started_at.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(at) = *started_at {
            if at.elapsed() < self.window {
                return false;
            }
        }

        *started_at = Some(Instant::now());
        true
    }

    /// Release the slot early, e.g. when the guarded call failed.
    pub fn cancel(&self) {
        if let Ok(mut started_at) = self.started_at.lock() {
            *started_at = None;
        }
    }

    pub fn is_active(&self) -> bool {
        self.started_at
            .lock()
            .ok()
            .and_then(|started_at| *started_at)
            .is_some_and(|at| at.elapsed() < self.window)
    }
}
