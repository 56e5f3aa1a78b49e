//! HTTP routes.
//!
//! ## Layout
//! ```text
//! /health                              liveness + migration status
//! /api/auth/*                          login, current user
//! /api/menu, /api/categories           public catalog
//! /api/coupons/check                   coupon preview
//! /api/orders, /api/orders/quote       cart pricing and placement
//! /api/orders/{id}/checkout            processor amount
//! /api/payment-methods                 enabled methods
//! /api/reservations                    table booking
//! /api/webhook/{stripe,paypal}         signed gateway callbacks
//! /api/admin/*                         staff dashboard (bearer token)
//! ```

mod addons;
mod auth;
mod categories;
mod charges;
mod coupons;
mod health;
mod menu_items;
mod orders;
mod payment_methods;
mod reservations;
mod settings;
mod users;
mod variants;
mod webhooks;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Builds the complete router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(categories::routes())
        .merge(menu_items::routes())
        .merge(addons::routes())
        .merge(charges::routes())
        .merge(variants::routes())
        .merge(coupons::routes())
        .merge(orders::routes())
        .merge(payment_methods::routes())
        .merge(reservations::routes())
        .merge(settings::routes())
        .merge(users::routes())
        .merge(webhooks::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
