//! Pricing settings synchronisation.
//!
//! The shop's delivery fee and free-delivery threshold are managed in the
//! admin panel and exposed through `/settings/general`. The cart starts with
//! the configured defaults and picks up the live values once fetched.

use std::sync::{Mutex, PoisonError};

use classic_carry_core::{Price, PricingConfig};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError, GeneralSettings};
use crate::cart::CartStore;

/// Map general settings onto a pricing config.
///
/// Missing, zero or negative values fall back to the defaults (200 / 4000).
#[must_use]
pub fn pricing_from(settings: &GeneralSettings) -> PricingConfig {
    let fee = positive_or(
        settings.shipping_fee,
        PricingConfig::DEFAULT_DELIVERY_FEE,
    );
    let threshold = positive_or(
        settings.free_shipping_threshold,
        PricingConfig::DEFAULT_FREE_DELIVERY_THRESHOLD,
    );
    // Both values are strictly positive here.
    PricingConfig::new(fee, threshold).unwrap_or_default()
}

fn positive_or(value: Option<Decimal>, default: i64) -> Price {
    value
        .filter(|v| *v > Decimal::ZERO)
        .map_or_else(|| Price::from_units(default), Price::new)
}

/// Fetch general settings and apply their pricing to `cart`.
///
/// On failure the cart keeps its current config and the error is returned
/// for the caller to report.
///
/// # Errors
///
/// Returns `ApiError` if the settings cannot be fetched.
#[instrument(skip_all)]
pub async fn sync_pricing(api: &ApiClient, cart: &Mutex<CartStore>) -> Result<GeneralSettings, ApiError> {
    let settings = match api.general_settings().await {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %e, "Failed to fetch general settings, keeping current pricing");
            return Err(e);
        }
    };

    let config = pricing_from(&settings);
    cart.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .update_config(config);
    info!(
        delivery_fee = %config.delivery_fee(),
        free_delivery_threshold = %config.free_delivery_threshold(),
        "Pricing settings applied"
    );
    Ok(settings)
}
