//! Backend health commands.

use classic_carry_storefront::AppError;
use classic_carry_storefront::health::{HealthMonitor, HealthStatus};
use classic_carry_storefront::state::AppState;

/// Probe the API once.
///
/// # Errors
///
/// Returns an error if the backend is unavailable.
#[allow(clippy::print_stdout)]
pub async fn check(state: &AppState) -> Result<(), AppError> {
    let monitor = HealthMonitor::new(state.api().clone(), state.config().health);
    let status = monitor.check().await;
    println!("{}: {}", state.api().base_url(), label(status));
    if status.is_healthy() {
        Ok(())
    } else {
        Err(AppError::Unavailable(state.api().base_url().to_string()))
    }
}

/// Probe on the configured interval and print every change until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the Ctrl-C handler cannot be installed.
#[allow(clippy::print_stdout)]
pub async fn watch(state: &AppState) -> Result<(), AppError> {
    let handle = state.spawn_health_monitor();
    let mut rx = handle.subscribe();

    loop {
        let status = *rx.borrow_and_update();
        println!("{}: {}", state.api().base_url(), label(status));

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
        }
    }
    Ok(())
}

const fn label(status: HealthStatus) -> &'static str {
    match status {
        HealthStatus::Checking => "checking",
        HealthStatus::Healthy => "healthy",
        HealthStatus::Unhealthy => "backend unavailable",
    }
}
