//! Shop settings commands.

use classic_carry_core::PaymentMethod;
use classic_carry_storefront::AppError;
use classic_carry_storefront::state::AppState;

/// Fetch the general settings and print the pricing they produce.
///
/// # Errors
///
/// Returns an error if the settings cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn sync(state: &AppState) -> Result<(), AppError> {
    let settings = state.sync_settings().await?;
    let symbol = settings.symbol();
    let pricing = state.cart().config();

    println!("Currency:            {symbol}");
    println!(
        "Delivery fee:        {}",
        pricing.delivery_fee().display_with(symbol)
    );
    println!(
        "Free delivery from:  {}",
        pricing.free_delivery_threshold().display_with(symbol)
    );

    let methods: Vec<&str> = settings
        .payment_methods()
        .into_iter()
        .map(|method| match method {
            PaymentMethod::Cod => "cash on delivery",
            PaymentMethod::Online => "online",
        })
        .collect();
    if methods.is_empty() {
        println!("Payment methods:     none enabled");
    } else {
        println!("Payment methods:     {}", methods.join(", "));
    }
    Ok(())
}
