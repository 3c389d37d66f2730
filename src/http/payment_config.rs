//! Payment method configuration endpoints.
//!
//! `GET` and `PUT /api/payment-config/{stripe,credit-card,bank-transfer}`.
//! Secrets are always returned masked; masked values sent back are replaced
//! by the stored secret before validation.

use axum::{Json, Router, extract::State, routing::get, routing::post};

use super::response::{ApiResponse, JsonResponse};
use super::routes::RouteModule;
use crate::app::AppState;
use crate::payment_config::{
    BankTransferConfig, ConnectionTest, CreditCardConfig, PaymentMethodConfig, StripeConfig,
    method_slug,
};

async fn get_config<C: PaymentMethodConfig>(State(state): State<AppState>) -> JsonResponse<C> {
    let config: C = state.payment_config.load().await?;
    Ok(ApiResponse::success(config.masked()))
}

async fn put_config<C: PaymentMethodConfig>(
    State(state): State<AppState>,
    Json(config): Json<C>,
) -> JsonResponse<C> {
    let saved = state.payment_config.save_edited(config).await?;
    Ok(ApiResponse::success_with_message(
        saved.masked(),
        "Configuration enregistrée",
    ))
}

async fn test_stripe(
    State(state): State<AppState>,
    Json(config): Json<StripeConfig>,
) -> JsonResponse<ConnectionTest> {
    let config = state.payment_config.restore_secrets(config).await?;
    let result = state.payment_config.test_stripe_connection(&config).await?;
    Ok(ApiResponse::success(result))
}

fn method_path<C: PaymentMethodConfig>() -> String {
    format!("/{}", method_slug(C::METHOD))
}

/// Routes under `/api/payment-config`.
pub struct PaymentConfigModule;

impl RouteModule for PaymentConfigModule {
    fn routes(&self) -> Router<AppState> {
        Router::new()
            .route(
                &method_path::<StripeConfig>(),
                get(get_config::<StripeConfig>).put(put_config::<StripeConfig>),
            )
            .route(
                &method_path::<CreditCardConfig>(),
                get(get_config::<CreditCardConfig>).put(put_config::<CreditCardConfig>),
            )
            .route(
                &method_path::<BankTransferConfig>(),
                get(get_config::<BankTransferConfig>).put(put_config::<BankTransferConfig>),
            )
            .route("/stripe/test", post(test_stripe))
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api/payment-config")
    }
}
