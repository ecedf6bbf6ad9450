// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stripe API client for payment intents.

use crate::error::AppError;
use serde::Deserialize;

/// Currency for all payment intents.
pub const CURRENCY: &str = "usd";

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

/// Subset of the Stripe PaymentIntent object the service uses.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub client_secret: Option<String>,
}

impl StripeClient {
    pub fn new(base_url: &str, secret_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    /// Create a card payment intent for `amount_cents` minor units.
    pub async fn create_payment_intent(&self, amount_cents: i64) -> Result<PaymentIntent, AppError> {
        let url = format!("{}/payment_intents", self.base_url);
        let amount = amount_cents.to_string();

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&[
                ("amount", amount.as_str()),
                ("currency", CURRENCY),
                ("payment_method_types[]", "card"),
            ])
            .send()
            .await
            .map_err(|e| AppError::PaymentProvider(format!("Request failed: {}", e)))?;

        let intent: PaymentIntent = self.check_response_json(response).await?;
        tracing::info!(
            payment_intent_id = %intent.id,
            amount = intent.amount,
            "Payment intent created"
        );
        Ok(intent)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 401 {
                return Err(AppError::PaymentProvider(
                    "Stripe rejected the API key".to_string(),
                ));
            }

            return Err(AppError::PaymentProvider(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::PaymentProvider(format!("JSON parse error: {}", e)))
    }
}

/// Convert a major-unit amount to minor units, rounding to the nearest cent.
pub fn to_minor_units(amount: f64) -> Option<i64> {
    if !amount.is_finite() || amount <= 0.0 {
        return None;
    }
    let cents = (amount * 100.0).round();
    if cents < 1.0 || cents > i64::MAX as f64 {
        return None;
    }
    Some(cents as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(49.99), Some(4999));
        assert_eq!(to_minor_units(0.125), Some(13));
        assert_eq!(to_minor_units(10.0), Some(1000));
        assert_eq!(to_minor_units(0.0), None);
        assert_eq!(to_minor_units(-5.0), None);
        assert_eq!(to_minor_units(0.001), None);
        assert_eq!(to_minor_units(f64::NAN), None);
    }

    #[test]
    fn test_payment_intent_parses_stripe_shape() {
        let intent: PaymentIntent = serde_json::from_value(serde_json::json!({
            "id": "pi_123",
            "object": "payment_intent",
            "amount": 4999,
            "currency": "usd",
            "status": "requires_payment_method",
            "client_secret": "pi_123_secret_abc"
        }))
        .unwrap();

        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.client_secret.as_deref(), Some("pi_123_secret_abc"));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_provider_error() {
        let client = StripeClient::new("http://127.0.0.1:9/v1/", "sk_test".to_string());
        assert_eq!(client.base_url, "http://127.0.0.1:9/v1");

        let result = client.create_payment_intent(100).await;
        assert!(matches!(result, Err(AppError::PaymentProvider(_))));
    }
}
