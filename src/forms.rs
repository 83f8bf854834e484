//! Structured input for staff and customer edits, validated before anything
//! touches the store.

use chrono::NaiveTime;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("{0} is required")]
    EmptyField(&'static str),

    #[error("Montant invalide: {0:?}")]
    InvalidAmount(String),

    #[error("Heure de passage invalide: {0:?}")]
    InvalidPickupTime(String),
}

/// Parse a user-typed amount. Accepts `4.5`, `4,50`, surrounding spaces.
pub fn parse_amount(input: &str) -> Result<f64, FormError> {
    let normalized = input.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(FormError::InvalidAmount(input.to_string())),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub pickup_time: String,
}

impl CheckoutForm {
    /// Returns the pickup time as zero-padded `HH:MM`, so that string order
    /// matches time order.
    pub fn validate(&self) -> Result<String, FormError> {
        let raw = self.pickup_time.trim();
        if raw.is_empty() {
            return Err(FormError::EmptyField("pickup time"));
        }
        NaiveTime::parse_from_str(raw, "%H:%M")
            .map(|time| time.format("%H:%M").to_string())
            .map_err(|_| FormError::InvalidPickupTime(raw.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemForm {
    pub name: String,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidMenuItem {
    pub name: String,
    pub price: f64,
}

impl MenuItemForm {
    pub fn validate(&self) -> Result<ValidMenuItem, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::EmptyField("name"));
        }
        let price = parse_amount(&self.price)?;
        if price < 0.0 {
            return Err(FormError::InvalidAmount(self.price.clone()));
        }
        Ok(ValidMenuItem {
            name: name.to_string(),
            price,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryForm {
    pub label: String,
}

impl CategoryForm {
    pub fn validate(&self) -> Result<String, FormError> {
        let label = self.label.trim();
        if label.is_empty() {
            return Err(FormError::EmptyField("label"));
        }
        Ok(label.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TotalForm {
    pub amount: String,
}

impl TotalForm {
    pub fn validate(&self) -> Result<f64, FormError> {
        parse_amount(&self.amount)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastForm {
    pub message: String,
}

impl BroadcastForm {
    pub fn validate(&self) -> Result<String, FormError> {
        let message = self.message.trim();
        if message.is_empty() {
            return Err(FormError::EmptyField("message"));
        }
        Ok(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_accepts_comma_and_spaces() {
        assert_eq!(parse_amount(" 4,50 "), Ok(4.5));
        assert_eq!(parse_amount("12"), Ok(12.0));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(matches!(parse_amount("abc"), Err(FormError::InvalidAmount(_))));
        assert!(parse_amount("").is_err());
        assert!(parse_amount("inf").is_err());
        assert!(parse_amount("NaN").is_err());
    }

    #[test]
    fn test_checkout_pads_pickup_time() {
        let form = CheckoutForm {
            pickup_time: "9:05".to_string(),
        };
        assert_eq!(form.validate(), Ok("09:05".to_string()));
    }

    #[test]
    fn test_checkout_requires_pickup_time() {
        let form = CheckoutForm {
            pickup_time: "  ".to_string(),
        };
        assert_eq!(form.validate(), Err(FormError::EmptyField("pickup time")));

        let form = CheckoutForm {
            pickup_time: "25:00".to_string(),
        };
        assert!(matches!(form.validate(), Err(FormError::InvalidPickupTime(_))));
    }

    #[test]
    fn test_menu_item_form_rejects_negative_price() {
        let form = MenuItemForm {
            name: "Cortado".to_string(),
            price: "-1".to_string(),
        };
        assert!(form.validate().is_err());

        let form = MenuItemForm {
            name: " Cortado ".to_string(),
            price: "3.2".to_string(),
        };
        assert_eq!(
            form.validate(),
            Ok(ValidMenuItem {
                name: "Cortado".to_string(),
                price: 3.2
            })
        );
    }
}
