//! Status and option enums for orders.
//!
//! Serialized names match the keys the storefront already writes to
//! `orders_<email>` (`"confirmed"`, `"credit-card"`, `"same-day"`).

use serde::{Deserialize, Serialize};

use crate::Price;

/// Lifecycle status of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Payment accepted; every checkout produces this status.
    #[default]
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Confirmed => "Confirmed",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    DebitCard,
    Transfer,
    MercadoPago,
}

impl PaymentMethod {
    /// Whether this method needs card number, expiry, CVV and cardholder name.
    #[must_use]
    pub const fn requires_card_details(self) -> bool {
        matches!(self, Self::CreditCard | Self::DebitCard)
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreditCard => "Credit card",
            Self::DebitCard => "Debit card",
            Self::Transfer => "Bank transfer",
            Self::MercadoPago => "Mercado Pago",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreditCard => write!(f, "credit-card"),
            Self::DebitCard => write!(f, "debit-card"),
            Self::Transfer => write!(f, "transfer"),
            Self::MercadoPago => write!(f, "mercado-pago"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit-card" => Ok(Self::CreditCard),
            "debit-card" => Ok(Self::DebitCard),
            "transfer" => Ok(Self::Transfer),
            "mercado-pago" => Ok(Self::MercadoPago),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Delivery option chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
    SameDay,
}

impl ShippingMethod {
    /// All options, in display order.
    pub const ALL: [Self; 3] = [Self::Standard, Self::Express, Self::SameDay];

    /// Flat shipping fee.
    #[must_use]
    pub fn price(self) -> Price {
        match self {
            Self::Standard => Price::ZERO,
            Self::Express => Price::from_units(500),
            Self::SameDay => Price::from_units(1200),
        }
    }

    /// Expected delivery window.
    #[must_use]
    pub const fn delivery_time(self) -> &'static str {
        match self {
            Self::Standard => "5-7 business days",
            Self::Express => "2-3 business days",
            Self::SameDay => "Today before 8pm",
        }
    }
}

impl std::fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Express => write!(f, "express"),
            Self::SameDay => write!(f, "same-day"),
        }
    }
}

impl std::str::FromStr for ShippingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            "same-day" => Ok(Self::SameDay),
            _ => Err(format!("invalid shipping method: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shipping_prices() {
        assert_eq!(ShippingMethod::Standard.price(), Price::ZERO);
        assert_eq!(ShippingMethod::Express.price(), Price::from_units(500));
        assert_eq!(ShippingMethod::SameDay.price(), Price::from_units(1200));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::MercadoPago).unwrap(),
            "\"mercado-pago\""
        );
        assert_eq!(
            serde_json::to_string(&ShippingMethod::SameDay).unwrap(),
            "\"same-day\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
    }

    #[test]
    fn test_display_matches_from_str() {
        for method in ShippingMethod::ALL {
            assert_eq!(method.to_string().parse::<ShippingMethod>().unwrap(), method);
        }
        assert!("pigeon".parse::<ShippingMethod>().is_err());
        assert_eq!(
            "debit-card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::DebitCard
        );
    }

    #[test]
    fn test_card_details_required() {
        assert!(PaymentMethod::CreditCard.requires_card_details());
        assert!(PaymentMethod::DebitCard.requires_card_details());
        assert!(!PaymentMethod::Transfer.requires_card_details());
        assert!(!PaymentMethod::MercadoPago.requires_card_details());
    }
}
