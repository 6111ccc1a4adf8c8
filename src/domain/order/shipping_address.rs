//! Structured shipping address captured on orders and subscriptions.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Delivery address. Every field except `number` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub email: String,
    pub street: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl ShippingAddress {
    /// Checks required fields and the shape of the email address.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("full_name", &self.full_name),
            ("email", &self.email),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zip_code", &self.zip_code),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::empty_field(field));
            }
        }

        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(ValidationError::invalid_format(
                "email",
                "expected an address like name@example.com",
            )),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        street: "Rua das Flores".to_string(),
        number: Some("42".to_string()),
        city: "Lisbon".to_string(),
        state: "LX".to_string(),
        zip_code: "1200-195".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_address_validates() {
        assert!(test_address().validate().is_ok());
    }

    #[test]
    fn street_number_is_optional() {
        let address = ShippingAddress {
            number: None,
            ..test_address()
        };
        assert!(address.validate().is_ok());
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let address = ShippingAddress {
            city: "   ".to_string(),
            ..test_address()
        };
        let err = address.validate().unwrap_err();
        assert_eq!(err.field(), "city");
    }

    #[test]
    fn malformed_email_is_rejected() {
        for email in ["ada", "@example.com", "ada@localhost"] {
            let address = ShippingAddress {
                email: email.to_string(),
                ..test_address()
            };
            assert!(address.validate().is_err(), "{}", email);
        }
    }

    #[test]
    fn deserializes_without_number() {
        let json = r#"{
            "full_name": "Ada Lovelace",
            "email": "ada@example.com",
            "street": "Main St",
            "city": "Springfield",
            "state": "IL",
            "zip_code": "62701"
        }"#;
        let address: ShippingAddress = serde_json::from_str(json).unwrap();
        assert!(address.number.is_none());
    }
}
