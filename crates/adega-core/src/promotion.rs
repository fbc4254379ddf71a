//! # Birthday Promotions
//!
//! Builds the messaging-app deep link the shop uses to greet customers on
//! their birthday. Nothing is sent from the server: the SPA opens the URL.
//!
//! ```text
//! phone "(11) 98765-4321"  ──► digits "11987654321" ──► "5511987654321"
//!                                                             │
//! https://wa.me/5511987654321?text=Feliz+anivers%C3%A1rio...  ◄┘
//! ```

use chrono::{Datelike, NaiveDate};
use url::Url;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::Customer;

const MESSAGING_BASE_URL: &str = "https://wa.me/";

/// Country code added to national numbers.
const DEFAULT_COUNTRY_CODE: &str = "55";

/// Normalizes a phone number to international digits.
///
/// National numbers (area code + number, 10 or 11 digits) get the
/// Brazilian country code prefixed.
pub fn normalize_phone(phone: &str) -> CoreResult<String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();

    match digits.len() {
        10 | 11 => Ok(format!("{DEFAULT_COUNTRY_CODE}{digits}")),
        12..=15 => Ok(digits),
        _ => Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain area code and number".to_string(),
        }
        .into()),
    }
}

/// Greeting text sent with the link.
pub fn birthday_message(customer_name: &str, store_name: &str) -> String {
    let first_name = customer_name.split_whitespace().next().unwrap_or(customer_name);
    format!(
        "Feliz aniversário, {first_name}! 🎉 A {store_name} preparou um presente especial para você. Venha nos visitar!"
    )
}

/// `https://wa.me/<digits>?text=<urlencoded message>`
pub fn message_link(phone: &str, text: &str) -> CoreResult<Url> {
    let digits = normalize_phone(phone)?;
    let mut url = Url::parse(MESSAGING_BASE_URL)
        .and_then(|base| base.join(&digits))
        .map_err(|e| ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: e.to_string(),
        })?;
    url.query_pairs_mut().append_pair("text", text);
    Ok(url)
}

/// Birthday deep link for a customer.
///
/// ## Errors
/// `Validation` when the customer has no usable phone number.
pub fn birthday_link(customer: &Customer, store_name: &str) -> CoreResult<Url> {
    let phone = customer
        .phone
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| {
            CoreError::from(ValidationError::Required {
                field: "phone".to_string(),
            })
        })?;
    message_link(phone, &birthday_message(&customer.name, store_name))
}

/// Whether the birth date falls in `month` (1-12).
pub fn has_birthday_in(birth_date: Option<NaiveDate>, month: u32) -> bool {
    birth_date.map(|d| d.month() == month).unwrap_or(false)
}
