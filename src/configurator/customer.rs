//! Customer contact record collected on the first wizard step.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("static email regex")
});

/// Contact information for the customer placing the order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub consent: bool,
}

fn min_chars(value: &str, min: usize) -> bool {
    value.trim().chars().count() >= min
}

impl CustomerInfo {
    /// Check every field and return all failures, not just the first one.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if !min_chars(&self.name, 2) {
            errors.push(FieldError {
                field: "name",
                message: "El nombre debe tener al menos 2 caracteres.",
            });
        }
        if !EMAIL_RE.is_match(self.email.trim()) {
            errors.push(FieldError {
                field: "email",
                message: "Por favor, ingrese un email válido.",
            });
        }
        if !min_chars(&self.phone, 7) {
            errors.push(FieldError {
                field: "phone",
                message: "Por favor, ingrese un número de teléfono válido.",
            });
        }
        if !min_chars(&self.company, 2) {
            errors.push(FieldError {
                field: "company",
                message: "El nombre de la empresa debe tener al menos 2 caracteres.",
            });
        }
        if !min_chars(&self.country, 2) {
            errors.push(FieldError {
                field: "country",
                message: "Por favor, ingrese un país.",
            });
        }
        if !self.consent {
            errors.push(FieldError {
                field: "consent",
                message: "Debe aceptar los términos y condiciones.",
            });
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
