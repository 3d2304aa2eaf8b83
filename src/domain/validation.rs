//! Pre-submission validation for restaurant and menu item drafts.
//!
//! Errors are collected per field so a caller can report every problem at
//! once; nothing that fails here is ever sent to the backend.

use std::fmt;

use choplink_api_types::{
    MenuItemCreateRequest, MenuItemUpdateRequest, RestaurantCreateRequest,
    RestaurantUpdateRequest,
};

const MIN_NAME_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.fields
    }

    /// First message reported for `field`, if any.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation failed")?;
        for (index, error) in self.fields.iter().enumerate() {
            let sep = if index == 0 { ": " } else { "; " };
            write!(f, "{sep}{} ({})", error.message, error.field)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

fn check_name(errors: &mut ValidationErrors, name: &str, subject: &str) {
    if name.chars().count() < MIN_NAME_CHARS {
        errors.push(
            "name",
            format!("{subject} name must be at least {MIN_NAME_CHARS} characters."),
        );
    }
}

fn check_min(errors: &mut ValidationErrors, field: &'static str, value: i64, min: i64, message: &str) {
    if value < min {
        errors.push(field, message);
    }
}

pub fn validate_restaurant_create(request: &RestaurantCreateRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_name(&mut errors, &request.name, "Restaurant");
    errors.into_result()
}

pub fn validate_restaurant_update(request: &RestaurantUpdateRequest) -> Result<(), ValidationErrors> {
    if request.is_empty() {
        return Err(ValidationErrors::single(
            "request",
            "At least one field must be provided.",
        ));
    }

    let mut errors = ValidationErrors::default();
    if let Some(name) = request.name.as_deref() {
        check_name(&mut errors, name, "Restaurant");
    }
    if let Some(price) = request.plate_price {
        check_min(&mut errors, "plate_price", price, 0, "Plate price cannot be negative.");
    }
    if let Some(fee) = request.delivery_fee {
        check_min(&mut errors, "delivery_fee", fee, 0, "Delivery fee cannot be negative.");
    }
    errors.into_result()
}

pub fn validate_menu_item_create(request: &MenuItemCreateRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_name(&mut errors, &request.name, "Menu item");
    check_min(&mut errors, "price", request.price, 1, "Price must be at least 1.");
    if let Some(max_portion) = request.max_portion {
        check_min(
            &mut errors,
            "max_portion",
            max_portion,
            1,
            "Maximum portions must be at least 1.",
        );
    }
    errors.into_result()
}

pub fn validate_menu_item_update(request: &MenuItemUpdateRequest) -> Result<(), ValidationErrors> {
    if request.is_empty() {
        return Err(ValidationErrors::single(
            "request",
            "At least one field must be provided.",
        ));
    }

    let mut errors = ValidationErrors::default();
    if let Some(name) = request.name.as_deref() {
        check_name(&mut errors, name, "Menu item");
    }
    if let Some(price) = request.price {
        check_min(&mut errors, "price", price, 1, "Price must be at least 1.");
    }
    if let Some(max_portion) = request.max_portion {
        check_min(
            &mut errors,
            "max_portion",
            max_portion,
            1,
            "Maximum portions must be at least 1.",
        );
    }
    errors.into_result()
}
