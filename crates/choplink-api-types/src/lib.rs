//! Wire types for the Choplink administration API.
//!
//! Every response from the backend is wrapped in an [`Envelope`]; the entity
//! and request types here mirror the JSON the service accepts and returns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum portions assumed for a new menu item when none is supplied.
pub const DEFAULT_MAX_PORTION: i64 = 10;

pub type RestaurantId = i64;
pub type MenuItemId = i64;

/// Uniform response wrapper returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T> Envelope<T> {
    /// True when the numeric status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<T> {
        self.result
    }
}

/// Envelope carrying no meaningful payload (deletes, void updates).
pub type EmptyEnvelope = Envelope<serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub plate_price: i64,
    #[serde(default)]
    pub delivery_fee: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub max_portion: Option<i64>,
    #[serde(default)]
    pub dish_type: DishType,
    #[serde(default)]
    pub status: MenuItemStatus,
    #[serde(default)]
    pub description: Option<String>,
    pub restaurant_id: RestaurantId,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} `{value}` (expected one of: {expected})")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DishType {
    #[default]
    Main,
    Side,
    Dessert,
    Drink,
}

impl DishType {
    pub const ALL: [DishType; 4] = [
        DishType::Main,
        DishType::Side,
        DishType::Dessert,
        DishType::Drink,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DishType::Main => "main",
            DishType::Side => "side",
            DishType::Dessert => "dessert",
            DishType::Drink => "drink",
        }
    }
}

impl fmt::Display for DishType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DishType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        DishType::ALL
            .into_iter()
            .find(|dish| dish.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "dish type",
                value: value.to_string(),
                expected: "main, side, dessert, drink",
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuItemStatus {
    #[default]
    Available,
    Unavailable,
}

impl MenuItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MenuItemStatus::Available => "available",
            MenuItemStatus::Unavailable => "unavailable",
        }
    }

    /// The opposite availability, used when toggling an item.
    pub fn toggled(self) -> Self {
        match self {
            MenuItemStatus::Available => MenuItemStatus::Unavailable,
            MenuItemStatus::Unavailable => MenuItemStatus::Available,
        }
    }
}

impl fmt::Display for MenuItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MenuItemStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(MenuItemStatus::Available),
            "unavailable" => Ok(MenuItemStatus::Unavailable),
            _ => Err(UnknownVariant {
                kind: "menu item status",
                value: value.to_string(),
                expected: "available, unavailable",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantCreateRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RestaurantCreateRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial restaurant update; only populated fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate_price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_fee: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RestaurantUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.plate_price.is_none()
            && self.delivery_fee.is_none()
            && self.description.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemCreateRequest {
    pub name: String,
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_portion: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dish_type: Option<DishType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MenuItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MenuItemCreateRequest {
    /// Builds a create request with the contract defaults filled in:
    /// `max_portion = 10`, `dish_type = main`, `status = available`.
    pub fn new(name: impl Into<String>, price: i64) -> Self {
        Self {
            name: name.into(),
            price,
            max_portion: Some(DEFAULT_MAX_PORTION),
            dish_type: Some(DishType::default()),
            status: Some(MenuItemStatus::default()),
            description: None,
        }
    }

    pub fn with_max_portion(mut self, max_portion: i64) -> Self {
        self.max_portion = Some(max_portion);
        self
    }

    pub fn with_dish_type(mut self, dish_type: DishType) -> Self {
        self.dish_type = Some(dish_type);
        self
    }

    pub fn with_status(mut self, status: MenuItemStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial menu item update; any subset of fields may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_portion: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dish_type: Option<DishType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MenuItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MenuItemUpdateRequest {
    pub fn status(status: MenuItemStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.max_portion.is_none()
            && self.dish_type.is_none()
            && self.status.is_none()
            && self.description.is_none()
    }
}
