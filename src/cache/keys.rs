//! Query key definitions.
//!
//! A `QueryKey` is an ordered tuple of segments such as
//! `["restaurant", 7, "menu"]`. Invalidation works on key prefixes, so a
//! write only needs to know the scopes it touches.

use std::borrow::Cow;
use std::fmt;

use choplink_api_types::{MenuItemId, RestaurantId};

const RESTAURANT: &str = "restaurant";
const MENU: &str = "menu";

/// One element of a query key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeySegment {
    Name(Cow<'static, str>),
    Id(i64),
}

impl From<&'static str> for KeySegment {
    fn from(value: &'static str) -> Self {
        KeySegment::Name(Cow::Borrowed(value))
    }
}

impl From<String> for KeySegment {
    fn from(value: String) -> Self {
        KeySegment::Name(Cow::Owned(value))
    }
}

impl From<i64> for KeySegment {
    fn from(value: i64) -> Self {
        KeySegment::Id(value)
    }
}

impl fmt::Display for KeySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySegment::Name(name) => write!(f, "{name:?}"),
            KeySegment::Id(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<KeySegment>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<KeySegment>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// `["restaurant"]`: the restaurant list and, as a prefix, every restaurant scope.
    pub fn restaurants() -> Self {
        Self(vec![RESTAURANT.into()])
    }

    /// `["restaurant", id]`
    pub fn restaurant(id: RestaurantId) -> Self {
        Self(vec![RESTAURANT.into(), id.into()])
    }

    /// `["restaurant", id, "menu"]`
    pub fn restaurant_menu(id: RestaurantId) -> Self {
        Self(vec![RESTAURANT.into(), id.into(), MENU.into()])
    }

    /// `["menu", id]`
    pub fn menu_item(id: MenuItemId) -> Self {
        Self(vec![MENU.into(), id.into()])
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, segment) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{segment}")?;
        }
        f.write_str("]")
    }
}

/// A successful write, described by the entities it touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityChange {
    RestaurantCreated,
    RestaurantUpdated {
        id: RestaurantId,
    },
    MenuItemCreated {
        restaurant_id: RestaurantId,
    },
    MenuItemUpdated {
        id: MenuItemId,
        restaurant_id: RestaurantId,
    },
    MenuItemDeleted {
        id: MenuItemId,
        restaurant_id: RestaurantId,
    },
}

impl EntityChange {
    /// Key prefixes whose cached queries no longer reflect the server.
    pub fn affected_prefixes(&self) -> Vec<QueryKey> {
        match *self {
            EntityChange::RestaurantCreated => vec![QueryKey::restaurants()],
            EntityChange::RestaurantUpdated { id } => {
                vec![QueryKey::restaurants(), QueryKey::restaurant(id)]
            }
            EntityChange::MenuItemCreated { restaurant_id } => {
                vec![QueryKey::restaurant_menu(restaurant_id)]
            }
            EntityChange::MenuItemUpdated { id, restaurant_id }
            | EntityChange::MenuItemDeleted { id, restaurant_id } => vec![
                QueryKey::menu_item(id),
                QueryKey::restaurant_menu(restaurant_id),
            ],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EntityChange::RestaurantCreated => "restaurant_created",
            EntityChange::RestaurantUpdated { .. } => "restaurant_updated",
            EntityChange::MenuItemCreated { .. } => "menu_item_created",
            EntityChange::MenuItemUpdated { .. } => "menu_item_updated",
            EntityChange::MenuItemDeleted { .. } => "menu_item_deleted",
        }
    }
}
