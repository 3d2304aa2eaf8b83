//! Command-line surface for `choplink-cli`.

#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use choplink::config::SettingsArgs;
use choplink_api_types::{DishType, MenuItemStatus};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "choplink-cli", version, about = "Choplink restaurant admin CLI", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Restaurant management
    Restaurants(RestaurantsArgs),
    /// Menu item management
    Menu(MenuArgs),
}

#[derive(Parser, Debug)]
pub struct RestaurantsArgs {
    #[command(subcommand)]
    pub action: RestaurantsCmd,
}

#[derive(Subcommand, Debug)]
pub enum RestaurantsCmd {
    /// List all restaurants
    List,
    /// Get a restaurant by id
    Get { id: i64 },
    /// Create a restaurant
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Update selected fields of a restaurant
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        plate_price: Option<i64>,
        #[arg(long)]
        delivery_fee: Option<i64>,
    },
}

#[derive(Parser, Debug)]
pub struct MenuArgs {
    #[command(subcommand)]
    pub action: MenuCmd,
}

#[derive(Subcommand, Debug)]
pub enum MenuCmd {
    /// List a restaurant's menu with optional filters
    List {
        restaurant_id: i64,
        /// Case-insensitive match on name or description
        #[arg(long)]
        search: Option<String>,
        /// main | side | dessert | drink
        #[arg(long)]
        dish_type: Option<DishType>,
        /// available | unavailable
        #[arg(long)]
        status: Option<MenuItemStatus>,
        /// Group the result by dish type
        #[arg(long, default_value_t = false)]
        grouped: bool,
    },
    /// Get a menu item by id
    Get { id: i64 },
    /// Add a menu item to a restaurant
    Create {
        restaurant_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: i64,
        #[arg(long)]
        max_portion: Option<i64>,
        #[arg(long)]
        dish_type: Option<DishType>,
        #[arg(long)]
        status: Option<MenuItemStatus>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        description_file: Option<PathBuf>,
    },
    /// Update selected fields of a menu item
    Update {
        id: i64,
        /// Restaurant owning the item
        #[arg(long)]
        restaurant_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<i64>,
        #[arg(long)]
        max_portion: Option<i64>,
        #[arg(long)]
        dish_type: Option<DishType>,
        #[arg(long)]
        status: Option<MenuItemStatus>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        description_file: Option<PathBuf>,
    },
    /// Delete a menu item
    Delete {
        id: i64,
        /// Restaurant owning the item
        #[arg(long)]
        restaurant_id: i64,
    },
    /// Flip a menu item between available and unavailable
    Toggle { id: i64 },
}
