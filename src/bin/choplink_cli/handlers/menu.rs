#![deny(clippy::all, clippy::pedantic)]

use choplink::domain::menu::{MenuFilter, group_by_dish_type};
use choplink_api_types::{MenuItemCreateRequest, MenuItemUpdateRequest};

use crate::args::MenuCmd;
use crate::client::{CliError, Ctx};
use crate::io::{read_opt_value, require_id};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: MenuCmd) -> Result<(), CliError> {
    match cmd {
        MenuCmd::List {
            restaurant_id,
            search,
            dish_type,
            status,
            grouped,
        } => {
            let filter = MenuFilter {
                search: search.unwrap_or_default(),
                dish_type,
                status,
            };
            list(ctx, restaurant_id, &filter, grouped).await
        }
        MenuCmd::Get { id } => get(ctx, id).await,
        MenuCmd::Create {
            restaurant_id,
            name,
            price,
            max_portion,
            dish_type,
            status,
            description,
            description_file,
        } => {
            let mut data = MenuItemCreateRequest::new(name, price);
            if let Some(max_portion) = max_portion {
                data = data.with_max_portion(max_portion);
            }
            if let Some(dish_type) = dish_type {
                data = data.with_dish_type(dish_type);
            }
            if let Some(status) = status {
                data = data.with_status(status);
            }
            if let Some(description) = read_opt_value(description, description_file)? {
                data = data.with_description(description);
            }
            create(ctx, restaurant_id, data).await
        }
        MenuCmd::Update {
            id,
            restaurant_id,
            name,
            price,
            max_portion,
            dish_type,
            status,
            description,
            description_file,
        } => {
            let data = MenuItemUpdateRequest {
                name,
                price,
                max_portion,
                dish_type,
                status,
                description: read_opt_value(description, description_file)?,
            };
            update(ctx, id, restaurant_id, data).await
        }
        MenuCmd::Delete { id, restaurant_id } => delete(ctx, id, restaurant_id).await,
        MenuCmd::Toggle { id } => toggle(ctx, id).await,
    }
}

async fn list(
    ctx: &Ctx,
    restaurant_id: i64,
    filter: &MenuFilter,
    grouped: bool,
) -> Result<(), CliError> {
    let restaurant_id = require_id(restaurant_id, "restaurant")?;
    let items = ctx
        .queries
        .filtered_menu(Some(restaurant_id), filter)
        .await?;
    if grouped {
        print_json(&group_by_dish_type(&items))
    } else {
        print_json(&items)
    }
}

async fn get(ctx: &Ctx, id: i64) -> Result<(), CliError> {
    let id = require_id(id, "menu item")?;
    match ctx.queries.menu_item(Some(id)).await? {
        Some(res) => print_json(&*res),
        None => Err(CliError::InvalidInput(format!("menu item {id} unavailable"))),
    }
}

async fn create(
    ctx: &Ctx,
    restaurant_id: i64,
    data: MenuItemCreateRequest,
) -> Result<(), CliError> {
    let restaurant_id = require_id(restaurant_id, "restaurant")?;
    let res = ctx.queries.create_menu_item(restaurant_id, &data).await?;
    print_json(&res)
}

async fn update(
    ctx: &Ctx,
    id: i64,
    restaurant_id: i64,
    data: MenuItemUpdateRequest,
) -> Result<(), CliError> {
    let id = require_id(id, "menu item")?;
    let restaurant_id = require_id(restaurant_id, "restaurant")?;
    let res = ctx
        .queries
        .update_menu_item(id, restaurant_id, &data)
        .await?;
    print_json(&res)
}

async fn delete(ctx: &Ctx, id: i64, restaurant_id: i64) -> Result<(), CliError> {
    let id = require_id(id, "menu item")?;
    let restaurant_id = require_id(restaurant_id, "restaurant")?;
    let res = ctx.queries.delete_menu_item(id, restaurant_id).await?;
    print_json(&res)
}

async fn toggle(ctx: &Ctx, id: i64) -> Result<(), CliError> {
    let id = require_id(id, "menu item")?;
    let item = ctx
        .queries
        .menu_item(Some(id))
        .await?
        .and_then(|envelope| envelope.result.clone())
        .ok_or_else(|| CliError::InvalidInput(format!("menu item {id} unavailable")))?;
    ctx.queries.toggle_menu_item_availability(&item).await?;

    let refreshed = ctx.queries.menu_item(Some(id)).await?;
    match refreshed {
        Some(res) => print_json(&*res),
        None => Ok(()),
    }
}
