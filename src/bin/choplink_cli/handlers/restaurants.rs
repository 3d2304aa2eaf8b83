#![deny(clippy::all, clippy::pedantic)]

use choplink_api_types::{RestaurantCreateRequest, RestaurantUpdateRequest};

use crate::args::RestaurantsCmd;
use crate::client::{CliError, Ctx};
use crate::io::require_id;
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: RestaurantsCmd) -> Result<(), CliError> {
    match cmd {
        RestaurantsCmd::List => list(ctx).await,
        RestaurantsCmd::Get { id } => get(ctx, id).await,
        RestaurantsCmd::Create { name, description } => create(ctx, name, description).await,
        RestaurantsCmd::Update {
            id,
            name,
            description,
            plate_price,
            delivery_fee,
        } => {
            let data = RestaurantUpdateRequest {
                name,
                plate_price,
                delivery_fee,
                description,
            };
            update(ctx, id, data).await
        }
    }
}

async fn list(ctx: &Ctx) -> Result<(), CliError> {
    let res = ctx.queries.restaurants().await?;
    print_json(&*res)
}

async fn get(ctx: &Ctx, id: i64) -> Result<(), CliError> {
    let id = require_id(id, "restaurant")?;
    match ctx.queries.restaurant(Some(id)).await? {
        Some(res) => print_json(&*res),
        None => Err(CliError::InvalidInput(format!("restaurant {id} unavailable"))),
    }
}

async fn create(ctx: &Ctx, name: String, description: Option<String>) -> Result<(), CliError> {
    let mut data = RestaurantCreateRequest::new(name);
    if let Some(description) = description {
        data = data.with_description(description);
    }
    let res = ctx.queries.create_restaurant(&data).await?;
    print_json(&res)
}

async fn update(ctx: &Ctx, id: i64, data: RestaurantUpdateRequest) -> Result<(), CliError> {
    let id = require_id(id, "restaurant")?;
    let res = ctx.queries.update_restaurant(id, &data).await?;
    print_json(&res)
}
