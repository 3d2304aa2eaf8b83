//! Domain client: Choplink operations mapped onto HTTP calls.

use async_trait::async_trait;
use choplink_api_types::{
    EmptyEnvelope, Envelope, MenuItem, MenuItemCreateRequest, MenuItemId, MenuItemUpdateRequest,
    Restaurant, RestaurantCreateRequest, RestaurantId, RestaurantUpdateRequest,
};
use tracing::info;

use crate::application::error::ApiError;
use crate::domain::error::DomainError;
use crate::infra::http::{RequestOptions, Transport, TransportError};

const RESTAURANT: &str = "restaurant";
const MENU_ITEM: &str = "menu item";

/// Remote operations offered by the Choplink backend.
#[async_trait]
pub trait ChoplinkApi: Send + Sync {
    async fn list_restaurants(&self) -> Result<Envelope<Vec<Restaurant>>, ApiError>;

    async fn get_restaurant(&self, id: RestaurantId) -> Result<Envelope<Restaurant>, ApiError>;

    async fn create_restaurant(
        &self,
        data: &RestaurantCreateRequest,
    ) -> Result<Envelope<Restaurant>, ApiError>;

    async fn update_restaurant(
        &self,
        id: RestaurantId,
        data: &RestaurantUpdateRequest,
    ) -> Result<Envelope<Restaurant>, ApiError>;

    async fn list_menu_items(
        &self,
        restaurant_id: RestaurantId,
    ) -> Result<Envelope<Vec<MenuItem>>, ApiError>;

    async fn get_menu_item(&self, id: MenuItemId) -> Result<Envelope<MenuItem>, ApiError>;

    async fn create_menu_item(
        &self,
        restaurant_id: RestaurantId,
        data: &MenuItemCreateRequest,
    ) -> Result<Envelope<MenuItem>, ApiError>;

    async fn update_menu_item(
        &self,
        id: MenuItemId,
        data: &MenuItemUpdateRequest,
    ) -> Result<EmptyEnvelope, ApiError>;

    async fn delete_menu_item(&self, id: MenuItemId) -> Result<EmptyEnvelope, ApiError>;
}

#[derive(Clone, Debug)]
pub struct HttpChoplinkApi {
    transport: Transport,
}

impl HttpChoplinkApi {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ChoplinkApi for HttpChoplinkApi {
    async fn list_restaurants(&self) -> Result<Envelope<Vec<Restaurant>>, ApiError> {
        let envelope = self
            .transport
            .request("/restaurant/", RequestOptions::get())
            .await?;
        require_result(envelope, "list restaurants")
    }

    async fn get_restaurant(&self, id: RestaurantId) -> Result<Envelope<Restaurant>, ApiError> {
        let envelope: Envelope<Restaurant> = self
            .transport
            .request(&format!("/restaurant/{id}"), RequestOptions::get())
            .await
            .map_err(scoped(RESTAURANT, id))?;
        if envelope.result.is_none() {
            return Err(DomainError::not_found(RESTAURANT, id).into());
        }
        Ok(envelope)
    }

    async fn create_restaurant(
        &self,
        data: &RestaurantCreateRequest,
    ) -> Result<Envelope<Restaurant>, ApiError> {
        let envelope = self
            .transport
            .request("/restaurant/", RequestOptions::post_json(data)?)
            .await?;
        let envelope = require_result(envelope, "create restaurant")?;
        info!(name = %data.name, "created restaurant");
        Ok(envelope)
    }

    async fn update_restaurant(
        &self,
        id: RestaurantId,
        data: &RestaurantUpdateRequest,
    ) -> Result<Envelope<Restaurant>, ApiError> {
        let envelope = self
            .transport
            .request(
                &format!("/restaurant/{id}"),
                RequestOptions::patch_json(data)?,
            )
            .await
            .map_err(scoped(RESTAURANT, id))?;
        info!(restaurant_id = id, "updated restaurant");
        Ok(envelope)
    }

    async fn list_menu_items(
        &self,
        restaurant_id: RestaurantId,
    ) -> Result<Envelope<Vec<MenuItem>>, ApiError> {
        let envelope = self
            .transport
            .request(
                &format!("/restaurant/{restaurant_id}/menu"),
                RequestOptions::get(),
            )
            .await
            .map_err(scoped(RESTAURANT, restaurant_id))?;
        require_result(envelope, "list menu items")
    }

    async fn get_menu_item(&self, id: MenuItemId) -> Result<Envelope<MenuItem>, ApiError> {
        let envelope: Envelope<MenuItem> = self
            .transport
            .request(&format!("/menu/{id}"), RequestOptions::get())
            .await
            .map_err(scoped(MENU_ITEM, id))?;
        if envelope.result.is_none() {
            return Err(DomainError::not_found(MENU_ITEM, id).into());
        }
        Ok(envelope)
    }

    async fn create_menu_item(
        &self,
        restaurant_id: RestaurantId,
        data: &MenuItemCreateRequest,
    ) -> Result<Envelope<MenuItem>, ApiError> {
        let envelope = self
            .transport
            .request(
                &format!("/menu/{restaurant_id}"),
                RequestOptions::post_json(data)?,
            )
            .await
            .map_err(scoped(RESTAURANT, restaurant_id))?;
        let envelope = require_result(envelope, "create menu item")?;
        info!(restaurant_id, name = %data.name, "created menu item");
        Ok(envelope)
    }

    async fn update_menu_item(
        &self,
        id: MenuItemId,
        data: &MenuItemUpdateRequest,
    ) -> Result<EmptyEnvelope, ApiError> {
        let envelope = self
            .transport
            .request(&format!("/menu/{id}"), RequestOptions::patch_json(data)?)
            .await
            .map_err(scoped(MENU_ITEM, id))?;
        info!(menu_item_id = id, "updated menu item");
        Ok(envelope)
    }

    async fn delete_menu_item(&self, id: MenuItemId) -> Result<EmptyEnvelope, ApiError> {
        let envelope = self
            .transport
            .request(&format!("/menu/{id}"), RequestOptions::delete())
            .await
            .map_err(scoped(MENU_ITEM, id))?;
        info!(menu_item_id = id, "deleted menu item");
        Ok(envelope)
    }
}

/// Maps a 404 on an id-scoped call to `NotFound` for that entity.
fn scoped(entity: &'static str, id: i64) -> impl FnOnce(TransportError) -> ApiError {
    move |err| {
        if err.is_not_found() {
            DomainError::not_found(entity, id).into()
        } else {
            err.into()
        }
    }
}

fn require_result<T>(envelope: Envelope<T>, operation: &'static str) -> Result<Envelope<T>, ApiError> {
    if envelope.result.is_none() {
        return Err(TransportError::MissingResult { operation }.into());
    }
    Ok(envelope)
}

/// Resolves a restaurant from an already fetched list.
pub fn find_restaurant(list: &[Restaurant], id: RestaurantId) -> Result<&Restaurant, DomainError> {
    list.iter()
        .find(|restaurant| restaurant.id == id)
        .ok_or_else(|| DomainError::not_found(RESTAURANT, id))
}

/// Resolves a menu item from an already fetched list.
pub fn find_menu_item(list: &[MenuItem], id: MenuItemId) -> Result<&MenuItem, DomainError> {
    list.iter()
        .find(|item| item.id == id)
        .ok_or_else(|| DomainError::not_found(MENU_ITEM, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restaurant(id: i64, name: &str) -> Restaurant {
        Restaurant {
            id,
            name: name.to_string(),
            description: None,
            plate_price: 0,
            delivery_fee: 0,
        }
    }

    #[test]
    fn find_restaurant_resolves_or_reports_missing() {
        let list = vec![restaurant(1, "Home Ways"), restaurant(2, "Spice Haven")];
        assert_eq!(
            find_restaurant(&list, 2).expect("present").name,
            "Spice Haven"
        );
        let err = find_restaurant(&list, 9).expect_err("missing");
        assert_eq!(err, DomainError::not_found("restaurant", 9));
    }

    #[test]
    fn find_menu_item_reports_entity_in_error() {
        let err = find_menu_item(&[], 3).expect_err("empty list");
        assert_eq!(err.to_string(), "menu item `3` not found");
    }

    #[test]
    fn scoped_maps_only_404() {
        let not_found = scoped("menu item", 5)(TransportError::Status {
            status: 404,
            message: "Not Found".into(),
        });
        assert_eq!(
            not_found,
            ApiError::Domain(DomainError::not_found("menu item", 5))
        );

        let server = scoped("menu item", 5)(TransportError::Status {
            status: 500,
            message: "boom".into(),
        });
        assert!(matches!(server, ApiError::Transport(_)));
    }

    #[test]
    fn missing_result_is_a_shape_error() {
        let envelope: Envelope<Vec<Restaurant>> = Envelope {
            status: "success".into(),
            status_code: 200,
            message: "ok".into(),
            result: None,
        };
        let err = require_result(envelope, "list restaurants").expect_err("no result");
        assert!(matches!(
            err,
            ApiError::Transport(TransportError::MissingResult { .. })
        ));
    }
}
