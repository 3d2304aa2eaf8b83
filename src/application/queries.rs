//! Query bindings: cached reads and invalidating writes.
//!
//! Reads go through the [`QueryCache`]; a read whose id is unset (`None` or
//! `0`) is disabled and resolves to `Ok(None)` without fetching. Writes are
//! validated locally, sent through the domain client and, only on success,
//! invalidate the queries they affect before returning.

use std::future::Future;
use std::sync::Arc;

use choplink_api_types::{
    EmptyEnvelope, Envelope, MenuItem, MenuItemCreateRequest, MenuItemId, MenuItemUpdateRequest,
    Restaurant, RestaurantCreateRequest, RestaurantId, RestaurantUpdateRequest,
};
use tracing::info;

use crate::application::api::ChoplinkApi;
use crate::application::error::ApiError;
use crate::cache::{EntityChange, QueryCache, QueryKey};
use crate::domain::menu::MenuFilter;
use crate::domain::validation::{
    validate_menu_item_create, validate_menu_item_update, validate_restaurant_create,
    validate_restaurant_update,
};

#[derive(Clone)]
pub struct Queries {
    cache: QueryCache,
    api: Arc<dyn ChoplinkApi>,
}

impl Queries {
    pub fn new(cache: QueryCache, api: Arc<dyn ChoplinkApi>) -> Self {
        Self { cache, api }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub async fn restaurants(&self) -> Result<Arc<Envelope<Vec<Restaurant>>>, ApiError> {
        self.read(QueryKey::restaurants(), |api| async move {
            api.list_restaurants().await
        })
        .await
    }

    pub async fn restaurant(
        &self,
        id: Option<RestaurantId>,
    ) -> Result<Option<Arc<Envelope<Restaurant>>>, ApiError> {
        let Some(id) = enabled(id) else {
            return Ok(None);
        };
        self.read(QueryKey::restaurant(id), move |api| async move {
            api.get_restaurant(id).await
        })
        .await
        .map(Some)
    }

    pub async fn menu_items(
        &self,
        restaurant_id: Option<RestaurantId>,
    ) -> Result<Option<Arc<Envelope<Vec<MenuItem>>>>, ApiError> {
        let Some(restaurant_id) = enabled(restaurant_id) else {
            return Ok(None);
        };
        self.read(QueryKey::restaurant_menu(restaurant_id), move |api| async move {
            api.list_menu_items(restaurant_id).await
        })
        .await
        .map(Some)
    }

    pub async fn menu_item(
        &self,
        id: Option<MenuItemId>,
    ) -> Result<Option<Arc<Envelope<MenuItem>>>, ApiError> {
        let Some(id) = enabled(id) else {
            return Ok(None);
        };
        self.read(QueryKey::menu_item(id), move |api| async move {
            api.get_menu_item(id).await
        })
        .await
        .map(Some)
    }

    /// Menu of `restaurant_id` narrowed by `filter`, in menu order.
    pub async fn filtered_menu(
        &self,
        restaurant_id: Option<RestaurantId>,
        filter: &MenuFilter,
    ) -> Result<Vec<MenuItem>, ApiError> {
        let menu = self.menu_items(restaurant_id).await?;
        Ok(menu
            .as_deref()
            .and_then(Envelope::result)
            .map(|items| filter.apply(items))
            .unwrap_or_default())
    }

    pub async fn create_restaurant(
        &self,
        data: &RestaurantCreateRequest,
    ) -> Result<Envelope<Restaurant>, ApiError> {
        validate_restaurant_create(data)?;
        let envelope = self.api.create_restaurant(data).await?;
        self.settle(EntityChange::RestaurantCreated);
        Ok(envelope)
    }

    pub async fn update_restaurant(
        &self,
        id: RestaurantId,
        data: &RestaurantUpdateRequest,
    ) -> Result<Envelope<Restaurant>, ApiError> {
        validate_restaurant_update(data)?;
        let envelope = self.api.update_restaurant(id, data).await?;
        self.settle(EntityChange::RestaurantUpdated { id });
        Ok(envelope)
    }

    pub async fn create_menu_item(
        &self,
        restaurant_id: RestaurantId,
        data: &MenuItemCreateRequest,
    ) -> Result<Envelope<MenuItem>, ApiError> {
        validate_menu_item_create(data)?;
        let envelope = self.api.create_menu_item(restaurant_id, data).await?;
        self.settle(EntityChange::MenuItemCreated { restaurant_id });
        Ok(envelope)
    }

    /// `restaurant_id` names the owning menu so it can be refreshed.
    pub async fn update_menu_item(
        &self,
        id: MenuItemId,
        restaurant_id: RestaurantId,
        data: &MenuItemUpdateRequest,
    ) -> Result<EmptyEnvelope, ApiError> {
        validate_menu_item_update(data)?;
        let envelope = self.api.update_menu_item(id, data).await?;
        self.settle(EntityChange::MenuItemUpdated { id, restaurant_id });
        Ok(envelope)
    }

    pub async fn delete_menu_item(
        &self,
        id: MenuItemId,
        restaurant_id: RestaurantId,
    ) -> Result<EmptyEnvelope, ApiError> {
        let envelope = self.api.delete_menu_item(id).await?;
        self.settle(EntityChange::MenuItemDeleted { id, restaurant_id });
        Ok(envelope)
    }

    /// Flips `item` between available and unavailable.
    pub async fn toggle_menu_item_availability(
        &self,
        item: &MenuItem,
    ) -> Result<EmptyEnvelope, ApiError> {
        let data = MenuItemUpdateRequest::status(item.status.toggled());
        self.update_menu_item(item.id, item.restaurant_id, &data)
            .await
    }

    async fn read<T, F, Fut>(&self, key: QueryKey, op: F) -> Result<Arc<T>, ApiError>
    where
        T: Send + Sync + 'static,
        F: Fn(Arc<dyn ChoplinkApi>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let api = Arc::clone(&self.api);
        self.cache.fetch(key, move || op(Arc::clone(&api))).await
    }

    fn settle(&self, change: EntityChange) {
        let marked: usize = change
            .affected_prefixes()
            .iter()
            .map(|prefix| self.cache.invalidate(prefix))
            .sum();
        info!(change = change.kind(), marked, "write settled");
    }
}

fn enabled(id: Option<i64>) -> Option<i64> {
    id.filter(|id| *id != 0)
}
