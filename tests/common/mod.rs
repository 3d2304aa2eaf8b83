#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use choplink::application::{ApiError, ChoplinkApi, Queries};
use choplink::cache::{CacheConfig, QueryCache};
use choplink::domain::error::DomainError;
use choplink::infra::http::TransportError;
use choplink_api_types::{
    DishType, EmptyEnvelope, Envelope, MenuItem, MenuItemCreateRequest, MenuItemId,
    MenuItemStatus, MenuItemUpdateRequest, Restaurant, RestaurantCreateRequest, RestaurantId,
    RestaurantUpdateRequest,
};

#[derive(Default)]
struct FakeState {
    restaurants: Vec<Restaurant>,
    items: Vec<MenuItem>,
    next_id: i64,
    calls: HashMap<&'static str, usize>,
    failures: VecDeque<ApiError>,
}

/// In-memory backend with call counters and scripted failures.
#[derive(Default)]
pub struct FakeChoplink {
    state: Mutex<FakeState>,
    delay: Option<Duration>,
}

impl FakeChoplink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `delay` before answering.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub async fn seed_restaurant(&self, name: &str) -> Restaurant {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let restaurant = Restaurant {
            id: state.next_id,
            name: name.to_string(),
            description: None,
            plate_price: 0,
            delivery_fee: 0,
        };
        state.restaurants.push(restaurant.clone());
        restaurant
    }

    pub async fn seed_item(
        &self,
        restaurant_id: RestaurantId,
        name: &str,
        dish_type: DishType,
        status: MenuItemStatus,
    ) -> MenuItem {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let item = MenuItem {
            id: state.next_id,
            name: name.to_string(),
            price: 500,
            max_portion: Some(10),
            dish_type,
            status,
            description: None,
            restaurant_id,
        };
        state.items.push(item.clone());
        item
    }

    /// Makes the next call fail with `err` instead of touching state.
    pub async fn fail_next(&self, err: ApiError) {
        self.state.lock().await.failures.push_back(err);
    }

    pub async fn calls(&self, op: &'static str) -> usize {
        self.state.lock().await.calls.get(op).copied().unwrap_or(0)
    }

    pub async fn total_calls(&self) -> usize {
        self.state.lock().await.calls.values().sum()
    }

    pub async fn item(&self, id: MenuItemId) -> Option<MenuItem> {
        let state = self.state.lock().await;
        state.items.iter().find(|item| item.id == id).cloned()
    }

    async fn enter(&self, op: &'static str) -> Result<tokio::sync::MutexGuard<'_, FakeState>, ApiError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().await;
        *state.calls.entry(op).or_default() += 1;
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        Ok(state)
    }
}

pub fn ok<T>(result: T) -> Envelope<T> {
    Envelope {
        status: "success".into(),
        status_code: 200,
        message: "ok".into(),
        result: Some(result),
    }
}

pub fn empty_ok() -> EmptyEnvelope {
    Envelope {
        status: "success".into(),
        status_code: 200,
        message: "ok".into(),
        result: None,
    }
}

pub fn server_error() -> ApiError {
    TransportError::Status {
        status: 500,
        message: "HTTP error! status: 500".into(),
    }
    .into()
}

#[async_trait]
impl ChoplinkApi for FakeChoplink {
    async fn list_restaurants(&self) -> Result<Envelope<Vec<Restaurant>>, ApiError> {
        let state = self.enter("list_restaurants").await?;
        Ok(ok(state.restaurants.clone()))
    }

    async fn get_restaurant(&self, id: RestaurantId) -> Result<Envelope<Restaurant>, ApiError> {
        let state = self.enter("get_restaurant").await?;
        state
            .restaurants
            .iter()
            .find(|restaurant| restaurant.id == id)
            .cloned()
            .map(ok)
            .ok_or_else(|| DomainError::not_found("restaurant", id).into())
    }

    async fn create_restaurant(
        &self,
        data: &RestaurantCreateRequest,
    ) -> Result<Envelope<Restaurant>, ApiError> {
        let mut state = self.enter("create_restaurant").await?;
        state.next_id += 1;
        let restaurant = Restaurant {
            id: state.next_id,
            name: data.name.clone(),
            description: data.description.clone(),
            plate_price: 0,
            delivery_fee: 0,
        };
        state.restaurants.push(restaurant.clone());
        Ok(ok(restaurant))
    }

    async fn update_restaurant(
        &self,
        id: RestaurantId,
        data: &RestaurantUpdateRequest,
    ) -> Result<Envelope<Restaurant>, ApiError> {
        let mut state = self.enter("update_restaurant").await?;
        let restaurant = state
            .restaurants
            .iter_mut()
            .find(|restaurant| restaurant.id == id)
            .ok_or_else(|| ApiError::from(DomainError::not_found("restaurant", id)))?;
        if let Some(name) = &data.name {
            restaurant.name = name.clone();
        }
        if let Some(plate_price) = data.plate_price {
            restaurant.plate_price = plate_price;
        }
        if let Some(delivery_fee) = data.delivery_fee {
            restaurant.delivery_fee = delivery_fee;
        }
        if let Some(description) = &data.description {
            restaurant.description = Some(description.clone());
        }
        Ok(ok(restaurant.clone()))
    }

    async fn list_menu_items(
        &self,
        restaurant_id: RestaurantId,
    ) -> Result<Envelope<Vec<MenuItem>>, ApiError> {
        let state = self.enter("list_menu_items").await?;
        if !state.restaurants.iter().any(|r| r.id == restaurant_id) {
            return Err(DomainError::not_found("restaurant", restaurant_id).into());
        }
        let items = state
            .items
            .iter()
            .filter(|item| item.restaurant_id == restaurant_id)
            .cloned()
            .collect();
        Ok(ok(items))
    }

    async fn get_menu_item(&self, id: MenuItemId) -> Result<Envelope<MenuItem>, ApiError> {
        let state = self.enter("get_menu_item").await?;
        state
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .map(ok)
            .ok_or_else(|| DomainError::not_found("menu item", id).into())
    }

    async fn create_menu_item(
        &self,
        restaurant_id: RestaurantId,
        data: &MenuItemCreateRequest,
    ) -> Result<Envelope<MenuItem>, ApiError> {
        let mut state = self.enter("create_menu_item").await?;
        if !state.restaurants.iter().any(|r| r.id == restaurant_id) {
            return Err(DomainError::not_found("restaurant", restaurant_id).into());
        }
        state.next_id += 1;
        let item = MenuItem {
            id: state.next_id,
            name: data.name.clone(),
            price: data.price,
            max_portion: data.max_portion,
            dish_type: data.dish_type.unwrap_or_default(),
            status: data.status.unwrap_or_default(),
            description: data.description.clone(),
            restaurant_id,
        };
        state.items.push(item.clone());
        Ok(ok(item))
    }

    async fn update_menu_item(
        &self,
        id: MenuItemId,
        data: &MenuItemUpdateRequest,
    ) -> Result<EmptyEnvelope, ApiError> {
        let mut state = self.enter("update_menu_item").await?;
        let item = state
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| ApiError::from(DomainError::not_found("menu item", id)))?;
        if let Some(name) = &data.name {
            item.name = name.clone();
        }
        if let Some(price) = data.price {
            item.price = price;
        }
        if let Some(max_portion) = data.max_portion {
            item.max_portion = Some(max_portion);
        }
        if let Some(dish_type) = data.dish_type {
            item.dish_type = dish_type;
        }
        if let Some(status) = data.status {
            item.status = status;
        }
        if let Some(description) = &data.description {
            item.description = Some(description.clone());
        }
        Ok(empty_ok())
    }

    async fn delete_menu_item(&self, id: MenuItemId) -> Result<EmptyEnvelope, ApiError> {
        let mut state = self.enter("delete_menu_item").await?;
        let before = state.items.len();
        state.items.retain(|item| item.id != id);
        if state.items.len() == before {
            return Err(DomainError::not_found("menu item", id).into());
        }
        Ok(empty_ok())
    }
}

/// Cache settings for tests: default staleness, no backoff between retries.
pub fn test_config() -> CacheConfig {
    CacheConfig {
        retry_delay_ms: 0,
        ..CacheConfig::default()
    }
}

pub fn queries(api: &Arc<FakeChoplink>) -> Queries {
    let api: Arc<dyn ChoplinkApi> = Arc::clone(api) as Arc<dyn ChoplinkApi>;
    Queries::new(QueryCache::new(test_config()), api)
}
