use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::domain::errors::FieldError;
use crate::domain::menu::MenuItem;
use crate::errors::ErrorResponse;
use crate::handlers::menu::MenuItemResponse;
use crate::handlers::orders::{CreateOrderRequest, CreateOrderResponse, OrderDetailsResponse};

use super::checkout::OrderGateway;
use super::menu::MenuSource;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Could not reach the shop: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {message}")]
    Status {
        status: u16,
        message: String,
        fields: Vec<FieldError>,
    },

    #[error("Unexpected response from the shop: {0}")]
    MalformedResponse(String),

    #[error("Invalid shop URL {0}")]
    InvalidBaseUrl(String),
}

/// HTTP client for the storefront's backend.
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    http: Client,
    base_url: Url,
}

impl StorefrontClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(Client::new(), base_url)
    }

    /// Use a caller-built `reqwest::Client`, e.g. one with timeouts set.
    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Always Ok: `with_client` rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn list_menu(&self) -> Result<Vec<MenuItem>, ClientError> {
        let resp = self.http.get(self.url(&["menu"])).send().await?;
        let items: Vec<MenuItemResponse> = read_json(resp).await?;
        items.into_iter().map(to_menu_item).collect()
    }

    /// Fetch one item; `None` when the shop has no item with that id.
    pub async fn get_menu_item(&self, id: i32) -> Result<Option<MenuItem>, ClientError> {
        let resp = self
            .http
            .get(self.url(&["menu", &id.to_string()]))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let item: MenuItemResponse = read_json(resp).await?;
        to_menu_item(item).map(Some)
    }

    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ClientError> {
        let resp = self
            .http
            .post(self.url(&["orders"]))
            .json(request)
            .send()
            .await?;
        read_json(resp).await
    }

    pub async fn get_order(
        &self,
        order_number: &str,
    ) -> Result<Option<OrderDetailsResponse>, ClientError> {
        let resp = self
            .http
            .get(self.url(&["orders", order_number]))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(resp).await.map(Some)
    }
}

fn to_menu_item(item: MenuItemResponse) -> Result<MenuItem, ClientError> {
    let id = item.id;
    MenuItem::try_from(item)
        .map_err(|e| ClientError::MalformedResponse(format!("menu item {} price: {}", id, e)))
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    let body = resp.bytes().await?;

    if !status.is_success() {
        let (message, fields) = match serde_json::from_slice::<ErrorResponse>(&body) {
            Ok(err) => (err.error, err.fields),
            Err(_) => (String::from_utf8_lossy(&body).into_owned(), vec![]),
        };
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
            fields,
        });
    }

    serde_json::from_slice(&body).map_err(|e| ClientError::MalformedResponse(e.to_string()))
}

#[async_trait]
impl MenuSource for StorefrontClient {
    async fn fetch_menu(&self) -> Result<Vec<MenuItem>, ClientError> {
        self.list_menu().await
    }

    async fn fetch_menu_item(&self, id: i32) -> Result<Option<MenuItem>, ClientError> {
        self.get_menu_item(id).await
    }
}

#[async_trait]
impl OrderGateway for StorefrontClient {
    async fn submit_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ClientError> {
        self.create_order(request).await
    }
}
