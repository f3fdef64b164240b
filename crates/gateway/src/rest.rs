use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::blob::{ImageUpload, object_name_for};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::record::{NewWaypoint, Parameter, Waypoint};
use crate::{ListOrder, LocalBoxFuture, WaypointGateway};

/// Gateway backed by the hosted REST and storage endpoints.
///
/// Tables are read and written through `{base}/rest/v1/{table}`; images go to
/// `{base}/storage/v1/object/{bucket}/{name}` and are served from the public
/// object path. Every request carries the anonymous key both as `apikey` and
/// as a bearer token.
#[derive(Debug, Clone)]
pub struct RestGateway {
    config: GatewayConfig,
    http: Client,
}

impl RestGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: GatewayConfig, http: Client) -> Self {
        Self { config, http }
    }

    pub fn waypoints_url(&self, order: ListOrder) -> String {
        let base = self.table_url(&self.config.waypoints_table);
        match order {
            ListOrder::Unspecified => format!("{base}?select=*"),
            ListOrder::NewestFirst => format!("{base}?select=*&order=created_at.desc"),
        }
    }

    pub fn parameters_url(&self) -> String {
        format!("{}?select=*", self.table_url(&self.config.parameters_table))
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.config.base())
    }

    pub fn object_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{name}",
            self.config.base(),
            self.config.image_bucket
        )
    }

    pub fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{name}",
            self.config.base(),
            self.config.image_bucket
        )
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.config.anon_key)
            .bearer_auth(&self.config.anon_key)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GatewayError> {
        debug!("GET {url}");
        let resp = self.authorized(self.http.get(url)).send().await?;
        decode(resp).await
    }

    async fn insert(&self, waypoint: NewWaypoint) -> Result<Waypoint, GatewayError> {
        let url = self.table_url(&self.config.waypoints_table);
        debug!("POST {url}");
        let resp = self
            .authorized(self.http.post(&url))
            .header("Prefer", "return=representation")
            .json(&[waypoint])
            .send()
            .await?;
        let rows: Vec<Waypoint> = decode(resp).await?;
        rows.into_iter().next().ok_or(GatewayError::EmptyInsert)
    }

    async fn upload(&self, image: ImageUpload) -> Result<String, GatewayError> {
        let name = object_name_for(&image.file_name);
        let url = self.object_url(&name);
        debug!("POST {url} ({} bytes)", image.bytes.len());
        let resp = self
            .authorized(self.http.post(&url))
            .header(CONTENT_TYPE, image.content_type)
            .body(image.bytes)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(self.public_url(&name))
    }
}

async fn check_status(resp: Response) -> Result<Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(GatewayError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, GatewayError> {
    let text = check_status(resp).await?.text().await?;
    serde_json::from_str(&text).map_err(|e| GatewayError::Decode(e.to_string()))
}

impl WaypointGateway for RestGateway {
    fn list_waypoints(
        &self,
        order: ListOrder,
    ) -> LocalBoxFuture<'_, Result<Vec<Waypoint>, GatewayError>> {
        Box::pin(async move { self.get_json(&self.waypoints_url(order)).await })
    }

    fn list_parameters(&self) -> LocalBoxFuture<'_, Result<Vec<Parameter>, GatewayError>> {
        Box::pin(async move { self.get_json(&self.parameters_url()).await })
    }

    fn insert_waypoint(
        &self,
        waypoint: NewWaypoint,
    ) -> LocalBoxFuture<'_, Result<Waypoint, GatewayError>> {
        Box::pin(self.insert(waypoint))
    }

    fn upload_image(&self, image: ImageUpload) -> LocalBoxFuture<'_, Result<String, GatewayError>> {
        Box::pin(self.upload(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> RestGateway {
        RestGateway::new(GatewayConfig::new("https://demo.example.co/", "anon"))
    }

    #[test]
    fn map_listing_has_no_order() {
        assert_eq!(
            gateway().waypoints_url(ListOrder::Unspecified),
            "https://demo.example.co/rest/v1/waypoints?select=*"
        );
    }

    #[test]
    fn list_listing_is_newest_first() {
        assert_eq!(
            gateway().waypoints_url(ListOrder::NewestFirst),
            "https://demo.example.co/rest/v1/waypoints?select=*&order=created_at.desc"
        );
    }

    #[test]
    fn storage_urls_use_bucket() {
        let gw = gateway();
        assert_eq!(
            gw.object_url("x.jpg"),
            "https://demo.example.co/storage/v1/object/waypoint-images/x.jpg"
        );
        assert_eq!(
            gw.public_url("x.jpg"),
            "https://demo.example.co/storage/v1/object/public/waypoint-images/x.jpg"
        );
    }

    #[test]
    fn parameters_url_uses_configured_table() {
        let mut cfg = GatewayConfig::new("https://demo.example.co", "anon");
        cfg.parameters_table = "tags".to_string();
        assert_eq!(
            RestGateway::new(cfg).parameters_url(),
            "https://demo.example.co/rest/v1/tags?select=*"
        );
    }
}
