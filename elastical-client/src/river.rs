//! River registration.

use serde_json::Value;

use crate::{client::Client, error::Result, request::RequestOptions, response::Payload, shape};

fn meta_path(name: &str) -> String {
    format!("/_river/{}/_meta", shape::encode(name))
}

impl Client {
    /// Create or replace a river.
    pub async fn put_river(&self, name: &str, config: Value) -> Result<Payload> {
        self.request(&meta_path(name), RequestOptions::put().json(config))
            .await
    }

    /// Fetch a river's configuration.
    pub async fn get_river(&self, name: &str) -> Result<Payload> {
        self.request(&meta_path(name), RequestOptions::get()).await
    }

    /// Delete a river and its state.
    pub async fn delete_river(&self, name: &str) -> Result<Payload> {
        let path = format!("/_river/{}", shape::encode(name));
        self.request(&path, RequestOptions::delete()).await
    }
}
