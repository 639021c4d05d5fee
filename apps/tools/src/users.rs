use anyhow::{bail, Context, Result};
use serde::Deserialize;

pub const DEFAULT_USERS_URL: &str = "https://jsonplaceholder.typicode.com/users";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
}

pub async fn fetch_users(client: &reqwest::Client, url: &str) -> Result<Vec<User>> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed to fetch users from {url}"))?;
    if !response.status().is_success() {
        bail!("failed to fetch users: {}", response.status());
    }
    response
        .json::<Vec<User>>()
        .await
        .context("failed to decode users")
}
