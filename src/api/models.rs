use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
pub struct AppInfo {
    pub application: &'static str,
    pub version: &'static str,
}

pub const APP_INFO: AppInfo = AppInfo {
    application: "sample-app",
    version: "1",
};

#[derive(Deserialize, Debug)]
pub struct ScrapeQuery {
    pub url: Option<String>,
}
