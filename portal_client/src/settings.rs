use std::collections::HashMap;

pub const PORTAL_URL_KEY: &str = "portal_url";
pub const HUB_API_URL_KEY: &str = "hub_api_url";
pub const IS_PORTAL_KEY: &str = "is_portal";

const DEFAULT_PORTAL_URL: &str = "https://www.arcgis.com";
const DEFAULT_HUB_API_URL: &str = "https://hub.arcgis.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalSettings {
    pub portal_url: String,
    pub hub_api_url: String,
    /// True for an on-premise portal, which has no Hub API of its own.
    pub is_portal: bool,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            portal_url: DEFAULT_PORTAL_URL.to_string(),
            hub_api_url: DEFAULT_HUB_API_URL.to_string(),
            is_portal: false,
        }
    }
}

impl From<HashMap<String, String>> for PortalSettings {
    fn from(map: HashMap<String, String>) -> Self {
        let defaults = PortalSettings::default();
        let portal_url = map
            .get(PORTAL_URL_KEY)
            .cloned()
            .unwrap_or(defaults.portal_url);
        let is_portal = map
            .get(IS_PORTAL_KEY)
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.is_portal);
        let hub_api_url = match map.get(HUB_API_URL_KEY) {
            Some(url) => url.clone(),
            // an on-premise portal serves the hub endpoints itself
            None if is_portal => portal_url.clone(),
            None => defaults.hub_api_url,
        };
        Self {
            portal_url,
            hub_api_url,
            is_portal,
        }
    }
}
