//! Backend route table.

use crate::outbound::http::HEALTH_PATH;

/// Route paths for every backend operation.
///
/// `Default` gives the paths the reference backend serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRoutes {
    pub ping: String,
    pub dashboard: String,
    pub force_refresh: String,
    pub list_endpoints: String,
    pub create_endpoint: String,
    pub persist_runtime_state: String,
    pub update_code: String,
    pub remove_endpoint: String,
    pub fetch_settings: String,
    pub store_settings: String,
    pub list_files: String,
    pub health: String,
}

impl Default for BackendRoutes {
    fn default() -> Self {
        Self {
            ping: "/ping".to_owned(),
            dashboard: "/get_dashboard".to_owned(),
            force_refresh: "/force_refresh_dashboard".to_owned(),
            list_endpoints: "/get_apis".to_owned(),
            create_endpoint: "/create_api".to_owned(),
            persist_runtime_state: "/save_server".to_owned(),
            update_code: "/update_api_code".to_owned(),
            remove_endpoint: "/remove_api".to_owned(),
            fetch_settings: "/get_user_dash_config".to_owned(),
            store_settings: "/update_user_dash_config".to_owned(),
            list_files: "/get_files".to_owned(),
            health: HEALTH_PATH.to_owned(),
        }
    }
}
