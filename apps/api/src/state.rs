use guardian_application::{AccessAdminService, AccessService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_service: AccessService,
    pub admin_service: AccessAdminService,
}
