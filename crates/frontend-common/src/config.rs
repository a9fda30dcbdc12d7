//! Frontend configuration

/// Authentication configuration
pub struct AuthConfig;

impl AuthConfig {
    /// Login entry point
    pub const LOGIN_ROUTE: &'static str = "/login";

    /// Public landing view
    pub const PUBLIC_ROUTE: &'static str = "/";

    /// Profile view, requires a session
    pub const PROFILE_ROUTE: &'static str = "/profile";

    /// Back-office root, requires the admin role
    pub const ADMIN_ROUTE: &'static str = "/admin";
}
