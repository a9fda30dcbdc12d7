//! API wrapper utilities for handling authentication errors

use crate::auth::SessionContext;
use campus_http::ClientError;

/// Route an error through central session handling.
///
/// Returns `true` when the error ended the session.
pub fn handle_api_error(error: &ClientError, session: &SessionContext) -> bool {
    session.handle_api_error(error)
}

/// Wrapper for API calls that handles auth errors
///
/// Authentication and authorization failures end the session the call was
/// sent with and redirect to the login route; every error is still returned
/// to the caller.
pub async fn with_auth_error_handling<T, F>(
    session: &SessionContext,
    api_call: F,
) -> Result<T, ClientError>
where
    F: std::future::Future<Output = Result<T, ClientError>>,
{
    // The call reads the token when first polled, which happens below
    let sent_with = session.store().access_token();

    match api_call.await {
        Ok(result) => Ok(result),
        Err(error) => {
            session.handle_call_error(&error, sent_with.as_deref());
            Err(error)
        }
    }
}
