use crate::{
    dto::auth::{LoginRequest, LoginResponse},
    error::AppResult,
    models::User,
    state::AppState,
    store::Context,
};

/// `None` covers both an unknown user and a wrong password.
pub async fn login_user(state: &AppState, payload: LoginRequest) -> AppResult<Option<LoginResponse>> {
    let LoginRequest { user_id, password } = payload;

    let record = match state.store.get(Context::User, &user_id).await? {
        Some(r) => r,
        None => {
            tracing::debug!(user_id = %user_id, "login for unknown user");
            return Ok(None);
        }
    };
    let user: User = record.into_model()?;

    if !state.credentials.verify(&password, &user.password)? {
        tracing::debug!(user_id = %user_id, "login with wrong password");
        return Ok(None);
    }

    let token = state.tokens.issue(user.info)?;
    tracing::info!(user_id = %user_id, "user logged in");
    Ok(Some(LoginResponse { token }))
}
