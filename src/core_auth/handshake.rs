use crate::core_auth::core_auth::LoginAttempt;
use crate::core_error::Result;
use crate::core_wire::ResponseCode;
use crate::session::Session;
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    Rejected,
    /// The peer closed the control connection mid-handshake.
    Disconnected,
}

/// Runs the server side of the two-step login.
///
/// The first command carries the username and is always answered with
/// need-password, whether or not the name is known; the second carries the
/// password. Command names are not checked, only their arguments are used.
/// The caller sends the final logged-in or invalid-credentials response.
pub async fn authenticate(session: &mut Session) -> Result<AuthOutcome> {
    let Some(user_command) = session.read_command().await? else {
        return Ok(AuthOutcome::Disconnected);
    };
    let username = user_command.argument().unwrap_or_default().to_string();
    info!("Login attempt from {} as '{}'", session.peer, username);

    session.respond(ResponseCode::NeedPassword).await?;

    let Some(pass_command) = session.read_command().await? else {
        return Ok(AuthOutcome::Disconnected);
    };
    let attempt = LoginAttempt::new(username, pass_command.argument().unwrap_or_default());

    if attempt.matches(&session.config.auth) {
        info!("User '{}' logged in from {}", attempt.username(), session.peer);
        Ok(AuthOutcome::Authenticated)
    } else {
        debug!("Credentials rejected for '{}'", attempt.username());
        Ok(AuthOutcome::Rejected)
    }
}
