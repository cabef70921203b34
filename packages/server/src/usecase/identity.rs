//! Identity resolution for inbound requests.

use std::sync::Arc;

use crate::domain::{
    AuthError, ConnectionId, ConnectionRegistry, Identity, TokenVerifier, Username,
    ValueObjectError,
};

pub struct IdentityResolver {
    verifier: Arc<dyn TokenVerifier>,
    connections: Arc<dyn ConnectionRegistry>,
    require_auth: bool,
}

fn present(token: Option<&str>) -> Option<&str> {
    token.map(str::trim).filter(|t| !t.is_empty())
}

impl IdentityResolver {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        connections: Arc<dyn ConnectionRegistry>,
        require_auth: bool,
    ) -> Self {
        Self {
            verifier,
            connections,
            require_auth,
        }
    }

    /// Resolve the identity of a `join-room`.
    ///
    /// A token, when present, must verify. Without one the supplied username
    /// is used as a guest identity unless authentication is required.
    pub fn resolve_for_join(
        &self,
        token: Option<&str>,
        username: Option<&str>,
    ) -> Result<Identity, AuthError> {
        if let Some(token) = present(token) {
            return self.verifier.verify(token);
        }
        if self.require_auth {
            return Err(AuthError::MissingToken);
        }

        let username =
            username.ok_or(AuthError::InvalidUsername(ValueObjectError::UsernameEmpty))?;
        let username = Username::new(username.to_string()).map_err(AuthError::InvalidUsername)?;
        Ok(Identity::guest(username))
    }

    /// Resolve the identity of any other request.
    ///
    /// Without a token the identity the connection joined with is used.
    pub async fn resolve(
        &self,
        connection_id: &ConnectionId,
        token: Option<&str>,
    ) -> Result<Identity, AuthError> {
        if let Some(token) = present(token) {
            return self.verifier.verify(token);
        }
        self.connections
            .identity(connection_id)
            .await
            .ok_or(AuthError::NotJoined)
    }
}
