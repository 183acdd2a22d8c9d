use common::Identity;

/// The authentication state handed to the submission action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    identity: Option<Identity>,
}

impl AuthSession {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn authenticated(uid: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            identity: Some(Identity {
                uid: uid.into(),
                display_name: display_name.into(),
            }),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

impl From<Option<Identity>> for AuthSession {
    fn from(identity: Option<Identity>) -> Self {
        Self { identity }
    }
}
