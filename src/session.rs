use crate::error::LoginError;

/// Whether the admin controls are shown.
///
/// This is a display toggle. The password lives in the shipped bundle and no
/// operation checks the flag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    is_admin: bool,
    /// Contents of the login password field.
    pub password_input: String,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Checks the typed password. The field is cleared only on success so a
    /// typo can be fixed in place.
    pub fn login(&mut self, expected: &str) -> Result<(), LoginError> {
        if self.password_input != expected {
            return Err(LoginError::InvalidPassword);
        }
        self.is_admin = true;
        self.password_input.clear();
        Ok(())
    }

    pub fn logout(&mut self) {
        self.is_admin = false;
    }
}
