//! Known users, keyed by id, with the demo accounts as a fallback.

use log::{debug, error, info, warn};

use crate::{
    error::{StoreError, ValidationError},
    storage::{KeyValueStore, SESSION_KEY, USERS_KEY},
    utils::time_id,
    Kudos,
};

use super::{propagate::propagate, seed_users, User};

/// Sign-up form contents.
#[derive(Debug, Clone, Default)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: String,
    pub profile_image: String,
}

impl SignUp {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().chars().count() < 2 {
            return Err(ValidationError::NameTooShort);
        }
        if !is_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if self.password.chars().count() < 8 {
            return Err(ValidationError::PasswordTooShort);
        }
        if self.profile_image.is_empty() {
            return Err(ValidationError::MissingProfileImage);
        }
        Ok(())
    }
}

fn is_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !domain.ends_with('.')
}

pub struct UserRegistry<'a, S> {
    kudos: &'a Kudos<S>,
}

impl<'a, S: KeyValueStore> UserRegistry<'a, S> {
    pub fn new(kudos: &'a Kudos<S>) -> Self {
        Self { kudos }
    }

    /// Persisted users, or the demo accounts when there are none.
    pub fn all(&self) -> Vec<User> {
        match self.persisted() {
            Ok(users) if !users.is_empty() => users,
            Ok(_) => seed_users(),
            Err(err) => {
                error!("Failed to read users: {}", err);
                seed_users()
            }
        }
    }

    fn persisted(&self) -> Result<Vec<User>, StoreError> {
        let Some(users) = self.kudos.storage().get(USERS_KEY)? else {
            return Ok(vec![]);
        };
        serde_json::from_str(&users).map_err(|source| StoreError::Json {
            key: USERS_KEY.to_string(),
            source,
        })
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        self.all().into_iter().find(|user| user.email == email)
    }

    /// Insert or replace `user` by id, then refresh its copies in the posts.
    ///
    /// The demo accounts are never written out: upserting into an empty
    /// registry leaves just `user`. Returns `false` if the registry could not
    /// be written. A failed propagation is logged only; the registry write is
    /// kept.
    pub fn upsert(&self, user: &User) -> bool {
        let user = user.compressed(self.kudos.limits().max_image_length);
        let _guard = self.kudos.write_lock();

        if let Err(err) = self.write(&user) {
            error!("Failed to save user {}: {}", user.id, err);
            return false;
        }

        if let Err(err) = propagate(&self.kudos.posts(), &user) {
            error!("Failed to update user {} in posts: {}", user.id, err);
        }
        true
    }

    fn write(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.persisted().unwrap_or_else(|err| {
            warn!("Overwriting unreadable users: {}", err);
            vec![]
        });
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }

        let value = serde_json::to_string(&users).map_err(|source| StoreError::Json {
            key: USERS_KEY.to_string(),
            source,
        })?;
        self.kudos.storage().set(USERS_KEY, &value)?;
        debug!("Saved {} users", users.len());
        Ok(())
    }

    /// Logged-in user, if any.
    ///
    /// Resolves the id recorded by [`log_in`](Self::log_in). When the flag was
    /// set without it, this falls back to the first registry entry, which is
    /// not necessarily who logged in.
    pub fn current_user(&self) -> Option<User> {
        if !self.kudos.auth().is_authenticated() {
            return None;
        }

        let users = self.all();
        let session = self.session();
        session
            .and_then(|id| users.iter().find(|user| user.id == id).cloned())
            .or_else(|| users.into_iter().next())
    }

    fn session(&self) -> Option<String> {
        match self.kudos.storage().get(SESSION_KEY) {
            Ok(value) => value.and_then(|v| serde_json::from_str(&v).ok()),
            Err(err) => {
                error!("Failed to read session: {}", err);
                None
            }
        }
    }

    pub fn log_in(&self, email: &str, password: &str) -> Option<User> {
        let user = self
            .all()
            .into_iter()
            .find(|user| user.matches(email, password))?;

        let session = serde_json::Value::from(user.id.as_str()).to_string();
        if let Err(err) = self.kudos.storage().set(SESSION_KEY, &session) {
            error!("Failed to save session: {}", err);
        }
        self.kudos.auth().set_authenticated(true);
        info!("Logged in as {}", user.name);
        Some(user)
    }

    pub fn log_out(&self) {
        if let Err(err) = self.kudos.storage().remove(SESSION_KEY) {
            error!("Failed to clear session: {}", err);
        }
        self.kudos.auth().set_authenticated(false);
    }

    /// Validate the form and register a new account.
    pub fn sign_up(&self, form: SignUp) -> Result<User, ValidationError> {
        form.validate()?;
        if self.find_by_email(&form.email).is_some() {
            return Err(ValidationError::DuplicateEmail);
        }

        let user = User {
            id: time_id(),
            name: form.name.trim().to_string(),
            email: form.email,
            password: form.password,
            profile_image: form.profile_image,
        };
        if !self.upsert(&user) {
            return Err(ValidationError::NotSaved);
        }
        Ok(user.compressed(self.kudos.limits().max_image_length))
    }
}
