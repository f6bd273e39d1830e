pub mod propagate;
pub mod registry;

use serde::{Deserialize, Serialize};

pub use propagate::Propagation;
pub use registry::{SignUp, UserRegistry};

use crate::normalize::compress_image;

pub const DEFAULT_PROFILE_IMAGE: &str = "https://images.unsplash.com/photo-1494790108377-be9c29b29330?ixlib=rb-1.2.1&auto=format&fit=facearea&facepad=2&w=256&h=256&q=80";

#[derive(Deserialize, Serialize, Debug, Clone, Hash, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Stored as typed, there is no hashing in this app.
    #[serde(default)]
    pub password: String,
    /// Either a URL or an inlined `data:image` payload.
    pub profile_image: String,
}

impl User {
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }

    /// Copy of this user with the profile image capped at `max_image_length`.
    pub fn compressed(&self, max_image_length: usize) -> Self {
        Self {
            profile_image: compress_image(&self.profile_image, max_image_length),
            ..self.clone()
        }
    }
}

/// Demo accounts used while no user has been persisted.
pub fn seed_users() -> Vec<User> {
    vec![
        User {
            id: "1".to_string(),
            name: "テストユーザー".to_string(),
            email: "test@example.com".to_string(),
            password: "test1234".to_string(),
            profile_image: DEFAULT_PROFILE_IMAGE.to_string(),
        },
        User {
            id: "2".to_string(),
            name: "ミク".to_string(),
            email: "anmiku6464@gmail.com".to_string(),
            password: "test1234".to_string(),
            profile_image: DEFAULT_PROFILE_IMAGE.to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_like_the_browser_layout() {
        let user = &seed_users()[0];
        let json = serde_json::to_value(user).unwrap();
        assert_eq!(json["profileImage"], DEFAULT_PROFILE_IMAGE);
        assert_eq!(json["email"], "test@example.com");
    }

    #[test]
    fn missing_password_defaults_to_empty() {
        let user: User = serde_json::from_str(
            r#"{"id":"3","name":"n","email":"e@x.com","profileImage":"p"}"#,
        )
        .unwrap();
        assert_eq!(user.password, "");
        assert!(!user.matches("e@x.com", "anything"));
    }

    #[test]
    fn compressed_only_touches_the_image() {
        let mut user = seed_users().remove(1);
        user.profile_image = format!("data:image/jpeg;base64,{}", "B".repeat(50));
        let compressed = user.compressed(20);
        assert_eq!(compressed.profile_image.chars().count(), 20);
        assert_eq!(compressed.name, user.name);
        assert_eq!(compressed.id, user.id);
    }
}
