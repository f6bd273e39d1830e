//! Keeps the user copies embedded in posts in line with the registry.

use log::debug;

use crate::{
    error::StoreError,
    post::{Post, PostStore},
    storage::KeyValueStore,
    Kudos,
};

use super::User;

/// Embedded copies replaced by a propagation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Propagation {
    pub authors: usize,
    pub mentions: usize,
    pub comments: usize,
}

impl Propagation {
    pub fn total(&self) -> usize {
        self.authors + self.mentions + self.comments
    }
}

/// Replace every copy of `user` inside `posts`.
pub fn replace_user(posts: &mut [Post], user: &User) -> Propagation {
    let mut replaced = Propagation::default();

    for post in posts.iter_mut() {
        if post.user.id == user.id {
            post.user = user.clone();
            replaced.authors += 1;
        }

        for mentioned in post.mentioned_users.iter_mut().filter(|u| u.id == user.id) {
            *mentioned = user.clone();
            replaced.mentions += 1;
        }

        for comment in post.comments.iter_mut().filter(|c| c.user.id == user.id) {
            comment.user = user.clone();
            replaced.comments += 1;
        }
    }

    replaced
}

/// Load every post, rewrite `user`'s copies and save the collection back.
///
/// The save re-applies the storage caps to the whole collection.
pub fn propagate<S: KeyValueStore + ?Sized>(
    store: &PostStore<'_, S>,
    user: &User,
) -> Result<Propagation, StoreError> {
    let mut posts = store.try_load()?;
    let replaced = replace_user(&mut posts, user);
    store.try_save(&posts)?;

    debug!(
        "Propagated user {} into {} copies",
        user.id,
        replaced.total()
    );
    Ok(replaced)
}

impl<S: KeyValueStore> Kudos<S> {
    /// [`propagate`] under the writer lock.
    pub fn propagate(&self, user: &User) -> Result<Propagation, StoreError> {
        let _guard = self.write_lock();
        propagate(&self.posts(), user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        post::Comment,
        storage::MemoryStore,
        user::seed_users,
    };

    fn renamed(user: &User, name: &str) -> User {
        User {
            name: name.to_string(),
            ..user.clone()
        }
    }

    #[test]
    fn renames_author_and_keeps_counts() {
        let kudos = Kudos::new(MemoryStore::new());
        let users = seed_users();

        let mut post = Post::new(users[1].clone(), "shout out");
        post.likes = 4;
        post.has_liked = true;
        post.push_comment(Comment::new(&post.id, users[0].clone(), "agreed"), 50);
        let other = Post::new(users[0].clone(), "unrelated");
        kudos.posts().try_save(&[post, other]).unwrap();

        let replaced = kudos.propagate(&renamed(&users[1], "New Name")).unwrap();
        assert_eq!(replaced, Propagation { authors: 1, mentions: 0, comments: 0 });

        let posts = kudos.posts().load();
        assert_eq!(posts[0].user.name, "New Name");
        assert_eq!(posts[0].likes, 4);
        assert!(posts[0].has_liked);
        assert_eq!(posts[0].comments.len(), 1);
        assert_eq!(posts[0].comments[0].user.name, users[0].name);
        assert_eq!(posts[1].user.name, users[0].name);
    }

    #[test]
    fn rewrites_mentions_and_comments_everywhere() {
        let users = seed_users();
        let mut first = Post::new(users[0].clone(), "a").mentioning(vec![users[1].clone()]);
        first.push_comment(Comment::new(&first.id, users[1].clone(), "x"), 50);
        let mut second = Post::new(users[0].clone(), "b");
        second.push_comment(Comment::new(&second.id, users[1].clone(), "y"), 50);
        second.push_comment(Comment::new(&second.id, users[0].clone(), "z"), 50);
        let mut posts = vec![first, second];

        let mut updated = renamed(&users[1], "Miku");
        updated.profile_image = "https://example.com/miku.png".to_string();
        let replaced = replace_user(&mut posts, &updated);

        assert_eq!(replaced, Propagation { authors: 0, mentions: 1, comments: 2 });
        assert_eq!(posts[0].mentioned_users[0], updated);
        assert_eq!(posts[0].comments[0].user, updated);
        assert_eq!(posts[1].comments[0].user, updated);
        assert_eq!(posts[1].comments[1].user, users[0]);
    }

    #[test]
    fn unreadable_posts_fail_without_writing() {
        let kudos = Kudos::new(MemoryStore::new());
        kudos
            .storage()
            .set("praise_platform_posts_count", "oops")
            .unwrap();

        assert!(kudos.propagate(&seed_users()[0]).is_err());
        assert_eq!(
            kudos.storage().get("praise_platform_posts_count").unwrap().as_deref(),
            Some("oops")
        );
    }
}
