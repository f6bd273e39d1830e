mod config;

use std::error::Error;

use config::{Command, Config};
use kudos::{
    database,
    post::Post,
    storage::{FileStore, KeyValueStore},
    user::{SignUp, User},
    utils::resolve_image,
    Kudos,
};
use log::{info, warn};

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::parse();
    config.init_logger();

    let store = FileStore::open(config.data())?;
    let kudos = Kudos::new(store).with_limits(config.limits());

    match config.command.clone() {
        Command::SignUp {
            name,
            email,
            password,
            image,
        } => {
            let user = kudos.users().sign_up(SignUp {
                name,
                email,
                password,
                profile_image: resolve_image(&image)?,
            })?;
            info!("Welcome, {} (id {})", user.name, user.id);
        }
        Command::LogIn { email, password } => match kudos.users().log_in(&email, &password) {
            Some(user) => info!("Hello, {}", user.name),
            None => return Err("email or password is incorrect".into()),
        },
        Command::LogOut => {
            kudos.users().log_out();
            info!("Logged out");
        }
        Command::Whoami => match kudos.users().current_user() {
            Some(user) => info!("{} <{}> (id {})", user.name, user.email, user.id),
            None => info!("Not logged in"),
        },
        Command::Users => display_users(&kudos.users().all()),
        Command::Post { content, mentions } => {
            let author = require_user(&kudos)?;
            let users = kudos.users();
            let mentions = mentions
                .iter()
                .filter_map(|email| {
                    let user = users.find_by_email(email);
                    if user.is_none() {
                        warn!("No user with email {}", email);
                    }
                    user
                })
                .collect();

            match kudos.timeline().publish(&author, &content, mentions) {
                Some(post) => info!("Posted {}", post.id),
                None => return Err("nothing was posted".into()),
            }
        }
        Command::Like { post_id } => {
            require_user(&kudos)?;
            if !kudos.timeline().toggle_like(&post_id) {
                return Err(format!("could not like {post_id}").into());
            }
        }
        Command::Comment { post_id, content } => {
            let author = require_user(&kudos)?;
            match kudos.timeline().comment(&post_id, &author, &content) {
                Some(comment) => info!("Commented {}", comment.id),
                None => return Err(format!("could not comment on {post_id}").into()),
            }
        }
        Command::List {
            search,
            sort,
            direction,
        } => {
            let posts = kudos.timeline().list(&search, sort, direction);
            info!("{} posts (sorted by {} {})", posts.len(), sort, direction);
            display_posts(&posts);
        }
        Command::Profile { name, image } => {
            let mut user = require_user(&kudos)?;
            if let Some(name) = name {
                user.name = name.trim().to_string();
            }
            if let Some(image) = image {
                user.profile_image = resolve_image(&image)?;
            }
            if !kudos.users().upsert(&user) {
                return Err("failed to save profile".into());
            }
            info!("Profile updated");
        }
        Command::SetupDb => {
            let path = config.database();
            kudos::unit_short!("Setup database", {
                let conn = database::create_connection(&path)?;
                database::seed(&conn)?
            });
        }
    }

    Ok(())
}

fn require_user<S: KeyValueStore>(kudos: &Kudos<S>) -> Result<User, Box<dyn Error>> {
    kudos
        .users()
        .current_user()
        .ok_or_else(|| "log in first".into())
}

fn display_users(users: &[User]) {
    let (mut id_width, mut name_width) = (4_usize, 6_usize);
    for user in users {
        id_width = user.id.len().max(id_width);
        name_width = user.name.chars().count().max(name_width);
    }

    info!(
        "+-{:-<id_width$}-+-{:-<name_width$}-+-{}------- - -",
        " Id ", " Name ", " Email "
    );
    for user in users {
        info!(
            "| {:id_width$} | {:name_width$} | {}",
            user.id, user.name, user.email
        );
    }
    info!(
        "+-{}-+-{}-+------------ - -",
        "-".repeat(id_width),
        "-".repeat(name_width)
    );
}

fn display_posts(posts: &[Post]) {
    let (mut id_width, mut name_width) = (4_usize, 6_usize);
    for post in posts {
        id_width = post.id.len().max(id_width);
        name_width = post.user.name.chars().count().max(name_width);
    }

    info!(
        "+-{:-<id_width$}-+-{:-<name_width$}-+-{:-<5}-+-{:-<5}-+-{}------- - -",
        " Id ", " User ", " ♥ ", " 💬 ", " Content "
    );
    for post in posts {
        info!(
            "| {:id_width$} | {:name_width$} | {:5} | {:5} | {}",
            post.id,
            post.user.name,
            post.likes,
            post.comments.len(),
            post.content
        );
        for comment in &post.comments {
            info!(
                "| {:id_width$} | {:name_width$} | {:5} | {:5} |   > {}",
                "", comment.user.name, "", "", comment.content
            );
        }
    }
    info!(
        "+-{}-+-{}-+-------+-------+------------ - -",
        "-".repeat(id_width),
        "-".repeat(name_width)
    );
}
