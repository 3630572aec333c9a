//! Mock identities and demo content.
//!
//! The gateway tracks no authors, so display identities come from this
//! roster.

use super::ids::{CommentId, PostId};
use super::post::{Comment, ImageRef, Post, SyncStatus, UserRef};

const SESSION_USER: (&str, &str) = (
    "Michał Pstrąg",
    "https://avatars.githubusercontent.com/u/47692610?v=4",
);

const MOCK_USERS: [(&str, &str); 3] = [
    (
        "Alan Konarski",
        "https://sloppy-joe-app.imgix.net/blog_images/img-3064a-jpg-m9oR.jpg?usm=20&usmrad=15&w=512&h=512",
    ),
    (
        "Eryk Mazuś",
        "https://avatars.githubusercontent.com/u/21311210?v=4",
    ),
    (
        "Michał Pstrąg",
        "https://avatars.githubusercontent.com/u/47692610?v=4",
    ),
];

/// Default identity of whoever is using this client
pub fn session_user() -> UserRef {
    UserRef::new(SESSION_USER.0).with_avatar(SESSION_USER.1)
}

/// Identities handed out to server-side posts and comments
pub fn mock_users() -> Vec<UserRef> {
    MOCK_USERS
        .iter()
        .map(|(name, avatar)| UserRef::new(*name).with_avatar(*avatar))
        .collect()
}

/// Two sample posts shown before the first sync completes.
pub fn demo_posts() -> Vec<Post> {
    let jane = UserRef::new("Jane Doe").with_avatar("https://randomuser.me/api/portraits/women/68.jpg");
    let alex = UserRef::new("Alex Smith").with_avatar("https://randomuser.me/api/portraits/men/12.jpg");
    let charlie = UserRef::new("Charlie").with_avatar("https://randomuser.me/api/portraits/men/45.jpg");

    let coffee = PostId::server("demo-1");
    let cat = PostId::server("demo-2");

    vec![
        Post {
            id: coffee.clone(),
            author: jane.clone(),
            image: ImageRef::Url(
                "https://images.unsplash.com/photo-1649972904349-6e44c42644a7?auto=format&fit=crop&w=500&q=80"
                    .to_string(),
            ),
            caption: "Enjoying my coffee ☕️ in the morning sunshine!".to_string(),
            comments: vec![Comment {
                id: CommentId::new(coffee, 0),
                author: alex.clone(),
                text: "Looks delicious!".to_string(),
            }],
            status: SyncStatus::Synced,
        },
        Post {
            id: cat.clone(),
            author: alex,
            image: ImageRef::Url(
                "https://images.unsplash.com/photo-1582562124811-c09040d0a901?auto=format&fit=crop&w=500&q=80"
                    .to_string(),
            ),
            caption: "My cat being silly as always 😹".to_string(),
            comments: vec![
                Comment {
                    id: CommentId::new(cat.clone(), 0),
                    author: jane,
                    text: "So cute!!!".to_string(),
                },
                Comment {
                    id: CommentId::new(cat, 1),
                    author: charlie,
                    text: "Give her a hug from me!".to_string(),
                },
            ],
            status: SyncStatus::Synced,
        },
    ]
}
