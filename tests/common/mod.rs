//! Shared fixtures for the integration tests.
//!
//! Store-backed tests need `TEST_DATABASE_URL` pointing at a disposable
//! PostgreSQL database: every seeded client drops and recreates the tables.

#![allow(dead_code)]

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use rocket::local::blocking::Client;
use std::env;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use news_api::db::Pool;
use news_api::endpoints::Endpoints;

lazy_static::lazy_static! {
    static ref DB_LOCK: Mutex<()> = Mutex::new(());
}

pub const SEED_SQL: &str = r#"
DROP TABLE IF EXISTS comments;
DROP TABLE IF EXISTS articles;
DROP TABLE IF EXISTS users;
DROP TABLE IF EXISTS topics;

CREATE TABLE topics (
    slug VARCHAR PRIMARY KEY,
    description VARCHAR
);

CREATE TABLE users (
    username VARCHAR PRIMARY KEY,
    name VARCHAR NOT NULL,
    avatar_url VARCHAR
);

CREATE TABLE articles (
    article_id SERIAL PRIMARY KEY,
    title VARCHAR NOT NULL,
    topic VARCHAR NOT NULL REFERENCES topics(slug),
    author VARCHAR NOT NULL REFERENCES users(username),
    body VARCHAR NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT NOW(),
    votes INT NOT NULL DEFAULT 0,
    article_img_url VARCHAR DEFAULT 'https://images.pexels.com/photos/97050/pexels-photo-97050.jpeg?w=700&h=700'
);

CREATE TABLE comments (
    comment_id SERIAL PRIMARY KEY,
    body VARCHAR NOT NULL,
    article_id INT NOT NULL REFERENCES articles(article_id) ON DELETE CASCADE,
    author VARCHAR NOT NULL REFERENCES users(username),
    votes INT NOT NULL DEFAULT 0,
    created_at TIMESTAMP NOT NULL DEFAULT NOW()
);

INSERT INTO topics (slug, description) VALUES
    ('mitch', 'The man, the Mitch, the legend'),
    ('cats', 'Not dogs'),
    ('paper', 'what books are made of');

INSERT INTO users (username, name, avatar_url) VALUES
    ('butter_bridge', 'jonny', 'https://www.healthytherapies.com/wp-content/uploads/2016/06/Lime3.jpg'),
    ('icellusedkars', 'sam', 'https://avatars2.githubusercontent.com/u/24604688?s=460&v=4'),
    ('rogersop', 'paul', 'https://avatars2.githubusercontent.com/u/24394918?s=400&v=4'),
    ('lurker', 'do_nothing', 'https://www.golenbock.com/wp-content/uploads/2015/01/placeholder-user.png');

INSERT INTO articles (title, topic, author, body, created_at, votes) VALUES
    ('Living in the shadow of a great man', 'mitch', 'butter_bridge', 'I find this existence challenging', '2020-07-09 20:11:00', 100),
    ('Sony Vaio; or, The Laptop', 'mitch', 'icellusedkars', 'Call me Mitchell.', '2020-10-16 05:03:00', 0),
    ('Eight pug gifs that remind me of mitch', 'mitch', 'icellusedkars', 'some gifs', '2020-11-03 09:12:00', 0),
    ('Student SUES Mitch!', 'mitch', 'rogersop', 'We all love Mitch and his wonderful, unique typing style.', '2020-05-06 01:14:00', 0),
    ('UNCOVERED: catspiracy to bring down democracy', 'cats', 'rogersop', 'Bastet walks amongst us, and the cats are taking arms!', '2020-08-03 13:14:00', 0),
    ('A', 'mitch', 'icellusedkars', 'Delicious tin of cat food', '2020-10-18 01:00:00', 0),
    ('Z', 'mitch', 'icellusedkars', 'I was hungry.', '2020-01-07 14:08:00', 0);

INSERT INTO comments (body, article_id, author, votes, created_at) VALUES
    ('Oh, I''ve got compassion running out of my nose, pal!', 1, 'butter_bridge', 16, '2020-04-06 12:17:00'),
    ('The beautiful thing about treasure is that it exists.', 1, 'butter_bridge', 14, '2020-10-31 03:03:00'),
    ('Replacing the quiet elegance of the dark suit and tie with the casual indifference of these muted earth tones.', 1, 'icellusedkars', 100, '2020-03-01 01:13:00'),
    ('I carry a log, yes. Is it funny to you? It is not to me.', 1, 'icellusedkars', -100, '2020-02-23 12:01:00'),
    ('Ambidextrous marsupial', 3, 'icellusedkars', 0, '2020-09-19 23:10:00'),
    ('git push origin master', 3, 'butter_bridge', 0, '2020-06-20 07:24:00'),
    ('What do you see? I have no idea where this will lead us.', 5, 'icellusedkars', 16, '2020-06-09 05:00:00'),
    ('Fruit pastilles', 5, 'butter_bridge', 0, '2020-06-15 10:25:00'),
    ('Lobster pot', 6, 'icellusedkars', 0, '2020-05-15 20:19:00');
"#;

/// A client whose pool never connects. Only routes that fail before
/// touching the store may be exercised with it.
pub fn offline_client() -> Client {
    let manager = ConnectionManager::<PgConnection>::new("postgres://localhost:1/unreachable");
    let pool: Pool = r2d2::Pool::builder()
        .max_size(1)
        .min_idle(Some(0))
        .connection_timeout(Duration::from_millis(250))
        .build_unchecked(manager);
    Client::tracked(news_api::build(pool, Endpoints::load().unwrap())).unwrap()
}

/// Holds the database lock for as long as the client is alive.
pub struct Seeded {
    pub client: Client,
    _guard: MutexGuard<'static, ()>,
}

/// A client over a freshly seeded database.
///
/// Panics when `TEST_DATABASE_URL` is not set, so an ignored test run
/// without a database fails instead of passing vacuously.
pub fn seeded_client() -> Seeded {
    let url = env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must point at a disposable PostgreSQL database");
    let guard = DB_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let pool: Pool = r2d2::Pool::builder()
        .max_size(2)
        .build(ConnectionManager::<PgConnection>::new(url))
        .unwrap();
    pool.get().unwrap().batch_execute(SEED_SQL).unwrap();

    let client = Client::tracked(news_api::build(pool, Endpoints::load().unwrap())).unwrap();
    Seeded {
        client,
        _guard: guard,
    }
}
