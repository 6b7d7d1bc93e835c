use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

use cinelink_api::{create_router, db::InMemoryStore, AppState};

fn create_test_server() -> TestServer {
    let state = AppState::new(Arc::new(InMemoryStore::new()), None, 60);
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

async fn create_user(server: &TestServer, login: &str) -> i64 {
    let response = server
        .post("/users")
        .json(&json!({
            "email": format!("{}@example.com", login),
            "login": login,
            "birthday": "1990-05-17"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}

async fn create_film(server: &TestServer, body: Value) -> i64 {
    let response = server.post("/films").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}

fn film_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "",
        "releaseDate": "2001-07-20",
        "duration": 120,
        "mpa": { "id": 1 }
    })
}

fn ids(values: &[Value], key: &str) -> Vec<i64> {
    values.iter().map(|v| v[key].as_i64().unwrap()).collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_user_name_defaults_to_login() {
    let server = create_test_server();
    let id = create_user(&server, "chihiro").await;

    let response = server.get(&format!("/users/{}", id)).await;
    response.assert_status_ok();
    let user: Value = response.json();
    assert_eq!(user["name"], "chihiro");
}

#[tokio::test]
async fn test_film_validation_and_missing_entities() {
    let server = create_test_server();

    let mut early = film_body("Too Early");
    early["releaseDate"] = json!("1890-01-01");
    server
        .post("/films")
        .json(&early)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let mut unknown_genre = film_body("Mystery");
    unknown_genre["genres"] = json!([{ "id": 42 }]);
    server
        .post("/films")
        .json(&unknown_genre)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = server.get("/films/999").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn test_recommendations_from_overlapping_likes() {
    let server = create_test_server();
    let u1 = create_user(&server, "u1").await;
    let u2 = create_user(&server, "u2").await;
    let u3 = create_user(&server, "u3").await;
    let mut films = Vec::new();
    for title in ["F1", "F2", "F3", "F4"] {
        films.push(create_film(&server, film_body(title)).await);
    }

    for (film, user) in [
        (films[0], u1),
        (films[1], u1),
        (films[1], u2),
        (films[2], u2),
        (films[3], u3),
    ] {
        server
            .put(&format!("/films/{}/like/{}", film, user))
            .await
            .assert_status_ok();
    }

    let recs: Vec<Value> = server
        .get(&format!("/users/{}/recommendations", u1))
        .await
        .json();
    assert_eq!(ids(&recs, "id"), vec![films[2]]);

    let recs: Vec<Value> = server
        .get(&format!("/users/{}/recommendations", u3))
        .await
        .json();
    assert!(recs.is_empty());
}

#[tokio::test]
async fn test_user_without_likes_gets_no_recommendations() {
    let server = create_test_server();
    let user = create_user(&server, "newcomer").await;

    let response = server.get(&format!("/users/{}/recommendations", user)).await;
    response.assert_status_ok();
    assert!(response.json::<Vec<Value>>().is_empty());
}

#[tokio::test]
async fn test_double_like_counts_once_in_popular() {
    let server = create_test_server();
    let fan = create_user(&server, "fan").await;
    let other = create_user(&server, "other").await;
    let a = create_film(&server, film_body("A")).await;
    let b = create_film(&server, film_body("B")).await;
    let c = create_film(&server, film_body("C")).await;

    server.put(&format!("/films/{}/like/{}", a, fan)).await.assert_status_ok();
    server.put(&format!("/films/{}/like/{}", a, fan)).await.assert_status_ok();
    server.put(&format!("/films/{}/like/{}", b, fan)).await.assert_status_ok();
    server.put(&format!("/films/{}/like/{}", b, other)).await.assert_status_ok();

    let popular: Vec<Value> = server
        .get("/films/popular")
        .add_query_param("count", 2)
        .await
        .json();
    assert_eq!(ids(&popular, "id"), vec![b, a]);

    let all: Vec<Value> = server.get("/films/popular").await.json();
    assert_eq!(ids(&all, "id"), vec![b, a, c]);

    server
        .get("/films/popular")
        .add_query_param("count", 0)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_popular_with_genre_and_year_filters() {
    let server = create_test_server();
    let mut drama = film_body("Drama 2001");
    drama["genres"] = json!([{ "id": 2 }]);
    let drama = create_film(&server, drama).await;
    let mut late_drama = film_body("Drama 2011");
    late_drama["genres"] = json!([{ "id": 2 }]);
    late_drama["releaseDate"] = json!("2011-03-01");
    create_film(&server, late_drama).await;

    let popular: Vec<Value> = server
        .get("/films/popular")
        .add_query_param("genreId", 2)
        .add_query_param("year", 2001)
        .await
        .json();
    assert_eq!(ids(&popular, "id"), vec![drama]);
}

#[tokio::test]
async fn test_friendships_are_directed() {
    let server = create_test_server();
    let a = create_user(&server, "alice").await;
    let b = create_user(&server, "bob").await;
    let c = create_user(&server, "carol").await;

    server.put(&format!("/users/{}/friends/{}", a, c)).await.assert_status_ok();
    server.put(&format!("/users/{}/friends/{}", b, c)).await.assert_status_ok();
    server.put(&format!("/users/{}/friends/{}", a, b)).await.assert_status_ok();

    let b_friends: Vec<Value> = server.get(&format!("/users/{}/friends", b)).await.json();
    assert_eq!(ids(&b_friends, "id"), vec![c]);

    let common: Vec<Value> = server
        .get(&format!("/users/{}/friends/common/{}", a, b))
        .await
        .json();
    assert_eq!(ids(&common, "id"), vec![c]);

    let own: Vec<Value> = server
        .get(&format!("/users/{}/friends/common/{}", a, a))
        .await
        .json();
    assert!(own.is_empty());

    server
        .put(&format!("/users/{}/friends/{}", a, b))
        .await
        .assert_status(StatusCode::CONFLICT);
    server
        .put(&format!("/users/{}/friends/{}", a, a))
        .await
        .assert_status(StatusCode::CONFLICT);
    server
        .get("/users/404/friends")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_review_usefulness_and_listing() {
    let server = create_test_server();
    let author = create_user(&server, "author").await;
    let v1 = create_user(&server, "v1").await;
    let v2 = create_user(&server, "v2").await;
    let v3 = create_user(&server, "v3").await;
    let film = create_film(&server, film_body("Ikiru")).await;

    let response = server
        .post("/reviews")
        .json(&json!({
            "content": "Quietly devastating",
            "isPositive": true,
            "userId": author,
            "filmId": film
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let review_id = response.json::<Value>()["reviewId"].as_i64().unwrap();

    server.put(&format!("/reviews/{}/like/{}", review_id, v1)).await.assert_status_ok();
    server.put(&format!("/reviews/{}/like/{}", review_id, v2)).await.assert_status_ok();
    let scored: Value = server
        .put(&format!("/reviews/{}/dislike/{}", review_id, v3))
        .await
        .json();
    assert_eq!(scored["useful"], 1);

    let flipped: Value = server
        .put(&format!("/reviews/{}/like/{}", review_id, v3))
        .await
        .json();
    assert_eq!(flipped["useful"], 3);

    let listed: Vec<Value> = server
        .get("/reviews")
        .add_query_param("filmId", film)
        .await
        .json();
    assert_eq!(ids(&listed, "reviewId"), vec![review_id]);

    server
        .delete(&format!("/reviews/{}", review_id))
        .await
        .assert_status_ok();
    server
        .get(&format!("/reviews/{}", review_id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_by_title_and_director() {
    let server = create_test_server();
    let director: Value = server
        .post("/directors")
        .json(&json!({ "name": "Drama Lab" }))
        .await
        .json();
    let director_id = director["id"].as_i64().unwrap();

    let by_title = create_film(&server, film_body("Family Drama")).await;
    let mut directed = film_body("Silent Harbor");
    directed["directors"] = json!([{ "id": director_id }]);
    let by_director = create_film(&server, directed).await;
    create_film(&server, film_body("Space Comedy")).await;

    let response = server
        .get("/films/search")
        .add_query_param("query", "drama")
        .add_query_param("by", "title,director")
        .await;
    response.assert_status_ok();
    let found: Vec<Value> = response.json();

    assert_eq!(ids(&found, "id"), vec![by_director, by_title]);

    server
        .get("/films/search")
        .add_query_param("query", "drama")
        .add_query_param("by", "genre")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_director_filmography_sorted_by_year() {
    let server = create_test_server();
    let director: Value = server
        .post("/directors")
        .json(&json!({ "name": "Hayao Miyazaki" }))
        .await
        .json();
    let director_id = director["id"].as_i64().unwrap();

    let mut later = film_body("Spirited Away");
    later["directors"] = json!([{ "id": director_id }]);
    let later = create_film(&server, later).await;
    let mut earlier = film_body("Porco Rosso");
    earlier["releaseDate"] = json!("1992-07-18");
    earlier["directors"] = json!([{ "id": director_id }]);
    let earlier = create_film(&server, earlier).await;

    let films: Vec<Value> = server
        .get(&format!("/films/director/{}", director_id))
        .add_query_param("sortBy", "year")
        .await
        .json();
    assert_eq!(ids(&films, "id"), vec![earlier, later]);

    server
        .get("/films/director/999")
        .add_query_param("sortBy", "likes")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_common_films() {
    let server = create_test_server();
    let a = create_user(&server, "a").await;
    let b = create_user(&server, "b").await;
    let shared = create_film(&server, film_body("Shared")).await;
    let solo = create_film(&server, film_body("Solo")).await;
    for (film, user) in [(shared, a), (shared, b), (solo, a)] {
        server
            .put(&format!("/films/{}/like/{}", film, user))
            .await
            .assert_status_ok();
    }

    let common: Vec<Value> = server
        .get("/films/common")
        .add_query_param("userId", a)
        .add_query_param("friendId", b)
        .await
        .json();
    assert_eq!(ids(&common, "id"), vec![shared]);
}

#[tokio::test]
async fn test_feed_records_like_friend_and_vote_in_order() {
    let server = create_test_server();
    let user = create_user(&server, "diarist").await;
    let friend = create_user(&server, "pal").await;
    let film = create_film(&server, film_body("Paterson")).await;

    let review: Value = server
        .post("/reviews")
        .json(&json!({
            "content": "Poems in a notebook",
            "isPositive": true,
            "userId": friend,
            "filmId": film
        }))
        .await
        .json();
    let review_id = review["reviewId"].as_i64().unwrap();

    server.put(&format!("/films/{}/like/{}", film, user)).await.assert_status_ok();
    server.put(&format!("/users/{}/friends/{}", user, friend)).await.assert_status_ok();
    server
        .put(&format!("/reviews/{}/like/{}", review_id, user))
        .await
        .assert_status_ok();

    let feed: Vec<Value> = server.get(&format!("/users/{}/feed", user)).await.json();
    assert_eq!(feed.len(), 3);

    let kinds: Vec<(&str, &str, i64)> = feed
        .iter()
        .map(|e| {
            (
                e["eventType"].as_str().unwrap(),
                e["operation"].as_str().unwrap(),
                e["entityId"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("LIKE", "ADD", film),
            ("FRIEND", "ADD", friend),
            ("REVIEW", "ADD", review_id),
        ]
    );

    let stamps = ids(&feed, "timestamp");
    assert!(stamps.windows(2).all(|pair| pair[0] < pair[1]));

    server
        .get("/users/404/feed")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reference_data() {
    let server = create_test_server();

    let genres: Vec<Value> = server.get("/genres").await.json();
    assert_eq!(genres.len(), 6);

    let rating: Value = server.get("/mpa/4").await.json();
    assert_eq!(rating["name"], "R");

    server.get("/genres/77").await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_user_no_longer_drives_recommendations() {
    let server = create_test_server();
    let gone = create_user(&server, "gone").await;
    let stays = create_user(&server, "stays").await;
    let film = create_film(&server, film_body("Left Behind")).await;
    server.put(&format!("/films/{}/like/{}", film, gone)).await.assert_status_ok();
    server.put(&format!("/films/{}/like/{}", film, stays)).await.assert_status_ok();

    server.delete(&format!("/users/{}", gone)).await.assert_status_ok();
    server
        .get(&format!("/users/{}", gone))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let recs: Vec<Value> = server
        .get(&format!("/users/{}/recommendations", stays))
        .await
        .json();
    assert!(recs.is_empty());
}
