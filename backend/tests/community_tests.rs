//! Community feed, marketplace and profile API tests

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_delete_post_keeps_other_comments() {
    let app = TestApp::new();
    let author = Uuid::new_v4();
    app.sign_up(author, "Ravi", "farmer").await;

    let (_, first) = app.post("/api/v1/posts", author, json!({ "content": "Monsoon is late" })).await;
    let (_, second) = app.post("/api/v1/posts", author, json!({ "content": "Onion prices up" })).await;
    let first_id = first["id"].as_str().unwrap();
    let second_id = second["id"].as_str().unwrap();

    for (post, text) in [(first_id, "Same here"), (second_id, "In Lasalgaon too")] {
        let (status, _) = app
            .post(&format!("/api/v1/posts/{}/comments", post), author, json!({ "content": text }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = app.delete(&format!("/api/v1/posts/{}", first_id), author).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, feed) = app.get("/api/v1/posts", author).await;
    let posts = feed["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["id"], second_id);
    assert_eq!(posts[0]["author"]["full_name"], "Ravi");
    assert_eq!(posts[0]["comments"][0]["content"], "In Lasalgaon too");
}

#[tokio::test]
async fn test_delete_post_ownership() {
    let app = TestApp::new();
    let author = Uuid::new_v4();
    let (_, post) = app.post("/api/v1/posts", author, json!({ "content": "Mine" })).await;
    let uri = format!("/api/v1/posts/{}", post["id"].as_str().unwrap());

    let (status, _) = app.delete(&uri, Uuid::new_v4()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .delete(&format!("/api/v1/posts/{}", Uuid::new_v4()), author)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_feed_newest_first() {
    let app = TestApp::new();
    let author = Uuid::new_v4();
    for text in ["first", "second", "third"] {
        app.post("/api/v1/posts", author, json!({ "content": text })).await;
    }

    let (_, feed) = app.get("/api/v1/posts", author).await;
    let contents: Vec<&str> = feed["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_product_listing_and_search() {
    let app = TestApp::new();
    let seller = Uuid::new_v4();

    let (status, product) = app
        .post(
            "/api/v1/products",
            seller,
            json!({
                "name": "Alphonso Mango",
                "description": "Ratnagiri, export quality",
                "category": "Fruits",
                "price": "450.00",
                "quantity": "20",
                "unit": "dozen"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(product["status"], "available");

    let (status, body) = app
        .post(
            "/api/v1/products",
            seller,
            json!({ "name": "Rice", "category": "Grains", "price": "0", "quantity": "1", "unit": "kg" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "price");

    let buyer = Uuid::new_v4();
    let (_, found) = app.get("/api/v1/products?search=ratnagiri", buyer).await;
    assert_eq!(found["products"].as_array().unwrap().len(), 1);
    let (_, none) = app.get("/api/v1/products?search=wheat", buyer).await;
    assert!(none["products"].as_array().unwrap().is_empty());

    let (_, mine) = app.get("/api/v1/products/mine", seller).await;
    assert_eq!(mine["products"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_product_stats_by_category() {
    let app = TestApp::new();
    let seller = Uuid::new_v4();
    for (name, category, price) in [
        ("Tomatoes", "Vegetables", "20.00"),
        ("Brinjal", "Vegetables", "30.00"),
        ("Wheat", "Grains", "28.50"),
    ] {
        app.post(
            "/api/v1/products",
            seller,
            json!({ "name": name, "category": category, "price": price, "quantity": "10", "unit": "kg" }),
        )
        .await;
    }

    let (status, body) = app.get("/api/v1/products/stats", Uuid::new_v4()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_products"], 3);

    let categories = body["categories"].as_array().unwrap();
    let average = |i: usize| -> f64 {
        categories[i]["average_price"].as_str().unwrap().parse().unwrap()
    };
    assert_eq!(categories[0]["category"], "Grains");
    assert_eq!(average(0), 28.5);
    assert_eq!(categories[1]["category"], "Vegetables");
    assert_eq!(categories[1]["product_count"], 2);
    assert_eq!(average(1), 25.0);
}

#[tokio::test]
async fn test_profile_lifecycle_and_directory() {
    let app = TestApp::new();
    let me = Uuid::new_v4();
    app.sign_up(me, "Meena", "user").await;

    let (status, _) = app
        .post("/api/v1/profiles", me, json!({ "full_name": "Meena", "role": "user" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let farmer = Uuid::new_v4();
    app.post(
        "/api/v1/profiles",
        farmer,
        json!({
            "full_name": "Suresh Patil",
            "role": "farmer",
            "location": "Nashik",
            "crop_types": ["Grapes", "Onion"]
        }),
    )
    .await;
    app.sign_up(Uuid::new_v4(), "Kiran Traders", "wholesaler").await;

    let (status, updated) = app
        .request(
            Method::PUT,
            "/api/v1/profiles/me",
            Some(me),
            Some(json!({ "location": "Pune", "role": "farmer" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["location"], "Pune");
    assert_eq!(updated["role"], "user");

    let (_, all) = app.get("/api/v1/directory", me).await;
    let names: Vec<&str> = all["profiles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["full_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Kiran Traders", "Suresh Patil"]);

    let (_, grapes) = app.get("/api/v1/directory?search=grape&role=farmer", me).await;
    assert_eq!(grapes["profiles"][0]["id"], farmer.to_string());

    let (status, _) = app.get(&format!("/api/v1/profiles/{}", Uuid::new_v4()), me).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_diagnosis_history() {
    let app = TestApp::new();
    let me = Uuid::new_v4();

    let (status, record) = app
        .post(
            "/api/v1/diagnoses",
            me,
            json!({
                "image_url": "https://img.example/leaf.jpg",
                "diagnosis": "Disease: Leaf Blight",
                "disease_detected": "Leaf Blight",
                "confidence": 78,
                "recommendations": "Copper fungicide"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["status"], "completed");

    let (_, history) = app.get("/api/v1/diagnoses", me).await;
    assert_eq!(history["diagnoses"].as_array().unwrap().len(), 1);

    let (_, other) = app.get("/api/v1/diagnoses", Uuid::new_v4()).await;
    assert!(other["diagnoses"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_health_reports_store() {
    let app = TestApp::new();
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "connected");
    assert_eq!(body["store_backend"], "memory");
}
