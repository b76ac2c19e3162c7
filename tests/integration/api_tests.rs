//! API integration tests
//!
//! These run against a live server backed by Postgres and Redis.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Unique suffix so repeated runs don't collide on email/username
fn unique(label: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{}{}", label, nanos)
}

async fn create_author(client: &Client) -> i64 {
    let response = client
        .post(format!("{}/authors", BASE_URL))
        .json(&json!({ "name": "Ursula K. Le Guin" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No author ID")
}

async fn create_book(client: &Client, total_copies: i64) -> i64 {
    let author_id = create_author(client).await;
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "The Dispossessed",
            "author_id": author_id,
            "total_copies": total_copies
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["available_copies"], total_copies);
    body["id"].as_i64().expect("No book ID")
}

async fn create_member(client: &Client) -> i64 {
    let name = unique("member");
    let response = client
        .post(format!("{}/members", BASE_URL))
        .json(&json!({
            "email": format!("{}@example.org", name),
            "username": name
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No member ID")
}

async fn available_copies(client: &Client, book_id: i64) -> i64 {
    let body: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    body["available_copies"].as_i64().expect("No available_copies")
}

async fn loan(client: &Client, book_id: i64, member_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/books/{}/loan", BASE_URL, book_id))
        .json(&json!({ "member_id": member_id }))
        .send()
        .await
        .expect("Failed to send request")
}

async fn return_book(client: &Client, book_id: i64, member_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/books/{}/return_book", BASE_URL, book_id))
        .json(&json!({ "member_id": member_id }))
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_loan_until_exhausted_then_return() {
    let client = Client::new();
    let book_id = create_book(&client, 2).await;
    let m1 = create_member(&client).await;
    let m2 = create_member(&client).await;
    let m3 = create_member(&client).await;

    let response = loan(&client, book_id, m1).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["loan"]["is_returned"], false);
    assert!(body["loan"]["return_date"].is_null());
    assert_eq!(available_copies(&client, book_id).await, 1);

    assert_eq!(loan(&client, book_id, m2).await.status(), StatusCode::CREATED);
    assert_eq!(available_copies(&client, book_id).await, 0);

    let response = loan(&client, book_id, m3).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "InsufficientCopies");
    assert_eq!(available_copies(&client, book_id).await, 0);

    let response = return_book(&client, book_id, m1).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["loan"]["is_returned"], true);
    assert!(body["loan"]["return_date"].is_string());
    assert_eq!(available_copies(&client, book_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn test_loan_then_return_leaves_one_returned_loan() {
    let client = Client::new();
    let book_id = create_book(&client, 1).await;
    let member_id = create_member(&client).await;

    assert_eq!(loan(&client, book_id, member_id).await.status(), StatusCode::CREATED);
    assert_eq!(return_book(&client, book_id, member_id).await.status(), StatusCode::OK);
    assert_eq!(available_copies(&client, book_id).await, 1);

    let loans: Value = client
        .get(format!("{}/loans?book_id={}&member_id={}", BASE_URL, book_id, member_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let loans = loans.as_array().expect("Loans should be an array");
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0]["is_returned"], true);
}

#[tokio::test]
#[ignore]
async fn test_loan_to_unknown_member() {
    let client = Client::new();
    let book_id = create_book(&client, 1).await;

    let response = loan(&client, book_id, i32::MAX as i64).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "MemberNotFound");
    assert_eq!(available_copies(&client, book_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn test_return_without_active_loan() {
    let client = Client::new();
    let book_id = create_book(&client, 1).await;
    let member_id = create_member(&client).await;

    let response = return_book(&client, book_id, member_id).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "ActiveLoanNotFound");
    assert_eq!(available_copies(&client, book_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn test_loan_unknown_book() {
    let client = Client::new();
    let member_id = create_member(&client).await;

    let response = loan(&client, i32::MAX as i64, member_id).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_extend_due_date() {
    let client = Client::new();
    let book_id = create_book(&client, 1).await;
    let member_id = create_member(&client).await;

    let body: Value = loan(&client, book_id, member_id)
        .await
        .json()
        .await
        .expect("Failed to parse response");
    let loan_id = body["loan"]["id"].as_i64().expect("No loan ID");
    let due_date = chrono::NaiveDate::parse_from_str(
        body["loan"]["due_date"].as_str().expect("No due date"),
        "%Y-%m-%d",
    )
    .expect("Invalid due date");

    let response = client
        .post(format!("{}/loans/{}/extend_due_date", BASE_URL, loan_id))
        .json(&json!({ "additional_days": 7 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    let expected = (due_date + chrono::Duration::days(7)).format("%Y-%m-%d").to_string();
    assert_eq!(body["due_date"], expected);

    let response = client
        .post(format!("{}/loans/{}/extend_due_date", BASE_URL, loan_id))
        .json(&json!({ "additional_days": 0 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_top_active_members() {
    let client = Client::new();
    let book_id = create_book(&client, 3).await;
    let busy = create_member(&client).await;
    for _ in 0..3 {
        assert_eq!(loan(&client, book_id, busy).await.status(), StatusCode::CREATED);
    }

    let response = client
        .get(format!("{}/members/top-active", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let entries = body.as_array().expect("Ranking should be an array");
    assert!(entries.len() <= 5);

    let counts: Vec<i64> = entries
        .iter()
        .map(|e| e["active_loan"].as_i64().expect("No active_loan"))
        .collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    assert!(entries.iter().all(|e| e["email"].is_string() && e["username"].is_string()));
}

#[tokio::test]
#[ignore]
async fn test_list_books_page_size() {
    let client = Client::new();
    create_book(&client, 1).await;
    create_book(&client, 1).await;

    let response = client
        .get(format!("{}/books?page_size=1", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["items"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(body["page_size"], 1);
    assert!(body["total"].as_i64().unwrap_or(0) >= 2);
}

#[tokio::test]
#[ignore]
async fn test_delete_book_with_history_conflicts() {
    let client = Client::new();
    let book_id = create_book(&client, 1).await;
    let member_id = create_member(&client).await;
    assert_eq!(loan(&client, book_id, member_id).await.status(), StatusCode::CREATED);

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_return_picks_earliest_active_loan() {
    let client = Client::new();
    let book_id = create_book(&client, 3).await;
    let member_id = create_member(&client).await;

    let mut loan_ids = Vec::new();
    for _ in 0..3 {
        let body: Value = loan(&client, book_id, member_id)
            .await
            .json()
            .await
            .expect("Failed to parse response");
        loan_ids.push(body["loan"]["id"].as_i64().expect("No loan ID"));
    }
    assert_eq!(available_copies(&client, book_id).await, 0);

    let response = return_book(&client, book_id, member_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    let earliest = loan_ids.iter().copied().min().expect("No loans");
    assert_eq!(body["loan"]["id"], earliest);
    assert_eq!(available_copies(&client, book_id).await, 1);

    let loans: Value = client
        .get(format!("{}/loans?book_id={}&member_id={}&active=true", BASE_URL, book_id, member_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let mut active: Vec<i64> = loans
        .as_array()
        .expect("Loans should be an array")
        .iter()
        .map(|l| l["id"].as_i64().expect("No loan ID"))
        .collect();
    active.sort_unstable();
    let mut expected: Vec<i64> = loan_ids.into_iter().filter(|id| *id != earliest).collect();
    expected.sort_unstable();
    assert_eq!(active, expected);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_loans_for_last_copy() {
    let client = Client::new();
    let book_id = create_book(&client, 1).await;

    let mut members = Vec::new();
    for _ in 0..8 {
        members.push(create_member(&client).await);
    }

    let handles: Vec<_> = members
        .into_iter()
        .map(|member_id| {
            let client = client.clone();
            tokio::spawn(async move {
                let response = loan(&client, book_id, member_id).await;
                let status = response.status();
                let body: Value = response.json().await.expect("Failed to parse response");
                (status, body)
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        let (status, body) = handle.await.expect("Loan task panicked");
        if status == StatusCode::CREATED {
            created += 1;
        } else {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "InsufficientCopies");
        }
    }
    assert_eq!(created, 1);
    assert_eq!(available_copies(&client, book_id).await, 0);
}

#[tokio::test]
#[ignore]
async fn test_loan_without_member_id() {
    let client = Client::new();
    let book_id = create_book(&client, 1).await;

    let response = client
        .post(format!("{}/books/{}/loan", BASE_URL, book_id))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "MemberNotFound");
    assert_eq!(available_copies(&client, book_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn test_update_book_unknown_author() {
    let client = Client::new();
    let book_id = create_book(&client, 1).await;

    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .json(&json!({ "author_id": i32::MAX }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "NoSuchData");
}

#[tokio::test]
#[ignore]
async fn test_update_author_clears_bio() {
    let client = Client::new();
    let response = client
        .post(format!("{}/authors", BASE_URL))
        .json(&json!({ "name": "Octavia E. Butler", "bio": "Kindred" }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let author_id = body["id"].as_i64().expect("No author ID");

    let response = client
        .put(format!("{}/authors/{}", BASE_URL, author_id))
        .json(&json!({ "name": "Octavia Butler" }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["bio"], "Kindred");

    let response = client
        .put(format!("{}/authors/{}", BASE_URL, author_id))
        .json(&json!({ "bio": null }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["bio"].is_null());
    assert_eq!(body["name"], "Octavia Butler");
}
