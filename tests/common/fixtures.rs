//! OpenTDB response fixtures and a scripted mock server

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Session token served by [`mount_token`]
pub const TEST_TOKEN: &str = "0f3a9c7e5b1d";

/// A multiple-choice item, HTML-encoded the way the API sends it
pub fn multiple(question: &str, correct: &str, incorrect: [&str; 3]) -> Value {
    json!({
        "type": "multiple",
        "difficulty": "medium",
        "category": "Science: Computers",
        "question": question,
        "correct_answer": correct,
        "incorrect_answers": incorrect
    })
}

/// A true/false item
pub fn boolean(question: &str, correct: bool) -> Value {
    let (correct, incorrect) = if correct {
        ("True", "False")
    } else {
        ("False", "True")
    };
    json!({
        "type": "boolean",
        "difficulty": "easy",
        "category": "Science: Computers",
        "question": question,
        "correct_answer": correct,
        "incorrect_answers": [incorrect]
    })
}

/// Serve [`TEST_TOKEN`] from the token endpoint
pub async fn mount_token(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api_token.php"))
        .and(query_param("command", "request"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response_code": 0,
            "response_message": "Token Generated Successfully!",
            "token": TEST_TOKEN
        })))
        .mount(server)
        .await;
}

/// Report `total` questions for `category`
pub async fn mount_count(server: &MockServer, category: i64, total: u64) {
    Mock::given(method("GET"))
        .and(path("/api_count.php"))
        .and(query_param("category", category.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "category_id": category,
            "category_question_count": {
                "total_question_count": total,
                "total_easy_question_count": total,
                "total_medium_question_count": 0,
                "total_hard_question_count": 0
            }
        })))
        .mount(server)
        .await;
}

/// Serve `pages` in order for `category`, then response code 4 forever
pub async fn mount_pages(server: &MockServer, category: i64, pages: Vec<Vec<Value>>) {
    for results in pages {
        Mock::given(method("GET"))
            .and(path("/api.php"))
            .and(query_param("category", category.to_string()))
            .and(query_param("token", TEST_TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response_code": 0,
                "results": results
            })))
            .up_to_n_times(1)
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("category", category.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response_code": 4,
            "results": []
        })))
        .mount(server)
        .await;
}

/// Requests received by `endpoint` (e.g. "/api.php")
pub async fn requests_to(server: &MockServer, endpoint: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == endpoint)
        .collect()
}
