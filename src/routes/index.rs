use axum::{response::Html, routing::get, Router};

use crate::state::AppState;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>User CRUD API Server</title>
    <meta charset="UTF-8">
</head>
<body>
    <h1>User CRUD API</h1>
    <h2>Endpoints</h2>
    <ul>
        <li><strong>GET</strong> /api/users - list all users</li>
        <li><strong>GET</strong> /api/users/{id} - fetch one user</li>
        <li><strong>POST</strong> /api/users - create a user</li>
        <li><strong>PUT</strong> /api/users/{id} - update a user</li>
        <li><strong>DELETE</strong> /api/users/{id} - delete a user</li>
        <li><strong>GET</strong> /health - health check</li>
    </ul>
    <h2>User payload</h2>
    <pre>{
  "name": "Li Lei",
  "email": "lilei@example.com",
  "age": 25
}</pre>
</body>
</html>"#;

pub fn index_routes() -> Router<AppState> {
    Router::new().route("/", get(index))
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
