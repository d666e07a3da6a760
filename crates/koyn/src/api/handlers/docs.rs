//! Machine-readable route index.

use axum::Json;
use serde_json::{Value, json};

/// `GET /docs` — a static index of the HTTP surface. Public by policy.
pub async fn docs() -> Json<Value> {
    Json(json!({
        "service": "koyn",
        "version": env!("CARGO_PKG_VERSION"),
        "routes": [
            { "method": "GET",    "path": "/health",           "auth": false },
            { "method": "GET",    "path": "/docs",             "auth": false },
            { "method": "POST",   "path": "/auth/signup",      "auth": false },
            { "method": "POST",   "path": "/auth/login",       "auth": false },
            { "method": "POST",   "path": "/oauth2/{provider}", "auth": false },
            { "method": "GET",    "path": "/uploads/{key}",    "auth": false },
            { "method": "GET",    "path": "/users/me",         "auth": true },
            { "method": "GET",    "path": "/posts",            "auth": true },
            { "method": "POST",   "path": "/posts",            "auth": true },
            { "method": "GET",    "path": "/posts/mine",       "auth": true },
            { "method": "GET",    "path": "/posts/{id}",       "auth": true },
            { "method": "PUT",    "path": "/posts/{id}",       "auth": true },
            { "method": "DELETE", "path": "/posts/{id}",       "auth": true },
            { "method": "GET",    "path": "/files",            "auth": true },
            { "method": "POST",   "path": "/files",            "auth": true },
            { "method": "GET",    "path": "/files/{id}",       "auth": true },
            { "method": "DELETE", "path": "/files/{id}",       "auth": true },
            { "method": "GET",    "path": "/news",             "auth": true },
            { "method": "GET",    "path": "/news/{id}",        "auth": true },
            { "method": "POST",   "path": "/exchange/connect", "auth": true },
            { "method": "GET",    "path": "/exchange/status",  "auth": true },
            { "method": "GET",    "path": "/exchange/wallet",  "auth": true },
            { "method": "DELETE", "path": "/exchange",         "auth": true },
        ],
    }))
}
