use std::future::Future;

use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use tracing::debug;

use parlor_types::api::{UpdateUserRequest, UpdateUserResponse};
use parlor_types::models::UserId;

use crate::error::AdminError;

/// Transport for the admin user-update endpoint.
pub trait UserUpdater {
    fn update_user(
        &self,
        user_id: UserId,
        request: &UpdateUserRequest,
    ) -> impl Future<Output = Result<UpdateUserResponse, AdminError>> + Send;
}

/// `POST {base_url}/admin/update_user/{user_id}` with a JSON body.
#[derive(Debug, Clone)]
pub struct HttpUserUpdater {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserUpdater {
    /// `session_cookie` is sent verbatim as the `Cookie` header.
    pub fn new(base_url: impl Into<String>, session_cookie: Option<&str>) -> Result<Self, AdminError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = session_cookie {
            let value = HeaderValue::from_str(cookie).map_err(|e| AdminError::Config(e.to_string()))?;
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AdminError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl UserUpdater for HttpUserUpdater {
    async fn update_user(
        &self,
        user_id: UserId,
        request: &UpdateUserRequest,
    ) -> Result<UpdateUserResponse, AdminError> {
        let url = format!("{}/admin/update_user/{}", self.base_url, user_id);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AdminError::Request(e.to_string()))?;

        // Rejections (400/403) still carry a JSON body with the reason.
        let status = response.status();
        response
            .json::<UpdateUserResponse>()
            .await
            .map_err(|e| AdminError::Request(format!("{} (HTTP {})", e, status)))
    }
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, extract::Path, http::StatusCode, routing::post};

    use super::*;

    async fn serve() -> String {
        let app = Router::new().route(
            "/admin/update_user/{user_id}",
            post(
                |Path(user_id): Path<UserId>, Json(req): Json<UpdateUserRequest>| async move {
                    if req.username == "taken" {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(UpdateUserResponse {
                                success: false,
                                message: "Username already exists".into(),
                            }),
                        );
                    }
                    (
                        StatusCode::OK,
                        Json(UpdateUserResponse {
                            success: true,
                            message: format!(
                                "user {} -> {} (password {})",
                                user_id,
                                req.username,
                                if req.password.is_some() { "changed" } else { "kept" }
                            ),
                        }),
                    )
                },
            ),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn posts_json_and_reads_success() {
        let updater = HttpUserUpdater::new(serve().await, None).unwrap();
        let resp = updater
            .update_user(
                4,
                &UpdateUserRequest {
                    username: "dave".into(),
                    password: Some("hunter22".into()),
                },
            )
            .await
            .unwrap();
        assert!(resp.success);
        assert_eq!(resp.message, "user 4 -> dave (password changed)");
    }

    #[tokio::test]
    async fn rejection_body_is_returned() {
        let updater = HttpUserUpdater::new(serve().await, Some("session=abc")).unwrap();
        let resp = updater
            .update_user(
                4,
                &UpdateUserRequest {
                    username: "taken".into(),
                    password: None,
                },
            )
            .await
            .unwrap();
        assert!(!resp.success);
        assert_eq!(resp.message, "Username already exists");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_request_error() {
        let updater = HttpUserUpdater::new("http://127.0.0.1:9", None).unwrap();
        let err = updater
            .update_user(
                1,
                &UpdateUserRequest {
                    username: "x".into(),
                    password: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Request(_)));
    }
}
