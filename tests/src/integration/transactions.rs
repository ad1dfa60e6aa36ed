//! Transaction lifecycle: begin, isolation, commit, abort, timeout.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::support::{begin_transaction, on_disk, send, server, server_with_timeout};

    #[tokio::test]
    async fn test_begin_returns_started_transaction() {
        let server = server();
        let (status, body) = send(&server, Method::POST, "/api/transactions", None, None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["state"], "started");
        assert_eq!(body["id"].as_str().map(str::len), Some(32));
        assert!(body["expires_on"].is_string());
    }

    #[tokio::test]
    async fn test_only_one_transaction_at_a_time() {
        let server = server();
        let _id = begin_transaction(&server).await;

        let (status, body) = send(&server, Method::POST, "/api/transactions", None, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["title"], "transaction_already_active");
    }

    #[tokio::test]
    async fn test_transactional_changes_are_isolated_until_commit() {
        let server = server();
        let id = begin_transaction(&server).await;

        let (status, _) = send(
            &server,
            Method::POST,
            "/api/webserver/application-pools",
            Some(&id),
            Some(json!({"name": "staged"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        // Inside the transaction the pool is visible
        let (status, _) = send(
            &server,
            Method::GET,
            "/api/webserver/application-pools/staged",
            Some(&id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // An independent read still sees the persisted state
        let (status, _) = send(
            &server,
            Method::GET,
            "/api/webserver/application-pools/staged",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(on_disk(&server).app_pool("staged").is_none());

        // Commit publishes it
        let (status, body) = send(
            &server,
            Method::PATCH,
            &format!("/api/transactions/{id}"),
            None,
            Some(json!({"state": "committed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "committed");

        let (status, _) = send(
            &server,
            Method::GET,
            "/api/webserver/application-pools/staged",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(on_disk(&server).app_pool("staged").is_some());
    }

    #[tokio::test]
    async fn test_commit_applies_multiple_changes_atomically() {
        let server = server();
        let id = begin_transaction(&server).await;

        // Two mutations against different resources in the same transaction
        let (status, _) = send(
            &server,
            Method::POST,
            "/api/webserver/application-pools",
            Some(&id),
            Some(json!({"name": "batch"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(
            &server,
            Method::PATCH,
            "/api/webserver/http-logging",
            Some(&id),
            Some(json!({"enabled": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Neither change is on disk before the commit
        let staged = on_disk(&server);
        assert!(staged.app_pool("batch").is_none());
        assert_eq!(staged.read_section("", "web/http-logging").unwrap()["enabled"], true);

        let (status, _) = send(
            &server,
            Method::PATCH,
            &format!("/api/transactions/{id}"),
            None,
            Some(json!({"state": "committed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Both land together
        let committed = on_disk(&server);
        assert!(committed.app_pool("batch").is_some());
        assert_eq!(
            committed.read_section("", "web/http-logging").unwrap()["enabled"],
            false
        );
    }

    #[tokio::test]
    async fn test_abort_discards_pending_changes() {
        let server = server();
        let id = begin_transaction(&server).await;

        let (status, _) = send(
            &server,
            Method::POST,
            "/api/webserver/websites",
            Some(&id),
            Some(json!({"name": "doomed", "physical_path": "/srv/doomed"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &server,
            Method::PATCH,
            &format!("/api/transactions/{id}"),
            None,
            Some(json!({"state": "aborted"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "aborted");

        let (status, _) = send(&server, Method::GET, "/api/webserver/websites/doomed", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(on_disk(&server).site("doomed").is_none());
    }

    #[tokio::test]
    async fn test_concluded_transaction_is_gone() {
        let server = server();
        let id = begin_transaction(&server).await;

        send(
            &server,
            Method::PATCH,
            &format!("/api/transactions/{id}"),
            None,
            Some(json!({"state": "committed"})),
        )
        .await;

        let (status, _) = send(
            &server,
            Method::GET,
            &format!("/api/transactions/{id}"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // The token no longer scopes requests either
        let (status, body) = send(
            &server,
            Method::GET,
            "/api/webserver/websites",
            Some(&id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["title"], "transaction_not_found");

        // And a new transaction can begin
        begin_transaction(&server).await;
    }

    #[tokio::test]
    async fn test_independent_write_refused_while_transaction_active() {
        let server = server();
        let _id = begin_transaction(&server).await;

        let (status, body) = send(
            &server,
            Method::POST,
            "/api/webserver/application-pools",
            None,
            Some(json!({"name": "walled-off"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["title"], "transaction_in_progress");
        assert!(on_disk(&server).app_pool("walled-off").is_none());
    }

    #[tokio::test]
    async fn test_independent_reads_allowed_during_transaction() {
        let server = server();
        let _id = begin_transaction(&server).await;

        let (status, body) = send(&server, Method::GET, "/api/webserver/websites", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_unknown_token_rejected_on_entity_routes() {
        let server = server();
        let (status, body) = send(
            &server,
            Method::GET,
            "/api/webserver/websites",
            Some("0123456789abcdef0123456789abcdef"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["title"], "transaction_not_found");
    }

    #[tokio::test]
    async fn test_idle_transaction_times_out_and_discards() {
        let server = server_with_timeout(Duration::from_millis(100));
        let id = begin_transaction(&server).await;

        let (status, _) = send(
            &server,
            Method::POST,
            "/api/webserver/application-pools",
            Some(&id),
            Some(json!({"name": "expired"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        tokio::time::sleep(Duration::from_millis(400)).await;

        let (status, _) = send(
            &server,
            Method::GET,
            &format!("/api/transactions/{id}"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(on_disk(&server).app_pool("expired").is_none());

        // The slot is free again
        begin_transaction(&server).await;
    }

    #[tokio::test]
    async fn test_requests_keep_the_transaction_alive() {
        let server = server_with_timeout(Duration::from_millis(400));
        let id = begin_transaction(&server).await;

        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(150)).await;
            let (status, _) = send(
                &server,
                Method::GET,
                "/api/webserver/websites",
                Some(&id),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        // Past the original window, still concludable
        let (status, _) = send(
            &server,
            Method::PATCH,
            &format!("/api/transactions/{id}"),
            None,
            Some(json!({"state": "committed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_shows_active_transaction() {
        let server = server();
        let (_, empty) = send(&server, Method::GET, "/api/transactions", None, None).await;
        assert_eq!(empty, json!([]));

        let id = begin_transaction(&server).await;
        let (status, body) = send(&server, Method::GET, "/api/transactions", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["id"], json!(id));
    }

    #[tokio::test]
    async fn test_conclude_requires_valid_state() {
        let server = server();
        let id = begin_transaction(&server).await;

        let (status, _) = send(
            &server,
            Method::PATCH,
            &format!("/api/transactions/{id}"),
            None,
            Some(json!({"state": "started"})),
        )
        .await;
        // Body fails to deserialize into a terminal state
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
