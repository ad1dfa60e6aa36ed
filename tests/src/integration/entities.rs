//! Websites, applications, virtual directories, and feature sections.

#[cfg(test)]
mod tests {
    use apphost_config::{OverrideMode, SECTION_HTTP_COMPRESSION};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::support::{on_disk, seeded_server, send, server, TestServer};

    async fn create_site(server: &TestServer, name: &str) {
        let (status, _) = send(
            server,
            Method::POST,
            "/api/webserver/websites",
            None,
            Some(json!({"name": name, "physical_path": format!("/srv/{name}")})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_new_site_has_root_application() {
        let server = server();
        create_site(&server, "portal").await;

        let (status, body) = send(
            &server,
            Method::GET,
            "/api/webserver/websites/portal/applications",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["path"], "/");
        assert_eq!(body[0]["app_pool"], "default");
        assert_eq!(body[0]["virtual_directories"][0]["path"], "/");
    }

    #[tokio::test]
    async fn test_duplicate_site_rejected() {
        let server = server();
        create_site(&server, "portal").await;

        let (status, body) = send(
            &server,
            Method::POST,
            "/api/webserver/websites",
            None,
            Some(json!({"name": "PORTAL", "physical_path": "/srv/other"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["title"], "already_exists");
    }

    #[tokio::test]
    async fn test_site_ids_increment() {
        let server = server();
        create_site(&server, "one").await;
        create_site(&server, "two").await;

        let doc = on_disk(&server);
        assert_eq!(doc.site("one").map(|s| s.id), Some(1));
        assert_eq!(doc.site("two").map(|s| s.id), Some(2));
    }

    #[tokio::test]
    async fn test_unknown_app_pool_rejected() {
        let server = server();
        let (status, _) = send(
            &server,
            Method::POST,
            "/api/webserver/websites",
            None,
            Some(json!({"name": "site", "physical_path": "/srv", "app_pool": "ghost"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_application_lifecycle() {
        let server = server();
        create_site(&server, "portal").await;

        let (status, body) = send(
            &server,
            Method::POST,
            "/api/webserver/websites/portal/applications",
            None,
            Some(json!({"path": "/shop", "physical_path": "/srv/shop"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["path"], "/shop");

        // Root application cannot be re-created or deleted
        let (status, _) = send(
            &server,
            Method::POST,
            "/api/webserver/websites/portal/applications",
            None,
            Some(json!({"path": "/", "physical_path": "/srv"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &server,
            Method::DELETE,
            "/api/webserver/websites/portal/applications/shop",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(on_disk(&server)
            .site("portal")
            .unwrap()
            .application("/shop")
            .is_none());
    }

    #[tokio::test]
    async fn test_virtual_directory_lifecycle() {
        let server = server();
        create_site(&server, "portal").await;

        let (status, body) = send(
            &server,
            Method::POST,
            "/api/webserver/websites/portal/virtual-directories",
            None,
            Some(json!({"path": "/static", "physical_path": "/srv/static"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["path"], "/static");

        let (_, listed) = send(
            &server,
            Method::GET,
            "/api/webserver/websites/portal/virtual-directories",
            None,
            None,
        )
        .await;
        assert_eq!(listed.as_array().map(Vec::len), Some(2));

        // The root virtual directory is protected
        let (status, _) = send(
            &server,
            Method::DELETE,
            "/api/webserver/websites/portal/virtual-directories?path=/",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &server,
            Method::DELETE,
            "/api/webserver/websites/portal/virtual-directories?path=/static",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_section_defaults_at_server_scope() {
        let server = server();
        let (status, body) = send(
            &server,
            Method::GET,
            "/api/webserver/http-compression",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["static_enabled"], true);
        assert_eq!(body["dynamic_enabled"], true);
    }

    #[tokio::test]
    async fn test_section_patch_at_server_scope_persists() {
        let server = server();
        let (status, body) = send(
            &server,
            Method::PATCH,
            "/api/webserver/http-logging",
            None,
            Some(json!({"enabled": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["enabled"], false);
        // Untouched keys survive the merge
        assert_eq!(body["format"], "w3c");

        let doc = on_disk(&server);
        assert_eq!(doc.read_section("", "web/http-logging").unwrap()["enabled"], false);
    }

    #[tokio::test]
    async fn test_scoped_section_override() {
        let server = server();
        create_site(&server, "portal").await;

        let (status, _) = send(
            &server,
            Method::PATCH,
            "/api/webserver/http-compression?scope=portal",
            None,
            Some(json!({"dynamic_enabled": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Server scope keeps its default
        let (_, server_view) = send(
            &server,
            Method::GET,
            "/api/webserver/http-compression",
            None,
            None,
        )
        .await;
        assert_eq!(server_view["dynamic_enabled"], true);

        // The site sees the override
        let (_, site_view) = send(
            &server,
            Method::GET,
            "/api/webserver/http-compression?scope=portal",
            None,
            None,
        )
        .await;
        assert_eq!(site_view["dynamic_enabled"], false);
    }

    #[tokio::test]
    async fn test_unknown_scope_is_not_found() {
        let server = server();
        let (status, body) = send(
            &server,
            Method::GET,
            "/api/webserver/authentication?scope=ghost",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["title"], "scope_not_found");
    }

    #[tokio::test]
    async fn test_unknown_section_property_rejected() {
        let server = server();
        let (status, body) = send(
            &server,
            Method::PATCH,
            "/api/webserver/authentication",
            None,
            Some(json!({"anonymousEnabled": false})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["title"], "invalid_parameter");
    }

    #[tokio::test]
    async fn test_locked_section_rejects_scoped_patch() {
        let server = seeded_server(|doc| {
            doc.section_locks
                .insert(SECTION_HTTP_COMPRESSION.to_string(), OverrideMode::Deny);
        });
        create_site(&server, "portal").await;

        let (status, body) = send(
            &server,
            Method::PATCH,
            "/api/webserver/http-compression?scope=portal",
            None,
            Some(json!({"static_enabled": false})),
        )
        .await;
        assert_eq!(status, StatusCode::LOCKED);
        assert_eq!(body["title"], "section_locked");

        // Server scope is still writable despite the lock
        let (status, _) = send(
            &server,
            Method::PATCH,
            "/api/webserver/http-compression",
            None,
            Some(json!({"static_enabled": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_deleting_site_drops_its_overrides() {
        let server = server();
        create_site(&server, "portal").await;
        send(
            &server,
            Method::PATCH,
            "/api/webserver/http-compression?scope=portal",
            None,
            Some(json!({"dynamic_enabled": false})),
        )
        .await;
        assert!(!on_disk(&server).locations.is_empty());

        send(&server, Method::DELETE, "/api/webserver/websites/portal", None, None).await;
        assert!(on_disk(&server).locations.is_empty());
    }
}
