use std::time::{SystemTime, UNIX_EPOCH};
use serde_json::json;
use once_cell::sync::Lazy;
use redis::aio::ConnectionManager;

// Shared test context
struct TestContext {
    client: reqwest::Client,
    base_url: String,
}

static REDIS_CLIENT: Lazy<redis::Client> = Lazy::new(|| {
    redis::Client::open("redis://127.0.0.1:6379/").unwrap()
});

impl TestContext {
    fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .unwrap(),
            base_url: "http://127.0.0.1:8080".to_string(),
        }
    }

    fn get_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }
}

async fn get_redis_conn() -> ConnectionManager {
    REDIS_CLIENT.get_connection_manager().await.unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn setup() {
        let mut con = get_redis_conn().await;
        for key in [
            "rate_limit:register:127.0.0.1",
            "rate_limit:login:127.0.0.1",
            "rate_limit:submit:127.0.0.1",
        ] {
            let _: () = redis::cmd("DEL").arg(key).query_async(&mut con).await.unwrap();
        }
    }

    async fn register(
        context: &TestContext,
        name: &str,
        email: &str,
        username: &str,
    ) -> reqwest::Response {
        context
            .client
            .post(format!("{}/api/auth/register", context.base_url))
            .json(&json!({
                "name": name,
                "email": email,
                "username": username,
                "password": "SecurePass123!@#"
            }))
            .send()
            .await
            .unwrap()
    }

    async fn login(context: &TestContext, email: &str) -> String {
        let response = context
            .client
            .post(format!("{}/api/auth/login", context.base_url))
            .json(&json!({
                "email": email,
                "password": "SecurePass123!@#"
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200, "Login failed");

        let cookies = response.cookies().collect::<Vec<_>>();
        let csrf_cookie = cookies
            .iter()
            .find(|c| c.name() == "csrf_token")
            .expect("CSRF token not found in login response");
        csrf_cookie.value().to_string()
    }

    #[tokio::test]
    async fn test_full_feedback_flow() {
        setup().await;
        let owner = TestContext::new();
        let timestamp = TestContext::get_timestamp();
        let username = format!("owner_{}", timestamp);
        let email = format!("owner_{}@example.com", timestamp);

        // Registration
        let reg_response = register(&owner, "Feedback Owner", &email, &username).await;
        assert_eq!(reg_response.status().as_u16(), 201, "Registration failed");
        let reg_body: Value = reg_response.json().await.unwrap();
        assert_eq!(reg_body["success"], true);
        assert_eq!(reg_body["user"]["username"], username.as_str());
        assert!(
            reg_body["user"].get("password").is_none(),
            "Password must never appear in a response"
        );

        // Same email again names the email as the colliding field
        let dup_email = register(&owner, "Imposter", &email, &format!("other_{}", timestamp)).await;
        assert_eq!(dup_email.status().as_u16(), 409);
        let dup_email_body: Value = dup_email.json().await.unwrap();
        assert_eq!(dup_email_body["error"], "Email already exists");

        // Same username, fresh email, names the username
        let dup_user = register(
            &owner,
            "Imposter",
            &format!("other_{}@example.com", timestamp),
            &username,
        )
        .await;
        assert_eq!(dup_user.status().as_u16(), 409);
        let dup_user_body: Value = dup_user.json().await.unwrap();
        assert_eq!(dup_user_body["error"], "Username already exists");

        // Login
        let csrf_token = login(&owner, &email).await;

        let me_response = owner
            .client
            .get(format!("{}/api/auth/me", owner.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(me_response.status().as_u16(), 200);
        let me_body: Value = me_response.json().await.unwrap();
        assert_eq!(me_body["user"]["username"], username.as_str());

        // Visitors see the public profile without the email
        let visitor = TestContext::new();
        let profile_response = visitor
            .client
            .get(format!("{}/api/users/{}", visitor.base_url, username))
            .send()
            .await
            .unwrap();
        assert_eq!(profile_response.status().as_u16(), 200);
        let profile_body: Value = profile_response.json().await.unwrap();
        assert_eq!(profile_body["user"]["name"], "Feedback Owner");
        assert!(profile_body["user"].get("email").is_none());

        // Anonymous submissions, in a known order
        for content in ["first", "second", "third"] {
            let submit_response = visitor
                .client
                .post(format!(
                    "{}/api/users/{}/messages",
                    visitor.base_url, username
                ))
                .json(&json!({ "content": content }))
                .send()
                .await
                .unwrap();
            assert_eq!(submit_response.status().as_u16(), 201, "Submission failed");
            let submit_body: Value = submit_response.json().await.unwrap();
            assert_eq!(submit_body["message"]["is_read"], false);
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }

        // Owner lists them most recent first
        let list_response = owner
            .client
            .get(format!("{}/api/messages", owner.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(list_response.status().as_u16(), 200);
        let list_body: Value = list_response.json().await.unwrap();
        assert_eq!(list_body["count"], 3);
        assert_eq!(list_body["unread"], 3);
        assert_eq!(list_body["messages"][0]["content"], "third");
        assert_eq!(list_body["messages"][1]["content"], "second");
        assert_eq!(list_body["messages"][2]["content"], "first");

        let newest_id = list_body["messages"][0]["id"].as_str().unwrap().to_string();

        // Mark as read, twice; the second call is a no-op that still succeeds
        for _ in 0..2 {
            let read_response = owner
                .client
                .post(format!(
                    "{}/api/messages/{}/read",
                    owner.base_url, newest_id
                ))
                .header("X-CSRF-Token", &csrf_token)
                .send()
                .await
                .unwrap();
            assert_eq!(read_response.status().as_u16(), 200);
        }

        let list_body: Value = owner
            .client
            .get(format!("{}/api/messages", owner.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(list_body["unread"], 2);
        assert_eq!(list_body["messages"][0]["is_read"], true);

        // A different account cannot see or touch the message; it reads as absent
        let stranger = TestContext::new();
        let stranger_email = format!("stranger_{}@example.com", timestamp);
        let reg_response = register(
            &stranger,
            "Stranger",
            &stranger_email,
            &format!("stranger_{}", timestamp),
        )
        .await;
        assert_eq!(reg_response.status().as_u16(), 201);
        let stranger_csrf = login(&stranger, &stranger_email).await;

        let foreign_delete = stranger
            .client
            .delete(format!("{}/api/messages/{}", stranger.base_url, newest_id))
            .header("X-CSRF-Token", &stranger_csrf)
            .send()
            .await
            .unwrap();
        assert_eq!(foreign_delete.status().as_u16(), 404);

        // The owner still has all three messages
        let list_body: Value = owner
            .client
            .get(format!("{}/api/messages", owner.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(list_body["count"], 3);

        // Owner deletes for real
        let delete_response = owner
            .client
            .delete(format!("{}/api/messages/{}", owner.base_url, newest_id))
            .header("X-CSRF-Token", &csrf_token)
            .send()
            .await
            .unwrap();
        assert_eq!(delete_response.status().as_u16(), 200);

        let list_body: Value = owner
            .client
            .get(format!("{}/api/messages", owner.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(list_body["count"], 2);

        // Logout invalidates the session
        let logout_response = owner
            .client
            .post(format!("{}/api/auth/logout", owner.base_url))
            .header("X-CSRF-Token", &csrf_token)
            .send()
            .await
            .unwrap();
        assert_eq!(logout_response.status().as_u16(), 200);

        let after_logout = owner
            .client
            .get(format!("{}/api/messages", owner.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(after_logout.status().as_u16(), 403);
    }

    #[tokio::test]
    async fn test_submit_validation_and_unknown_receiver() {
        setup().await;
        let context = TestContext::new();

        // Unknown receiver
        let response = context
            .client
            .post(format!(
                "{}/api/users/no_such_user_ever/messages",
                context.base_url
            ))
            .json(&json!({ "content": "hello?" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);

        // Empty content
        let response = context
            .client
            .post(format!(
                "{}/api/users/no_such_user_ever/messages",
                context.base_url
            ))
            .json(&json!({ "content": "" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);

        // Over the 1000-character bound
        let response = context
            .client
            .post(format!(
                "{}/api/users/no_such_user_ever/messages",
                context.base_url
            ))
            .json(&json!({ "content": "x".repeat(1001) }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn test_protected_routes_require_session() {
        setup().await;
        let context = TestContext::new();

        let response = context
            .client
            .get(format!("{}/api/messages", context.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 403);

        let response = context
            .client
            .delete(format!(
                "{}/api/messages/00000000-0000-0000-0000-000000000000",
                context.base_url
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 403);
    }

    #[tokio::test]
    async fn test_login_does_not_leak_account_existence() {
        setup().await;
        let context = TestContext::new();

        let unknown = context
            .client
            .post(format!("{}/api/auth/login", context.base_url))
            .json(&json!({
                "email": "ghost@example.com",
                "password": "SecurePass123!@#"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(unknown.status().as_u16(), 401);
        let unknown_body: Value = unknown.json().await.unwrap();
        assert_eq!(unknown_body["error"], "Invalid email or password");
    }
}
