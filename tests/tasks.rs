mod common;

use actix_web::middleware::Logger;
use actix_web::{rt, test, web, App, HttpServer};
use pretty_assertions::assert_eq;
use projecthub::auth::AuthMiddleware;
use projecthub::models::Task;
use projecthub::routes;
use serde_json::json;
use std::net::TcpListener;

#[actix_rt::test]
async fn test_task_crud_flow() {
    let pool = match common::try_pool().await {
        Some(pool) => pool,
        None => return,
    };
    common::cleanup_user(&pool, "task_crud@example.com").await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .wrap(Logger::default())
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            ),
    )
    .await;

    let user = common::register_and_login(&app, "task_crud@example.com", "task_crud_user", "Password123!")
        .await
        .expect("register/login failed");

    // Create a task with defaults
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(("Authorization", format!("Bearer {}", user.token)))
        .set_json(json!({
            "title": "Write integration tests",
            "description": "Cover the full CRUD cycle"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let task: Task = test::read_body_json(resp).await;
    assert_eq!(task.title, "Write integration tests");
    assert_eq!(task.owner_id, user.id);
    assert!(!task.is_completed);
    assert!(task.completion_date.is_none());

    // Fetch it back
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task.id))
        .insert_header(("Authorization", format!("Bearer {}", user.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    // List with a matching and a non-matching filter
    let req = test::TestRequest::get()
        .uri("/api/tasks?status=todo&search=integration")
        .insert_header(("Authorization", format!("Bearer {}", user.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let tasks: Vec<Task> = test::read_body_json(resp).await;
    assert_eq!(tasks.len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/tasks?status=done")
        .insert_header(("Authorization", format!("Bearer {}", user.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let tasks: Vec<Task> = test::read_body_json(resp).await;
    assert!(tasks.is_empty());

    // Moving the task to done marks it completed
    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", task.id))
        .insert_header(("Authorization", format!("Bearer {}", user.token)))
        .set_json(json!({ "status": "done" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let done: Task = test::read_body_json(resp).await;
    assert!(done.is_completed);
    assert!(done.completion_date.is_some());
    // Fields absent from the payload are untouched
    assert_eq!(done.title, "Write integration tests");

    // Moving it back out of done clears the completion marker
    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", task.id))
        .insert_header(("Authorization", format!("Bearer {}", user.token)))
        .set_json(json!({ "status": "in_progress" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let reopened: Task = test::read_body_json(resp).await;
    assert!(!reopened.is_completed);
    assert!(reopened.completion_date.is_none());

    // Stats reflect the single in-progress task
    let req = test::TestRequest::get()
        .uri("/api/tasks/stats/me")
        .insert_header(("Authorization", format!("Bearer {}", user.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let stats: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(stats["total_tasks"], 1);
    assert_eq!(stats["in_progress_tasks"], 1);
    assert_eq!(stats["completed_tasks"], 0);

    // Delete it
    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", task.id))
        .insert_header(("Authorization", format!("Bearer {}", user.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NO_CONTENT);

    // Gone now
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task.id))
        .insert_header(("Authorization", format!("Bearer {}", user.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    common::cleanup_user(&pool, "task_crud@example.com").await;
}

#[actix_rt::test]
async fn test_task_ownership_isolation() {
    let pool = match common::try_pool().await {
        Some(pool) => pool,
        None => return,
    };
    common::cleanup_user(&pool, "task_owner_a@example.com").await;
    common::cleanup_user(&pool, "task_owner_b@example.com").await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            ),
    )
    .await;

    let alice = common::register_and_login(&app, "task_owner_a@example.com", "task_owner_a", "Password123!")
        .await
        .expect("register/login failed");
    let bob = common::register_and_login(&app, "task_owner_b@example.com", "task_owner_b", "Password123!")
        .await
        .expect("register/login failed");

    // Alice creates a task
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(("Authorization", format!("Bearer {}", alice.token)))
        .set_json(json!({ "title": "Alice's private task" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let task: Task = test::read_body_json(resp).await;

    // Bob cannot read it
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task.id))
        .insert_header(("Authorization", format!("Bearer {}", bob.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);

    // It does not show up in Bob's list
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(("Authorization", format!("Bearer {}", bob.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let tasks: Vec<Task> = test::read_body_json(resp).await;
    assert!(tasks.is_empty());

    // Bob cannot update or delete it either
    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", task.id))
        .insert_header(("Authorization", format!("Bearer {}", bob.token)))
        .set_json(json!({ "title": "Hijacked title" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", task.id))
        .insert_header(("Authorization", format!("Bearer {}", bob.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);

    common::cleanup_user(&pool, "task_owner_a@example.com").await;
    common::cleanup_user(&pool, "task_owner_b@example.com").await;
}

#[actix_rt::test]
async fn test_create_task_unauthorized() {
    let pool = match common::try_pool().await {
        Some(pool) => pool,
        None => return,
    };

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener); // Drop the listener so the server can bind to it

    let server_pool = pool.clone();
    let server_handle = rt::spawn(async move {
        HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(server_pool.clone()))
                .service(routes::health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware)
                        .configure(routes::config),
                )
        })
        .bind(("127.0.0.1", port))
        .expect("Failed to bind test server")
        .run()
        .await
        .expect("Test server failed");
    });

    // Give the server a moment to come up
    rt::time::sleep(std::time::Duration::from_millis(200)).await;

    let client = reqwest::Client::new();

    // No token at all
    let resp = client
        .post(format!("http://127.0.0.1:{}/api/tasks", port))
        .json(&json!({ "title": "No credentials" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    // Garbage token
    let resp = client
        .get(format!("http://127.0.0.1:{}/api/tasks", port))
        .bearer_auth("not.a.valid.token")
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    // Health stays open
    let resp = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    server_handle.abort();
}
