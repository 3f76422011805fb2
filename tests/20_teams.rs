mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use common::{id_of, TestContext, TestUser};
use projecthub_api::types::Role;

#[tokio::test]
async fn duplicate_team_name_conflicts() -> Result<()> {
    let Some(mut ctx) = TestContext::start().await? else { return Ok(()) };
    let manager = ctx.create_user(Role::Manager).await?;

    let team = ctx.create_team(&manager).await?;

    let res = ctx
        .request(Method::POST, "/api/teams", &manager)
        .json(&json!({ "name": team["name"] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "CONFLICT");

    ctx.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn members_cannot_create_teams() -> Result<()> {
    let Some(mut ctx) = TestContext::start().await? else { return Ok(()) };
    let member = ctx.create_user(Role::Member).await?;

    let res = ctx
        .request(Method::POST, "/api/teams", &member)
        .json(&json!({ "name": TestContext::unique("team") }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    ctx.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn membership_is_unique_and_lead_managed() -> Result<()> {
    let Some(mut ctx) = TestContext::start().await? else { return Ok(()) };
    let manager = ctx.create_user(Role::Manager).await?;
    let alice = ctx.create_user(Role::Member).await?;
    let bob = ctx.create_user(Role::Member).await?;

    let team = ctx.create_team(&manager).await?;
    let team_id = id_of(&team)?;
    let members_path = format!("/api/teams/{}/members", team_id);

    let res = ctx
        .request(Method::POST, &members_path, &manager)
        .json(&json!({ "user_id": alice.id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let member = res.json::<Value>().await?;
    assert_eq!(member["data"]["role"], "member");

    let res = ctx
        .request(Method::POST, &members_path, &manager)
        .json(&json!({ "user_id": alice.id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // A plain member cannot add people
    let res = ctx
        .request(Method::POST, &members_path, &alice)
        .json(&json!({ "user_id": bob.id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Promoted to lead, they can
    let res = ctx
        .request(Method::PATCH, &members_path, &manager)
        .json(&json!({ "user_id": alice.id, "role": "lead" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = ctx
        .request(Method::POST, &members_path, &alice)
        .json(&json!({ "user_id": bob.id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Bob was told about it
    let res = ctx.request(Method::GET, "/api/notifications", &bob).send().await?;
    let notifications = res.json::<Value>().await?["data"].clone();
    assert_eq!(notifications[0]["kind"], "team");

    // Members only see their own teams
    let res = ctx.request(Method::GET, "/api/teams", &bob).send().await?;
    let teams = res.json::<Value>().await?["data"].clone();
    assert_eq!(teams.as_array().map(Vec::len), Some(1));

    let res = ctx
        .request(Method::DELETE, &format!("{}?user_id={}", members_path, bob.id), &alice)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = ctx
        .request(Method::GET, &format!("/api/teams/{}", team_id), &bob)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    ctx.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn team_delete_cascades_to_projects_and_tasks() -> Result<()> {
    let Some(mut ctx) = TestContext::start().await? else { return Ok(()) };
    let manager = ctx.create_user(Role::Manager).await?;

    let team = ctx.create_team(&manager).await?;
    let team_id = id_of(&team)?;

    let res = ctx
        .request(Method::POST, "/api/projects", &manager)
        .json(&json!({ "name": "Apollo", "team_id": team_id, "status": "active" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let project_id = id_of(&res.json::<Value>().await?["data"])?;

    let res = ctx
        .request(Method::POST, &format!("/api/projects/{}/goals", project_id), &manager)
        .json(&json!({ "title": "Launch" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let goal_id = id_of(&res.json::<Value>().await?["data"])?;

    let mut task_ids = Vec::new();
    for title in ["Build rocket", "Fuel rocket"] {
        let res = ctx
            .request(Method::POST, &format!("/api/goals/{}/tasks", goal_id), &manager)
            .json(&json!({ "title": title, "priority": "high" }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
        task_ids.push(id_of(&res.json::<Value>().await?["data"])?);
    }

    let res = ctx
        .request(Method::POST, &format!("/api/tasks/{}/comments", task_ids[0]), &manager)
        .json(&json!({ "body": "Started on the frame" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = ctx
        .request(Method::POST, &format!("/api/projects/{}/messages", project_id), &manager)
        .json(&json!({ "body": "Kickoff tomorrow" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = ctx
        .request(Method::DELETE, &format!("/api/teams/{}", team_id), &manager)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let deleted = res.json::<Value>().await?["data"]["deleted"].clone();
    assert_eq!(deleted["projects"], 1);
    assert_eq!(deleted["goals"], 1);
    assert_eq!(deleted["tasks"], 2);
    assert_eq!(deleted["comments"], 1);
    assert_eq!(deleted["messages"], 1);
    assert_eq!(deleted["members"], 1);

    for path in [
        format!("/api/teams/{}", team_id),
        format!("/api/projects/{}", project_id),
        format!("/api/goals/{}", goal_id),
        format!("/api/tasks/{}", task_ids[1]),
    ] {
        let res = ctx.request(Method::GET, &path, &manager).send().await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{}", path);
    }

    ctx.cleanup().await;
    Ok(())
}

/// Team-owned project with one goal; returns (project_id, goal_id)
async fn project_with_goal(ctx: &mut TestContext, owner: &TestUser) -> Result<(Uuid, Uuid)> {
    let team_id = id_of(&ctx.create_team(owner).await?)?;

    let res = ctx
        .request(Method::POST, "/api/projects", owner)
        .json(&json!({ "name": "Voyager", "team_id": team_id, "start_date": "2024-03-01" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let project_id = id_of(&res.json::<Value>().await?["data"])?;

    let res = ctx
        .request(Method::POST, &format!("/api/projects/{}/goals", project_id), owner)
        .json(&json!({ "title": "Flyby" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let goal_id = id_of(&res.json::<Value>().await?["data"])?;

    Ok((project_id, goal_id))
}

#[tokio::test]
async fn project_delete_is_owner_or_admin_only() -> Result<()> {
    let Some(mut ctx) = TestContext::start().await? else { return Ok(()) };
    let owner = ctx.create_user(Role::Manager).await?;
    let other = ctx.create_user(Role::Manager).await?;

    let (project_id, goal_id) = project_with_goal(&mut ctx, &owner).await?;
    let res = ctx
        .request(Method::POST, &format!("/api/goals/{}/tasks", goal_id), &owner)
        .json(&json!({ "title": "Calibrate camera" }))
        .send()
        .await?;
    let task_id = id_of(&res.json::<Value>().await?["data"])?;
    ctx.request(Method::POST, &format!("/api/tasks/{}/comments", task_id), &owner)
        .json(&json!({ "body": "Lens cap is off" }))
        .send()
        .await?;
    ctx.request(Method::POST, &format!("/api/projects/{}/messages", project_id), &owner)
        .json(&json!({ "body": "Launch window opens Monday" }))
        .send()
        .await?;

    // Managing a project is not enough to delete someone else's
    let res = ctx
        .request(Method::DELETE, &format!("/api/projects/{}", project_id), &other)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = ctx
        .request(Method::DELETE, &format!("/api/projects/{}", project_id), &owner)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let deleted = res.json::<Value>().await?["data"]["deleted"].clone();
    assert_eq!(deleted["projects"], 1);
    assert_eq!(deleted["goals"], 1);
    assert_eq!(deleted["tasks"], 1);
    assert_eq!(deleted["comments"], 1);
    assert_eq!(deleted["messages"], 1);

    let res = ctx
        .request(Method::GET, &format!("/api/tasks/{}", task_id), &owner)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn goal_delete_removes_tasks_and_comments() -> Result<()> {
    let Some(mut ctx) = TestContext::start().await? else { return Ok(()) };
    let owner = ctx.create_user(Role::Manager).await?;

    let (project_id, goal_id) = project_with_goal(&mut ctx, &owner).await?;
    let mut task_ids = Vec::new();
    for title in ["Point antenna", "Send telemetry"] {
        let res = ctx
            .request(Method::POST, &format!("/api/goals/{}/tasks", goal_id), &owner)
            .json(&json!({ "title": title }))
            .send()
            .await?;
        task_ids.push(id_of(&res.json::<Value>().await?["data"])?);
    }
    ctx.request(Method::POST, &format!("/api/tasks/{}/comments", task_ids[1]), &owner)
        .json(&json!({ "body": "Signal is weak" }))
        .send()
        .await?;

    let res = ctx
        .request(Method::DELETE, &format!("/api/goals/{}", goal_id), &owner)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let deleted = res.json::<Value>().await?["data"]["deleted"].clone();
    assert_eq!(deleted["goals"], 1);
    assert_eq!(deleted["tasks"], 2);
    assert_eq!(deleted["comments"], 1);

    let res = ctx
        .request(Method::GET, &format!("/api/goals/{}", goal_id), &owner)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // The project itself survives
    let res = ctx
        .request(Method::GET, &format!("/api/projects/{}", project_id), &owner)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    ctx.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn project_end_date_cannot_precede_stored_start() -> Result<()> {
    let Some(mut ctx) = TestContext::start().await? else { return Ok(()) };
    let owner = ctx.create_user(Role::Manager).await?;

    let (project_id, _) = project_with_goal(&mut ctx, &owner).await?;
    let path = format!("/api/projects/{}", project_id);

    let res = ctx
        .request(Method::PATCH, &path, &owner)
        .json(&json!({ "end_date": "2024-02-01" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["end_date"].is_string());

    let res = ctx
        .request(Method::PATCH, &path, &owner)
        .json(&json!({ "end_date": "2024-04-01" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["data"]["end_date"], "2024-04-01");

    ctx.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn tasks_order_by_priority_rank() -> Result<()> {
    let Some(mut ctx) = TestContext::start().await? else { return Ok(()) };
    let owner = ctx.create_user(Role::Manager).await?;

    let (_, goal_id) = project_with_goal(&mut ctx, &owner).await?;
    for (title, priority) in [("Sweep", "low"), ("Fire", "urgent"), ("Report", "medium"), ("Audit", "high")] {
        let res = ctx
            .request(Method::POST, &format!("/api/goals/{}/tasks", goal_id), &owner)
            .json(&json!({ "title": title, "priority": priority }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = ctx
        .request(Method::GET, &format!("/api/goals/{}/tasks?order=priority%20desc", goal_id), &owner)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let tasks = res.json::<Value>().await?["data"].clone();
    let priorities: Vec<&str> = tasks
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|t| t["priority"].as_str())
        .collect();
    assert_eq!(priorities, ["urgent", "high", "medium", "low"]);

    ctx.cleanup().await;
    Ok(())
}
