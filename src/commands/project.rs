//! Project command handlers.

use crate::args::{AddProjectArgs, UpdateProjectArgs};
use crate::commands::{count, Out};
use crate::ledger::ProjectDeletion;
use crate::model::{generate_id, Capability, Project};
use crate::{Config, Result};
use anyhow::bail;
use chrono::Local;

/// Handles `hotelflow project list`. Requires `viewProjects`.
pub async fn list_projects(config: Config) -> Result<Out<Vec<Project>>> {
    let app = config.open()?;
    app.require(Capability::ViewProjects)?;
    let projects = app.projects().data().to_vec();
    let mut message = count(projects.len(), "project");
    for p in &projects {
        message.push_str(&format!(
            "\n{}  {}  {}  {}  started {}  budget {}",
            p.id,
            p.name,
            p.location,
            p.status,
            p.start_date,
            p.budget.currency()
        ));
    }
    Ok(Out::new(message, projects))
}

/// Handles `hotelflow project add`. The project gets a fresh id and goes to the top of the list.
/// Requires `addProjects`.
pub async fn add_project(config: Config, args: AddProjectArgs) -> Result<Out<Project>> {
    let mut app = config.open()?;
    let project = Project {
        id: generate_id(),
        name: args.name().trim().to_string(),
        location: args.location().trim().to_string(),
        start_date: args
            .start_date()
            .unwrap_or_else(|| Local::now().date_naive()),
        status: args.status(),
        budget: args.budget(),
    };
    app.add_project(project.clone())?;
    Ok(Out::new(
        format!("Added project '{}' with id {}", project.name, project.id),
        project,
    ))
}

/// Handles `hotelflow project update`. Requires `editProjects`.
///
/// # Errors
/// - Returns an error if there is no project with the given id.
pub async fn update_project(config: Config, args: UpdateProjectArgs) -> Result<Out<Project>> {
    let mut app = config.open()?;
    let mut project = match app.projects().get(args.id()) {
        Some(p) => p.clone(),
        None => bail!("Project not found: {}", args.id()),
    };
    if let Some(name) = args.name() {
        project.name = name.trim().to_string();
    }
    if let Some(location) = args.location() {
        project.location = location.trim().to_string();
    }
    if let Some(start_date) = args.start_date() {
        project.start_date = start_date;
    }
    if let Some(status) = args.status() {
        project.status = status;
    }
    if let Some(budget) = args.budget() {
        project.budget = budget;
    }
    let _ = app.update_project(project.clone())?;
    Ok(Out::new(format!("Updated project {}", project.id), project))
}

/// Handles `hotelflow project delete`. The project's transactions are deleted with it. Requires
/// `deleteProjects`.
///
/// # Errors
/// - Returns an error if there is no project with the given id.
pub async fn delete_project(config: Config, id: &str) -> Result<Out<ProjectDeletion>> {
    let mut app = config.open()?;
    let deletion = match app.delete_project(id)? {
        Some(deletion) => deletion,
        None => bail!("Project not found: {id}"),
    };
    Ok(Out::new(
        format!(
            "Deleted project '{}' and {}",
            deletion.project.name,
            count(deletion.transactions_removed, "transaction")
        ),
        deletion,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::login;
    use crate::model::{Amount, ProjectStatus};
    use crate::test::TestEnv;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_add_and_list() {
        let env = TestEnv::new().await;
        let _ = env.login_admin().await;
        let args = AddProjectArgs::new("Grand Hotel", "Lisbon")
            .with_start_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
            .with_status(ProjectStatus::Construction)
            .with_budget("2500000".parse().unwrap());
        let out = add_project(env.config(), args).await.unwrap();
        let added = out.structure().unwrap().clone();
        assert_eq!(added.id.len(), 12);

        let out = list_projects(env.config()).await.unwrap();
        assert_eq!(out.structure().unwrap(), &vec![added]);
        assert!(out.message().starts_with("1 project\n"));
        assert!(out.message().contains("$2,500,000.00"));
    }

    #[tokio::test]
    async fn test_add_requires_login() {
        let env = TestEnv::new().await;
        let result = add_project(env.config(), AddProjectArgs::new("Grand", "Porto")).await;
        assert!(result.unwrap_err().to_string().contains("not logged in"));
    }

    #[tokio::test]
    async fn test_update() {
        let env = TestEnv::new().await;
        env.seed().await;
        let args = UpdateProjectArgs::new("p1")
            .with_name("Grand Palace")
            .with_budget(Amount::ZERO);
        let out = update_project(env.config(), args).await.unwrap();
        let project = out.structure().unwrap();
        assert_eq!(project.name, "Grand Palace");
        assert_eq!(project.location, "Lisbon");
        assert!(project.budget.is_zero());

        let err = update_project(env.config(), UpdateProjectArgs::new("nope"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Project not found"));
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let env = TestEnv::new().await;
        env.seed().await;
        let out = delete_project(env.config(), "p1").await.unwrap();
        assert_eq!(out.message(), "Deleted project 'Grand Hotel' and 2 transactions");
        let app = env.app();
        assert!(app.projects().is_empty());
        assert!(app.transactions().is_empty());
        assert!(delete_project(env.config(), "p1").await.is_err());
    }

    #[tokio::test]
    async fn test_viewer_cannot_delete() {
        let env = TestEnv::new().await;
        env.seed().await;
        let mut app = env.app();
        app.add_user(crate::model::User::from_preset(
            "auditor",
            crate::model::PermissionPreset::Auditor,
        ))
        .unwrap();
        let _ = login(env.config(), "auditor", "password123").await.unwrap();

        let err = delete_project(env.config(), "p1").await.unwrap_err();
        assert!(err.to_string().contains("Permission denied"));
        assert_eq!(env.app().projects().len(), 1);
        assert!(list_projects(env.config()).await.is_ok());
    }
}
