//! Hand-written fakes for application service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tokio::sync::Mutex;

use strata_core::{AppError, AppResult, OrganizationId, UserId};
use strata_domain::{
    Assignment, AssignmentId, AssignmentStatus, ContextEntity, ContextType, DirectoryUser,
    Location, LocationId, Project, ProjectId, ResourceRef, Role, RoleId, RoleScope,
    ValidityWindow,
};

use crate::{
    AssignmentChanges, AssignmentDeletion, AssignmentRepository, AssignmentTransfer, AuditEvent,
    Clock, ContainmentRepository, NewAssignment, RoleCatalog, UserDirectory,
};

pub(crate) struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub(crate) fn on(year: i32, month: u32, day: u32) -> Self {
        Self(
            Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
                .single()
                .unwrap_or_else(|| unreachable!()),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| unreachable!())
}

#[derive(Default)]
pub(crate) struct FakeContainment {
    pub organizations: Mutex<Vec<OrganizationId>>,
    pub locations: Mutex<Vec<Location>>,
    pub projects: Mutex<Vec<Project>>,
    pub unavailable: AtomicBool,
}

impl FakeContainment {
    pub(crate) async fn add_org(&self, org_id: i64) {
        self.organizations
            .lock()
            .await
            .push(OrganizationId::new(org_id));
    }

    pub(crate) async fn add_location(&self, org_id: i64, location_id: i64) {
        self.locations.lock().await.push(Location {
            location_id: LocationId::new(location_id),
            org_id: OrganizationId::new(org_id),
        });
    }

    pub(crate) async fn add_project(&self, org_id: i64, location_id: i64, project_id: i64) {
        self.projects.lock().await.push(Project {
            project_id: ProjectId::new(project_id),
            org_id: OrganizationId::new(org_id),
            location_id: LocationId::new(location_id),
        });
    }

    pub(crate) async fn remove_location(&self, location_id: i64) {
        self.locations
            .lock()
            .await
            .retain(|location| location.location_id.value() != location_id);
    }

    pub(crate) async fn remove_project(&self, project_id: i64) {
        self.projects
            .lock()
            .await
            .retain(|project| project.project_id.value() != project_id);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Transient("containment store unavailable".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContainmentRepository for FakeContainment {
    async fn find_context_entity(&self, context: ResourceRef) -> AppResult<Option<ContextEntity>> {
        self.check_available()?;
        let entity = match context.resource_type() {
            ContextType::Organization => self
                .organizations
                .lock()
                .await
                .iter()
                .find(|org_id| org_id.value() == context.resource_id())
                .map(|org_id| ContextEntity {
                    reference: context,
                    org_id: *org_id,
                }),
            ContextType::Location => self
                .locations
                .lock()
                .await
                .iter()
                .find(|location| location.location_id.value() == context.resource_id())
                .map(|location| ContextEntity::from(*location)),
            ContextType::Project => self
                .projects
                .lock()
                .await
                .iter()
                .find(|project| project.project_id.value() == context.resource_id())
                .map(|project| ContextEntity::from(*project)),
        };

        Ok(entity)
    }

    async fn locations_by_org(&self, org_id: OrganizationId) -> AppResult<Vec<Location>> {
        self.check_available()?;
        Ok(self
            .locations
            .lock()
            .await
            .iter()
            .filter(|location| location.org_id == org_id)
            .copied()
            .collect())
    }

    async fn projects_by_org(&self, org_id: OrganizationId) -> AppResult<Vec<Project>> {
        self.check_available()?;
        Ok(self
            .projects
            .lock()
            .await
            .iter()
            .filter(|project| project.org_id == org_id)
            .copied()
            .collect())
    }

    async fn projects_by_location(&self, location_id: LocationId) -> AppResult<Vec<Project>> {
        self.check_available()?;
        Ok(self
            .projects
            .lock()
            .await
            .iter()
            .filter(|project| project.location_id == location_id)
            .copied()
            .collect())
    }
}

/// Assignment store fake. Mutations stage a copy of the rows and only swap it
/// in after the audit event was recorded, like a rolled-back transaction.
#[derive(Default)]
pub(crate) struct FakeAssignmentRepository {
    pub rows: Mutex<Vec<Assignment>>,
    pub audit_events: Mutex<Vec<AuditEvent>>,
    pub failing_audit_writes: AtomicUsize,
    pub user_reads: AtomicUsize,
    pub unavailable: AtomicBool,
}

impl FakeAssignmentRepository {
    pub(crate) async fn seed(&self, assignment: Assignment) {
        self.rows.lock().await.push(assignment);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Transient("assignment store unavailable".to_owned()));
        }
        Ok(())
    }

    async fn record_audit(&self, event: AuditEvent) -> AppResult<()> {
        if self
            .failing_audit_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
        {
            return Err(AppError::Transient("audit insert aborted".to_owned()));
        }
        self.audit_events.lock().await.push(event);
        Ok(())
    }
}

fn demote_primary(rows: &mut [Assignment], user_id: UserId, context: ResourceRef, keep: i64) {
    for row in rows.iter_mut().filter(|row| {
        row.user_id == user_id
            && row.context == context
            && !row.is_deleted()
            && row.assignment_id.value() != keep
    }) {
        row.is_primary = false;
    }
}

#[async_trait]
impl AssignmentRepository for FakeAssignmentRepository {
    async fn create_assignment(&self, assignment: NewAssignment) -> AppResult<Assignment> {
        self.check_available()?;
        let mut rows = self.rows.lock().await;
        if rows.iter().any(|row| {
            !row.is_deleted()
                && row.user_id == assignment.user_id
                && row.role_id == assignment.role_id
                && row.context == assignment.context
        }) {
            return Err(AppError::Conflict("duplicate assignment".to_owned()));
        }

        let mut staged = rows.clone();
        let assignment_id = staged
            .iter()
            .map(|row| row.assignment_id.value())
            .max()
            .unwrap_or(0)
            + 1;
        if assignment.is_primary {
            demote_primary(&mut staged, assignment.user_id, assignment.context, assignment_id);
        }

        let row = Assignment {
            assignment_id: AssignmentId::new(assignment_id),
            user_id: assignment.user_id,
            role_id: assignment.role_id,
            org_id: assignment.org_id,
            context: assignment.context,
            trade_type: assignment.trade_type,
            is_primary: assignment.is_primary,
            validity: assignment.validity,
            status: AssignmentStatus::Active,
            created_at: assignment.at,
            created_by: assignment.actor,
            updated_at: assignment.at,
            updated_by: assignment.actor,
            deleted_at: None,
            deleted_by: None,
        };
        staged.push(row.clone());

        self.record_audit(assignment.audit.into_event(
            row.org_id,
            assignment.actor,
            row.assignment_id.to_string(),
        ))
        .await?;
        *rows = staged;
        Ok(row)
    }

    async fn find_assignment(
        &self,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
    ) -> AppResult<Option<Assignment>> {
        self.check_available()?;
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .find(|row| row.org_id == org_id && row.assignment_id == assignment_id)
            .cloned())
    }

    async fn list_context_assignments(
        &self,
        org_id: OrganizationId,
        context: ResourceRef,
    ) -> AppResult<Vec<Assignment>> {
        self.check_available()?;
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .filter(|row| row.org_id == org_id && row.context == context && !row.is_deleted())
            .cloned()
            .collect())
    }

    async fn list_user_assignments(
        &self,
        org_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Vec<Assignment>> {
        self.user_reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .filter(|row| row.org_id == org_id && row.user_id == user_id && !row.is_deleted())
            .cloned()
            .collect())
    }

    async fn list_context_assignments_including_deleted(
        &self,
        org_id: OrganizationId,
        context: ResourceRef,
    ) -> AppResult<Vec<Assignment>> {
        self.check_available()?;
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .filter(|row| row.org_id == org_id && row.context == context)
            .cloned()
            .collect())
    }

    async fn update_assignment(
        &self,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
        changes: AssignmentChanges,
    ) -> AppResult<Assignment> {
        self.check_available()?;
        let mut rows = self.rows.lock().await;
        let Some(position) = rows.iter().position(|row| {
            row.org_id == org_id && row.assignment_id == assignment_id && !row.is_deleted()
        }) else {
            return Err(AppError::NotFound(format!(
                "assignment '{assignment_id}' was not found"
            )));
        };

        let (user_id, context) = (rows[position].user_id, rows[position].context);
        if rows.iter().any(|row| {
            !row.is_deleted()
                && row.assignment_id != assignment_id
                && row.user_id == user_id
                && row.role_id == changes.role_id
                && row.context == context
        }) {
            return Err(AppError::Conflict("duplicate assignment".to_owned()));
        }

        let mut staged = rows.clone();
        if changes.is_primary {
            demote_primary(&mut staged, user_id, context, assignment_id.value());
        }

        let row = &mut staged[position];
        row.role_id = changes.role_id;
        row.trade_type = changes.trade_type;
        row.is_primary = changes.is_primary;
        row.validity = changes.validity;
        row.updated_at = changes.at;
        row.updated_by = changes.actor;
        let row = row.clone();

        self.record_audit(changes.audit.into_event(
            org_id,
            changes.actor,
            assignment_id.to_string(),
        ))
        .await?;
        *rows = staged;
        Ok(row)
    }

    async fn delete_assignment(
        &self,
        org_id: OrganizationId,
        assignment_id: AssignmentId,
        deletion: AssignmentDeletion,
    ) -> AppResult<bool> {
        self.check_available()?;
        let mut rows = self.rows.lock().await;
        let position = rows
            .iter()
            .position(|row| row.org_id == org_id && row.assignment_id == assignment_id)
            .ok_or_else(|| AppError::NotFound(format!("assignment '{assignment_id}' was not found")))?;

        if rows[position].is_deleted() {
            return Ok(false);
        }

        self.record_audit(deletion.audit.into_event(
            org_id,
            deletion.actor,
            assignment_id.to_string(),
        ))
        .await?;

        let row = &mut rows[position];
        row.status = AssignmentStatus::Deleted;
        row.is_primary = false;
        row.deleted_at = Some(deletion.at);
        row.deleted_by = Some(deletion.actor);
        Ok(true)
    }

    async fn transfer_assignments(
        &self,
        transfer: AssignmentTransfer,
    ) -> AppResult<Vec<Assignment>> {
        self.check_available()?;
        let mut rows = self.rows.lock().await;
        let mut staged = rows.clone();
        let selected: Vec<usize> = staged
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                row.org_id == transfer.org_id
                    && row.context == transfer.from
                    && !row.is_deleted()
                    && transfer.filter.matches(row)
            })
            .map(|(index, _)| index)
            .collect();

        for index in &selected {
            let (user_id, role_id) = (staged[*index].user_id, staged[*index].role_id);
            if staged.iter().any(|row| {
                !row.is_deleted()
                    && row.context == transfer.to
                    && row.user_id == user_id
                    && row.role_id == role_id
            }) {
                return Err(AppError::Conflict("duplicate assignment at destination".to_owned()));
            }

            let has_primary = staged.iter().any(|row| {
                !row.is_deleted()
                    && row.context == transfer.to
                    && row.user_id == user_id
                    && row.is_primary
            });
            let row = &mut staged[*index];
            row.context = transfer.to;
            row.is_primary = row.is_primary && !has_primary;
            row.updated_at = transfer.at;
            row.updated_by = transfer.actor;
        }

        let moved: Vec<Assignment> = selected.iter().map(|index| staged[*index].clone()).collect();
        if !moved.is_empty() {
            let assignment_ids = moved
                .iter()
                .map(|row| row.assignment_id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            self.record_audit(transfer.audit.into_event(
                transfer.org_id,
                transfer.actor,
                assignment_ids,
            ))
            .await?;
        }
        *rows = staged;
        Ok(moved)
    }
}

#[derive(Default)]
pub(crate) struct FakeDirectory {
    pub roles: HashMap<RoleId, Role>,
    pub users: HashMap<UserId, DirectoryUser>,
}

impl FakeDirectory {
    pub(crate) fn with_system_role(mut self, role_id: i64) -> Self {
        let role = Role::new(RoleId::new(role_id), "Site Manager", RoleScope::System)
            .unwrap_or_else(|_| unreachable!());
        self.roles.insert(role.role_id(), role);
        self
    }

    pub(crate) fn with_custom_role(mut self, role_id: i64, org_id: i64) -> Self {
        let role = Role::new(
            RoleId::new(role_id),
            "Foreman",
            RoleScope::Organization {
                org_id: OrganizationId::new(org_id),
            },
        )
        .unwrap_or_else(|_| unreachable!());
        self.roles.insert(role.role_id(), role);
        self
    }

    pub(crate) fn with_user(mut self, user_id: i64, org_id: i64) -> Self {
        self.users.insert(
            UserId::new(user_id),
            DirectoryUser {
                user_id: UserId::new(user_id),
                org_id: OrganizationId::new(org_id),
            },
        );
        self
    }
}

#[async_trait]
impl RoleCatalog for FakeDirectory {
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.roles.get(&role_id).cloned())
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<DirectoryUser>> {
        Ok(self.users.get(&user_id).copied())
    }
}

/// Builds a live, unbounded, non-primary assignment row.
pub(crate) fn stored_assignment(
    assignment_id: i64,
    user_id: i64,
    org_id: i64,
    context: ResourceRef,
) -> Assignment {
    let created_at = FixedClock::on(2026, 1, 1).0;
    Assignment {
        assignment_id: AssignmentId::new(assignment_id),
        user_id: UserId::new(user_id),
        role_id: RoleId::new(1),
        org_id: OrganizationId::new(org_id),
        context,
        trade_type: None,
        is_primary: false,
        validity: ValidityWindow::unbounded(),
        status: AssignmentStatus::Active,
        created_at,
        created_by: UserId::new(1),
        updated_at: created_at,
        updated_by: UserId::new(1),
        deleted_at: None,
        deleted_by: None,
    }
}
