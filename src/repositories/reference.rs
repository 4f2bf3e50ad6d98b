//! # Reference Repository
//!
//! Lookup tables (regions, organization types, organization subtypes and
//! services) share one bilingual, soft-activatable shape. This repository
//! exposes them through a single [`ReferenceKind`]-dispatched API.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::{organization_subtype, organization_type, region, service};

/// Expands `$body` once per reference table with `$table` bound to its model module.
macro_rules! for_each_table {
    ($kind:expr, |$table:ident| $body:expr) => {
        match $kind {
            ReferenceKind::Region => {
                use crate::models::region as $table;
                $body
            }
            ReferenceKind::OrganizationType => {
                use crate::models::organization_type as $table;
                $body
            }
            ReferenceKind::OrganizationSubtype => {
                use crate::models::organization_subtype as $table;
                $body
            }
            ReferenceKind::Service => {
                use crate::models::service as $table;
                $body
            }
        }
    };
}

/// Copies the fields every reference table has from a patch onto an active model.
macro_rules! apply_common_patch {
    ($active:ident, $name:expr, $patch:expr) => {
        if let Some(name) = $name {
            $active.name = Set(name);
        }
        if let Some(name_ar) = $patch.name_ar.clone() {
            $active.name_ar = Set(non_empty(Some(name_ar)));
        }
        if let Some(is_active) = $patch.is_active {
            $active.is_active = Set(is_active);
        }
    };
}

/// The reference tables exposed over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Region,
    OrganizationType,
    OrganizationSubtype,
    Service,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 4] = [
        ReferenceKind::Region,
        ReferenceKind::OrganizationType,
        ReferenceKind::OrganizationSubtype,
        ReferenceKind::Service,
    ];

    /// URL segment used by the `/api/{kind}` routes.
    pub fn slug(&self) -> &'static str {
        match self {
            ReferenceKind::Region => "regions",
            ReferenceKind::OrganizationType => "organization-types",
            ReferenceKind::OrganizationSubtype => "organization-subtypes",
            ReferenceKind::Service => "services",
        }
    }

    /// Human label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::Region => "Region",
            ReferenceKind::OrganizationType => "Organization type",
            ReferenceKind::OrganizationSubtype => "Organization subtype",
            ReferenceKind::Service => "Service",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown reference kind '{0}'")]
pub struct UnknownReferenceKind(pub String);

impl FromStr for ReferenceKind {
    type Err = UnknownReferenceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReferenceKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| UnknownReferenceKind(s.to_string()))
    }
}

/// Reference row as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_ar: Option<String>,
    pub is_active: bool,
    /// Parent organization type (subtypes only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_id: Option<Uuid>,
    /// Free-text description (services only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<region::Model> for ReferenceRecord {
    fn from(model: region::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            name_ar: model.name_ar,
            is_active: model.is_active,
            type_id: None,
            description: None,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<organization_type::Model> for ReferenceRecord {
    fn from(model: organization_type::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            name_ar: model.name_ar,
            is_active: model.is_active,
            type_id: None,
            description: None,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<organization_subtype::Model> for ReferenceRecord {
    fn from(model: organization_subtype::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            name_ar: model.name_ar,
            is_active: model.is_active,
            type_id: model.type_id,
            description: None,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<service::Model> for ReferenceRecord {
    fn from(model: service::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            name_ar: model.name_ar,
            is_active: model.is_active,
            type_id: None,
            description: model.description,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// Payload for creating a reference row.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceInput {
    pub name: String,
    #[serde(default)]
    pub name_ar: Option<String>,
    /// Defaults to `true`
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Parent organization type (subtypes only)
    #[serde(default)]
    pub type_id: Option<Uuid>,
    /// Description (services only)
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update of a reference row; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferencePatch {
    #[serde(default)]
    pub name: Option<String>,
    /// An empty string clears the Arabic name
    #[serde(default)]
    pub name_ar: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub type_id: Option<Uuid>,
    /// An empty string clears the description
    #[serde(default)]
    pub description: Option<String>,
}

/// Repository for the reference lookup tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceRepository;

impl ReferenceRepository {
    pub fn new() -> Self {
        Self
    }

    /// Lists rows of `kind` by name; `active_only` hides deactivated rows.
    pub async fn list<C>(
        &self,
        conn: &C,
        kind: ReferenceKind,
        active_only: bool,
    ) -> Result<Vec<ReferenceRecord>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let records: Vec<ReferenceRecord> = for_each_table!(kind, |table| {
            let mut query = table::Entity::find();
            if active_only {
                query = query.filter(table::Column::IsActive.eq(true));
            }
            query
                .order_by_asc(table::Column::Name)
                .all(conn)
                .await
                .map_err(RepositoryError::database_error)?
                .into_iter()
                .map(ReferenceRecord::from)
                .collect()
        });

        Ok(records)
    }

    pub async fn find_by_id<C>(
        &self,
        conn: &C,
        kind: ReferenceKind,
        id: Uuid,
    ) -> Result<Option<ReferenceRecord>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let record = for_each_table!(kind, |table| {
            table::Entity::find_by_id(id)
                .one(conn)
                .await
                .map_err(RepositoryError::database_error)?
                .map(ReferenceRecord::from)
        });

        Ok(record)
    }

    /// True when an active row of `kind` is named exactly `name`.
    pub async fn is_active_name<C>(
        &self,
        conn: &C,
        kind: ReferenceKind,
        name: &str,
    ) -> Result<bool, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let count: u64 = for_each_table!(kind, |table| {
            table::Entity::find()
                .filter(table::Column::Name.eq(name))
                .filter(table::Column::IsActive.eq(true))
                .count(conn)
                .await
                .map_err(RepositoryError::database_error)?
        });

        Ok(count > 0)
    }

    /// Creates a row; a duplicate name yields [`RepositoryError::Conflict`].
    pub async fn create<C>(
        &self,
        conn: &C,
        kind: ReferenceKind,
        input: ReferenceInput,
    ) -> Result<ReferenceRecord, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let name = required_name(&input.name)?;
        check_kind_specific_fields(kind, input.type_id.is_some(), input.description.is_some())?;
        if let Some(type_id) = input.type_id {
            self.ensure_type_exists(conn, type_id).await?;
        }

        let id = Uuid::new_v4();
        let name_ar = non_empty(input.name_ar);
        let is_active = input.is_active.unwrap_or(true);
        let created_at: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();

        let record = match kind {
            ReferenceKind::Region => region::ActiveModel {
                id: Set(id),
                name: Set(name),
                name_ar: Set(name_ar),
                is_active: Set(is_active),
                created_at: Set(created_at),
            }
            .insert(conn)
            .await
            .map(ReferenceRecord::from),
            ReferenceKind::OrganizationType => organization_type::ActiveModel {
                id: Set(id),
                name: Set(name),
                name_ar: Set(name_ar),
                is_active: Set(is_active),
                created_at: Set(created_at),
            }
            .insert(conn)
            .await
            .map(ReferenceRecord::from),
            ReferenceKind::OrganizationSubtype => organization_subtype::ActiveModel {
                id: Set(id),
                name: Set(name),
                name_ar: Set(name_ar),
                type_id: Set(input.type_id),
                is_active: Set(is_active),
                created_at: Set(created_at),
            }
            .insert(conn)
            .await
            .map(ReferenceRecord::from),
            ReferenceKind::Service => service::ActiveModel {
                id: Set(id),
                name: Set(name),
                name_ar: Set(name_ar),
                description: Set(non_empty(input.description)),
                is_active: Set(is_active),
                created_at: Set(created_at),
            }
            .insert(conn)
            .await
            .map(ReferenceRecord::from),
        };

        record.map_err(|err| duplicate_name_conflict(kind, err))
    }

    /// Applies a partial update; a rename onto an existing name is a conflict.
    pub async fn update<C>(
        &self,
        conn: &C,
        kind: ReferenceKind,
        id: Uuid,
        patch: ReferencePatch,
    ) -> Result<ReferenceRecord, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let name = patch.name.as_deref().map(required_name).transpose()?;
        check_kind_specific_fields(kind, patch.type_id.is_some(), patch.description.is_some())?;
        if let Some(type_id) = patch.type_id {
            self.ensure_type_exists(conn, type_id).await?;
        }

        let missing = || RepositoryError::not_found(format!("{} {id} not found", kind.label()));

        let record = match kind {
            ReferenceKind::Region => {
                let model = region::Entity::find_by_id(id)
                    .one(conn)
                    .await
                    .map_err(RepositoryError::database_error)?
                    .ok_or_else(missing)?;
                let mut active = model.into_active_model();
                apply_common_patch!(active, name, patch);
                active.update(conn).await.map(ReferenceRecord::from)
            }
            ReferenceKind::OrganizationType => {
                let model = organization_type::Entity::find_by_id(id)
                    .one(conn)
                    .await
                    .map_err(RepositoryError::database_error)?
                    .ok_or_else(missing)?;
                let mut active = model.into_active_model();
                apply_common_patch!(active, name, patch);
                active.update(conn).await.map(ReferenceRecord::from)
            }
            ReferenceKind::OrganizationSubtype => {
                let model = organization_subtype::Entity::find_by_id(id)
                    .one(conn)
                    .await
                    .map_err(RepositoryError::database_error)?
                    .ok_or_else(missing)?;
                let mut active = model.into_active_model();
                apply_common_patch!(active, name, patch);
                if let Some(type_id) = patch.type_id {
                    active.type_id = Set(Some(type_id));
                }
                active.update(conn).await.map(ReferenceRecord::from)
            }
            ReferenceKind::Service => {
                let model = service::Entity::find_by_id(id)
                    .one(conn)
                    .await
                    .map_err(RepositoryError::database_error)?
                    .ok_or_else(missing)?;
                let mut active = model.into_active_model();
                apply_common_patch!(active, name, patch);
                if let Some(description) = patch.description.clone() {
                    active.description = Set(non_empty(Some(description)));
                }
                active.update(conn).await.map(ReferenceRecord::from)
            }
        };

        record.map_err(|err| duplicate_name_conflict(kind, err))
    }

    pub async fn delete<C>(
        &self,
        conn: &C,
        kind: ReferenceKind,
        id: Uuid,
    ) -> Result<(), RepositoryError>
    where
        C: ConnectionTrait,
    {
        let rows_affected: u64 = for_each_table!(kind, |table| {
            table::Entity::delete_by_id(id)
                .exec(conn)
                .await
                .map_err(RepositoryError::database_error)?
                .rows_affected
        });

        if rows_affected == 0 {
            return Err(RepositoryError::not_found(format!(
                "{} {id} not found",
                kind.label()
            )));
        }

        Ok(())
    }

    async fn ensure_type_exists<C>(&self, conn: &C, type_id: Uuid) -> Result<(), RepositoryError>
    where
        C: ConnectionTrait,
    {
        let exists = organization_type::Entity::find_by_id(type_id)
            .one(conn)
            .await
            .map_err(RepositoryError::database_error)?
            .is_some();

        if exists {
            Ok(())
        } else {
            Err(RepositoryError::validation_error(format!(
                "Organization type {type_id} does not exist"
            )))
        }
    }
}

fn required_name(raw: &str) -> Result<String, RepositoryError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(RepositoryError::validation_error("Name is required"));
    }
    Ok(name.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_kind_specific_fields(
    kind: ReferenceKind,
    has_type_id: bool,
    has_description: bool,
) -> Result<(), RepositoryError> {
    if has_type_id && kind != ReferenceKind::OrganizationSubtype {
        return Err(RepositoryError::validation_error(
            "typeId is only supported for organization subtypes",
        ));
    }
    if has_description && kind != ReferenceKind::Service {
        return Err(RepositoryError::validation_error(
            "description is only supported for services",
        ));
    }
    Ok(())
}

fn duplicate_name_conflict(kind: ReferenceKind, err: sea_orm::DbErr) -> RepositoryError {
    match RepositoryError::database_error(err) {
        RepositoryError::Conflict(_) => RepositoryError::Conflict(format!(
            "{} with this name already exists",
            kind.label()
        )),
        other => other,
    }
}
