//! Admin descriptor and admin-specific queries

use std::collections::HashMap;

use shared::error::{AppResult, ErrorCode};
use shared::models::{Admin, AdminCreate, AdminResponse, AdminUpdate, AssetRef, Role};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::entity::{Document, Entity, Reference, to_document};
use super::user::{EMAIL, PASSWORD, USERNAME, hash_password_field};
use super::{EntityRepository, RepoResult};
use crate::utils::validation::{Field, Rule, Schema};

pub const TABLE: &str = "admin";

impl Entity for Admin {
    type Create = AdminCreate;
    type Update = AdminUpdate;

    const TABLE: &'static str = TABLE;
    const LABEL: &'static str = "Admin";
    const SCHEMA: &'static Schema = &Schema {
        fields: &[USERNAME, EMAIL, PASSWORD, Field::new("role", Rule::ObjectId)],
        strict_update: false,
    };
    const UNIQUE_KEYS: &'static [&'static str] = &["username", "email"];
    const REFERENCES: &'static [Reference] = &[Reference {
        field: "role",
        table: super::role::TABLE,
        invalid: ErrorCode::RoleInvalid,
        counter: None,
    }];
    const NOT_FOUND: ErrorCode = ErrorCode::AdminNotFound;
    const CONFLICT: ErrorCode = ErrorCode::AccountExists;
    const HAS_IMAGE: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn image(&self) -> Option<&AssetRef> {
        self.image.as_ref()
    }

    fn create_document(input: AdminCreate) -> AppResult<Document> {
        let mut document = to_document(&input)?;
        hash_password_field(&mut document)?;
        Ok(document)
    }

    fn update_document(input: AdminUpdate) -> AppResult<Document> {
        let mut document = to_document(&input)?;
        hash_password_field(&mut document)?;
        Ok(document)
    }
}

/// Login lookup by the unique email
pub async fn find_by_email(db: &Surreal<Db>, email: &str) -> RepoResult<Option<Admin>> {
    let mut result = db
        .query("SELECT *, meta::id(id) AS id FROM admin WHERE email = $email LIMIT 1")
        .bind(("email", email.to_string()))
        .await?;
    let admins: Vec<Admin> = result.take(0)?;
    Ok(admins.into_iter().next())
}

/// Populate each admin's role; a dangling role renders as `None`
pub async fn with_roles(db: &Surreal<Db>, admins: Vec<Admin>) -> RepoResult<Vec<AdminResponse>> {
    let mut ids: Vec<String> = admins.iter().map(|a| a.role.clone()).collect();
    ids.sort();
    ids.dedup();

    let roles: HashMap<String, Role> = EntityRepository::<Role>::new(db.clone())
        .find_many(&ids)
        .await?
        .into_iter()
        .map(|role| (role.id.clone(), role))
        .collect();

    Ok(admins
        .into_iter()
        .map(|admin| {
            let role = roles.get(&admin.role).cloned();
            AdminResponse::new(admin, role)
        })
        .collect())
}

/// Single-admin form of [`with_roles`]
pub async fn with_role(db: &Surreal<Db>, admin: Admin) -> RepoResult<AdminResponse> {
    let role = EntityRepository::<Role>::new(db.clone())
        .find_by_id(&admin.role)
        .await?;
    Ok(AdminResponse::new(admin, role))
}
