//! 实体服务 - 所有实体族共用的写入流程
//!
//! # 创建
//!
//! ```text
//! 校验 → 引用存在 → 唯一性 → 上传图片 → 事务写入(记录 + 计数器)
//!                                        └─ 失败则删除刚上传的图片
//! ```
//!
//! # 更新
//!
//! ```text
//! 校验(无 I/O) → 记录存在 → 引用存在 → 唯一性 → 替换图片 → 事务写入
//! ```
//!
//! 引用字段变化时，旧目标计数 -1、新目标 +1，与记录写在同一事务中；
//! 旧值在事务内读取，写冲突时整个事务重跑。
//!
//! # 删除
//!
//! ```text
//! 记录存在 → 无引用方 → 事务删除(记录 + 计数器) → 删除图片
//! ```

use chrono::Utc;
use serde_json::Value;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::assets::AssetCoordinator;
use super::image_processing::UploadedImage;
use crate::db::repository::entity::from_document;
use crate::db::repository::{
    Document, Entity, EntityRepository, count_referencing, record_exists,
};
use crate::utils::{AppError, AppResult};

pub struct EntityService<E> {
    repo: EntityRepository<E>,
    assets: AssetCoordinator,
}

impl<E> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            assets: self.assets.clone(),
        }
    }
}

impl<E: Entity> EntityService<E> {
    pub fn new(db: Surreal<Db>, assets: AssetCoordinator) -> Self {
        Self {
            repo: EntityRepository::new(db),
            assets,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<E>> {
        Ok(self.repo.find_all().await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<E> {
        self.repo.find_by_id(id).await?.ok_or_else(E::not_found)
    }

    pub async fn create(&self, fields: Document, image: Option<UploadedImage>) -> AppResult<E> {
        let fields = E::SCHEMA.validate_create(&fields)?;
        self.check_references(&fields).await?;
        self.check_unique(&fields, None).await?;

        let mut document = E::create_document(from_document(fields)?)?;
        if E::TIMESTAMPS {
            let now = timestamp();
            document.insert("createdAt".into(), now.clone());
            document.insert("updatedAt".into(), now);
        }

        let asset = if E::HAS_IMAGE {
            self.assets.attach(image).await?
        } else {
            None
        };
        if let Some(asset) = &asset {
            document.insert("image".into(), asset_value(asset)?);
        }

        let id = shared::util::object_id();
        if let Err(e) = self.repo.insert(&id, document).await {
            if let Some(asset) = &asset {
                self.assets.discard(asset).await;
            }
            return Err(self.write_error(e.into()));
        }
        self.get(&id).await
    }

    pub async fn update(&self, id: &str, fields: Document, image: Option<UploadedImage>) -> AppResult<E> {
        let fields = E::SCHEMA.validate_update(&fields)?;
        let existing = self.get(id).await?;
        self.check_references(&fields).await?;
        self.check_unique(&fields, Some(id)).await?;

        let mut patch = E::update_document(from_document(fields)?)?;

        let replaced = match image {
            Some(image) if E::HAS_IMAGE => self.assets.replace(existing.image(), Some(image)).await?,
            _ => None,
        };

        if patch.is_empty() && replaced.is_none() {
            return Ok(existing);
        }
        if let Some(asset) = &replaced {
            patch.insert("image".into(), asset_value(asset)?);
        }
        if E::TIMESTAMPS {
            patch.insert("updatedAt".into(), timestamp());
        }

        if let Err(e) = self.repo.merge(id, patch).await {
            if let Some(asset) = &replaced {
                self.assets.discard(asset).await;
            }
            return Err(self.write_error(e.into()));
        }
        self.get(id).await
    }

    /// Delete a record, returning it as it was
    pub async fn delete(&self, id: &str) -> AppResult<E> {
        let existing = self.get(id).await?;

        for referrer in E::REFERENCED_BY {
            let count = count_referencing(self.repo.db(), referrer.table, referrer.field, id).await?;
            if count > 0 {
                return Err(AppError::with_message(
                    referrer.in_use,
                    format!(
                        "Cannot delete {}: still referenced by {} {}(s)",
                        E::LABEL.to_lowercase(),
                        count,
                        referrer.table
                    ),
                )
                .with_detail("count", count));
            }
        }

        self.repo.remove(id).await?;

        if let Err(e) = self.assets.release(existing.image()).await {
            tracing::error!(entity = E::TABLE, id = %id, error = %e, "Record deleted but its image was not");
            return Err(e);
        }
        Ok(existing)
    }

    /// Every reference present in `fields` must resolve
    async fn check_references(&self, fields: &Document) -> AppResult<()> {
        for r in E::REFERENCES {
            let Some(target) = fields.get(r.field).and_then(Value::as_str) else {
                continue;
            };
            if !record_exists(self.repo.db(), r.table, target).await? {
                return Err(AppError::new(r.invalid).with_detail("field", r.field));
            }
        }
        Ok(())
    }

    /// No other record may hold any unique value in `fields`
    async fn check_unique(&self, fields: &Document, exclude: Option<&str>) -> AppResult<()> {
        if self.repo.find_conflict(fields, exclude).await?.is_some() {
            return Err(AppError::new(E::CONFLICT));
        }
        Ok(())
    }

    /// A unique index caught a race the pre-check missed
    fn write_error(&self, err: AppError) -> AppError {
        if err.code == crate::utils::ErrorCode::AlreadyExists {
            AppError::new(E::CONFLICT)
        } else {
            err
        }
    }
}

fn timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

fn asset_value(asset: &shared::models::AssetRef) -> AppResult<Value> {
    serde_json::to_value(asset).map_err(|e| AppError::internal(e.to_string()))
}
