use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use shared::error::AppResult;
use shared::models::{Admin, Role};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::SessionAuthenticator;
use crate::core::{Config, ServerError};
use crate::db::DbService;
use crate::db::repository::{Document, Entity};
use crate::security_log;
use crate::services::image_host::{CloudinaryHost, ImageHost, MemoryImageHost};
use crate::services::{AssetCoordinator, EntityService};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc / 句柄实现浅拷贝，每个请求克隆一次成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | assets | AssetCoordinator | 图片生命周期 (图床) |
/// | auth | SessionAuthenticator | 管理员会话 |
/// | started_at | Instant | 启动时间 (health 使用) |
///
/// # 使用示例
///
/// ```ignore
/// let products = state.service::<Product>().list().await?;
/// let admin = state.auth.current(token).await?;
/// ```
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// 图片生命周期协调器
    pub assets: AssetCoordinator,
    /// 会话认证
    pub auth: SessionAuthenticator,
    /// 启动时间
    pub started_at: Instant,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 测试中用来注入内存图床；通常使用 [`initialize()`](Self::initialize)
    pub fn new(config: Config, db: Surreal<Db>, host: Arc<dyn ImageHost>) -> Self {
        let assets = AssetCoordinator::new(host, config.upload.clone());
        let auth = SessionAuthenticator::new(db.clone(), config.session.clone());
        Self {
            config,
            db,
            assets,
            auth,
            started_at: Instant::now(),
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 数据库 (RocksDB 或内存) 与表结构
    /// 2. 图床 (Cloudinary 凭证齐全时，否则内存图床)
    /// 3. 会话认证
    /// 4. 初始管理员 (已配置且管理员表为空时)
    pub async fn initialize(config: &Config) -> Result<Self, ServerError> {
        let db = DbService::new(config).await?.db;

        let host: Arc<dyn ImageHost> = match &config.cloudinary {
            Some(cloudinary) => {
                tracing::info!(cloud = %cloudinary.cloud_name, folder = %cloudinary.folder, "Using Cloudinary image host");
                Arc::new(CloudinaryHost::new(cloudinary.clone()))
            }
            None => {
                if config.is_production() {
                    return Err(ServerError::Config(
                        "CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET are required in production".into(),
                    ));
                }
                tracing::warn!("Cloudinary credentials not set, images are kept in memory");
                Arc::new(MemoryImageHost::new())
            }
        };

        let state = Self::new(config.clone(), db, host);
        state
            .bootstrap_admin()
            .await
            .map_err(|e| ServerError::Config(format!("初始管理员创建失败: {e}")))?;
        Ok(state)
    }

    /// 创建初始管理员
    ///
    /// 仅当配置了 [`BootstrapAdmin`](crate::core::BootstrapAdmin) 且管理员表为空时执行，
    /// 走与 HTTP 相同的校验与哈希流程。角色按名称复用，不存在时创建。
    pub async fn bootstrap_admin(&self) -> AppResult<Option<Admin>> {
        let Some(seed) = &self.config.bootstrap else {
            return Ok(None);
        };
        let admins = self.service::<Admin>();
        if !admins.list().await?.is_empty() {
            return Ok(None);
        }

        let roles = self.service::<Role>();
        let existing = roles
            .list()
            .await?
            .into_iter()
            .find(|role| role.name == seed.role_name);
        let role = match existing {
            Some(role) => role,
            None => {
                let fields = Document::from_iter([
                    ("name".to_string(), Value::from(seed.role_name.as_str())),
                    ("status".to_string(), Value::from("active")),
                    ("limit".to_string(), Value::from(1)),
                ]);
                roles.create(fields, None).await?
            }
        };

        let fields = Document::from_iter([
            ("username".to_string(), Value::from(seed.username.as_str())),
            ("email".to_string(), Value::from(seed.email.as_str())),
            ("password".to_string(), Value::from(seed.password.as_str())),
            ("role".to_string(), Value::from(role.id.as_str())),
        ]);
        let admin = admins.create(fields, None).await?;
        security_log!("INFO", "admin_bootstrapped", admin_id = admin.id.as_str());
        tracing::info!(email = %admin.email, role = %role.name, "Initial admin created");
        Ok(Some(admin))
    }

    /// 实体族服务
    pub fn service<E: Entity>(&self) -> EntityService<E> {
        EntityService::new(self.db.clone(), self.assets.clone())
    }

    /// 运行秒数
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
