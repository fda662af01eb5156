use std::time::Duration;

/// 图床 (Cloudinary) 凭证
///
/// 三项均设置时才启用远程图床，否则使用内存图床。
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// 上传目录
    pub folder: String,
}

/// 图片上传限制
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// 单个文件最大字节数 (同时作为请求体上限)
    pub max_bytes: usize,
    /// 长边最大像素，超过则等比缩小
    pub max_dimension: u32,
}

/// 会话配置
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Cookie 名称
    pub cookie_name: String,
    /// 不活跃过期时间
    pub ttl: Duration,
    /// 过期会话清理间隔
    pub sweep_interval: Duration,
    /// 登录失败后的固定延迟
    pub failed_login_delay: Duration,
    /// 是否要求所有 CRUD 接口携带有效会话
    pub require_session: bool,
}

/// 初始管理员
///
/// 管理员表为空时于启动阶段创建，使开启 REQUIRE_SESSION 的新库也能登录。
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
    /// 角色名，不存在时创建
    pub role_name: String,
}

/// 服务器配置 - 后台服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 5000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | DATABASE_PATH | data/backoffice.db | RocksDB 目录，`memory` 表示内存库 |
/// | DATABASE_NAMESPACE | backoffice | SurrealDB namespace |
/// | DATABASE_NAME | main | SurrealDB database |
/// | CORS_ORIGIN | http://localhost:3000 | 唯一允许的跨域来源 |
/// | SESSION_COOKIE_NAME | backoffice.sid | 会话 Cookie 名称 |
/// | SESSION_TTL_SECS | 86400 | 会话不活跃过期(秒) |
/// | SESSION_SWEEP_SECS | 600 | 过期会话清理间隔(秒) |
/// | REQUIRE_SESSION | false | CRUD 接口是否需要登录 |
/// | AUTH_DELAY_MS | 300 | 登录失败固定延迟(毫秒) |
/// | MAX_UPLOAD_BYTES | 5242880 | 图片大小上限 |
/// | IMAGE_MAX_DIMENSION | 500 | 图片长边上限 |
/// | CLOUDINARY_CLOUD_NAME / CLOUDINARY_API_KEY / CLOUDINARY_API_SECRET | - | 图床凭证 |
/// | CLOUDINARY_FOLDER | user-profiles | 图床目录 |
/// | ADMIN_BOOTSTRAP_EMAIL / ADMIN_BOOTSTRAP_PASSWORD | - | 初始管理员 (两项均设置时启用) |
/// | ADMIN_BOOTSTRAP_USERNAME | admin | 初始管理员用户名 |
/// | ADMIN_BOOTSTRAP_ROLE | Administrator | 初始管理员角色名 |
///
/// # 示例
///
/// ```ignore
/// HTTP_PORT=8080 DATABASE_PATH=memory cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | production
    pub environment: String,
    /// 数据库目录 (RocksDB) 或 `memory`
    pub database_path: String,
    pub database_namespace: String,
    pub database_name: String,
    /// 允许携带凭证的跨域来源
    pub cors_origin: String,
    pub session: SessionConfig,
    pub upload: UploadConfig,
    /// 图床凭证 (None 时使用内存图床)
    pub cloudinary: Option<CloudinaryConfig>,
    /// 初始管理员 (None 时不创建)
    pub bootstrap: Option<BootstrapAdmin>,
}

/// Value that selects the in-memory SurrealDB engine.
pub const MEMORY_DATABASE: &str = "memory";

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let cloudinary = match (
            std::env::var("CLOUDINARY_CLOUD_NAME"),
            std::env::var("CLOUDINARY_API_KEY"),
            std::env::var("CLOUDINARY_API_SECRET"),
        ) {
            (Ok(cloud_name), Ok(api_key), Ok(api_secret))
                if !cloud_name.is_empty() && !api_key.is_empty() && !api_secret.is_empty() =>
            {
                Some(CloudinaryConfig {
                    cloud_name,
                    api_key,
                    api_secret,
                    folder: env_or("CLOUDINARY_FOLDER", "user-profiles"),
                })
            }
            _ => None,
        };

        let bootstrap = match (
            std::env::var("ADMIN_BOOTSTRAP_EMAIL"),
            std::env::var("ADMIN_BOOTSTRAP_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                Some(BootstrapAdmin {
                    username: env_or("ADMIN_BOOTSTRAP_USERNAME", "admin"),
                    email,
                    password,
                    role_name: env_or("ADMIN_BOOTSTRAP_ROLE", "Administrator"),
                })
            }
            _ => None,
        };

        Self {
            http_port: env_parse("HTTP_PORT", 5000),
            environment: env_or("ENVIRONMENT", "development"),
            database_path: env_or("DATABASE_PATH", "data/backoffice.db"),
            database_namespace: env_or("DATABASE_NAMESPACE", "backoffice"),
            database_name: env_or("DATABASE_NAME", "main"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:3000"),
            session: SessionConfig {
                cookie_name: env_or("SESSION_COOKIE_NAME", "backoffice.sid"),
                ttl: Duration::from_secs(env_parse("SESSION_TTL_SECS", 24 * 60 * 60)),
                sweep_interval: Duration::from_secs(env_parse("SESSION_SWEEP_SECS", 600)),
                failed_login_delay: Duration::from_millis(env_parse("AUTH_DELAY_MS", 300)),
                require_session: env_parse("REQUIRE_SESSION", false),
            },
            upload: UploadConfig {
                max_bytes: env_parse("MAX_UPLOAD_BYTES", 5 * 1024 * 1024),
                max_dimension: env_parse("IMAGE_MAX_DIMENSION", 500),
            },
            cloudinary,
            bootstrap,
        }
    }

    /// 测试用配置：内存数据库、内存图床、无登录延迟
    pub fn for_tests() -> Self {
        let mut config = Self::from_env();
        config.environment = "test".into();
        config.database_path = MEMORY_DATABASE.into();
        config.database_namespace = "test".into();
        config.database_name = "test".into();
        config.cloudinary = None;
        config.bootstrap = None;
        config.session.failed_login_delay = Duration::ZERO;
        config.session.require_session = false;
        config.session.cookie_name = "backoffice.sid".into();
        config
    }

    /// 是否使用内存数据库
    pub fn uses_memory_database(&self) -> bool {
        self.database_path == MEMORY_DATABASE
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_tests_uses_memory_backends() {
        let config = Config::for_tests();
        assert!(config.uses_memory_database());
        assert!(config.cloudinary.is_none());
        assert_eq!(config.session.failed_login_delay, Duration::ZERO);
        assert!(!config.is_production());
    }
}
