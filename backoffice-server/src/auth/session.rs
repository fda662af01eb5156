//! 会话认证
//!
//! 状态机: `Anonymous -> (正确凭证) -> Authenticated -> (登出 | 过期) -> Anonymous`
//!
//! - 令牌: 32 字节随机数 (hex)，只以 Cookie 形式交给浏览器
//! - 存储: 仅保存令牌的 SHA-256 摘要
//! - 过期: 不活跃超时，每次读取顺延
//! - 登录失败: 未知邮箱与密码错误返回同一错误，并固定延迟

use std::sync::OnceLock;

use rand::RngCore;
use sha2::{Digest, Sha256};
use shared::models::Admin;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::password::{hash_password, verify_password};
use crate::core::config::SessionConfig;
use crate::db::repository::{EntityRepository, SessionRepository, admin};
use crate::security_log;
use crate::utils::{AppError, AppResult};

const TOKEN_BYTES: usize = 32;

/// Hash compared against when the email is unknown, so both failure paths cost the same
fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("dummy-password-for-timing").ok())
        .as_deref()
}

fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[derive(Clone)]
pub struct SessionAuthenticator {
    sessions: SessionRepository,
    admins: EntityRepository<Admin>,
    config: SessionConfig,
}

impl std::fmt::Debug for SessionAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuthenticator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionAuthenticator {
    pub fn new(db: Surreal<Db>, config: SessionConfig) -> Self {
        Self {
            sessions: SessionRepository::new(db.clone()),
            admins: EntityRepository::new(db),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn expiry_from_now(&self) -> i64 {
        shared::util::now_millis() + self.config.ttl.as_millis() as i64
    }

    /// Verify credentials and open a session, returning the new token
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, Admin)> {
        let admin = admin::find_by_email(self.admins.db(), email.trim()).await?;

        let verified = match &admin {
            Some(admin) => verify_password(password, &admin.password),
            None => {
                if let Some(hash) = dummy_hash() {
                    let _ = verify_password(password, hash);
                }
                false
            }
        };

        let admin = match admin {
            Some(admin) if verified => admin,
            _ => {
                security_log!("WARN", "login_failed", email = email);
                tokio::time::sleep(self.config.failed_login_delay).await;
                return Err(AppError::invalid_credentials());
            }
        };

        let token = new_token();
        self.sessions
            .create(&digest(&token), &admin.id, self.expiry_from_now())
            .await?;

        security_log!("INFO", "login_success", admin_id = admin.id.as_str());
        Ok((token, admin))
    }

    /// Admin behind a live session; slides the expiry forward
    ///
    /// A session whose admin no longer exists is destroyed and reported as absent.
    pub async fn current(&self, token: Option<&str>) -> AppResult<Option<Admin>> {
        let Some(token) = token else {
            return Ok(None);
        };
        let key = digest(token);
        let Some(session) = self
            .sessions
            .find_live(&key, shared::util::now_millis())
            .await?
        else {
            return Ok(None);
        };

        let Some(admin) = self.admins.find_by_id(&session.admin_id).await? else {
            self.sessions.delete(&key).await?;
            return Ok(None);
        };

        self.sessions.touch(&key, self.expiry_from_now()).await?;
        Ok(Some(admin))
    }

    /// Destroy the session behind `token`, if any
    pub async fn logout(&self, token: Option<&str>) -> AppResult<()> {
        if let Some(token) = token {
            self.sessions.delete(&digest(token)).await?;
            security_log!("INFO", "logout");
        }
        Ok(())
    }

    /// Drop every session of a deleted admin
    pub async fn destroy_for_admin(&self, admin_id: &str) -> AppResult<i64> {
        let removed = self.sessions.delete_for_admin(admin_id).await?;
        if removed > 0 {
            tracing::info!(admin_id = %admin_id, removed, "Sessions of deleted admin destroyed");
        }
        Ok(removed)
    }

    /// Delete expired sessions
    pub async fn sweep(&self) -> AppResult<i64> {
        let removed = self
            .sessions
            .purge_expired(shared::util::now_millis())
            .await?;
        if removed > 0 {
            tracing::debug!(removed, "Expired sessions swept");
        }
        Ok(removed)
    }

    /// Periodic sweeper; runs until the returned handle is aborted
    pub fn spawn_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let auth = self.clone();
        let period = self.config.sweep_interval.max(std::time::Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if let Err(e) = auth.sweep().await {
                    tracing::warn!(error = %e, "Session sweep failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = new_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(token, new_token());
    }

    #[test]
    fn test_digest_is_stable_and_hides_token() {
        let token = new_token();
        assert_eq!(digest(&token), digest(&token));
        assert_ne!(digest(&token), token);
        assert_eq!(digest(&token).len(), 64);
    }
}
