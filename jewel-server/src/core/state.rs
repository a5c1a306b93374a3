use std::sync::Arc;

use crate::auth::{CsrfService, JwtService, hash_password};
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::db::repository::admin_user;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求克隆一次的成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | jwt_service | Arc<JwtService> | JWT 会话服务 |
/// | csrf | Arc<CsrfService> | CSRF 令牌服务 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 数据库服务
    pub db: DbService,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// CSRF 令牌服务
    pub csrf: Arc<CsrfService>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 代替
    pub fn new(config: Config, db: DbService) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let csrf = Arc::new(CsrfService::new(&config.csrf));
        Self {
            config,
            db,
            jwt_service,
            csrf,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 创建工作目录
    /// 2. 打开数据库并执行迁移
    /// 3. 写入初始管理员 (如已配置)
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let db_path = config.database_path();
        let db_path = db_path
            .to_str()
            .ok_or_else(|| ServerError::Config(format!("Invalid database path: {:?}", db_path)))?;
        let db = DbService::new(db_path).await?;

        let state = Self::new(config.clone(), db);
        state.seed_admin().await?;
        Ok(state)
    }

    /// 用户表为空时写入 `ADMIN_USERNAME` / `ADMIN_PASSWORD` 指定的管理员
    pub async fn seed_admin(&self) -> Result<()> {
        let (Some(username), Some(password)) =
            (&self.config.admin_username, &self.config.admin_password)
        else {
            return Ok(());
        };

        let existing = admin_user::count(&self.db.pool)
            .await
            .map_err(|e| ServerError::Database(e.to_string()))?;
        if existing > 0 {
            return Ok(());
        }

        let hash = hash_password(password)?;
        admin_user::create(&self.db.pool, username, &hash, "admin")
            .await
            .map_err(|e| ServerError::Database(e.to_string()))?;
        tracing::info!(username = %username, "Seeded initial admin account");
        Ok(())
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 是否生产环境 (决定 Cookie 的 Secure/SameSite)
    pub fn is_production(&self) -> bool {
        self.config.is_production()
    }
}
