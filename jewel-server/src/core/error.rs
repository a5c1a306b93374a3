use thiserror::Error;

/// 服务器启动与运行错误
///
/// 请求处理使用 [`crate::AppError`]；这里只覆盖进程级别的失败。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("数据库初始化失败: {0}")]
    Database(String),

    #[error("初始化失败: {0}")]
    App(#[from] shared::AppError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 启动流程的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
