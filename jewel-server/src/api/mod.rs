//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口 (CSRF 令牌、登录、登出、当前用户)
//! - [`products`] - 商品管理接口
//! - [`categories`] - 分类管理接口
//! - [`newsletter`] - 邮件订阅接口

pub mod auth;
pub mod categories;
pub mod health;
pub mod newsletter;
pub mod products;
