// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含系统的核心业务逻辑服务，这些服务封装了复杂的
/// 业务规则和领域逻辑，协调多个领域对象来完成业务操作。
///
/// 包含的服务：
/// - 账单服务（billing_service）：处理Stripe事件到本地账单表的映射
/// - 集成服务（integration_service）：处理集成注册表与静默日志写入
/// - Webhook分发服务（webhook_dispatcher）：定义事件广播的核心契约
///
/// 领域服务与应用程序服务的区别在于：领域服务包含纯粹的业务逻辑，
/// 而应用程序服务负责协调和编排，可能包含技术实现细节。
pub mod billing_service;
pub mod integration_service;
pub mod webhook_dispatcher;
