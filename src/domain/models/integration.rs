// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 集成提供商枚举
///
/// 定义了系统支持的外部CRM/消息提供商，每个提供商
/// 在integrations表中至多对应一行配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationProvider {
    /// Zoho CRM
    Zoho,
    /// SuiteCRM
    SuiteCrm,
    /// EspoCRM
    EspoCrm,
    /// OroCRM
    OroCrm,
    /// WhatsApp消息通道
    WhatsApp,
}

impl fmt::Display for IntegrationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrationProvider::Zoho => write!(f, "zoho"),
            IntegrationProvider::SuiteCrm => write!(f, "suitecrm"),
            IntegrationProvider::EspoCrm => write!(f, "espocrm"),
            IntegrationProvider::OroCrm => write!(f, "orocrm"),
            IntegrationProvider::WhatsApp => write!(f, "whatsapp"),
        }
    }
}

impl FromStr for IntegrationProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zoho" => Ok(IntegrationProvider::Zoho),
            "suitecrm" => Ok(IntegrationProvider::SuiteCrm),
            "espocrm" => Ok(IntegrationProvider::EspoCrm),
            "orocrm" => Ok(IntegrationProvider::OroCrm),
            "whatsapp" => Ok(IntegrationProvider::WhatsApp),
            other => Err(format!("Unknown provider: {}", other)),
        }
    }
}

/// 集成配置
///
/// 类型化的配置记录，替代自由形式的JSON映射。已命名的字段
/// 在边界处得到校验；未识别的键通过extra保留，避免
/// 读-改-写时丢失管理端写入的兄弟键。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrationConfig {
    /// 提供商REST API基础URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// 共享的最近同步时间（SuiteCRM使用）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Zoho最近同步时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoho_last_sync_at: Option<DateTime<Utc>>,
    /// EspoCRM最近同步时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub espocrm_last_sync_at: Option<DateTime<Utc>>,
    /// OroCRM最近同步时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orocrm_last_sync_at: Option<DateTime<Utc>>,
    /// 未识别的配置键，原样保留
    #[serde(flatten)]
    pub extra: serde_json::Map<String, JsonValue>,
}

impl IntegrationConfig {
    /// 读取指定提供商的最近同步时间
    ///
    /// # 参数
    ///
    /// * `provider` - 集成提供商
    ///
    /// # 返回值
    ///
    /// 该提供商的最近同步时间，从未同步过则为None
    pub fn last_sync(&self, provider: IntegrationProvider) -> Option<DateTime<Utc>> {
        match provider {
            IntegrationProvider::Zoho => self.zoho_last_sync_at,
            IntegrationProvider::SuiteCrm => self.last_sync_at,
            IntegrationProvider::EspoCrm => self.espocrm_last_sync_at,
            IntegrationProvider::OroCrm => self.orocrm_last_sync_at,
            IntegrationProvider::WhatsApp => None,
        }
    }

    /// 盖章指定提供商的最近同步时间
    ///
    /// 仅修改对应提供商的字段，其余字段保持不变；
    /// 调用方负责先读取现有配置再写回（读-改-写约定）。
    pub fn stamp_sync(&mut self, provider: IntegrationProvider, at: DateTime<Utc>) {
        match provider {
            IntegrationProvider::Zoho => self.zoho_last_sync_at = Some(at),
            IntegrationProvider::SuiteCrm => self.last_sync_at = Some(at),
            IntegrationProvider::EspoCrm => self.espocrm_last_sync_at = Some(at),
            IntegrationProvider::OroCrm => self.orocrm_last_sync_at = Some(at),
            IntegrationProvider::WhatsApp => {}
        }
    }
}

/// 集成实体
///
/// 表示一个已配置的外部提供商连接，持有配置与启用状态。
/// 每个provider值在正常运行中至多存在一行，不做硬删除。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integration {
    /// 集成唯一标识符
    pub id: Uuid,
    /// 展示名称
    pub name: String,
    /// 提供商标识（唯一键）
    pub provider: IntegrationProvider,
    /// 描述信息
    pub description: Option<String>,
    /// 是否启用
    pub is_active: bool,
    /// 类型化配置
    pub config: IntegrationConfig,
    /// 订阅的内部事件名列表
    pub triggers: Vec<String>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl Integration {
    /// 创建一个新的集成配置
    ///
    /// # 参数
    ///
    /// * `provider` - 提供商标识
    /// * `name` - 展示名称
    ///
    /// # 返回值
    ///
    /// 返回一个新的集成实例，默认启用、空配置
    pub fn new(provider: IntegrationProvider, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            provider,
            description: None,
            is_active: true,
            config: IntegrationConfig::default(),
            triggers: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// 执行日志状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    /// 执行成功
    Success,
    /// 执行失败
    Failed,
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogStatus::Success => write!(f, "success"),
            LogStatus::Failed => write!(f, "failed"),
        }
    }
}

/// 集成执行日志实体
///
/// 追加式审计记录，按集成归属。同步批次、入站回调和
/// 失败原因都以日志行的形式落库，不做保留期轮转。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationLog {
    /// 日志唯一标识符
    pub id: Uuid,
    /// 所属集成ID
    pub integration_id: Uuid,
    /// 事件名（点分字符串，如zoho.sync）
    pub event: String,
    /// 执行状态
    pub status: LogStatus,
    /// 事件负载
    pub payload: JsonValue,
    /// 响应数据
    pub response: JsonValue,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl IntegrationLog {
    /// 创建一条新的执行日志
    pub fn new(
        integration_id: Uuid,
        event: String,
        status: LogStatus,
        payload: JsonValue,
        response: JsonValue,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            integration_id,
            event,
            status,
            payload,
            response,
            created_at: Utc::now(),
        }
    }
}
