// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 提供商适配器模块
///
/// 每个外部CRM提供商实现一个同步适配器，统一走
/// CrmProvider特质；注册表按提供商标识路由请求。
pub mod espocrm;
pub mod orocrm;
pub mod suitecrm;
pub mod traits;
pub mod zoho;

use crate::domain::models::integration::IntegrationProvider;
use crate::providers::espocrm::EspoCrmProvider;
use crate::providers::orocrm::OroCrmProvider;
use crate::providers::suitecrm::SuiteCrmProvider;
use crate::providers::traits::{CrmProvider, SyncContext};
use crate::providers::zoho::ZohoProvider;
use std::collections::HashMap;
use std::sync::Arc;

/// 提供商注册表
///
/// 持有全部已接入的同步适配器，按提供商标识查找。
pub struct ProviderRegistry {
    providers: HashMap<IntegrationProvider, Arc<dyn CrmProvider>>,
}

impl ProviderRegistry {
    /// 创建包含全部内置适配器的注册表
    ///
    /// # 参数
    ///
    /// * `ctx` - 适配器共享上下文
    pub fn new(ctx: SyncContext) -> Self {
        let mut providers: HashMap<IntegrationProvider, Arc<dyn CrmProvider>> = HashMap::new();
        providers.insert(
            IntegrationProvider::Zoho,
            Arc::new(ZohoProvider::new(ctx.clone())),
        );
        providers.insert(
            IntegrationProvider::SuiteCrm,
            Arc::new(SuiteCrmProvider::new(ctx.clone())),
        );
        providers.insert(
            IntegrationProvider::EspoCrm,
            Arc::new(EspoCrmProvider::new(ctx.clone())),
        );
        providers.insert(
            IntegrationProvider::OroCrm,
            Arc::new(OroCrmProvider::new(ctx)),
        );
        Self { providers }
    }

    /// 按提供商标识查找适配器
    ///
    /// # 返回值
    ///
    /// 未接入同步适配器的提供商（如whatsapp）返回None
    pub fn get(&self, provider: IntegrationProvider) -> Option<Arc<dyn CrmProvider>> {
        self.providers.get(&provider).cloned()
    }
}
