//! Gateway 应用状态

use std::sync::Arc;

use crate::config::ZhipuSettings;
use crate::relay::Upstream;

/// Gateway 应用状态
///
/// 启动时构造一次，所有请求共享只读引用
#[derive(Clone)]
pub struct AppState {
    upstream: Arc<dyn Upstream>,
    settings: Arc<ZhipuSettings>,
}

impl AppState {
    pub fn new(upstream: Arc<dyn Upstream>, settings: ZhipuSettings) -> Self {
        Self {
            upstream,
            settings: Arc::new(settings),
        }
    }

    pub fn upstream(&self) -> &dyn Upstream {
        self.upstream.as_ref()
    }

    pub fn settings(&self) -> &ZhipuSettings {
        &self.settings
    }
}
