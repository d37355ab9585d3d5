//! 渲染期节点元数据
//!
//! 瞬态的逐节点注解放在树外的旁路表里，按 `NodeKey` 检索，
//! 每次校验走查整棵重建，绝不进入持久化形状。

use crate::models::NodeKey;
use std::collections::HashMap;

/// 单个节点的渲染期元数据
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalRuleMeta {
    /// 该节点是否为规则组
    pub ruleset: bool,
    /// 最近一次校验走查得出的无效标记
    pub invalid: bool,
}

/// 元数据旁路表
///
/// 由校验走查整表重建：被移除节点的条目随之消失，
/// 不需要单独的失效清理。
#[derive(Debug, Clone, Default)]
pub struct MetaStore {
    entries: HashMap<NodeKey, LocalRuleMeta>,
}

impl MetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: NodeKey) -> Option<LocalRuleMeta> {
        self.entries.get(&key).copied()
    }

    pub(crate) fn set(&mut self, key: NodeKey, meta: LocalRuleMeta) {
        self.entries.insert(key, meta);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
