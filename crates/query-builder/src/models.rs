//! 查询树领域模型
//!
//! `RuleSet` 是宿主双向绑定的可变查询树，叶子规则和子规则组
//! 通过带标签的 `RuleNode` 枚举区分，杜绝"同时是组又是叶子"的非法状态。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 默认条件连接符
pub const CONDITION_AND: &str = "AND";
pub const CONDITION_OR: &str = "OR";

/// 节点标识
///
/// 瞬态身份标识，用于按身份移除节点和元数据旁路表的键。
/// 不参与序列化，反序列化时重新生成，因此值相同的两个节点
/// 依然可以独立移除。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey(Uuid);

impl NodeKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeKey {
    fn default() -> Self {
        Self::new()
    }
}

/// 查询树节点（规则组或叶子规则）
///
/// 线上形状与未打标签的 JSON 兼容：带 `rules` 的对象解析为规则组，
/// 否则解析为叶子规则。规则组分支在前，因此同时带有组字段和
/// 叶子字段的畸形节点按规则组处理，多余的叶子字段被忽略。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleNode {
    RuleSet(RuleSet),
    Rule(Rule),
}

impl RuleNode {
    /// 节点标识
    pub fn key(&self) -> NodeKey {
        match self {
            Self::RuleSet(rs) => rs.key,
            Self::Rule(rule) => rule.key,
        }
    }

    /// 是否为规则组
    pub fn is_ruleset(&self) -> bool {
        matches!(self, Self::RuleSet(_))
    }

    pub fn as_rule_set(&self) -> Option<&RuleSet> {
        match self {
            Self::RuleSet(rs) => Some(rs),
            Self::Rule(_) => None,
        }
    }

    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Self::Rule(rule) => Some(rule),
            Self::RuleSet(_) => None,
        }
    }

    pub fn as_rule_set_mut(&mut self) -> Option<&mut RuleSet> {
        match self {
            Self::RuleSet(rs) => Some(rs),
            Self::Rule(_) => None,
        }
    }

    pub fn as_rule_mut(&mut self) -> Option<&mut Rule> {
        match self {
            Self::Rule(rule) => Some(rule),
            Self::RuleSet(_) => None,
        }
    }
}

/// 规则组节点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    /// 条件连接符（"AND"/"OR"，词表由宿主定义）
    #[serde(default = "default_condition")]
    pub condition: String,
    /// 有序的子节点序列
    pub rules: Vec<RuleNode>,
    /// 瞬态的展开/折叠状态
    #[serde(default, skip_serializing_if = "is_false")]
    pub collapsed: bool,
    /// 是否嵌套在另一个规则组之下（影响默认的可移除性）
    #[serde(rename = "isChild", default, skip_serializing_if = "is_false")]
    pub is_child: bool,
    #[serde(skip)]
    pub key: NodeKey,
}

impl RuleSet {
    pub fn new(condition: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            rules: Vec::new(),
            collapsed: false,
            is_child: false,
            key: NodeKey::new(),
        }
    }

    pub fn and(rules: Vec<RuleNode>) -> Self {
        Self {
            rules,
            ..Self::new(CONDITION_AND)
        }
    }

    pub fn or(rules: Vec<RuleNode>) -> Self {
        Self {
            rules,
            ..Self::new(CONDITION_OR)
        }
    }

    /// 按标识在子树中查找规则组（含自身）
    pub fn find_ruleset(&self, key: NodeKey) -> Option<&RuleSet> {
        if self.key == key {
            return Some(self);
        }
        for child in &self.rules {
            if let RuleNode::RuleSet(rs) = child {
                if let Some(found) = rs.find_ruleset(key) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// 按标识在子树中查找规则组（含自身，可变引用）
    pub fn find_ruleset_mut(&mut self, key: NodeKey) -> Option<&mut RuleSet> {
        if self.key == key {
            return Some(self);
        }
        for child in self.rules.iter_mut() {
            if let RuleNode::RuleSet(rs) = child {
                if let Some(found) = rs.find_ruleset_mut(key) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// 按标识在子树中查找叶子规则
    pub fn find_rule(&self, key: NodeKey) -> Option<&Rule> {
        for child in &self.rules {
            match child {
                RuleNode::Rule(rule) if rule.key == key => return Some(rule),
                RuleNode::RuleSet(rs) => {
                    if let Some(found) = rs.find_rule(key) {
                        return Some(found);
                    }
                }
                RuleNode::Rule(_) => {}
            }
        }
        None
    }

    /// 按标识在子树中查找叶子规则（可变引用）
    pub fn find_rule_mut(&mut self, key: NodeKey) -> Option<&mut Rule> {
        for child in self.rules.iter_mut() {
            match child {
                RuleNode::Rule(rule) if rule.key == key => return Some(rule),
                RuleNode::RuleSet(rs) => {
                    if let Some(found) = rs.find_rule_mut(key) {
                        return Some(found);
                    }
                }
                RuleNode::Rule(_) => {}
            }
        }
        None
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(CONDITION_AND)
    }
}

/// 叶子规则节点：用一个操作符对一个字段的取值做测试
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value: Value,
    /// 字段按实体分组时所属的实体
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(skip)]
    pub key: NodeKey,
}

impl Rule {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
            entity: None,
            key: NodeKey::new(),
        }
    }
}

fn default_condition() -> String {
    CONDITION_AND.to_string()
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}
