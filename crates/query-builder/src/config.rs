//! 查询构建器配置
//!
//! 组合根：绑定字段/实体模式、结构策略开关和提示文案。
//! 每个控件实例持有一份配置，树层只读，覆盖钩子单独注入（见 `hooks`）。

use crate::schema::{Entity, Field};
use serde::{Deserialize, Serialize};

/// 空规则组的默认提示文案
const DEFAULT_EMPTY_MESSAGE: &str =
    "A ruleset cannot be empty. Please add a rule or remove it all together.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryBuilderConfig {
    /// 声明顺序即展示顺序：默认字段选择、操作符列表都按此顺序决定
    pub fields: Vec<Field>,
    /// 字段按实体分组时的实体列表
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<Entity>>,
    /// 零子节点的规则组是否合法；为 false 时空组会被校验标记为无效
    #[serde(default = "default_allow_empty")]
    pub allow_empty_rulesets: bool,
    /// 空规则组的提示文案
    #[serde(default = "default_empty_message")]
    pub empty_message: String,
}

impl QueryBuilderConfig {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            entities: None,
            allow_empty_rulesets: true,
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
        }
    }

    pub fn with_entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = Some(entities);
        self
    }

    pub fn allow_empty_rulesets(mut self, allow: bool) -> Self {
        self.allow_empty_rulesets = allow;
        self
    }

    pub fn with_empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    /// 按数据标识或展示名查找字段
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.value_or_name() == name || f.name == name)
    }

    /// 按数据标识或展示名查找实体
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities
            .as_deref()?
            .iter()
            .find(|e| e.value_or_name() == name || e.name == name)
    }

    /// 某实体下的字段（实体为 `None` 时返回全部字段）
    pub fn fields_for_entity(&self, entity: Option<&str>) -> Vec<&Field> {
        match entity {
            Some(name) => self
                .fields
                .iter()
                .filter(|f| f.entity.as_deref() == Some(name))
                .collect(),
            None => self.fields.iter().collect(),
        }
    }

    /// 选中某实体时的默认字段：显式 `default_field`，否则该实体下的首个字段
    pub fn default_field_for_entity(&self, entity: &Entity) -> Option<&Field> {
        if let Some(name) = entity.default_field.as_deref() {
            if let Some(field) = self.field(name) {
                return Some(field);
            }
        }
        self.fields
            .iter()
            .find(|f| f.entity.as_deref() == Some(entity.value_or_name()))
    }

    /// 声明顺序的首个字段（默认 `add_rule` 的选择）
    pub fn first_field(&self) -> Option<&Field> {
        self.fields.first()
    }
}

fn default_allow_empty() -> bool {
    true
}

fn default_empty_message() -> String {
    DEFAULT_EMPTY_MESSAGE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn sample_config() -> QueryBuilderConfig {
        QueryBuilderConfig::new(vec![
            Field::new("age", FieldType::Number).with_entity("user"),
            Field::new("name", FieldType::String).with_entity("user"),
            Field::new("amount", FieldType::Number).with_entity("order"),
        ])
        .with_entities(vec![
            Entity::new("user"),
            Entity::new("order").with_default_field("amount"),
        ])
    }

    #[test]
    fn test_field_lookup() {
        let config = sample_config();
        assert!(config.field("age").is_some());
        assert!(config.field("missing").is_none());
    }

    #[test]
    fn test_fields_for_entity() {
        let config = sample_config();
        let user_fields = config.fields_for_entity(Some("user"));
        assert_eq!(user_fields.len(), 2);
        assert_eq!(config.fields_for_entity(None).len(), 3);
    }

    #[test]
    fn test_default_field_for_entity() {
        let config = sample_config();
        let order = config.entity("order").unwrap().clone();
        assert_eq!(
            config.default_field_for_entity(&order).unwrap().name,
            "amount"
        );
        // 未显式指定时取该实体下声明顺序的首个字段
        let user = config.entity("user").unwrap().clone();
        assert_eq!(config.default_field_for_entity(&user).unwrap().name, "age");
    }

    #[test]
    fn test_defaults() {
        let config = QueryBuilderConfig::new(vec![]);
        assert!(config.allow_empty_rulesets);
        assert!(config.empty_message.contains("cannot be empty"));
    }
}
