//! 定制钩子
//!
//! 宿主覆盖点收敛为一个策略对象：trait 的默认方法实现即内置策略，
//! 宿主只需覆写想改变的行为，其余自动回落到默认实现，
//! 核心代码里不再散落"有没有覆盖"的分支判断。

use crate::coerce::ValueCoercer;
use crate::config::QueryBuilderConfig;
use crate::error::{QueryBuilderError, Result};
use crate::models::{NodeKey, Rule, RuleNode, RuleSet};
use crate::operators::{
    default_input_type, default_operators, InputType, OperatorDef, OP_IS_NOT_NULL, OP_IS_NULL,
};
use crate::schema::{Field, FieldOption};
use serde_json::Value;
use tracing::{debug, warn};

/// 查询构建器策略对象
///
/// 所有方法都有默认实现；渲染面永远通过它调用，不区分默认与覆盖。
/// 约束（见并发模型）：任何覆盖实现不得在执行期间再触发结构性变更 ——
/// `&mut` 借用纪律让重入在编译期就不可表达。
pub trait QueryBuilderHooks {
    /// 字段的有效操作符列表
    ///
    /// 默认推导：显式 `field.operators`，否则按字段类型查内置映射；
    /// 可空字段追加空值检查操作符。推导不出任何操作符属于配置错误，
    /// 渲染面应拒绝渲染下拉而不是瞎猜。
    fn get_operators(
        &self,
        _config: &QueryBuilderConfig,
        field_name: &str,
        field: &Field,
    ) -> Result<Vec<OperatorDef>> {
        let mut ops: Vec<OperatorDef> = match &field.operators {
            Some(list) if !list.is_empty() => list.clone(),
            _ => default_operators(&field.field_type)
                .map(|list| list.iter().map(|op| OperatorDef::from(*op)).collect())
                .unwrap_or_default(),
        };

        if field.nullable {
            ops.push(OperatorDef::from(OP_IS_NULL));
            ops.push(OperatorDef::from(OP_IS_NOT_NULL));
        }

        if ops.is_empty() {
            warn!("字段 '{}' 推导不出任何操作符", field_name);
            return Err(QueryBuilderError::EmptyOperatorList {
                field: field_name.to_string(),
            });
        }
        Ok(ops)
    }

    /// 字段与操作符组合对应的输入控件（纯函数、确定性）
    fn get_input_type(
        &self,
        _config: &QueryBuilderConfig,
        field: &Field,
        operator: &str,
    ) -> InputType {
        default_input_type(&field.field_type, operator)
    }

    /// 字段的候选项列表（空列表合法，渲染为无选项）
    fn get_options(&self, _config: &QueryBuilderConfig, field: &Field) -> Vec<FieldOption> {
        field.options.clone()
    }

    /// 向规则组追加一条新叶子规则（纯追加，不影响既有兄弟顺序）
    ///
    /// 默认选择声明顺序的首个字段，操作符取字段的
    /// `default_operator`（否则取有效操作符列表的首项），取值取字段默认值。
    fn add_rule(&self, config: &QueryBuilderConfig, parent: &mut RuleSet) -> Result<()> {
        let field = config
            .first_field()
            .ok_or(QueryBuilderError::NoFieldsConfigured)?;
        let operator = self.default_operator_for(config, field)?;
        let value = field.default_value.clone().unwrap_or(Value::Null);

        let mut rule = Rule::new(field.value_or_name(), operator, value);
        rule.entity = field.entity.clone();

        debug!("追加规则: 字段 '{}'", rule.field);
        parent.rules.push(RuleNode::Rule(rule));
        Ok(())
    }

    /// 向规则组追加一个空的子规则组
    ///
    /// 新组继承父组的条件连接符并标记 `is_child`。
    fn add_rule_set(&self, _config: &QueryBuilderConfig, parent: &mut RuleSet) -> Result<()> {
        let mut child = RuleSet::new(parent.condition.clone());
        child.is_child = true;

        debug!("追加子规则组");
        parent.rules.push(RuleNode::RuleSet(child));
        Ok(())
    }

    /// 按身份移除叶子规则；目标不在 `parent.rules` 中时静默无操作
    fn remove_rule(&self, config: &QueryBuilderConfig, key: NodeKey, parent: &mut RuleSet) {
        remove_child_by_key(config, key, parent);
    }

    /// 按身份移除子规则组；语义与 `remove_rule` 一致
    ///
    /// 移除后父组变空且 `allow_empty_rulesets` 为 false 时不自动补规则，
    /// 空组留在树中，由下一次校验走查标记为无效的中间状态。
    fn remove_rule_set(&self, config: &QueryBuilderConfig, key: NodeKey, parent: &mut RuleSet) {
        remove_child_by_key(config, key, parent);
    }

    /// 操作符切换后的取值整形（必须幂等）
    fn coerce_value_for_operator(
        &self,
        config: &QueryBuilderConfig,
        operator: &str,
        value: Value,
        rule: &Rule,
    ) -> Value {
        let default_value = config
            .field(&rule.field)
            .and_then(|f| f.default_value.as_ref());
        ValueCoercer::coerce_for_operator(operator, value, default_value)
    }

    /// 字段切换后的取值策略
    fn calculate_field_change_value(
        &self,
        _config: &QueryBuilderConfig,
        current_field: &Field,
        next_field: &Field,
        current_value: Value,
    ) -> Value {
        ValueCoercer::coerce_for_field_change(current_field, next_field, current_value)
    }

    /// 字段的默认操作符：显式 `default_operator`，否则有效操作符列表首项
    fn default_operator_for(&self, config: &QueryBuilderConfig, field: &Field) -> Result<String> {
        if let Some(op) = &field.default_operator {
            return Ok(op.clone());
        }
        let operators = self.get_operators(config, &field.name, field)?;
        operators
            .first()
            .map(|op| op.value().to_string())
            .ok_or_else(|| QueryBuilderError::EmptyOperatorList {
                field: field.name.clone(),
            })
    }
}

/// 按身份的移除逻辑，供默认钩子和宿主覆盖实现共用
pub fn remove_child_by_key(config: &QueryBuilderConfig, key: NodeKey, parent: &mut RuleSet) {
    let before = parent.rules.len();
    parent.rules.retain(|node| node.key() != key);

    if parent.rules.len() == before {
        debug!("移除目标不在父组中，忽略");
    } else if parent.rules.is_empty() && !config.allow_empty_rulesets {
        debug!("父组已空且不允许空组，留待校验标记为无效");
    }
}

/// 全部采用内置默认策略的钩子实现
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl QueryBuilderHooks for DefaultHooks {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{OP_BETWEEN, OP_EQ, OP_GTE};
    use crate::schema::FieldType;
    use serde_json::json;

    fn number_field() -> Field {
        Field::new("age", FieldType::Number)
            .with_default_operator("=")
            .with_default_value(0)
    }

    #[test]
    fn test_get_operators_from_type() {
        let config = QueryBuilderConfig::new(vec![number_field()]);
        let field = config.field("age").unwrap();
        let ops = DefaultHooks.get_operators(&config, "age", field).unwrap();
        assert_eq!(ops.first().unwrap().value(), OP_EQ);
        assert!(ops.iter().any(|op| op.value() == OP_BETWEEN));
    }

    #[test]
    fn test_get_operators_explicit_override_wins() {
        let field = Field::new("age", FieldType::Number)
            .with_operators(vec![OperatorDef::from(OP_GTE)]);
        let config = QueryBuilderConfig::new(vec![field]);
        let field = config.field("age").unwrap();
        let ops = DefaultHooks.get_operators(&config, "age", field).unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].value(), OP_GTE);
    }

    #[test]
    fn test_nullable_appends_null_checks() {
        let field = Field::new("email", FieldType::String).nullable();
        let config = QueryBuilderConfig::new(vec![field]);
        let field = config.field("email").unwrap();
        let ops = DefaultHooks.get_operators(&config, "email", field).unwrap();
        let values: Vec<&str> = ops.iter().map(|op| op.value()).collect();
        assert!(values.contains(&OP_IS_NULL));
        assert!(values.contains(&OP_IS_NOT_NULL));
    }

    #[test]
    fn test_custom_type_without_operators_is_config_error() {
        let field = Field::new("color", FieldType::Custom("color".into()));
        let config = QueryBuilderConfig::new(vec![field]);
        let field = config.field("color").unwrap();
        let err = DefaultHooks.get_operators(&config, "color", field).unwrap_err();
        assert!(matches!(err, QueryBuilderError::EmptyOperatorList { .. }));
    }

    #[test]
    fn test_add_rule_uses_first_field_defaults() {
        let config = QueryBuilderConfig::new(vec![number_field()]);
        let mut root = RuleSet::default();

        DefaultHooks.add_rule(&config, &mut root).unwrap();

        assert_eq!(root.rules.len(), 1);
        let rule = root.rules[0].as_rule().unwrap();
        assert_eq!(rule.field, "age");
        assert_eq!(rule.operator, "=");
        assert_eq!(rule.value, json!(0));
    }

    #[test]
    fn test_add_rule_is_pure_append() {
        let config = QueryBuilderConfig::new(vec![number_field()]);
        let mut root = RuleSet::default();
        DefaultHooks.add_rule(&config, &mut root).unwrap();
        DefaultHooks.add_rule(&config, &mut root).unwrap();
        let first_key = root.rules[0].key();

        DefaultHooks.add_rule(&config, &mut root).unwrap();

        assert_eq!(root.rules.len(), 3);
        assert_eq!(root.rules[0].key(), first_key);
    }

    #[test]
    fn test_add_rule_without_fields_fails() {
        let config = QueryBuilderConfig::new(vec![]);
        let mut root = RuleSet::default();
        let err = DefaultHooks.add_rule(&config, &mut root).unwrap_err();
        assert!(matches!(err, QueryBuilderError::NoFieldsConfigured));
    }

    #[test]
    fn test_add_rule_set_inherits_condition() {
        let config = QueryBuilderConfig::new(vec![]);
        let mut root = RuleSet::or(vec![]);

        DefaultHooks.add_rule_set(&config, &mut root).unwrap();

        let child = root.rules[0].as_rule_set().unwrap();
        assert_eq!(child.condition, "OR");
        assert!(child.is_child);
        assert!(child.rules.is_empty());
    }

    #[test]
    fn test_remove_rule_by_identity() {
        let config = QueryBuilderConfig::new(vec![]);
        // 两条取值完全相同的规则必须可以独立移除
        let mut root = RuleSet::and(vec![
            RuleNode::Rule(Rule::new("age", "=", 1)),
            RuleNode::Rule(Rule::new("age", "=", 1)),
        ]);
        let first = root.rules[0].key();
        let second = root.rules[1].key();

        DefaultHooks.remove_rule(&config, first, &mut root);

        assert_eq!(root.rules.len(), 1);
        assert_eq!(root.rules[0].key(), second);
    }

    #[test]
    fn test_remove_absent_rule_is_noop() {
        let config = QueryBuilderConfig::new(vec![]);
        let mut root = RuleSet::and(vec![RuleNode::Rule(Rule::new("age", "=", 1))]);
        let keys_before: Vec<NodeKey> = root.rules.iter().map(|n| n.key()).collect();

        DefaultHooks.remove_rule(&config, NodeKey::new(), &mut root);

        let keys_after: Vec<NodeKey> = root.rules.iter().map(|n| n.key()).collect();
        assert_eq!(keys_before, keys_after);
    }

    #[test]
    fn test_remove_rule_set_leaves_empty_group_in_tree() {
        let config = QueryBuilderConfig::new(vec![]).allow_empty_rulesets(false);
        let mut root = RuleSet::and(vec![RuleNode::RuleSet(RuleSet::or(vec![]))]);
        let group = root.rules[0].key();

        DefaultHooks.remove_rule_set(&config, group, &mut root);

        // 空组留在树中（此处 root 自身变空），策略上交给校验标记
        assert!(root.rules.is_empty());
    }

    #[test]
    fn test_hook_override_replaces_default() {
        struct FixedOperator;
        impl QueryBuilderHooks for FixedOperator {
            fn get_operators(
                &self,
                _config: &QueryBuilderConfig,
                _field_name: &str,
                _field: &Field,
            ) -> Result<Vec<OperatorDef>> {
                Ok(vec![OperatorDef::from("matches")])
            }
        }

        let config = QueryBuilderConfig::new(vec![Field::new("age", FieldType::Number)]);
        let field = config.field("age").unwrap();
        let ops = FixedOperator.get_operators(&config, "age", field).unwrap();
        assert_eq!(ops[0].value(), "matches");

        // 未覆盖的方法仍走默认实现
        let op = FixedOperator.default_operator_for(&config, field).unwrap();
        assert_eq!(op, "matches");
    }
}
