//! 查询构建器核心实例
//!
//! 每个控件实例持有一份配置、一个策略对象和一张元数据旁路表。
//! 树由渲染面拥有，变更入口统一接收 `(&mut 根, 目标 NodeKey)`：
//! 变更完成后立即重算受影响子树的元数据，下一次面向渲染的读取
//! 看到的永远是一致状态。所有入口同步执行，`&mut` 借用保证
//! 两次变更不可能交错。

use crate::config::QueryBuilderConfig;
use crate::error::{QueryBuilderError, Result};
use crate::hooks::{DefaultHooks, QueryBuilderHooks};
use crate::meta::{LocalRuleMeta, MetaStore};
use crate::models::{NodeKey, RuleSet};
use crate::operators::{InputType, OperatorDef};
use crate::schema::FieldOption;
use crate::validation::TreeValidator;
use tracing::debug;

pub struct QueryBuilder {
    config: QueryBuilderConfig,
    hooks: Box<dyn QueryBuilderHooks>,
    meta: MetaStore,
    disabled: bool,
}

impl QueryBuilder {
    /// 以内置默认策略创建
    pub fn new(config: QueryBuilderConfig) -> Self {
        Self::with_hooks(config, Box::new(DefaultHooks))
    }

    /// 以宿主策略对象创建
    pub fn with_hooks(config: QueryBuilderConfig, hooks: Box<dyn QueryBuilderHooks>) -> Self {
        Self {
            config,
            hooks,
            meta: MetaStore::new(),
            disabled: false,
        }
    }

    pub fn config(&self) -> &QueryBuilderConfig {
        &self.config
    }

    /// 控件级禁用状态（上下文的 `get_disabled_state` 来源之一）
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// 节点的渲染期元数据
    pub fn meta(&self, key: NodeKey) -> Option<LocalRuleMeta> {
        self.meta.get(key)
    }

    /// 重算整棵树的元数据，返回树是否整体有效
    ///
    /// 变更入口内部都会调用；外部注入或替换整棵树后宿主也应调用一次。
    pub fn recompute_meta(&mut self, root: &RuleSet) -> bool {
        TreeValidator::new(&self.config).validate(root, &mut self.meta)
    }

    // ==================== 结构性变更 ====================

    /// 向目标规则组追加一条新规则
    pub fn add_rule(&mut self, root: &mut RuleSet, parent: NodeKey) -> Result<()> {
        let group = root
            .find_ruleset_mut(parent)
            .ok_or(QueryBuilderError::UnknownNode)?;
        self.hooks.add_rule(&self.config, group)?;
        self.recompute_meta(root);
        Ok(())
    }

    /// 向目标规则组追加一个空的子规则组
    pub fn add_rule_set(&mut self, root: &mut RuleSet, parent: NodeKey) -> Result<()> {
        let group = root
            .find_ruleset_mut(parent)
            .ok_or(QueryBuilderError::UnknownNode)?;
        self.hooks.add_rule_set(&self.config, group)?;
        self.recompute_meta(root);
        Ok(())
    }

    /// 从父组移除一条规则；目标已不在时静默无操作
    pub fn remove_rule(&mut self, root: &mut RuleSet, rule: NodeKey, parent: NodeKey) -> Result<()> {
        let group = root
            .find_ruleset_mut(parent)
            .ok_or(QueryBuilderError::UnknownNode)?;
        self.hooks.remove_rule(&self.config, rule, group);
        self.recompute_meta(root);
        Ok(())
    }

    /// 从父组移除一个子规则组；目标已不在时静默无操作
    pub fn remove_rule_set(
        &mut self,
        root: &mut RuleSet,
        ruleset: NodeKey,
        parent: NodeKey,
    ) -> Result<()> {
        let group = root
            .find_ruleset_mut(parent)
            .ok_or(QueryBuilderError::UnknownNode)?;
        self.hooks.remove_rule_set(&self.config, ruleset, group);
        self.recompute_meta(root);
        Ok(())
    }

    // ==================== 交互变更 ====================

    /// 切换规则组的条件连接符
    pub fn change_condition(
        &mut self,
        root: &mut RuleSet,
        group: NodeKey,
        condition: &str,
    ) -> Result<()> {
        let target = root
            .find_ruleset_mut(group)
            .ok_or(QueryBuilderError::UnknownNode)?;
        debug!("条件切换: '{}' -> '{}'", target.condition, condition);
        target.condition = condition.to_string();
        self.recompute_meta(root);
        Ok(())
    }

    /// 切换叶子规则的操作符并整形取值
    pub fn change_operator(
        &mut self,
        root: &mut RuleSet,
        rule: NodeKey,
        operator: &str,
    ) -> Result<()> {
        let leaf = root
            .find_rule_mut(rule)
            .ok_or(QueryBuilderError::UnknownNode)?;
        leaf.operator = operator.to_string();
        let value = leaf.value.clone();
        leaf.value = self
            .hooks
            .coerce_value_for_operator(&self.config, operator, value, leaf);
        self.recompute_meta(root);
        Ok(())
    }

    /// 切换叶子规则的字段：重算取值、回落到新字段的默认操作符
    pub fn change_field(
        &mut self,
        root: &mut RuleSet,
        rule: NodeKey,
        field_name: &str,
    ) -> Result<()> {
        let leaf = root
            .find_rule_mut(rule)
            .ok_or(QueryBuilderError::UnknownNode)?;
        let next = self
            .config
            .field(field_name)
            .ok_or_else(|| QueryBuilderError::UnknownField(field_name.to_string()))?;

        let value = match self.config.field(&leaf.field) {
            Some(current) => self.hooks.calculate_field_change_value(
                &self.config,
                current,
                next,
                leaf.value.clone(),
            ),
            // 当前字段已不在模式中：无从比较，直接取新字段默认值
            None => next.default_value.clone().unwrap_or_default(),
        };
        let operator = self.hooks.default_operator_for(&self.config, next)?;

        leaf.field = next.value_or_name().to_string();
        leaf.operator = operator;
        leaf.value = value;
        leaf.entity = next.entity.clone();

        self.recompute_meta(root);
        Ok(())
    }

    /// 切换叶子规则的实体：跳到该实体的默认字段
    pub fn change_entity(
        &mut self,
        root: &mut RuleSet,
        rule: NodeKey,
        entity_name: &str,
    ) -> Result<()> {
        let entity = self
            .config
            .entity(entity_name)
            .ok_or_else(|| QueryBuilderError::UnknownEntity(entity_name.to_string()))?;
        let field_name = self
            .config
            .default_field_for_entity(entity)
            .ok_or_else(|| QueryBuilderError::UnknownField(format!("<entity:{}>", entity_name)))?
            .value_or_name()
            .to_string();
        self.change_field(root, rule, &field_name)
    }

    /// 切换规则组的展开/折叠状态（纯瞬态，不触发校验）
    pub fn toggle_collapse(&mut self, root: &mut RuleSet, group: NodeKey) -> Result<()> {
        let target = root
            .find_ruleset_mut(group)
            .ok_or(QueryBuilderError::UnknownNode)?;
        target.collapsed = !target.collapsed;
        Ok(())
    }

    // ==================== 模式查询 ====================

    /// 某字段的有效操作符列表
    pub fn operators_for(&self, field_name: &str) -> Result<Vec<OperatorDef>> {
        let field = self
            .config
            .field(field_name)
            .ok_or_else(|| QueryBuilderError::UnknownField(field_name.to_string()))?;
        self.hooks.get_operators(&self.config, field_name, field)
    }

    /// 某字段与操作符组合的输入控件类型
    pub fn input_type_for(&self, field_name: &str, operator: &str) -> Result<InputType> {
        let field = self
            .config
            .field(field_name)
            .ok_or_else(|| QueryBuilderError::UnknownField(field_name.to_string()))?;
        Ok(self.hooks.get_input_type(&self.config, field, operator))
    }

    /// 某字段的候选项列表
    pub fn options_for(&self, field_name: &str) -> Result<Vec<FieldOption>> {
        let field = self
            .config
            .field(field_name)
            .ok_or_else(|| QueryBuilderError::UnknownField(field_name.to_string()))?;
        Ok(self.hooks.get_options(&self.config, field))
    }
}
