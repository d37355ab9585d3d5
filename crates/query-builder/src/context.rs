//! 渲染槽位上下文
//!
//! 渲染面每次渲染某个可定制槽位时，现场构造一个上下文对象传给
//! 定制实现：当前节点（`$implicit` 对应 `node`）、调用时求值的
//! 禁用状态查询、槽位专属的数据和回调。上下文不跨渲染保留。
//!
//! 每个槽位是独立的结构体：叶子槽位携带 `&Rule`，规则组槽位携带
//! `&RuleSet`，回调拿不到错误形状的节点。

use crate::models::{Rule, RuleSet};
use crate::operators::OperatorDef;
use crate::schema::{Entity, Field, FieldOption};

/// 调用时求值的禁用状态查询，不得缓存结果
pub type DisabledStateFn<'a> = Box<dyn Fn() -> bool + 'a>;

/// 条件连接符切换行
pub struct SwitchGroupContext<'a> {
    pub node: &'a RuleSet,
    pub get_disabled_state: DisabledStateFn<'a>,
    /// 用户选中新的条件连接符
    pub on_change: Box<dyn FnMut(&str) + 'a>,
}

impl<'a> SwitchGroupContext<'a> {
    pub fn new(
        node: &'a RuleSet,
        get_disabled_state: impl Fn() -> bool + 'a,
        on_change: impl FnMut(&str) + 'a,
    ) -> Self {
        Self {
            node,
            get_disabled_state: Box::new(get_disabled_state),
            on_change: Box::new(on_change),
        }
    }
}

/// 空规则组警示
pub struct EmptyWarningContext<'a> {
    pub node: &'a RuleSet,
    pub get_disabled_state: DisabledStateFn<'a>,
    pub message: &'a str,
}

impl<'a> EmptyWarningContext<'a> {
    pub fn new(
        node: &'a RuleSet,
        get_disabled_state: impl Fn() -> bool + 'a,
        message: &'a str,
    ) -> Self {
        Self {
            node,
            get_disabled_state: Box::new(get_disabled_state),
            message,
        }
    }
}

/// 折叠箭头图标
pub struct ArrowIconContext<'a> {
    pub node: &'a RuleSet,
    pub get_disabled_state: DisabledStateFn<'a>,
}

impl<'a> ArrowIconContext<'a> {
    pub fn new(node: &'a RuleSet, get_disabled_state: impl Fn() -> bool + 'a) -> Self {
        Self {
            node,
            get_disabled_state: Box::new(get_disabled_state),
        }
    }
}

/// 实体选择器
pub struct EntityContext<'a> {
    pub node: &'a Rule,
    pub get_disabled_state: DisabledStateFn<'a>,
    /// 可选实体，声明顺序
    pub entities: Vec<&'a Entity>,
    /// 用户选中新实体
    pub on_change: Box<dyn FnMut(&str, &Rule) + 'a>,
}

impl<'a> EntityContext<'a> {
    pub fn new(
        node: &'a Rule,
        get_disabled_state: impl Fn() -> bool + 'a,
        entities: Vec<&'a Entity>,
        on_change: impl FnMut(&str, &Rule) + 'a,
    ) -> Self {
        Self {
            node,
            get_disabled_state: Box::new(get_disabled_state),
            entities,
            on_change: Box::new(on_change),
        }
    }
}

/// 字段选择器
pub struct FieldContext<'a> {
    pub node: &'a Rule,
    pub get_disabled_state: DisabledStateFn<'a>,
    /// 当前可选字段，声明顺序
    pub fields: Vec<&'a Field>,
    /// 按实体名检索字段（字段按实体分组时）
    pub get_fields: Box<dyn Fn(&str) -> Vec<&'a Field> + 'a>,
    /// 用户选中新字段
    pub on_change: Box<dyn FnMut(&str, &Rule) + 'a>,
}

impl<'a> FieldContext<'a> {
    pub fn new(
        node: &'a Rule,
        get_disabled_state: impl Fn() -> bool + 'a,
        fields: Vec<&'a Field>,
        get_fields: impl Fn(&str) -> Vec<&'a Field> + 'a,
        on_change: impl FnMut(&str, &Rule) + 'a,
    ) -> Self {
        Self {
            node,
            get_disabled_state: Box::new(get_disabled_state),
            fields,
            get_fields: Box::new(get_fields),
            on_change: Box::new(on_change),
        }
    }
}

/// 操作符选择器
pub struct OperatorContext<'a> {
    pub node: &'a Rule,
    pub get_disabled_state: DisabledStateFn<'a>,
    /// 当前字段的有效操作符
    pub operators: Vec<OperatorDef>,
    /// 用户选中新操作符
    pub on_change: Box<dyn FnMut(&str) + 'a>,
}

impl<'a> OperatorContext<'a> {
    pub fn new(
        node: &'a Rule,
        get_disabled_state: impl Fn() -> bool + 'a,
        operators: Vec<OperatorDef>,
        on_change: impl FnMut(&str) + 'a,
    ) -> Self {
        Self {
            node,
            get_disabled_state: Box::new(get_disabled_state),
            operators,
            on_change: Box::new(on_change),
        }
    }
}

/// 取值输入控件
pub struct InputContext<'a> {
    pub node: &'a Rule,
    pub get_disabled_state: DisabledStateFn<'a>,
    /// 当前字段的模式描述
    pub field: &'a Field,
    /// 枚举字段的候选项
    pub options: Vec<FieldOption>,
    /// 用户修改了取值
    pub on_change: Box<dyn FnMut() + 'a>,
}

impl<'a> InputContext<'a> {
    pub fn new(
        node: &'a Rule,
        get_disabled_state: impl Fn() -> bool + 'a,
        field: &'a Field,
        options: Vec<FieldOption>,
        on_change: impl FnMut() + 'a,
    ) -> Self {
        Self {
            node,
            get_disabled_state: Box::new(get_disabled_state),
            field,
            options,
            on_change: Box::new(on_change),
        }
    }
}

/// 规则组的按钮组（加规则/加子组/移除本组）
pub struct ButtonGroupContext<'a> {
    pub node: &'a RuleSet,
    pub get_disabled_state: DisabledStateFn<'a>,
    pub add_rule: Box<dyn FnMut() + 'a>,
    pub add_rule_set: Box<dyn FnMut() + 'a>,
    pub remove_rule_set: Box<dyn FnMut() + 'a>,
}

impl<'a> ButtonGroupContext<'a> {
    pub fn new(
        node: &'a RuleSet,
        get_disabled_state: impl Fn() -> bool + 'a,
        add_rule: impl FnMut() + 'a,
        add_rule_set: impl FnMut() + 'a,
        remove_rule_set: impl FnMut() + 'a,
    ) -> Self {
        Self {
            node,
            get_disabled_state: Box::new(get_disabled_state),
            add_rule: Box::new(add_rule),
            add_rule_set: Box::new(add_rule_set),
            remove_rule_set: Box::new(remove_rule_set),
        }
    }
}

/// 单条规则的移除按钮
pub struct RemoveButtonContext<'a> {
    pub node: &'a Rule,
    pub get_disabled_state: DisabledStateFn<'a>,
    pub remove_rule: Box<dyn FnMut(&Rule) + 'a>,
}

impl<'a> RemoveButtonContext<'a> {
    pub fn new(
        node: &'a Rule,
        get_disabled_state: impl Fn() -> bool + 'a,
        remove_rule: impl FnMut(&Rule) + 'a,
    ) -> Self {
        Self {
            node,
            get_disabled_state: Box::new(get_disabled_state),
            remove_rule: Box::new(remove_rule),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RuleNode, RuleSet};
    use std::cell::Cell;

    #[test]
    fn test_disabled_state_evaluated_at_call_time() {
        let root = RuleSet::default();
        let disabled = Cell::new(false);
        let ctx = ArrowIconContext::new(&root, || disabled.get());

        assert!(!(ctx.get_disabled_state)());
        disabled.set(true);
        // 查询反映调用时刻的状态，而不是构造时刻
        assert!((ctx.get_disabled_state)());
    }

    #[test]
    fn test_switch_group_callback_receives_condition() {
        let root = RuleSet::default();
        let mut seen = String::new();
        {
            let mut ctx = SwitchGroupContext::new(&root, || false, |condition| {
                seen = condition.to_string();
            });
            (ctx.on_change)("OR");
        }
        assert_eq!(seen, "OR");
    }

    #[test]
    fn test_button_group_callbacks() {
        let root = RuleSet::default();
        let clicks = Cell::new(0u32);
        let mut ctx = ButtonGroupContext::new(
            &root,
            || false,
            || clicks.set(clicks.get() + 1),
            || clicks.set(clicks.get() + 1),
            || clicks.set(clicks.get() + 1),
        );
        (ctx.add_rule)();
        (ctx.add_rule_set)();
        (ctx.remove_rule_set)();
        assert_eq!(clicks.get(), 3);
    }

    #[test]
    fn test_remove_button_gets_exact_node() {
        let root = RuleSet::and(vec![RuleNode::Rule(crate::models::Rule::new(
            "age", "=", 1,
        ))]);
        let rule = root.rules[0].as_rule().unwrap();
        let expected = rule.key;
        let seen = Cell::new(None);
        let mut ctx = RemoveButtonContext::new(rule, || false, |r| seen.set(Some(r.key)));
        (ctx.remove_rule)(rule);
        // $implicit 与回调收到的是同一节点实例
        assert_eq!(seen.get(), Some(expected));
    }
}
