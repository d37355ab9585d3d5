//! 校验走查
//!
//! 自底向上重算整棵树的 `LocalRuleMeta`：叶子执行宿主校验器，
//! 规则组聚合全部后代的无效标记并叠加自身的结构合法性
//! （`allow_empty_rulesets` 为 false 时空组无效）。

use crate::config::QueryBuilderConfig;
use crate::meta::{LocalRuleMeta, MetaStore};
use crate::models::{Rule, RuleNode, RuleSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

/// 树校验器
pub struct TreeValidator<'a> {
    config: &'a QueryBuilderConfig,
}

impl<'a> TreeValidator<'a> {
    pub fn new(config: &'a QueryBuilderConfig) -> Self {
        Self { config }
    }

    /// 整表重建元数据，返回树是否整体有效
    pub fn validate(&self, root: &RuleSet, meta: &mut MetaStore) -> bool {
        meta.clear();
        !self.visit_ruleset(root, meta)
    }

    /// 返回该规则组是否无效
    fn visit_ruleset(&self, ruleset: &RuleSet, meta: &mut MetaStore) -> bool {
        let mut invalid = ruleset.rules.is_empty() && !self.config.allow_empty_rulesets;

        for child in &ruleset.rules {
            match child {
                RuleNode::RuleSet(rs) => {
                    invalid |= self.visit_ruleset(rs, meta);
                }
                RuleNode::Rule(rule) => {
                    invalid |= self.visit_rule(rule, ruleset, meta);
                }
            }
        }

        meta.set(
            ruleset.key,
            LocalRuleMeta {
                ruleset: true,
                invalid,
            },
        );
        invalid
    }

    /// 返回该叶子规则是否无效
    fn visit_rule(&self, rule: &Rule, parent: &RuleSet, meta: &mut MetaStore) -> bool {
        let invalid = match self.config.field(&rule.field) {
            None => {
                warn!("规则引用了未定义的字段 '{}'", rule.field);
                true
            }
            Some(field) => match &field.validator {
                None => false,
                Some(validator) => {
                    let validator = Arc::clone(validator);
                    // 校验器 panic 属于宿主编程错误：该节点记为无效，兄弟节点继续评估
                    match panic::catch_unwind(AssertUnwindSafe(|| validator(rule, parent))) {
                        Ok(result) => result,
                        Err(_) => {
                            warn!("字段 '{}' 的校验器发生 panic", rule.field);
                            true
                        }
                    }
                }
            },
        };

        meta.set(
            rule.key,
            LocalRuleMeta {
                ruleset: false,
                invalid,
            },
        );
        invalid
    }
}
