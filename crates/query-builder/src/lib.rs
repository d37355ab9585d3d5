//! 查询构建器核心
//!
//! 可视化构建嵌套布尔查询树的数据模型与契约层，支持：
//! - 递归查询树（规则组 + 叶子规则）的序列化与就地变更
//! - 宿主模式（字段/实体/操作符/输入控件）约束每个节点的合法取值
//! - 策略对象形式的定制钩子（操作符推导、取值整形、增删语义）
//! - 渲染期元数据旁路表与逐节点校验
//!
//! 渲染面本身不在此 crate 内：它消费这里的数据模型、调用钩子，
//! 并按 `context` 模块的槽位契约注入定制实现。

pub mod builder;
pub mod coerce;
pub mod config;
pub mod context;
pub mod error;
pub mod hooks;
pub mod meta;
pub mod models;
pub mod operators;
pub mod schema;
pub mod validation;

pub use builder::QueryBuilder;
pub use coerce::ValueCoercer;
pub use config::QueryBuilderConfig;
pub use context::{
    ArrowIconContext, ButtonGroupContext, EmptyWarningContext, EntityContext, FieldContext,
    InputContext, OperatorContext, RemoveButtonContext, SwitchGroupContext,
};
pub use error::{QueryBuilderError, Result};
pub use hooks::{DefaultHooks, QueryBuilderHooks};
pub use meta::{LocalRuleMeta, MetaStore};
pub use models::{NodeKey, Rule, RuleNode, RuleSet, CONDITION_AND, CONDITION_OR};
pub use operators::{
    default_input_type, default_operators, operator_arity, InputType, OperatorDef, OperatorOption,
    ValueArity,
};
pub use schema::{Entity, Field, FieldOption, FieldType, RuleValidator};
pub use validation::TreeValidator;
