//! 操作符词表与默认推导
//!
//! 树中的操作符是宿主词表里的普通字符串，这里只提供内置词表常量、
//! 按字段类型推导默认操作符列表的映射，以及驱动取值整形的元数。

use crate::schema::FieldType;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const OP_EQ: &str = "=";
pub const OP_NEQ: &str = "!=";
pub const OP_GT: &str = ">";
pub const OP_GTE: &str = ">=";
pub const OP_LT: &str = "<";
pub const OP_LTE: &str = "<=";
pub const OP_CONTAINS: &str = "contains";
pub const OP_LIKE: &str = "like";
pub const OP_IN: &str = "in";
pub const OP_NOT_IN: &str = "not in";
pub const OP_BETWEEN: &str = "between";
pub const OP_IS_NULL: &str = "is null";
pub const OP_IS_NOT_NULL: &str = "is not null";

/// 结构化的操作符描述（区别于裸操作符名）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorOption {
    /// 展示给用户的名称
    pub name: String,
    /// 写入规则的标识
    pub value: String,
}

impl OperatorOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 操作符定义：裸名称或结构化描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperatorDef {
    Name(String),
    Structured(OperatorOption),
}

impl OperatorDef {
    /// 写入规则的标识
    pub fn value(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Structured(opt) => &opt.value,
        }
    }

    /// 展示给用户的名称
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Structured(opt) => &opt.name,
        }
    }
}

impl From<&str> for OperatorDef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for OperatorDef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// 操作符期望的取值元数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueArity {
    /// 不需要取值（空值检查）
    None,
    /// 单值
    One,
    /// 二元区间 `[min, max]`
    Pair,
    /// 任意长度的列表
    Many,
}

/// 内置操作符的取值元数；宿主自定义操作符默认单值
pub fn operator_arity(operator: &str) -> ValueArity {
    match operator {
        OP_IS_NULL | OP_IS_NOT_NULL => ValueArity::None,
        OP_BETWEEN => ValueArity::Pair,
        OP_IN | OP_NOT_IN => ValueArity::Many,
        _ => ValueArity::One,
    }
}

/// 按字段类型推导默认操作符列表
///
/// 自定义类型没有可推导的默认值，返回 `None`，
/// 由配置显式给出 `Field::operators` 或钩子覆盖。
pub fn default_operators(field_type: &FieldType) -> Option<&'static [&'static str]> {
    Some(match field_type {
        FieldType::String => &[OP_EQ, OP_NEQ, OP_CONTAINS, OP_LIKE],
        FieldType::Number | FieldType::Date | FieldType::Time => {
            &[OP_EQ, OP_NEQ, OP_GT, OP_GTE, OP_LT, OP_LTE, OP_BETWEEN]
        }
        FieldType::Category => &[OP_EQ, OP_NEQ, OP_IN, OP_NOT_IN],
        FieldType::Boolean => &[OP_EQ],
        FieldType::Multiselect => &[OP_IN, OP_NOT_IN],
        FieldType::Custom(_) => return None,
    })
}

/// 输入控件类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InputType {
    Text,
    Textarea,
    Number,
    Date,
    Time,
    Select,
    Multiselect,
    Checkbox,
    NumberRange,
    DateRange,
    TimeRange,
    Custom(String),
}

impl From<String> for InputType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "text" => Self::Text,
            "textarea" => Self::Textarea,
            "number" => Self::Number,
            "date" => Self::Date,
            "time" => Self::Time,
            "select" => Self::Select,
            "multiselect" => Self::Multiselect,
            "checkbox" => Self::Checkbox,
            "number_range" => Self::NumberRange,
            "date_range" => Self::DateRange,
            "time_range" => Self::TimeRange,
            _ => Self::Custom(s),
        }
    }
}

impl From<InputType> for String {
    fn from(t: InputType) -> Self {
        t.to_string()
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Date => "date",
            Self::Time => "time",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Checkbox => "checkbox",
            Self::NumberRange => "number_range",
            Self::DateRange => "date_range",
            Self::TimeRange => "time_range",
            Self::Custom(s) => s.as_str(),
        };
        write!(f, "{}", s)
    }
}

/// 按字段类型和操作符推导默认输入控件
///
/// 纯函数：同一 (类型, 操作符) 组合永远得到同一控件。
/// 区间操作符强制双输入控件，`in`/`not in` 的枚举字段强制多选。
pub fn default_input_type(field_type: &FieldType, operator: &str) -> InputType {
    match field_type {
        FieldType::String => InputType::Text,
        FieldType::Number => {
            if operator == OP_BETWEEN {
                InputType::NumberRange
            } else {
                InputType::Number
            }
        }
        FieldType::Date => {
            if operator == OP_BETWEEN {
                InputType::DateRange
            } else {
                InputType::Date
            }
        }
        FieldType::Time => {
            if operator == OP_BETWEEN {
                InputType::TimeRange
            } else {
                InputType::Time
            }
        }
        FieldType::Category => {
            if operator == OP_IN || operator == OP_NOT_IN {
                InputType::Multiselect
            } else {
                InputType::Select
            }
        }
        FieldType::Boolean => InputType::Checkbox,
        FieldType::Multiselect => InputType::Multiselect,
        FieldType::Custom(name) => InputType::Custom(name.clone()),
    }
}
