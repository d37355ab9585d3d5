//! 字段与实体模式
//!
//! 宿主提供的静态描述：有哪些字段、每个字段适用哪些操作符和输入控件、
//! 字段按哪些实体分组。模式本身不随用户交互变化。

use crate::models::{Rule, RuleSet};
use crate::operators::OperatorDef;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// 字段类型
///
/// 驱动默认输入控件和默认操作符列表。已知类型之外的值
/// 原样保留为 `Custom`，词表对宿主开放。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    Number,
    Date,
    Time,
    Category,
    Boolean,
    Multiselect,
    Custom(String),
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "string" => Self::String,
            "number" => Self::Number,
            "date" => Self::Date,
            "time" => Self::Time,
            "category" => Self::Category,
            "boolean" => Self::Boolean,
            "multiselect" => Self::Multiselect,
            _ => Self::Custom(s),
        }
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Date => "date",
            Self::Time => "time",
            Self::Category => "category",
            Self::Boolean => "boolean",
            Self::Multiselect => "multiselect",
            Self::Custom(s) => s.as_str(),
        };
        write!(f, "{}", s)
    }
}

/// 枚举字段或操作符下拉的选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub name: String,
    pub value: Value,
}

impl FieldOption {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 叶子规则校验器
///
/// 纯函数：给定规则及其父规则组，返回该规则是否无效
/// （`true` 填入 `LocalRuleMeta::invalid`）。不得修改任一参数、
/// 不得在执行期间触发结构性变更。
pub type RuleValidator = Arc<dyn Fn(&Rule, &RuleSet) -> bool + Send + Sync>;

/// 可查询字段的模式描述
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// 展示给用户的标识
    pub name: String,
    /// 写入数据的标识，缺省时取 `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// 可空字段额外获得空值检查操作符
    #[serde(default, skip_serializing_if = "crate::models::is_false")]
    pub nullable: bool,
    /// 枚举类型的候选项
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    /// 显式覆盖的操作符列表；缺省时按 `field_type` 推导
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operators: Option<Vec<OperatorDef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_operator: Option<String>,
    /// 所属实体（字段按实体分组时）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// 宿主提供的校验器，不参与序列化
    #[serde(skip)]
    pub validator: Option<RuleValidator>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            value: None,
            field_type,
            nullable: false,
            options: Vec::new(),
            operators: None,
            default_value: None,
            default_operator: None,
            entity: None,
            validator: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_operators(mut self, operators: Vec<OperatorDef>) -> Self {
        self.operators = Some(operators);
        self
    }

    pub fn with_default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_default_operator(mut self, operator: impl Into<String>) -> Self {
        self.default_operator = Some(operator.into());
        self
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_validator(mut self, validator: RuleValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// 写入数据的标识（`value` 缺省时回退到 `name`）
    pub fn value_or_name(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("field_type", &self.field_type)
            .field("nullable", &self.nullable)
            .field("options", &self.options)
            .field("operators", &self.operators)
            .field("default_value", &self.default_value)
            .field("default_operator", &self.default_operator)
            .field("entity", &self.entity)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// 字段分组实体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// 选中该实体时默认选中的字段
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_field: Option<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            default_field: None,
        }
    }

    pub fn with_default_field(mut self, field: impl Into<String>) -> Self {
        self.default_field = Some(field.into());
        self
    }

    pub fn value_or_name(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.name)
    }
}
