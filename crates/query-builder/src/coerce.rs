//! 取值整形
//!
//! 用户交互切换操作符或字段后，叶子规则的 `value` 需要保持语义有效：
//! 区间操作符要求 `[min, max]` 二元数组，列表操作符要求数组，
//! 字段类型变更时不兼容的取值回退到新字段的默认值。

use crate::operators::{operator_arity, ValueArity};
use crate::schema::Field;
use serde_json::Value;

/// 取值整形器
pub struct ValueCoercer;

impl ValueCoercer {
    /// 按操作符元数整形取值（幂等：重复应用结果不变）
    ///
    /// 二元区间的填充策略：标量 `v` 复制为 `[v, v]`；
    /// 缺失的首元素取字段默认值，再退到 `Null`。
    pub fn coerce_for_operator(operator: &str, value: Value, default_value: Option<&Value>) -> Value {
        match operator_arity(operator) {
            ValueArity::None => Value::Null,
            ValueArity::One => match value {
                Value::Array(arr) => arr
                    .into_iter()
                    .next()
                    .or_else(|| default_value.cloned())
                    .unwrap_or(Value::Null),
                v => v,
            },
            ValueArity::Pair => Self::into_pair(value, default_value),
            ValueArity::Many => match value {
                Value::Array(arr) => Value::Array(arr),
                Value::Null => Value::Array(Vec::new()),
                v => Value::Array(vec![v]),
            },
        }
    }

    /// 字段切换后的取值策略：类型一致则保留当前值，否则回退到新字段默认值
    pub fn coerce_for_field_change(current: &Field, next: &Field, value: Value) -> Value {
        if current.field_type == next.field_type {
            value
        } else {
            next.default_value.clone().unwrap_or(Value::Null)
        }
    }

    fn into_pair(value: Value, default_value: Option<&Value>) -> Value {
        let fill = || default_value.cloned().unwrap_or(Value::Null);
        match value {
            Value::Array(arr) => {
                let mut it = arr.into_iter();
                let first = it.next().unwrap_or_else(fill);
                let second = it.next().unwrap_or_else(|| first.clone());
                Value::Array(vec![first, second])
            }
            Value::Null => {
                let first = fill();
                let second = first.clone();
                Value::Array(vec![first, second])
            }
            v => {
                let clone = v.clone();
                Value::Array(vec![v, clone])
            }
        }
    }
}
