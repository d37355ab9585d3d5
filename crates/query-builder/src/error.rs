//! 查询构建器错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryBuilderError {
    #[error("字段 '{0}' 未在配置中定义")]
    UnknownField(String),

    #[error("实体 '{0}' 未在配置中定义")]
    UnknownEntity(String),

    #[error("节点不在当前树中")]
    UnknownNode,

    #[error("字段 '{field}' 没有可用的操作符")]
    EmptyOperatorList { field: String },

    #[error("配置中没有任何字段")]
    NoFieldsConfigured,

    #[error("JSON 序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QueryBuilderError>;
