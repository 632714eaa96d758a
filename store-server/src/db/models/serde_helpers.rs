//! Serde helpers for SurrealDB RecordId fields
//!
//! 支持从字符串格式 "table:id" 反序列化为 RecordId，
//! 同时兼容 SurrealDB 原生格式和 JSON 字符串格式。
//! 序列化统一输出 "table:id" 字符串，保证 API 响应可读。

use serde::{Deserialize, Deserializer, Serializer, de};
use std::fmt;
use surrealdb::RecordId;

/// 自定义 Visitor，支持 RecordId 原生格式和字符串格式
struct RecordIdVisitor;

impl<'de> de::Visitor<'de> for RecordIdVisitor {
    type Value = RecordId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a record id or a string like 'table:id'")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        v.parse::<RecordId>()
            .map_err(|_| E::custom(format!("invalid record id: {}", v)))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        self.visit_str(&v)
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        // 委托给 RecordId 的默认反序列化
        RecordId::deserialize(de::value::MapAccessDeserializer::new(map))
    }

    fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        RecordId::deserialize(deserializer)
    }
}

/// Option<RecordId> 字段的序列化/反序列化
pub mod option_record_id {
    use super::*;

    struct OptionRecordIdVisitor;

    impl<'de> de::Visitor<'de> for OptionRecordIdVisitor {
        type Value = Option<RecordId>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a record id, a string like 'table:id', or none")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(RecordIdVisitor).map(Some)
        }
    }

    pub fn serialize<S>(value: &Option<RecordId>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(id) => serializer.serialize_str(&id.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_option(OptionRecordIdVisitor)
    }
}

/// Vec<RecordId> 字段的序列化/反序列化
pub mod record_id_vec {
    use super::*;
    use serde::ser::SerializeSeq;

    struct RecordIdVecVisitor;

    impl<'de> de::Visitor<'de> for RecordIdVecVisitor {
        type Value = Vec<RecordId>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a sequence of record ids")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(item) = seq.next_element_seed(RecordIdSeed)? {
                out.push(item);
            }
            Ok(out)
        }
    }

    struct RecordIdSeed;

    impl<'de> de::DeserializeSeed<'de> for RecordIdSeed {
        type Value = RecordId;

        fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(RecordIdVisitor)
        }
    }

    pub fn serialize<S>(value: &[RecordId], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(value.len()))?;
        for id in value {
            seq.serialize_element(&id.to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<RecordId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(RecordIdVecVisitor)
    }
}
