//! Business listing and category models.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::field::FieldInfo;
use crate::model::{Entity, EntityRef, Related, decode_column};
use crate::types::{SqlType, Timestamp};
use crate::value::Value;

/// A listing category. Categories form a tree through `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

impl Entity for Category {
    const TABLE_NAME: &'static str = "categories";

    fn fields() -> &'static [FieldInfo] {
        static FIELDS: &[FieldInfo] = &[
            FieldInfo::new("id", "id", SqlType::BigInt).primary_key(true),
            FieldInfo::new("name", "name", SqlType::Text),
            FieldInfo::new("parent_id", "parent_id", SqlType::BigInt)
                .nullable(true)
                .foreign_key("categories.id"),
        ];
        FIELDS
    }

    fn from_columns(columns: &[Value]) -> Result<Self> {
        Ok(Self {
            id: decode_column::<Self, _>(columns, 0)?,
            name: decode_column::<Self, _>(columns, 1)?,
            parent_id: decode_column::<Self, _>(columns, 2)?,
        })
    }

    fn primary_key(&self) -> i64 {
        self.id
    }
}

/// A business listing with its eagerly loaded category.
///
/// `category` is `None` both when the listing has not been resolved yet and
/// when the referenced category row was absent from the joined result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessListing {
    pub id: i64,
    pub category_id: i64,
    pub title: String,
    pub create_date: Timestamp,
    pub update_date: Timestamp,
    #[serde(default)]
    pub category: Option<EntityRef<Category>>,
}

impl BusinessListing {
    /// Column values in `fields()` order, without the loaded category.
    pub fn to_columns(&self) -> Vec<Value> {
        vec![
            Value::BigInt(self.id),
            Value::BigInt(self.category_id),
            Value::Text(self.title.clone()),
            self.create_date.into(),
            self.update_date.into(),
        ]
    }
}

impl Category {
    /// Column values in `fields()` order.
    pub fn to_columns(&self) -> Vec<Value> {
        vec![
            Value::BigInt(self.id),
            Value::Text(self.name.clone()),
            self.parent_id.into(),
        ]
    }
}

impl Entity for BusinessListing {
    const TABLE_NAME: &'static str = "listings";

    fn fields() -> &'static [FieldInfo] {
        static FIELDS: &[FieldInfo] = &[
            FieldInfo::new("id", "id", SqlType::BigInt).primary_key(true),
            FieldInfo::new("category_id", "category_id", SqlType::BigInt)
                .foreign_key("categories.id"),
            FieldInfo::new("title", "title", SqlType::Text),
            FieldInfo::new("create_date", "create_date", SqlType::Timestamp),
            FieldInfo::new("update_date", "update_date", SqlType::Timestamp),
        ];
        FIELDS
    }

    fn from_columns(columns: &[Value]) -> Result<Self> {
        Ok(Self {
            id: decode_column::<Self, _>(columns, 0)?,
            category_id: decode_column::<Self, _>(columns, 1)?,
            title: decode_column::<Self, _>(columns, 2)?,
            create_date: decode_column::<Self, _>(columns, 3)?,
            update_date: decode_column::<Self, _>(columns, 4)?,
            category: None,
        })
    }

    fn primary_key(&self) -> i64 {
        self.id
    }
}

impl Related for BusinessListing {
    type Target = Category;

    const RELATION: &'static str = "category";

    fn foreign_key(&self) -> Option<i64> {
        Some(self.category_id)
    }

    fn attach(&mut self, target: Option<EntityRef<Category>>) {
        self.category = target;
    }

    fn related(&self) -> Option<&EntityRef<Category>> {
        self.category.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn listing() -> BusinessListing {
        BusinessListing {
            id: 1,
            category_id: 10,
            title: "Corner Bakery".to_string(),
            create_date: Timestamp::from_secs(100),
            update_date: Timestamp::from_secs(200),
            category: None,
        }
    }

    #[test]
    fn listing_columns_roundtrip() {
        let original = listing();
        let decoded = BusinessListing::from_columns(&original.to_columns()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn category_parent_is_nullable() {
        let root = Category::from_columns(&[
            Value::BigInt(1),
            Value::Text("Food".into()),
            Value::Null,
        ])
        .unwrap();
        assert_eq!(root.parent_id, None);
        assert!(Category::fields()[2].nullable);
    }

    #[test]
    fn attach_sets_related_reference() {
        let mut l = listing();
        assert!(l.related().is_none());
        let cat = Arc::new(Category {
            id: 10,
            name: "Bakeries".into(),
            parent_id: None,
        });
        l.attach(Some(Arc::clone(&cat)));
        assert!(Arc::ptr_eq(l.related().unwrap(), &cat));
        assert_eq!(l.foreign_key(), Some(10));
    }

    #[test]
    fn listing_serializes_with_nested_category() {
        let mut l = listing();
        l.attach(Some(Arc::new(Category {
            id: 10,
            name: "Bakeries".into(),
            parent_id: Some(1),
        })));
        let json = serde_json::to_value(&l).unwrap();
        assert_eq!(json["category"]["name"], "Bakeries");
        assert_eq!(json["update_date"], 200_000_000);
    }
}
