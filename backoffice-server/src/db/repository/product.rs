//! Product descriptor and category population

use std::collections::HashMap;

use shared::error::{AppResult, ErrorCode};
use shared::models::{AssetRef, Category, Product, ProductCreate, ProductResponse, ProductUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::category::COUNT_FIELD;
use super::entity::{Document, Entity, Reference, to_document};
use super::{EntityRepository, RepoResult};
use crate::utils::validation::{Field, MAX_PRODUCT_NAME_LEN, Rule, Schema};

pub const TABLE: &str = "product";

impl Entity for Product {
    type Create = ProductCreate;
    type Update = ProductUpdate;

    const TABLE: &'static str = TABLE;
    const LABEL: &'static str = "Product";
    const SCHEMA: &'static Schema = &Schema {
        fields: &[
            Field::new("name", Rule::Text { min: 3, max: MAX_PRODUCT_NAME_LEN }),
            Field::new("price", Rule::Number { min: Some(0.0) }),
            Field::new("category", Rule::ObjectId),
        ],
        strict_update: false,
    };
    const REFERENCES: &'static [Reference] = &[Reference {
        field: "category",
        table: super::category::TABLE,
        invalid: ErrorCode::CategoryInvalid,
        counter: Some(COUNT_FIELD),
    }];
    const NOT_FOUND: ErrorCode = ErrorCode::ProductNotFound;
    const TIMESTAMPS: bool = true;
    const HAS_IMAGE: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn image(&self) -> Option<&AssetRef> {
        self.image.as_ref()
    }

    fn create_document(input: ProductCreate) -> AppResult<Document> {
        to_document(&input)
    }

    fn update_document(input: ProductUpdate) -> AppResult<Document> {
        to_document(&input)
    }
}

/// Populate each product's category; a dangling category renders as `None`
pub async fn with_categories(
    db: &Surreal<Db>,
    products: Vec<Product>,
) -> RepoResult<Vec<ProductResponse>> {
    let mut ids: Vec<String> = products.iter().map(|p| p.category.clone()).collect();
    ids.sort();
    ids.dedup();

    let categories: HashMap<String, Category> = EntityRepository::<Category>::new(db.clone())
        .find_many(&ids)
        .await?
        .into_iter()
        .map(|category| (category.id.clone(), category))
        .collect();

    Ok(products
        .into_iter()
        .map(|product| {
            let category = categories.get(&product.category).cloned();
            ProductResponse::new(product, category)
        })
        .collect())
}
