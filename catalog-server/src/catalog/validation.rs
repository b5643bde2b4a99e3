//! Input validation for product writes
//!
//! Presence checks only: required text must be present and non-blank,
//! required numbers must be present. Everything runs before a transaction is
//! opened, so a rejected write never touches storage.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{Product, ProductCreate, ProductUpdate};

/// A create payload that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidProduct {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub thumbnail: Option<String>,
    pub code: String,
    pub category: String,
    pub stock: Decimal,
}

impl ValidProduct {
    /// Materialize the record; status is always `true` on creation
    pub fn into_product(self, id: i64) -> Product {
        Product {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
            thumbnail: self.thumbnail,
            code: self.code,
            category: self.category,
            stock: self.stock,
            status: true,
        }
    }
}

/// Validate that a required string is present and non-blank.
pub fn validate_required_text(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(AppError::validation(format!("{field} must not be empty"))
            .with_detail("field", field)),
        None => Err(AppError::required_field(field)),
    }
}

/// Validate that a supplied replacement string is non-blank.
pub fn validate_optional_text(value: &Option<String>, field: &str) -> Result<(), AppError> {
    if let Some(v) = value
        && v.trim().is_empty()
    {
        return Err(
            AppError::validation(format!("{field} must not be empty")).with_detail("field", field)
        );
    }
    Ok(())
}

fn require<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::required_field(field))
}

/// Validate a create payload
pub fn validate_create(payload: ProductCreate) -> Result<ValidProduct, AppError> {
    Ok(ValidProduct {
        title: validate_required_text(payload.title, "title")?,
        description: validate_required_text(payload.description, "description")?,
        code: validate_required_text(payload.code, "code")?,
        price: require(payload.price, "price")?,
        stock: require(payload.stock, "stock")?,
        category: validate_required_text(payload.category, "category")?,
        thumbnail: payload.thumbnail,
    })
}

/// Validate an update payload against the id it targets
pub fn validate_update(id: i64, payload: &ProductUpdate) -> Result<(), AppError> {
    if let Some(body_id) = payload.id
        && body_id != id
    {
        return Err(AppError::with_message(
            ErrorCode::ProductIdImmutable,
            format!("Product id cannot be changed (target {id}, body {body_id})"),
        )
        .with_detail("id", id));
    }

    validate_optional_text(&payload.title, "title")?;
    validate_optional_text(&payload.description, "description")?;
    validate_optional_text(&payload.code, "code")?;
    validate_optional_text(&payload.category, "category")?;
    Ok(())
}

/// Merge supplied fields into an existing record; `id` is never touched.
pub fn apply_update(product: &mut Product, payload: ProductUpdate) {
    if let Some(title) = payload.title {
        product.title = title;
    }
    if let Some(description) = payload.description {
        product.description = description;
    }
    if let Some(price) = payload.price {
        product.price = price;
    }
    if let Some(thumbnail) = payload.thumbnail {
        product.thumbnail = Some(thumbnail);
    }
    if let Some(code) = payload.code {
        product.code = code;
    }
    if let Some(category) = payload.category {
        product.category = category;
    }
    if let Some(stock) = payload.stock {
        product.stock = stock;
    }
    if let Some(status) = payload.status {
        product.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_create() -> ProductCreate {
        ProductCreate {
            title: Some("A".to_string()),
            description: Some("d".to_string()),
            price: Some(Decimal::new(10, 0)),
            thumbnail: None,
            code: Some("c1".to_string()),
            category: Some("x".to_string()),
            stock: Some(Decimal::new(5, 0)),
        }
    }

    #[test]
    fn test_valid_create() {
        let valid = validate_create(full_create()).unwrap();
        let product = valid.into_product(4);
        assert_eq!(product.id, 4);
        assert!(product.status);
        assert_eq!(product.code, "c1");
    }

    #[test]
    fn test_each_required_field_is_checked() {
        let cases: [(&str, fn(&mut ProductCreate)); 6] = [
            ("title", |c| c.title = None),
            ("description", |c| c.description = None),
            ("code", |c| c.code = None),
            ("price", |c| c.price = None),
            ("stock", |c| c.stock = None),
            ("category", |c| c.category = None),
        ];

        for (field, strip) in cases {
            let mut payload = full_create();
            strip(&mut payload);
            let err = validate_create(payload).unwrap_err();
            assert_eq!(err.code, ErrorCode::RequiredField, "field {field}");
            assert_eq!(err.details.unwrap().get("field").unwrap(), field);
        }
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let mut payload = full_create();
        payload.title = Some("   ".to_string());
        let err = validate_create(payload).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_zero_numbers_are_present() {
        let mut payload = full_create();
        payload.price = Some(Decimal::ZERO);
        payload.stock = Some(Decimal::ZERO);
        assert!(validate_create(payload).is_ok());
    }

    #[test]
    fn test_update_id_must_match() {
        let same = ProductUpdate {
            id: Some(2),
            ..Default::default()
        };
        assert!(validate_update(2, &same).is_ok());

        let other = ProductUpdate {
            id: Some(3),
            ..Default::default()
        };
        let err = validate_update(2, &other).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductIdImmutable);
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_update_rejects_blank_replacement() {
        let payload = ProductUpdate {
            code: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_update(1, &payload).is_err());
    }

    #[test]
    fn test_apply_update_is_partial() {
        let mut product = validate_create(full_create()).unwrap().into_product(2);
        apply_update(
            &mut product,
            ProductUpdate {
                price: Some(Decimal::new(20, 0)),
                ..Default::default()
            },
        );
        assert_eq!(product.price, Decimal::new(20, 0));
        assert_eq!(product.title, "A");
        assert_eq!(product.code, "c1");
        assert_eq!(product.id, 2);
    }
}
