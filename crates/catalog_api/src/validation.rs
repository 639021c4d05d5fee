use std::num::IntErrorKind;

use shared::{
    domain::ProductFields,
    protocol::{FieldErrors, FormField, ProductForm},
};

/// Checks a submitted form and converts it into storable fields.
///
/// Every failing field gets exactly one message. Title and description are
/// trimmed; price must be a non-negative whole number.
pub fn validate_product_form(form: &ProductForm) -> Result<ProductFields, FieldErrors> {
    let mut errors = FieldErrors::default();

    let title = form.title.trim();
    if title.is_empty() {
        errors.insert(FormField::Title, required(FormField::Title));
    }

    let price = match parse_price(&form.price) {
        Ok(price) => Some(price),
        Err(message) => {
            errors.insert(FormField::Price, message);
            None
        }
    };

    let description = form.description.trim();
    if description.is_empty() {
        errors.insert(FormField::Description, required(FormField::Description));
    }

    match price {
        Some(price) if errors.is_empty() => Ok(ProductFields::new(title, price, description)),
        _ => Err(errors),
    }
}

fn parse_price(raw: &str) -> Result<i64, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(required(FormField::Price));
    }
    let price = raw.parse::<i64>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow => "price is too large".to_string(),
        IntErrorKind::NegOverflow => "price must not be negative".to_string(),
        _ => "price must be a whole number".to_string(),
    })?;
    if price < 0 {
        return Err("price must not be negative".to_string());
    }
    Ok(price)
}

fn required(field: FormField) -> String {
    format!("{} is required", field.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_complete_form() {
        let fields = validate_product_form(&ProductForm::new("Lamp", "150", "Brass"))
            .expect("valid form");
        assert_eq!(fields, ProductFields::new("Lamp", 150, "Brass"));
    }

    #[test]
    fn each_empty_field_yields_exactly_one_error() {
        for (form, field) in [
            (ProductForm::new("", "150", "Brass"), FormField::Title),
            (ProductForm::new("Lamp", "", "Brass"), FormField::Price),
            (ProductForm::new("Lamp", "150", ""), FormField::Description),
        ] {
            let errors = validate_product_form(&form).expect_err("invalid form");
            assert_eq!(errors.len(), 1, "{field:?}");
            assert_eq!(
                errors.get(field),
                Some(format!("{} is required", field.name()).as_str())
            );
        }
    }

    #[test]
    fn blank_form_reports_all_three_fields() {
        let errors = validate_product_form(&ProductForm::default()).expect_err("invalid form");
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn whitespace_counts_as_missing() {
        let errors =
            validate_product_form(&ProductForm::new("   ", "150", "\t")).expect_err("invalid");
        assert!(errors.get(FormField::Title).is_some());
        assert!(errors.get(FormField::Description).is_some());
        assert!(errors.get(FormField::Price).is_none());
    }

    #[test]
    fn rejects_non_numeric_price() {
        let errors =
            validate_product_form(&ProductForm::new("Lamp", "12.5", "Brass")).expect_err("invalid");
        assert_eq!(
            errors.get(FormField::Price),
            Some("price must be a whole number")
        );

        let errors =
            validate_product_form(&ProductForm::new("Lamp", "abc", "Brass")).expect_err("invalid");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn rejects_negative_price() {
        let errors =
            validate_product_form(&ProductForm::new("Lamp", "-1", "Brass")).expect_err("invalid");
        assert_eq!(
            errors.get(FormField::Price),
            Some("price must not be negative")
        );
    }

    #[test]
    fn rejects_price_beyond_integer_range() {
        let errors = validate_product_form(&ProductForm::new(
            "Lamp",
            "99999999999999999999",
            "Brass",
        ))
        .expect_err("invalid");
        assert_eq!(errors.get(FormField::Price), Some("price is too large"));

        let errors = validate_product_form(&ProductForm::new(
            "Lamp",
            "-99999999999999999999",
            "Brass",
        ))
        .expect_err("invalid");
        assert_eq!(
            errors.get(FormField::Price),
            Some("price must not be negative")
        );
    }

    #[test]
    fn trims_text_fields() {
        let fields = validate_product_form(&ProductForm::new("  Lamp ", " 0 ", " Brass\n"))
            .expect("valid form");
        assert_eq!(fields, ProductFields::new("Lamp", 0, "Brass"));
    }
}
