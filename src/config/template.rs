//! Endpoint URL templates
//!
//! Templates use `{name}` placeholders. Substitution is literal: values are
//! inserted as-is and unknown placeholders are left untouched.

pub const CATEGORY_PLACEHOLDER: &str = "{category}";
pub const BRAND_PLACEHOLDER: &str = "{brand}";
pub const PAGE_PLACEHOLDER: &str = "{page}";
pub const PRODUCT_ID_PLACEHOLDER: &str = "{productid}";

/// Fills a listing URL template
pub fn fill_listing_template(template: &str, category: &str, brand: &str, page: u32) -> String {
    template
        .replace(CATEGORY_PLACEHOLDER, category)
        .replace(BRAND_PLACEHOLDER, brand)
        .replace(PAGE_PLACEHOLDER, &page.to_string())
}

/// Fills a detail URL template
pub fn fill_detail_template(template: &str, product_id: &str) -> String {
    template.replace(PRODUCT_ID_PLACEHOLDER, product_id)
}
