use crate::category::Category;
use crate::record::SupportRequest;

/// Case-insensitive substring search over name, email, and description. An
/// empty needle returns the whole collection. Store order is preserved and
/// the records themselves are never touched.
#[must_use]
pub fn search<'a>(records: &'a [SupportRequest], needle: &str) -> Vec<&'a SupportRequest> {
    if needle.is_empty() {
        return records.iter().collect();
    }
    let needle = needle.to_lowercase();
    records
        .iter()
        .filter(|record| {
            record.name.to_lowercase().contains(&needle)
                || record.email.to_lowercase().contains(&needle)
                || record.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Exact, case-sensitive match on the resolved category title. Records
/// whose category cannot be resolved match nothing; an empty result is a
/// legitimate outcome, not an error.
#[must_use]
pub fn filter_by_category<'a>(
    records: &'a [SupportRequest],
    categories: &[Category],
    title: &str,
) -> Vec<&'a SupportRequest> {
    records
        .iter()
        .filter(|record| record.category_title(categories) == Some(title))
        .collect()
}
