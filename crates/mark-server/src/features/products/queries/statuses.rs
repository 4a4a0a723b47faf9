//! Ledger status catalogue

use mark_common::ProductStatus;
use serde::Serialize;

/// One ledger status as exposed to clients
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusItem {
    pub code: i16,
    pub name: &'static str,
    pub label: &'static str,
}

impl From<ProductStatus> for StatusItem {
    fn from(status: ProductStatus) -> Self {
        Self {
            code: status.code(),
            name: status.as_str(),
            label: status.label(),
        }
    }
}

pub fn handle() -> Vec<StatusItem> {
    ProductStatus::ALL.into_iter().map(StatusItem::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_every_status_in_code_order() {
        let items = handle();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].name, "NOT_DEFINED");
        assert_eq!(items[3].code, 3);
        assert!(items.windows(2).all(|w| w[0].code < w[1].code));
    }
}
