//! Line-item extraction from decoded e-invoice text.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::invoice::LineItem;

use super::rules::patterns::*;
use super::rules::{extract_total_amount, parse_amount};

/// Longest item name kept as-is; longer names are shortened with `...`.
const MAX_DISPLAY_NAME: usize = 50;

/// Names at or above this length are rejected.
const MAX_NAME_LEN: usize = 100;

/// Prices and amounts at or above this value are rejected.
const MAX_ITEM_VALUE: i64 = 1_000_000;

/// Name used when only the invoice total is known.
pub const GENERIC_PURCHASE_NAME: &str = "台灣商品購買";

/// Name used when nothing about the purchase is known.
pub const GENERIC_ITEM_NAME: &str = "台灣商品";

/// Values used to build a synthetic item when no line parses.
#[derive(Debug, Clone, Default)]
pub struct ItemFallback {
    /// Seller name found in the text (never the default placeholder).
    pub seller_name: Option<String>,
    /// Total amount found in the text.
    pub total_amount: Option<Decimal>,
}

impl ItemFallback {
    /// Derive fallback values from labeled seller and total lines.
    pub fn from_text(text: &str) -> Self {
        Self {
            seller_name: first_capture(&SELLER_NAME_STRICT, text).map(|s| s.trim().to_string()),
            total_amount: extract_total_amount(text, None).map(|m| m.value),
        }
    }

    fn into_item(self) -> LineItem {
        let total = self.total_amount.filter(|t| *t > Decimal::ZERO);

        match (self.seller_name, total) {
            (Some(seller), Some(total)) => LineItem::single(format!("來自 {} 的商品", seller), total),
            (None, Some(total)) => LineItem::single(GENERIC_PURCHASE_NAME, total),
            (_, None) => LineItem::single(GENERIC_ITEM_NAME, Decimal::ZERO),
        }
    }
}

/// Parse purchased items from decoded text.
///
/// Always returns at least one item. When no line parses, a synthetic item
/// is built from the labeled seller and total, so callers must not assume the
/// result lists real goods.
pub fn parse_items_from_data(data: &str) -> Vec<LineItem> {
    extract_line_items(data, ItemFallback::from_text(data)).items
}

/// Items parsed from a payload.
#[derive(Debug, Clone)]
pub struct ParsedItems {
    pub items: Vec<LineItem>,
    /// True when `items` holds only the synthetic fallback item.
    pub synthetic: bool,
}

/// Parse items, using `fallback` when no line parses.
pub fn extract_line_items(data: &str, fallback: ItemFallback) -> ParsedItems {
    let items: Vec<LineItem> = data
        .lines()
        .map(str::trim)
        .filter(|line| is_candidate_line(line))
        .filter_map(parse_item_line)
        .collect();

    if !items.is_empty() {
        return ParsedItems { items, synthetic: false };
    }

    let item = fallback.into_item();
    debug!("No item lines found, using synthetic item {:?}", item.name);
    ParsedItems { items: vec![item], synthetic: true }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn has_metadata_keyword(name: &str) -> bool {
    METADATA_NAME_KEYWORDS.iter().any(|k| name.contains(k))
}

fn is_candidate_line(line: &str) -> bool {
    if line.is_empty()
        || METADATA_LINE_MARKERS.iter().any(|m| line.contains(m))
        || BARE_INVOICE_NUMBER.is_match(line)
    {
        return false;
    }

    let len = char_len(line);
    PRODUCT_KEYWORDS.iter().any(|k| line.contains(k))
        || (ITEM_TEXT_THEN_NUMBER.is_match(line) && len > 2)
        || (ITEM_TEXT_ONLY.is_match(line) && len > 2 && len < MAX_DISPLAY_NAME)
}

/// Raw captures of one item line: name, quantity, price, amount.
struct ItemCaptures<'a> {
    name: &'a str,
    quantity: &'a str,
    price: &'a str,
    amount: &'a str,
}

fn match_item_line(line: &str) -> Option<ItemCaptures<'_>> {
    // name qty price amount
    if let Some(caps) = ITEM_FULL.captures(line) {
        let (_, [name, quantity, price, amount]) = caps.extract();
        return Some(ItemCaptures { name, quantity, price, amount });
    }

    // name amount
    if let Some(caps) = ITEM_NAME_AMOUNT.captures(line) {
        let (_, [name, amount]) = caps.extract();
        return Some(ItemCaptures { name, quantity: "1", price: amount, amount });
    }

    // mixed-script name directly followed by a number
    if char_len(line) > 3 {
        if let Some(caps) = ITEM_MIXED_SCRIPT.captures(line) {
            let (_, [name, amount]) = caps.extract();
            if !has_metadata_keyword(name.trim()) {
                return Some(ItemCaptures { name, quantity: "1", price: amount, amount });
            }
        }
    }

    // bare product name
    let len = char_len(line);
    if len > 2 && len < MAX_DISPLAY_NAME && !has_metadata_keyword(line) {
        return Some(ItemCaptures { name: line, quantity: "1", price: "0", amount: "0" });
    }

    None
}

fn parse_item_line(line: &str) -> Option<LineItem> {
    if char_len(line) < 3 || BARE_INVOICE_NUMBER.is_match(line) {
        return None;
    }

    let caps = match_item_line(line)?;
    let name = caps.name.trim();

    let non_zero = |s: &str| parse_amount(s).filter(|v| !v.is_zero());
    let quantity = non_zero(caps.quantity).unwrap_or(Decimal::ONE);
    let price = non_zero(caps.price)
        .or_else(|| non_zero(caps.amount))
        .unwrap_or(Decimal::ZERO);
    // Products that overflow are far past the value limit anyway.
    let amount = match non_zero(caps.amount) {
        Some(amount) => amount,
        None => price.checked_mul(quantity)?,
    };

    let limit = Decimal::from(MAX_ITEM_VALUE);
    let name_len = char_len(name);
    if name_len < 2
        || name_len >= MAX_NAME_LEN
        || has_metadata_keyword(name)
        || price >= limit
        || amount >= limit
    {
        return None;
    }

    debug!("Parsed item {:?}: qty {} price {} amount {}", name, quantity, price, amount);

    Some(LineItem::new(display_name(name), quantity, price, amount))
}

/// Shorten names longer than 50 characters to 47 characters plus `...`.
fn display_name(name: &str) -> String {
    if char_len(name) > MAX_DISPLAY_NAME {
        let head: String = name.chars().take(MAX_DISPLAY_NAME - 3).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_item_line() {
        let items = parse_items_from_data("鮮奶 2 35 70");

        assert_eq!(items, vec![LineItem::new("鮮奶", Decimal::from(2), Decimal::from(35), Decimal::from(70))]);
        assert_eq!(items[0].unit, "piece");
    }

    #[test]
    fn test_name_amount_line() {
        let items = parse_items_from_data("Green Tea 25");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Green Tea");
        assert_eq!(items[0].quantity, Decimal::ONE);
        assert_eq!(items[0].price, Decimal::from(25));
        assert_eq!(items[0].amount, Decimal::from(25));
    }

    #[test]
    fn test_mixed_script_line() {
        let items = parse_items_from_data("茶葉蛋12");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "茶葉蛋");
        assert_eq!(items[0].amount, Decimal::from(12));
    }

    #[test]
    fn test_bare_name_line() {
        let items = parse_items_from_data("御飯糰鮪魚");

        assert_eq!(items, vec![LineItem::new("御飯糰鮪魚", Decimal::ONE, Decimal::ZERO, Decimal::ZERO)]);
    }

    #[test]
    fn test_metadata_lines_are_skipped() {
        let text = "電子發票證明聯\nAB12345678\n發票號碼: AB12345678\n品名 咖啡 1 45 45";
        let items = parse_items_from_data(text);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "品名 咖啡");
        assert_eq!(items[0].amount, Decimal::from(45));
    }

    #[test]
    fn test_metadata_keyword_names_rejected() {
        // Not a metadata line marker (full-width colon), but the name is metadata.
        let items = parse_items_from_data("賣方：全聯 100");
        assert_eq!(items, vec![LineItem::single(GENERIC_ITEM_NAME, Decimal::ZERO)]);
    }

    #[test]
    fn test_long_name_is_shortened() {
        let long = "超".repeat(60);
        let items = parse_items_from_data(&format!("{} 10", long));

        assert_eq!(items[0].name.chars().count(), 50);
        assert!(items[0].name.ends_with("..."));
    }

    #[test]
    fn test_price_limit() {
        let items = parse_items_from_data("Diamond Ring 1 2000000 2000000");
        assert_eq!(items[0].name, GENERIC_ITEM_NAME);
    }

    #[test]
    fn test_overflowing_line_total_is_rejected() {
        let items = parse_items_from_data("Widget 99999999999999999999 99999999999999999999 0");
        assert_eq!(items, vec![LineItem::single(GENERIC_ITEM_NAME, Decimal::ZERO)]);
    }

    #[test]
    fn test_missing_amount_is_price_times_quantity() {
        let items = parse_items_from_data("Widget 3 20 0");
        assert_eq!(items, vec![LineItem::new("Widget", Decimal::from(3), Decimal::from(20), Decimal::from(60))]);
    }

    #[test]
    fn test_fallback_with_seller_and_total() {
        let items = parse_items_from_data("Seller: 好市多\nTotal: 150");

        assert_eq!(items, vec![LineItem::single("來自 好市多 的商品", Decimal::from(150))]);
    }

    #[test]
    fn test_fallback_with_total_only() {
        let items = parse_items_from_data("Total: 99");
        assert_eq!(items, vec![LineItem::single(GENERIC_PURCHASE_NAME, Decimal::from(99))]);
    }

    #[test]
    fn test_fallback_without_anything() {
        let parsed = extract_line_items("", ItemFallback::default());
        assert!(parsed.synthetic);
        assert_eq!(parsed.items, vec![LineItem::single(GENERIC_ITEM_NAME, Decimal::ZERO)]);
    }

    #[test]
    fn test_fallback_ignores_zero_total() {
        let fallback = ItemFallback {
            seller_name: Some("全家".to_string()),
            total_amount: Some(Decimal::ZERO),
        };
        let parsed = extract_line_items("", fallback);
        assert_eq!(parsed.items[0].name, GENERIC_ITEM_NAME);
    }
}
