//! Prompts for the product model.

use super::format::detect_barcode_format;

/// System prompt for barcode analysis.
pub const BARCODE_ANALYST_SYSTEM: &str = "You are an expert barcode analyst with access to comprehensive product databases. \
You identify products by their barcodes using your knowledge of:
- GS1 country codes and manufacturer prefixes
- Common consumer products and brands
- Product categories and subcategories
- Regional product variations

Give specific, accurate product information whenever you can.";

/// GS1 prefixes of registration countries.
const GS1_PREFIXES: &[(&str, &str)] = &[
    ("471", "Taiwan"),
    ("762", "International (various countries)"),
    ("690-699", "China"),
    ("00-13", "USA/Canada"),
    ("20-29", "Restricted circulation"),
    ("30-37", "France"),
    ("400-440", "Germany"),
    ("450-459, 490-499", "Japan"),
    ("460-469", "Russia"),
    ("500-509", "UK"),
    ("520", "Greece"),
    ("530, 539", "Ireland"),
    ("54", "Belgium/Luxembourg"),
    ("560", "Portugal"),
    ("57", "Denmark"),
    ("590", "Poland"),
    ("599", "Hungary"),
    ("600-601", "South Africa"),
    ("622", "Egypt"),
    ("628", "Saudi Arabia"),
    ("629", "UAE"),
    ("64", "Finland"),
    ("70", "Norway"),
    ("729", "Israel"),
    ("73", "Sweden"),
    ("750", "Mexico"),
    ("76", "Switzerland"),
    ("779", "Argentina"),
    ("789-790", "Brazil"),
    ("80-83", "Italy"),
    ("84", "Spain"),
    ("868-869", "Turkey"),
    ("87", "Netherlands"),
    ("880", "South Korea"),
    ("885", "Thailand"),
    ("888", "Singapore"),
    ("890", "India"),
    ("893", "Vietnam"),
    ("899", "Indonesia"),
    ("90-91", "Austria"),
    ("93", "Australia"),
    ("94", "New Zealand"),
    ("955", "Malaysia"),
    ("958", "Macau"),
];

const CATEGORY_HINTS: &[&str] = &[
    "Food & Beverages (snacks, drinks, packaged foods)",
    "Personal Care (cosmetics, toiletries, health products)",
    "Household Items (cleaning products, tools, electronics)",
    "Health & Beauty (medicines, supplements, skincare)",
    "Baby Products (formula, diapers, toys)",
    "Pet Products (food, toys, supplies)",
];

/// Instruction telling the model which language to answer in.
///
/// Unknown codes get the English instruction.
pub fn language_instruction(language: &str) -> &'static str {
    match language {
        "zh" => "请用简体中文回答。",
        "zh-TW" => "請用繁體中文回答。",
        "ja" => "日本語で回答してください。",
        "ko" => "한국어로 답변해주세요.",
        "es" => "Responde en español.",
        "fr" => "Répondez en français.",
        "de" => "Antworten Sie auf Deutsch.",
        "it" => "Rispondi in italiano.",
        "pt" => "Responda em português.",
        "ru" => "Ответьте на русском языке.",
        "ar" => "أجب باللغة العربية.",
        "hi" => "हिंदी में उत्तर दें।",
        "th" => "ตอบเป็นภาษาไทย",
        "vi" => "Trả lời bằng tiếng Việt.",
        _ => "Respond in English.",
    }
}

/// Prompt for a photo of a product barcode.
pub const BARCODE_IMAGE_PROMPT: &str = "Analyze this image that contains a barcode. Please: \
1) Read the barcode number if visible, 2) Analyze the product packaging, text, and visual elements, \
3) Identify the product type based on both barcode and visual information. \
Consider that barcodes starting with 471 are Taiwan-produced products. \
Provide detailed analysis of what you see on the packaging (text, images, features mentioned). \
Respond in JSON format with fields: barcode (if readable), name, description, category (item type), \
subcategory (specific item type), confidence (0-100), packagingAnalysis (what you see on the packaging).";

/// Prompt for a photo of an item, answered in `language`.
pub fn item_image_prompt(language: &str) -> String {
    format!(
        "Analyze this image and identify the item. IMPORTANT: Include key identifying features in the name \
         such as brand, color, size, material, or distinctive features for easy searching later. \
         Provide a name, description, and suggest a category based on the ITEM TYPE (like Electronics, \
         Drinkware, Cookware, Tools, Clothing, Books, etc. - NOT the location where it's stored). \
         Also suggest a subcategory if applicable.\n\
         \n\
         CRITICAL: {instruction} ALL fields (name, description, category, subcategory) MUST be in the specified language. \
         Do not mix languages.\n\
         \n\
         Respond in JSON format with fields: name (include brand/color/features), description, \
         category (item type), subcategory (specific item type), confidence (0-100). \
         For example: if it's a red Nike cup, name should be 'Nike Red Sports Cup' not just 'Cup'.",
        instruction = language_instruction(language),
    )
}

/// User prompt asking the model to identify `barcode`.
pub fn barcode_prompt(barcode: &str, language: &str) -> String {
    let prefixes: String = GS1_PREFIXES
        .iter()
        .map(|(prefix, country)| format!("- {} = {}\n", prefix, country))
        .collect();
    let categories: String = CATEGORY_HINTS
        .iter()
        .map(|c| format!("- {}\n", c))
        .collect();

    format!(
        "Analyze this barcode: {barcode} (Format: {format}).\n\
         \n\
         GS1 country codes:\n\
         {prefixes}\
         \n\
         Product categories to consider:\n\
         {categories}\
         \n\
         If you recognize the product, name it with its brand and key features (color, size, flavor, material). \
         If you only know the brand or category, say what you know. If you only know the country of origin, say that.\n\
         \n\
         CRITICAL: {instruction} ALL fields (name, description, category, subcategory) MUST be in the specified language. Do not mix languages.\n\
         \n\
         Respond in JSON format with fields: name, description, category, subcategory, confidence (0-100).\n\
         Example: {{\"name\": \"Head & Shoulders Classic Clean Shampoo 400ml\", \"description\": \"Anti-dandruff shampoo for normal hair, 400ml bottle\", \"category\": \"Personal Care\", \"subcategory\": \"Shampoo\", \"confidence\": 90}}",
        barcode = barcode,
        format = detect_barcode_format(barcode),
        prefixes = prefixes,
        categories = categories,
        instruction = language_instruction(language),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_instruction() {
        assert_eq!(language_instruction("zh-TW"), "請用繁體中文回答。");
        assert_eq!(language_instruction("en"), "Respond in English.");
        assert_eq!(language_instruction("xx"), "Respond in English.");
    }

    #[test]
    fn test_barcode_prompt() {
        let prompt = barcode_prompt("4710901898748", "ja");

        assert!(prompt.starts_with("Analyze this barcode: 4710901898748 (Format: EAN-13)."));
        assert!(prompt.contains("- 471 = Taiwan\n"));
        assert!(prompt.contains("日本語で回答してください。"));
        assert!(prompt.contains("{\"name\": \"Head & Shoulders"));
    }

    #[test]
    fn test_image_prompts() {
        let prompt = item_image_prompt("zh-TW");
        assert!(prompt.starts_with("Analyze this image and identify the item."));
        assert!(prompt.contains("CRITICAL: 請用繁體中文回答。 ALL fields"));

        assert!(BARCODE_IMAGE_PROMPT.contains("barcodes starting with 471 are Taiwan-produced"));
    }
}
