//! Keyword-based expense category detection.

/// Category names match the columns of the user's expense sheet.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Meals - Food",
        &[
            "lunch", "dinner", "breakfast", "food", "meal", "eat", "biryani", "canteen",
        ],
    ),
    (
        "Meals - Snacks",
        &["snack", "coffee", "tea", "cafe", "juice", "samosa"],
    ),
    (
        "Meals - Restaurant",
        &[
            "restaurant", "hotel", "pizza", "burger", "swiggy", "zomato", "dine",
        ],
    ),
    (
        "Transportation - Cab (Uber/Rapido)",
        &["uber", "ola", "cab", "taxi", "rapido"],
    ),
    ("Transportation - Auto", &["auto", "rickshaw"]),
    ("Transportation - Bus", &["bus", "metro", "train"]),
    ("Fuel - Petrol", &["fuel", "petrol", "diesel", "gas station"]),
    (
        "Shopping - Online",
        &["amazon", "flipkart", "myntra", "online"],
    ),
    (
        "Shopping - Clothes",
        &["clothes", "shoes", "dress", "shirt", "wear"],
    ),
    (
        "Shopping - General",
        &["shop", "mall", "buy", "purchase", "store"],
    ),
    (
        "Utilities - Bills",
        &["electricity", "water", "gas", "internet", "wifi", "bill"],
    ),
    (
        "Utilities - Recharge",
        &["recharge", "mobile", "phone", "jio", "airtel", "vi"],
    ),
    (
        "Entertainment - Movies",
        &["movie", "cinema", "pvr", "inox", "film"],
    ),
    (
        "Entertainment - Subscription",
        &["netflix", "spotify", "prime", "hotstar", "subscription"],
    ),
    (
        "Health - Medicine",
        &["medicine", "pharmacy", "medical", "tablet"],
    ),
    (
        "Health - Doctor",
        &["doctor", "hospital", "clinic", "apollo", "consultation"],
    ),
    (
        "Groceries",
        &[
            "grocery",
            "vegetables",
            "fruits",
            "milk",
            "supermarket",
            "bigbasket",
            "blinkit",
            "zepto",
            "dmart",
        ],
    ),
];

pub const DEFAULT_CATEGORY: &str = "Miscellaneous";

/// Detect a category from a free-text description.
///
/// First keyword hit wins, in table order; unrecognized descriptions fall
/// back to [`DEFAULT_CATEGORY`].
pub fn detect_category(description: &str) -> &'static str {
    let desc = description.to_lowercase();
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|keyword| desc.contains(keyword)) {
            return category;
        }
    }
    DEFAULT_CATEGORY
}
