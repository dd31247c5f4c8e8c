//! Canned answers for frequent questions.

/// FAQ topics, in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaqTopic {
    InternationalDelivery,
    ProductInformation,
    ShippingDetails,
    CustomerSupport,
}

const INTERNATIONAL_KEYWORDS: &[&str] = &[
    "do you deliver to",
    "can you ship to",
    "outside pakistan",
    "international shipping",
    "deliver abroad",
    "ship worldwide",
    "ship to usa",
    "ship to uk",
    "ship to india",
    "ship to canada",
    "ship internationally",
    "deliver to other countries",
    "deliver to china",
    "deliver to australia",
    "deliver to europe",
    "deliver to middle east",
    "deliver within china",
    "deliver within india",
    "deliver within usa",
    "deliver within uk",
    "deliver within canada",
    "deliver within australia",
    "deliver it in china",
    "deliver in india",
];

const PRODUCT_KEYWORDS: &[&str] = &[
    "product",
    "products",
    "items",
    "features",
    "specification",
    "price",
];

const SHIPPING_KEYWORDS: &[&str] = &[
    "shipping", "delivery", "return", "returns", "track", "tracking",
];

const SUPPORT_KEYWORDS: &[&str] = &[
    "support",
    "help",
    "issue",
    "problem",
    "contact",
    "complaint",
    "service",
];

impl FaqTopic {
    const ALL: [Self; 4] = [
        Self::InternationalDelivery,
        Self::ProductInformation,
        Self::ShippingDetails,
        Self::CustomerSupport,
    ];

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::InternationalDelivery => INTERNATIONAL_KEYWORDS,
            Self::ProductInformation => PRODUCT_KEYWORDS,
            Self::ShippingDetails => SHIPPING_KEYWORDS,
            Self::CustomerSupport => SUPPORT_KEYWORDS,
        }
    }

    /// The canned answer for this topic.
    #[must_use]
    pub fn answer(self) -> &'static str {
        match self {
            Self::InternationalDelivery => "🚫 Sorry, we currently only deliver within Pakistan.",
            Self::ProductInformation => {
                "Please specify the product name you're interested in. I will provide the details."
            }
            Self::ShippingDetails => concat!(
                "📦 Shipping Info:\n",
                "- Standard delivery: 3–5 business days\n",
                "- Express delivery: 1–2 business days\n",
                "- Free shipping on orders over Rs5000\n",
                "- 7-day return policy\n",
                "🚚 Delivery only within Pakistan."
            ),
            Self::CustomerSupport => concat!(
                "🛠️ Customer Support:\n",
                "- For order issues, contact: support@example.com\n",
                "- Call us at +92-800-123-4567"
            ),
        }
    }
}

/// The first topic whose keywords appear in `text`, ignoring case.
#[must_use]
pub fn classify(text: &str) -> Option<FaqTopic> {
    let lower = text.to_lowercase();
    FaqTopic::ALL
        .into_iter()
        .find(|topic| topic.keywords().iter().any(|k| lower.contains(k)))
}
