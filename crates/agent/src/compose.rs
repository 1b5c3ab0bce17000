use std::fmt::Write as _;

use storefront_core::domain::product::Product;

use crate::conversation::Intent;

pub const NO_MATCH_REPLY: &str = "Sorry, I couldn't find any products matching your request right now. Try describing it more specifically, for example the product type or a price range.";

pub const DISCOUNT_REPLY: &str = "Hello! We're running a limited-time promotion and many products are discounted. Browse the product list to see current offers, or tell me which kind of product you're interested in and I'll suggest the best value picks.";

/// Renders the canned reply for an intent. Never returns empty text.
#[derive(Clone, Debug, Default)]
pub struct ResponseComposer;

impl ResponseComposer {
    pub fn new() -> Self {
        Self
    }

    pub fn compose(&self, intent: Intent, message: &str, products: &[Product]) -> String {
        match intent {
            Intent::Recommend if products.is_empty() => NO_MATCH_REPLY.to_string(),
            Intent::Recommend => recommendation_list(products),
            Intent::Discount => DISCOUNT_REPLY.to_string(),
            Intent::Inquiry => inquiry_menu(message),
        }
    }
}

fn recommendation_list(products: &[Product]) -> String {
    let mut reply = String::from(
        "Hello, I'm your AI shopping assistant. Based on your needs, here are my recommendations:\n\n",
    );
    for (index, product) in products.iter().enumerate() {
        let _ = writeln!(reply, "{}. {} - ¥{}", index + 1, product.name, product.price);
        let reason = product.selection_reason.trim();
        if !reason.is_empty() {
            let _ = writeln!(reply, "   Why: {reason}");
        }
    }
    reply.push_str(
        "\nTap a product card below for details. Let me know if there's anything else I can help with!",
    );
    reply
}

fn inquiry_menu(message: &str) -> String {
    format!(
        "Hello, I've received your question: {}. What would you like to know more about? For example:\n1. Product recommendations\n2. Prices and promotions\n3. Product features and specs\n\nTell me what you need and I'll do my best to help!",
        message.trim()
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use storefront_core::domain::product::Product;

    use super::{ResponseComposer, DISCOUNT_REPLY, NO_MATCH_REPLY};
    use crate::conversation::Intent;

    fn headphones() -> Product {
        let mut product = Product::new(
            "p1",
            "ACC-001",
            "Bluetooth Headphones",
            "Digital Accessories",
            Decimal::new(19900, 2),
        );
        product.selection_reason = "Strong growth".to_string();
        product
    }

    #[test]
    fn recommendation_list_is_numbered_with_price_and_reason() {
        let mut lamp =
            Product::new("p2", "HOME-002", "Desk Lamp", "Daily Essentials", Decimal::new(8000, 2));
        lamp.selection_reason = "  ".to_string();

        let reply = ResponseComposer::new().compose(Intent::Recommend, "lamp", &[headphones(), lamp]);

        assert!(reply.contains("1. Bluetooth Headphones - ¥199.00\n   Why: Strong growth\n"));
        assert!(reply.contains("2. Desk Lamp - ¥80.00\n"));
        assert_eq!(reply.matches("Why:").count(), 1);
    }

    #[test]
    fn empty_recommendation_apologises() {
        let reply = ResponseComposer::new().compose(Intent::Recommend, "recommend me something", &[]);
        assert_eq!(reply, NO_MATCH_REPLY);
    }

    #[test]
    fn discount_reply_ignores_products() {
        let composer = ResponseComposer::new();
        assert_eq!(composer.compose(Intent::Discount, "deals?", &[headphones()]), DISCOUNT_REPLY);
        assert_eq!(composer.compose(Intent::Discount, "deals?", &[]), DISCOUNT_REPLY);
    }

    #[test]
    fn inquiry_echoes_the_message_and_offers_topics() {
        let reply = ResponseComposer::new().compose(Intent::Inquiry, "  is shipping free? ", &[]);

        assert!(reply.contains("your question: is shipping free?."));
        assert!(reply.contains("3. Product features and specs"));
    }
}
