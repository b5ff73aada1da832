// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of CRM rich content into Telegram Markdown text.
//!
//! Product cards and order summaries arrive as structured payloads and are
//! flattened into legacy-Markdown text. All user-controlled fragments are
//! escaped; currency codes are translated through the symbol table and
//! never shown raw.

use gramgate_crm::types::{Cost, OrderData, ProductData};
use gramgate_telegram::escape_markdown;

use crate::locale::Locales;

/// Currency symbol lookup, keyed by lowercase ISO code.
const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("rub", "₽"),
    ("uah", "₴"),
    ("byn", "Br"),
    ("kzt", "₸"),
    ("usd", "$"),
    ("eur", "€"),
    ("gbp", "£"),
    ("pln", "zł"),
    ("czk", "Kč"),
];

/// Symbol for a currency code, if known.
pub fn currency_symbol(code: &str) -> Option<&'static str> {
    let code = code.to_lowercase();
    CURRENCY_SYMBOLS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, symbol)| *symbol)
}

/// Formats an amount with its localized currency template.
fn format_cost(locales: &Locales, lang: &str, cost: &Cost) -> String {
    let symbol = currency_symbol(&cost.currency).unwrap_or_default();
    locales
        .localize_with(
            lang,
            "cost_currency",
            &[
                ("amount", format_amount(cost.value)),
                ("currency", symbol.to_string()),
            ],
        )
        .trim_end()
        .to_string()
}

/// Integral amounts print without a decimal point.
fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Renders a product reference: bold name, optional cost line, then the
/// product URL or image link.
pub fn render_product(locales: &Locales, lang: &str, product: &ProductData) -> String {
    let mut body = format!("*{}*\n", escape_markdown(&product.name));

    if let Some(cost) = &product.cost
        && cost.value != 0.0
    {
        body.push_str(&format!(
            "\n{}: {}\n",
            locales.localize(lang, "item_cost"),
            format_cost(locales, lang, cost),
        ));
    }

    if let Some(url) = product.url.as_deref().filter(|u| !u.is_empty()) {
        body.push_str(&escape_markdown(url));
    } else if let Some(img) = product.img.as_deref() {
        body.push_str(&escape_markdown(img));
    }

    body
}

/// Renders an order summary: header, itemized list, delivery block,
/// payment list and grand total.
pub fn render_order(locales: &Locales, lang: &str, order: &OrderData) -> String {
    let mut body = format!("*{}", locales.localize(lang, "order"));

    if let Some(number) = order.number.as_deref().filter(|n| !n.is_empty()) {
        body.push(' ');
        body.push_str(&escape_markdown(number));
    }
    if let Some(date) = order.date.as_deref().filter(|d| !d.is_empty()) {
        body.push_str(&format!(" ({date})"));
    }
    body.push_str("*\n");

    if !order.items.is_empty() {
        body.push('\n');
        for (index, item) in order.items.iter().enumerate() {
            body.push_str(&format!("{}. {}", index + 1, escape_markdown(&item.name)));

            if let Some(quantity) = &item.quantity
                && quantity.value != 0.0
            {
                body.push_str(&format!(" _{}_", format_amount(quantity.value)));
            }

            match &item.price {
                Some(price) if currency_symbol(&price.currency).is_some() => {
                    body.push_str(&format!(" _x {}_\n", format_cost(locales, lang, price)));
                }
                _ => body.push('\n'),
            }
        }
    }

    if let Some(delivery) = &order.delivery {
        if let Some(name) = delivery.name.as_deref().filter(|n| !n.is_empty()) {
            body.push_str(&format!(
                "\n*{}:*\n{}",
                locales.localize(lang, "delivery"),
                escape_markdown(name),
            ));
        }

        if let Some(price) = &delivery.price
            && currency_symbol(&price.currency).is_some()
            && price.value != 0.0
        {
            body.push_str(&format!("; {}", format_cost(locales, lang, price)));
        }

        if let Some(address) = delivery.address.as_deref().filter(|a| !a.is_empty()) {
            body.push_str(&format!(";\n{}", escape_markdown(address)));
        }
        if let Some(comment) = delivery.comment.as_deref().filter(|c| !c.is_empty()) {
            body.push_str(&format!(";\n{}", escape_markdown(comment)));
        }
        body.push('\n');
    }

    if !order.payments.is_empty() {
        body.push_str(&format!("\n*{}:*\n", locales.localize(lang, "payment")));
        for payment in &order.payments {
            body.push_str(&escape_markdown(&payment.name));

            if let Some(amount) = &payment.amount
                && currency_symbol(&amount.currency).is_some()
                && amount.value != 0.0
            {
                body.push_str(&format!("; {}", format_cost(locales, lang, amount)));
            }

            if let Some(status) = &payment.status
                && !status.name.is_empty()
            {
                body.push_str(&format!(" ({})", escape_markdown(&status.name)));
            }
            body.push('\n');
        }
    }

    if let Some(cost) = &order.cost
        && currency_symbol(&cost.currency).is_some()
        && cost.value != 0.0
    {
        body.push_str(&format!(
            "\n{}: {}",
            locales.localize(lang, "order_total"),
            format_cost(locales, lang, cost),
        ));
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use gramgate_crm::types::{Delivery, OrderItem, Payment, PaymentStatus, Quantity};

    fn locales() -> Locales {
        Locales::load().unwrap()
    }

    #[test]
    fn currency_table_translates_known_codes() {
        assert_eq!(currency_symbol("usd"), Some("$"));
        assert_eq!(currency_symbol("USD"), Some("$"));
        assert_eq!(currency_symbol("eur"), Some("€"));
        assert_eq!(currency_symbol("xxx"), None);
    }

    #[test]
    fn product_renders_name_cost_and_no_raw_currency_code() {
        let locales = locales();
        let product = ProductData {
            name: "Widget".into(),
            url: Some("https://shop.example.com/widget".into()),
            img: None,
            cost: Some(Cost {
                value: 100.0,
                currency: "usd".into(),
            }),
        };
        let body = render_product(&locales, "en", &product);
        assert!(body.contains("*Widget*"));
        assert!(body.contains("Cost: 100 $"));
        assert!(!body.to_lowercase().contains("usd"));
        assert!(body.contains("https://shop.example.com/widget"));
    }

    #[test]
    fn product_without_url_falls_back_to_image() {
        let locales = locales();
        let product = ProductData {
            name: "Widget".into(),
            url: None,
            img: Some("https://cdn.example.com/widget.jpg".into()),
            cost: None,
        };
        let body = render_product(&locales, "en", &product);
        assert!(body.contains("widget.jpg"));
        assert!(!body.contains("Cost"));
    }

    #[test]
    fn product_name_is_markdown_escaped() {
        let locales = locales();
        let product = ProductData {
            name: "Widget *deluxe*".into(),
            ..Default::default()
        };
        let body = render_product(&locales, "en", &product);
        assert!(body.contains("Widget \\*deluxe\\*"));
    }

    #[test]
    fn order_renders_all_sections() {
        let locales = locales();
        let order = OrderData {
            number: Some("1024C".into()),
            date: Some("2026-08-01".into()),
            items: vec![OrderItem {
                name: "Widget".into(),
                quantity: Some(Quantity { value: 2.0 }),
                price: Some(Cost {
                    value: 50.0,
                    currency: "usd".into(),
                }),
            }],
            delivery: Some(Delivery {
                name: Some("Courier".into()),
                price: Some(Cost {
                    value: 5.0,
                    currency: "usd".into(),
                }),
                address: Some("1 Main St".into()),
                comment: Some("call first".into()),
            }),
            payments: vec![Payment {
                name: "Card".into(),
                amount: Some(Cost {
                    value: 105.0,
                    currency: "usd".into(),
                }),
                status: Some(PaymentStatus { name: "paid".into() }),
            }],
            cost: Some(Cost {
                value: 105.0,
                currency: "usd".into(),
            }),
        };

        let body = render_order(&locales, "en", &order);
        assert!(body.starts_with("*Order 1024C (2026-08-01)*"));
        assert!(body.contains("1. Widget _2_ _x 50 $_"));
        assert!(body.contains("*Delivery:*\nCourier; 5 $;\n1 Main St;\ncall first"));
        assert!(body.contains("*Payment:*\nCard; 105 $ (paid)"));
        assert!(body.contains("Total: 105 $"));
    }

    #[test]
    fn sparse_order_renders_header_only() {
        let locales = locales();
        let order = OrderData::default();
        let body = render_order(&locales, "en", &order);
        assert_eq!(body, "*Order*\n");
    }
}
