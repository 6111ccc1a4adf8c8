//! Transactional email bodies for orders.

use crate::domain::order::Order;
use crate::ports::EmailMessage;

/// Sent right after intake, before payment.
pub fn order_received(order: &Order) -> EmailMessage {
    EmailMessage {
        to: order.shipping_address.email.clone(),
        subject: format!("Order Received - {}", order.order_number),
        html: render(
            order,
            "Thanks for your order!",
            "We've received your order and will confirm it as soon as payment clears.",
        ),
    }
}

/// Sent once payment has been confirmed.
pub fn order_confirmation(order: &Order) -> EmailMessage {
    EmailMessage {
        to: order.shipping_address.email.clone(),
        subject: format!("Order Confirmation - {}", order.order_number),
        html: render(
            order,
            "Your order is confirmed",
            "Payment received. We're roasting and packing your coffee now.",
        ),
    }
}

fn render(order: &Order, heading: &str, lead: &str) -> String {
    let rows: String = order
        .items
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&item.name),
                item.quantity,
                item.unit_price
            )
        })
        .collect();

    format!(
        "<h1>{heading}</h1>\
         <p>Hi {name},</p>\
         <p>{lead}</p>\
         <p>Order number: <strong>{number}</strong></p>\
         <table><tr><th>Item</th><th>Qty</th><th>Price</th></tr>{rows}</table>\
         <p>Total: <strong>{total}</strong></p>",
        heading = heading,
        name = escape(&order.shipping_address.full_name),
        lead = lead,
        number = order.order_number,
        rows = rows,
        total = order.total_amount,
    )
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::test_support::{line, pending_order};

    #[test]
    fn confirmation_shows_total_in_dollars() {
        let order = pending_order(vec![line(1699, 1), line(1899, 2)]);
        let email = order_confirmation(&order);

        assert_eq!(email.to, "ada@example.com");
        assert_eq!(email.subject, format!("Order Confirmation - {}", order.order_number));
        assert!(email.html.contains("$54.97"));
    }

    #[test]
    fn received_email_uses_order_number() {
        let order = pending_order(vec![line(500, 1)]);
        let email = order_received(&order);
        assert!(email.subject.starts_with("Order Received - ORD-"));
    }

    #[test]
    fn product_names_are_escaped() {
        let mut order = pending_order(vec![line(500, 1)]);
        order.items[0].name = "<b>Espresso & Co</b>".to_string();
        let email = order_received(&order);
        assert!(email.html.contains("&lt;b&gt;Espresso &amp; Co&lt;/b&gt;"));
    }
}
