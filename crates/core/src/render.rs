//! HTML rendering for card lists
//!
//! [`render_cards_table`] is a pure function from a card slice to a complete
//! HTML document, so it can be tested without an HTTP server. Every
//! interpolated value is escaped.

use crate::hearthstone::Card;
use html_escape::{encode_double_quoted_attribute, encode_text};

const HEADERS: [&str; 7] = ["ID", "Card Image", "Name", "Type", "Rarity", "Set", "Class"];

/// Render cards as a single HTML table, one row per card, in slice order
pub fn render_cards_table(cards: &[Card]) -> String {
    let mut page = String::from("<html>\n\t<body>\n\t\t<table>\n\t\t\t<tr>\n");

    for header in HEADERS {
        page.push_str(&format!("\t\t\t\t<th>{header}</th>\n"));
    }
    page.push_str("\t\t\t</tr>\n");

    for card in cards {
        page.push_str(&format!(
            concat!(
                "\t\t\t<tr>\n",
                "\t\t\t\t<td> {id} </td>\n",
                "\t\t\t\t<td><img width=\"66%\" height=\"66%\" src=\"{image}\" /></td>\n",
                "\t\t\t\t<td> {name} </td>\n",
                "\t\t\t\t<td> {card_type} </td>\n",
                "\t\t\t\t<td> {rarity} </td>\n",
                "\t\t\t\t<td> {card_set} </td>\n",
                "\t\t\t\t<td> {card_class} </td>\n",
                "\t\t\t</tr>\n",
            ),
            id = card.id,
            image = encode_double_quoted_attribute(&card.image),
            name = encode_text(&card.name),
            card_type = encode_text(&card.card_type.name),
            rarity = encode_text(&card.rarity.name),
            card_set = encode_text(&card.card_set.name),
            card_class = encode_text(&card.card_class.name),
        ));
    }

    page.push_str("\t\t</table>\n\t</body>\n</html>\n");
    page
}
