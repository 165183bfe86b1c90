//! Terminal rendering

use super::{ActivityCard, ActivityListView, PageView, EMPTY_ROSTER_TEXT};

fn card_lines(card: &ActivityCard) -> Vec<String> {
    let mut lines = vec![
        card.name.clone(),
        "-".repeat(card.name.chars().count().max(20)),
        format!("  {}", card.description),
        format!("  Schedule:     {}", card.schedule),
        format!("  Availability: {}", card.availability()),
    ];

    if card.roster.is_empty() {
        lines.push(format!("  {}", EMPTY_ROSTER_TEXT));
    } else {
        lines.push("  Participants:".to_string());
        lines.extend(card.roster.iter().map(|row| {
            let marker = if row.removable { " [x]" } else { "" };
            format!("    - {}{}", row.email, marker)
        }));
    }
    lines
}

/// Plain-text activity list, one block per activity
pub fn render_list_text(list: &ActivityListView) -> String {
    if !list.notice.is_empty() {
        return format!("{}\n", list.notice);
    }
    if list.cards.is_empty() {
        return "No activities available.\n".to_string();
    }

    list.cards
        .iter()
        .map(|card| card_lines(card).join("\n") + "\n\n")
        .collect()
}

/// Auth line, visible message and the list
pub fn render_page_text(page: &PageView) -> String {
    let mut lines = vec![page.auth.text.clone()];

    if let Some(error) = &page.login_error {
        lines.push(format!("Login: {}", error));
    }
    if let Some(message) = &page.message {
        lines.push(format!("[{}] {}", message.css_class(), message.text));
    }

    format!("{}\n\n{}", lines.join("\n"), render_list_text(&page.list))
}
