use clinic_core::{ServiceCapabilities, ServiceMethodKind, Statement};

use crate::services::support::{like_escape, Conditions};

use super::MessageFilter;

pub fn capabilities() -> ServiceCapabilities {
    ServiceCapabilities::from_methods(vec![ServiceMethodKind::Find])
}

const SELECT: &str = r#"SELECT m.id, m.phone, m.client, m.direction, m.text, m.intent, m.date_time AS "dateTime" FROM whatsapp_messages m"#;

pub fn find_statement(filter: &MessageFilter) -> Statement {
    let mut conds = Conditions::new();
    if let Some(phone) = &filter.phone {
        conds.push(
            r"regexp_replace(m.phone, '\D', '', 'g') LIKE {}",
            format!("%{phone}%"),
        );
    }
    if let Some(client) = &filter.client {
        conds.push("m.client ILIKE {}", format!("%{}%", like_escape(client)));
    }
    if let Some(direction) = filter.direction {
        conds.push("m.direction = {}", direction.as_str());
    }
    if let Some(intent) = &filter.intent {
        conds.push("m.intent = {}", intent.as_str());
    }
    if let Some(date) = filter.date {
        conds.push("(m.date_time AT TIME ZONE 'UTC')::date = {}", date);
    }

    let next = conds.len() + 1;
    let sql = format!(
        "{SELECT}{} ORDER BY m.date_time DESC LIMIT ${next} OFFSET ${}",
        conds.where_clause(),
        next + 1
    );
    conds
        .into_statement("messages.find", sql)
        .bind(filter.limit)
        .bind(filter.offset)
}
