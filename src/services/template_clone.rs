//! Копирование секций шаблона в новое событие.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::CoreResult;
use crate::models::{EventSection, TemplateSection};
use crate::store::{EventStore, TemplateCatalog};

/// Одна секция события на каждую секцию шаблона, в порядке шаблона.
/// Содержимое по умолчанию или пустой объект, все секции видимы.
pub fn sections_from_template(event_id: Uuid, template: &[TemplateSection]) -> Vec<EventSection> {
    let mut ordered: Vec<&TemplateSection> = template.iter().collect();
    ordered.sort_by_key(|s| s.sort_order);

    ordered
        .into_iter()
        .map(|ts| EventSection {
            id: Uuid::new_v4(),
            event_id,
            template_section_id: ts.id,
            content: ts.default_content.clone().unwrap_or_else(empty_content),
            is_visible: true,
            sort_order: ts.sort_order,
        })
        .collect()
}

pub(crate) fn empty_content() -> Value {
    json!({})
}

/// Читает секции шаблона и сохраняет копии одной пачкой (всё или ничего).
/// Шаблон без секций - нормальный случай, результат пустой.
pub async fn clone_sections(
    events: &dyn EventStore,
    templates: &dyn TemplateCatalog,
    event_id: Uuid,
    template_id: Uuid,
) -> CoreResult<Vec<EventSection>> {
    let template_sections = templates.find_sections(template_id).await?;
    let sections = sections_from_template(event_id, &template_sections);

    if !sections.is_empty() {
        events.create_sections(&sections).await?;
    }
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_section(sort_order: i32, default_content: Option<Value>) -> TemplateSection {
        TemplateSection {
            id: Uuid::new_v4(),
            template_id: Uuid::nil(),
            name: format!("section {}", sort_order),
            section_type: "text".to_string(),
            default_content,
            sort_order,
        }
    }

    #[test]
    fn copies_defaults_order_and_origin() {
        let template = vec![
            template_section(2, None),
            template_section(0, Some(json!({ "heading": "Welcome" }))),
            template_section(1, Some(json!({ "photos": [] }))),
        ];
        let event_id = Uuid::new_v4();

        let sections = sections_from_template(event_id, &template);

        assert_eq!(sections.len(), 3);
        let orders: Vec<i32> = sections.iter().map(|s| s.sort_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        assert!(sections.iter().all(|s| s.is_visible && s.event_id == event_id));
        assert_eq!(sections[0].content, json!({ "heading": "Welcome" }));
        assert_eq!(sections[0].template_section_id, template[1].id);
        assert_eq!(sections[2].content, json!({}));
    }

    #[test]
    fn empty_template_gives_no_sections() {
        assert!(sections_from_template(Uuid::new_v4(), &[]).is_empty());
    }
}
