pub mod event;
pub mod guest;
pub mod media;
pub mod template;

pub use event::{
    Event, EventPatch, EventSection, EventStats, EventTheme, NewEvent, SectionPatch, ThemeInput,
};
pub use guest::{Guest, NewGuest, RsvpStatus};
pub use media::{Media, MediaKind};
pub use template::{Template, TemplateSection};

use serde::{Deserialize, Deserializer};

/// Отличает отсутствующее поле от явного `null`: `None` - поля нет,
/// `Some(None)` - пришёл `null`, `Some(Some(v))` - новое значение.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
