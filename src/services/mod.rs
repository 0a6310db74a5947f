pub mod events;
pub mod media;
pub mod ownership;
pub mod projection;
pub mod rsvp;
pub mod slug;
pub mod template_clone;
pub mod templates;
pub mod view_counter;

pub use events::{CreatedEvent, EventService};
pub use media::{MediaService, UploadTicket};
pub use projection::{Fetched, ProjectionService, PublicEvent, PublicEventView};
pub use rsvp::RsvpService;
pub use slug::SlugGenerator;
pub use templates::{TemplateDetails, TemplateService};
pub use view_counter::{ViewCounter, ViewWorker};
