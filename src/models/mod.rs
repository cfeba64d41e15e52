pub mod account;
pub mod content;
pub mod donation;
pub mod event;
pub mod news;
pub mod resource;
pub mod role;

pub use content::{ContentKind, ContentRecord, Draft, FormFields, ValidationError};
pub use donation::{Donation, DonationStats};
pub use event::{Event, EventDraft};
pub use news::{NewsDraft, NewsItem};
pub use resource::{Resource, ResourceCategory, ResourceDraft};
