//! HTTP handlers for the Farmlytics platform

pub mod community;
pub mod conversation;
pub mod diagnosis;
pub mod health;
pub mod live;
pub mod marketplace;
pub mod profile;
pub mod relay;

pub use community::{add_comment, create_post, delete_post, list_posts};
pub use conversation::{list_conversations, list_messages, mark_read, send_message, start_conversation};
pub use diagnosis::{list_diagnoses, record_diagnosis};
pub use health::health_check;
pub use live::{live_conversations, live_feed, live_messages, live_products};
pub use marketplace::{add_product, list_my_products, list_products, product_stats};
pub use profile::{create_profile, directory, get_my_profile, get_profile, update_my_profile};
pub use relay::{diagnose_plant, relay_preflight, saathi_ai};
