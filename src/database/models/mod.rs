pub mod client;
pub mod interaction;
pub mod opportunity;
pub mod profile;
pub mod task;

pub use client::{Client, ClientStatus};
pub use interaction::Interaction;
pub use opportunity::Opportunity;
pub use profile::Profile;
pub use task::{Priority, Task};

use super::entity::Table;

/// Every owner-scoped table, parents before children
pub static TABLES: [&Table; 4] = [
    &client::CLIENTS,
    &opportunity::OPPORTUNITIES,
    &interaction::INTERACTIONS,
    &task::TASKS,
];
