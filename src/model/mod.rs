pub mod chat;
pub mod patient;
pub mod report;
pub mod route;
pub mod slice;

pub use chat::{chat_client_name, ChatMessage, ChatPhase, ChatRole, ChatSession};
pub use patient::{find_patient, Patient, PATIENTS};
pub use report::{ReportBlock, ReportDocument};
pub use route::Route;
pub use slice::{OverlayMode, SliceCursor, SlicePaths};
